use firestorm_core::{
    config::{ADDRESS_ENV, Config, TOKEN_ENV},
    error::FirestormError,
};
use pretty_assertions::assert_eq;

// Environment variables are process-wide, so this binary holds a single test.
#[test]
fn configuration_is_read_from_the_environment() {
    // SAFETY: no other thread of this test binary reads or writes the environment.
    unsafe {
        std::env::remove_var(ADDRESS_ENV);
        std::env::remove_var(TOKEN_ENV);
    }

    let empty = Config::from_env();
    assert!(matches!(empty.address(), Err(FirestormError::Configuration(_))));
    assert!(matches!(empty.token(), Err(FirestormError::Configuration(_))));

    // SAFETY: see above.
    unsafe {
        std::env::set_var(ADDRESS_ENV, "http://env.test/firestorm");
        std::env::set_var(TOKEN_ENV, "env-token");
    }

    let config = Config::from_env();
    assert_eq!(config.address().unwrap(), "http://env.test/firestorm/");
    assert_eq!(config.write_address().unwrap(), "http://env.test/firestorm/post.php");
    assert_eq!(config.token().unwrap(), "env-token");
}
