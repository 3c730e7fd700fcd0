mod common;

use firestorm::{
    memory::{InMemoryServer, Method},
    prelude::*,
    serde_json::{Value, json, to_value},
    transport::Response,
};
use pretty_assertions::assert_eq;

use common::{client, server_with};

fn users() -> Value {
    json!({
        "alice": { "name": "Alice", "age": 30, "tags": ["admin", "dev"] },
        "bob": { "name": "bob", "age": 17, "tags": ["dev"] },
        "carol": { "name": "Carol", "age": 45, "tags": [] }
    })
}

fn stamp(tag: &'static str) -> impl Fn(Document) -> Document + Send + Sync + 'static {
    move |mut document: Document| {
        let trail = document
            .get("trail")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        document.insert("trail".into(), json!(trail + tag));
        document
    }
}

#[tokio::test]
async fn get_injects_the_key() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let alice = client.collection("users").get("alice").await.unwrap();

    assert_eq!(
        Value::Object(alice),
        json!({ "name": "Alice", "age": 30, "tags": ["admin", "dev"], "id": "alice" })
    );

    let request = server.last_request().await.unwrap();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, "http://firestorm.test/get.php");
    assert_eq!(request.body, json!({ "collection": "users", "command": "get", "id": "alice" }));
}

#[tokio::test]
async fn missing_document_is_a_transport_error() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let err = client.collection("users").get("nobody").await.unwrap_err();

    assert!(matches!(err, FirestormError::Transport { status: 404, .. }));
}

#[tokio::test]
async fn custom_id_field() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let users = client.collection("users").with_id_field("key");
    let bob = users.get("bob").await.unwrap();

    assert_eq!(bob["key"], json!("bob"));
    assert!(!bob.contains_key("id"));
}

#[tokio::test]
async fn search_keys_skips_unknown_keys() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let found = client
        .collection("users")
        .search_keys(["carol", "nobody", "alice"])
        .await
        .unwrap();

    let ids: Vec<&Value> = found.iter().map(|d| &d["id"]).collect();
    assert_eq!(ids, vec![&json!("carol"), &json!("alice")]);
    assert_eq!(
        server.last_request().await.unwrap().body["search"],
        json!(["carol", "nobody", "alice"])
    );
}

#[tokio::test]
async fn search_combines_options() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let found = client
        .collection("users")
        .search(
            &[
                SearchOption::gte("age", 18),
                SearchOption::array_contains("tags", "dev"),
            ],
            false,
        )
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], json!("alice"));

    let request = server.last_request().await.unwrap();
    assert!(request.body.get("random").is_none());
}

#[tokio::test]
async fn search_sends_ignore_case_under_its_wire_name() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let found = client
        .collection("users")
        .search(&[SearchOption::starts_with("name", "B").ignore_case()], false)
        .await
        .unwrap();

    assert_eq!(found[0]["id"], json!("bob"));
    assert_eq!(
        server.last_request().await.unwrap().body["search"],
        json!([{ "field": "name", "criteria": "startsWith", "value": "B", "ignoreCase": true }])
    );
}

#[tokio::test]
async fn invalid_search_never_reaches_the_server() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    let err = users
        .search(&[SearchOption::is_in("age", 30)], false)
        .await
        .unwrap_err();
    assert!(matches!(err, FirestormError::InvalidArgument(_)));

    let err = users
        .search(&[SearchOption::eq("", "x")], false)
        .await
        .unwrap_err();
    assert!(matches!(err, FirestormError::InvalidArgument(_)));

    assert_eq!(server.request_count().await, 0);
}

#[tokio::test]
async fn seeded_search_is_reproducible() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    let first = users.search(&[SearchOption::gte("age", 0)], 42i64).await.unwrap();
    let second = users.search(&[SearchOption::gte("age", 0)], 42i64).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(server.last_request().await.unwrap().body["random"], json!({ "seed": 42 }));

    users
        .search(&[SearchOption::gte("age", 0)], SearchRandom::from(0i64))
        .await
        .unwrap();
    assert_eq!(server.last_request().await.unwrap().body["random"], json!({ "seed": 0 }));

    users.search(&[SearchOption::gte("age", 0)], true).await.unwrap();
    assert_eq!(server.last_request().await.unwrap().body["random"], json!({}));
}

#[tokio::test]
async fn read_raw_original_keeps_the_stored_shape() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let mut collection = client.collection("users");
    collection.register_decorator(stamp("f"));

    let original = collection.read_raw(true).await.unwrap();
    assert_eq!(to_value(&original).unwrap(), users());

    let injected = collection.read_raw(false).await.unwrap();
    for (key, document) in &injected {
        assert_eq!(document["id"], json!(key));
        assert_eq!(document["trail"], json!("f"));
    }
}

#[tokio::test]
async fn read_raw_original_keeps_scalar_entries() {
    let server = server_with("stats", json!({ "visits": 3, "name": "x" })).await;
    let client = client(&server);
    let stats = client.collection("stats");

    assert_eq!(
        to_value(stats.read_raw(true).await.unwrap()).unwrap(),
        json!({ "visits": 3, "name": "x" })
    );
    assert!(matches!(
        stats.read_raw(false).await,
        Err(FirestormError::UnexpectedResponseShape(_))
    ));
}

#[tokio::test]
async fn select_projects_and_injects() {
    let server = server_with("things", json!({ "k1": { "a": 1, "b": 1 }, "k2": { "a": 2 } })).await;
    let client = client(&server);

    let selected = client
        .collection("things")
        .select(&SelectOption::new(["a"]))
        .await
        .unwrap();

    assert_eq!(
        to_value(&selected).unwrap(),
        json!({ "k1": { "a": 1, "id": "k1" }, "k2": { "a": 2, "id": "k2" } })
    );
}

#[tokio::test]
async fn values_are_distinct() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    let tags = users.values(&ValueOption::new("tags").flatten()).await.unwrap();
    assert_eq!(tags, vec![json!("admin"), json!("dev")]);

    let ages = users.values(&ValueOption::new("age")).await.unwrap();
    assert_eq!(ages, vec![json!(30), json!(17), json!(45)]);
}

#[tokio::test]
async fn random_validates_before_sending() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    assert!(matches!(
        users.random(Some(-2), None, None).await,
        Err(FirestormError::InvalidArgument(_))
    ));
    assert!(matches!(
        users.random(None, None, Some(0)).await,
        Err(FirestormError::InvalidArgument(_))
    ));
    assert!(matches!(
        users.random(None, Some(1), Some(-1)).await,
        Err(FirestormError::InvalidArgument(_))
    ));
    assert_eq!(server.request_count().await, 0);

    let sample = users.random(None, Some(5), None).await.unwrap();
    assert_eq!(sample.len(), 3);
    assert_eq!(
        server.last_request().await.unwrap().body["random"],
        json!({ "seed": 5, "offset": 0 })
    );
}

#[tokio::test]
async fn random_respects_max_and_offset() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    let all = users.random(Some(-1), Some(9), None).await.unwrap();
    let page = users.random(Some(2), Some(9), Some(1)).await.unwrap();

    let all_keys: Vec<&String> = all.keys().collect();
    let page_keys: Vec<&String> = page.keys().collect();
    assert_eq!(page_keys, all_keys[1..3].to_vec());
    assert!(page.values().all(|d| d.contains_key("id")));
}

#[tokio::test]
async fn decorators_run_in_registration_order() {
    let server = server_with("users", users()).await;
    let client = client(&server);

    let mut users = client.collection("users");
    users.register_decorator(stamp("f"));
    let g = users.register_decorator(stamp("g"));

    assert_eq!(users.get("alice").await.unwrap()["trail"], json!("fg"));
    assert_eq!(users.decorators().len(), 2);
    assert_eq!(g(Document::new())["trail"], json!("g"));

    let found = users.search(&[SearchOption::lt("age", 18)], false).await.unwrap();
    assert_eq!(found[0]["trail"], json!("fg"));

    let ages = users.values(&ValueOption::new("age")).await.unwrap();
    assert!(ages.iter().all(Value::is_number));
}

#[tokio::test]
async fn sha1_tracks_content() {
    let server = server_with("users", users()).await;
    let client = client(&server);
    let users = client.collection("users");

    let before = users.sha1().await.unwrap();
    assert_eq!(before.len(), 40);
    assert!(before.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(users.sha1().await.unwrap(), before);

    users.remove("bob").await.unwrap();
    assert_ne!(users.sha1().await.unwrap(), before);
}

#[tokio::test]
async fn bare_string_bodies_are_rejected() {
    let server = InMemoryServer::new(common::TOKEN);
    server.script("search", Response::new(200, json!("Fatal error"))).await;
    server.script("sha1", Response::new(200, json!({ "hash": "abc" }))).await;
    let client = client(&server);
    let users = client.collection("users");

    let err = users.search(&[SearchOption::eq("a", 1)], false).await.unwrap_err();
    assert!(matches!(err, FirestormError::UnexpectedResponseShape(detail) if detail == "Fatal error"));

    assert!(matches!(
        users.sha1().await,
        Err(FirestormError::UnexpectedResponseShape(_))
    ));
}

#[tokio::test]
async fn empty_collections_read_as_empty() {
    let server = InMemoryServer::new(common::TOKEN);
    let client = client(&server);
    let users = client.collection("users");

    assert!(users.read_raw(false).await.unwrap().is_empty());
    assert!(users.search(&[SearchOption::eq("a", 1)], false).await.unwrap().is_empty());
}
