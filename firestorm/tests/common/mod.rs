#![allow(dead_code)]

use std::sync::Arc;

use firestorm::{
    Config, Firestorm,
    memory::InMemoryServer,
    serde_json::Value,
    transport::TransportBuilder,
};

pub const ADDRESS: &str = "http://firestorm.test";
pub const TOKEN: &str = "secret";

pub fn config() -> Arc<Config> {
    Arc::new(Config::builder().address(ADDRESS).token(TOKEN).build())
}

pub fn client(server: &InMemoryServer) -> Firestorm<InMemoryServer> {
    Firestorm::with_config(server.clone(), config())
}

pub async fn server_with(collection: &str, content: Value) -> InMemoryServer {
    InMemoryServer::builder()
        .token(TOKEN)
        .collection(collection, content)
        .build()
        .await
        .unwrap()
}
