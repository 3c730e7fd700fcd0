use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::trace;

use firestorm_core::{
    error::{FirestormError, FirestormResult},
    transport::{BinaryResponse, FilePart, Response, Transport, TransportBuilder},
};

/// [`Transport`] sending requests to a Firestorm server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> FirestormResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| FirestormError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| FirestormError::Connection(e.to_string()))?;

        trace!(url, status, "response received");

        Ok(Response::new(status, decode_body(text)))
    }
}

/// Parses a body as JSON, keeping the raw text when it is not.
fn decode_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.send(self.client.get(url).json(body), url).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.send(self.client.post(url).json(body), url).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        file: FilePart,
    ) -> FirestormResult<Response> {
        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part(file.field, Part::bytes(file.content).file_name(file.file_name));

        self.send(self.client.post(url).multipart(form), url).await
    }

    async fn delete(&self, url: &str, body: &Value) -> FirestormResult<Response> {
        self.send(self.client.delete(url).json(body), url).await
    }

    async fn get_binary(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> FirestormResult<BinaryResponse> {
        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FirestormError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FirestormError::Connection(e.to_string()))?;

        trace!(url, status, size = bytes.len(), "binary response received");

        Ok(BinaryResponse::new(status, bytes.to_vec()))
    }
}

/// Builder for [`HttpTransport`] instances.
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Applies a timeout to every request, from connection to the end of the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[async_trait]
impl TransportBuilder for HttpTransportBuilder {
    type Transport = HttpTransport;

    async fn build(self) -> FirestormResult<Self::Transport> {
        let mut builder = Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(HttpTransport::new(
            builder
                .build()
                .map_err(|e| FirestormError::Configuration(e.to_string()))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// One request as it arrived on the socket.
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
            })
        }

        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        fn text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Accepts a single connection, records the request and answers `reply` as JSON.
    async fn capture_one(reply: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buffer = Vec::new();
            let mut chunk = [0u8; 4096];

            let head_end = loop {
                let read = stream.read(&mut chunk).await.unwrap();
                assert!(read > 0, "connection closed inside the headers");
                buffer.extend_from_slice(&chunk[..read]);
                if let Some(at) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                    break at + 4;
                }
            };

            let mut captured = Captured {
                head: String::from_utf8_lossy(&buffer[..head_end]).into_owned(),
                body: Vec::new(),
            };
            let length: usize = captured
                .header("content-length")
                .map_or(0, |value| value.parse().unwrap());

            while buffer.len() < head_end + length {
                let read = stream.read(&mut chunk).await.unwrap();
                assert!(read > 0, "connection closed inside the body");
                buffer.extend_from_slice(&chunk[..read]);
            }
            captured.body = buffer[head_end..head_end + length].to_vec();

            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                reply.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();

            captured
        });

        (address, handle)
    }

    async fn transport() -> HttpTransport {
        HttpTransport::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reads_send_the_envelope_as_a_json_body() {
        let (address, server) = capture_one(r#"{"k1":{"a":1}}"#).await;
        let envelope = json!({ "collection": "users", "command": "search", "search": [] });

        let response = transport()
            .await
            .get(&format!("{address}/get.php"), &envelope)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert_eq!(response, Response::new(200, json!({ "k1": { "a": 1 } })));
        assert!(captured.request_line().starts_with("GET /get.php "));
        assert_eq!(captured.header("content-type"), Some("application/json"));
        assert_eq!(captured.json(), envelope);
    }

    #[tokio::test]
    async fn deletes_send_the_envelope_as_a_json_body() {
        let (address, server) = capture_one(r#"{"message":"deleted"}"#).await;
        let envelope = json!({ "token": "tok", "path": "docs/a.txt" });

        let response = transport()
            .await
            .delete(&format!("{address}/files.php"), &envelope)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert_eq!(response.body, json!({ "message": "deleted" }));
        assert!(captured.request_line().starts_with("DELETE /files.php "));
        assert_eq!(captured.header("content-type"), Some("application/json"));
        assert_eq!(captured.json(), envelope);
    }

    #[tokio::test]
    async fn uploads_are_multipart_forms() {
        let (address, server) = capture_one(r#"{"message":"Written file to docs/a.txt"}"#).await;
        let fields = [("path", "docs/a.txt"), ("overwrite", "false"), ("token", "tok")]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let file = FilePart {
            field: "file".into(),
            file_name: "a.txt".into(),
            content: b"hello".to_vec(),
        };

        transport()
            .await
            .post_multipart(&format!("{address}/files.php"), fields, file)
            .await
            .unwrap();
        let captured = server.await.unwrap();

        assert!(captured.request_line().starts_with("POST /files.php "));
        assert!(
            captured
                .header("content-type")
                .is_some_and(|value| value.starts_with("multipart/form-data; boundary="))
        );

        let body = captured.text();
        for (name, value) in [("path", "docs/a.txt"), ("overwrite", "false"), ("token", "tok")] {
            assert!(
                body.contains(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")),
                "missing field {name} in {body}"
            );
        }
        assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\""));
        assert!(body.contains("\r\n\r\nhello\r\n"));
    }

    #[test]
    fn bodies_fall_back_to_raw_text() {
        assert_eq!(decode_body(r#"{"id":"abc"}"#.to_string()), json!({ "id": "abc" }));
        assert_eq!(decode_body("Fatal error".to_string()), json!("Fatal error"));
        assert_eq!(decode_body("\"quoted\"".to_string()), json!("quoted"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_error() {
        let transport = HttpTransport::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .await
            .unwrap();

        let result = transport
            .get("http://127.0.0.1:1/get.php", &json!({ "collection": "c", "command": "sha1" }))
            .await;

        assert!(matches!(result, Err(FirestormError::Connection(_))));
    }
}
