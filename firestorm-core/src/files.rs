//! File storage endpoint.
//!
//! Files live outside collections and are addressed by path. These calls pass straight
//! through to the transport; no shaping is involved beyond attaching the write token.

use serde_json::json;
use tracing::debug;

use crate::{
    config::Config,
    error::FirestormResult,
    response::{self, WriteConfirmation},
    transport::{FilePart, Transport},
};

/// Handle on the server's `files.php` endpoint.
#[derive(Debug)]
pub struct FileHandle<'a, T: Transport> {
    transport: &'a T,
    config: &'a Config,
}

impl<'a, T: Transport> FileHandle<'a, T> {
    pub(crate) fn new(transport: &'a T, config: &'a Config) -> Self {
        Self { transport, config }
    }

    /// Downloads the file stored at `path`.
    pub async fn get(&self, path: &str) -> FirestormResult<Vec<u8>> {
        let url = self.config.file_address()?;

        debug!(path, "downloading file");

        response::extract_binary(
            self.transport
                .get_binary(&url, vec![("path".to_string(), path.to_string())])
                .await?,
        )
    }

    /// Uploads `content` to `path`. Fails server-side if the file exists and
    /// `overwrite` is not set.
    pub async fn upload(
        &self,
        path: &str,
        content: impl Into<Vec<u8>>,
        overwrite: bool,
    ) -> FirestormResult<WriteConfirmation> {
        let url = self.config.file_address()?;
        let token = self.config.token()?;

        let fields = vec![
            ("path".to_string(), path.to_string()),
            ("overwrite".to_string(), overwrite.to_string()),
            ("token".to_string(), token),
        ];
        let file = FilePart {
            field: "file".to_string(),
            file_name: file_name(path).to_string(),
            content: content.into(),
        };

        debug!(path, overwrite, size = file.content.len(), "uploading file");

        response::write_confirmation(response::extract(
            self.transport
                .post_multipart(&url, fields, file)
                .await?,
        )?)
    }

    /// Deletes the file stored at `path`.
    pub async fn delete(&self, path: &str) -> FirestormResult<WriteConfirmation> {
        let url = self.config.file_address()?;
        let body = json!({ "path": path, "token": self.config.token()? });

        debug!(path, "deleting file");

        response::write_confirmation(response::extract(self.transport.delete(&url, &body).await?)?)
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
