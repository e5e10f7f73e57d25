// Filesystem endpoints
//
// The daemon exposes named storages (`disk`, `mem`, ...). Files are
// addressed by storage name plus a slash-separated path inside it.

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::FsList;
use crate::transport::Body;

fn storage_path(storage: &str) -> PathBuilder {
    PathBuilder::api().lit("fs").id(storage)
}

impl RestreamerClient {
    /// Resolve a file path inside a storage, recording bad paths.
    fn file_path(&mut self, storage: &str, path: &str) -> Result<String, Error> {
        let storage = self.require(storage, "storage name")?;
        let built = storage_path(storage).file_path(path).map(PathBuilder::build);
        self.record(built)
    }

    /// List the configured storages.
    ///
    /// `GET /api/v3/fs`
    pub async fn list_filesystems(&mut self) -> Result<Value, Error> {
        self.get(&PathBuilder::api().lit("fs").build()).await
    }

    /// List files in a storage, optionally filtered by a glob pattern.
    ///
    /// `GET /api/v3/fs/{storage}?glob={pattern}`
    pub async fn list_files(&mut self, storage: &str, glob: Option<&str>) -> Result<FsList, Error> {
        let storage = self.require(storage, "storage name")?;
        let path = storage_path(storage)
            .query("glob", glob.unwrap_or_default())
            .build();
        let resp = self.call(Method::GET, &path, None).await?;
        self.decode_list(&resp, None)
    }

    /// Download a file.
    ///
    /// `GET /api/v3/fs/{storage}/{path}`
    pub async fn download_file(&mut self, storage: &str, path: &str) -> Result<Bytes, Error> {
        let path = self.file_path(storage, path)?;
        let resp = self.call(Method::GET, &path, None).await?;
        debug!(bytes = resp.body.len(), "downloaded file");
        Ok(resp.body)
    }

    /// Upload a file, replacing any existing one. Empty uploads are allowed.
    ///
    /// `PUT /api/v3/fs/{storage}/{path}` with `application/data`
    pub async fn upload_file(
        &mut self,
        storage: &str,
        path: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), Error> {
        let target = self.file_path(storage, path)?;
        let body = Body::binary(data);
        let size = body.bytes.len();
        self.call(Method::PUT, &target, Some(body)).await?;
        info!(storage, path, size, "uploaded file");
        Ok(())
    }

    /// Delete a file.
    ///
    /// `DELETE /api/v3/fs/{storage}/{path}`
    pub async fn delete_file(&mut self, storage: &str, path: &str) -> Result<(), Error> {
        let target = self.file_path(storage, path)?;
        self.delete(&target).await?;
        info!(storage, path, "deleted file");
        Ok(())
    }
}
