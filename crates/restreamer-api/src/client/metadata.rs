// Metadata endpoints
//
// Free-form JSON stored by the daemon under a key, either globally or
// scoped to one process.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;

impl RestreamerClient {
    /// `GET /api/v3/metadata/{key}`
    pub async fn get_metadata(&mut self, key: &str) -> Result<Value, Error> {
        let key = self.require(key, "metadata key")?;
        self.get(&PathBuilder::api().lit("metadata").id(key).build())
            .await
    }

    /// `PUT /api/v3/metadata/{key}`
    pub async fn set_metadata(&mut self, key: &str, value: &Value) -> Result<(), Error> {
        let key = self.require(key, "metadata key")?;
        debug!(key, "storing metadata");
        self.send_json(
            Method::PUT,
            &PathBuilder::api().lit("metadata").id(key).build(),
            value,
        )
        .await?;
        Ok(())
    }

    /// `GET /api/v3/process/{id}/metadata/{key}`
    pub async fn get_process_metadata(
        &mut self,
        process_id: &str,
        key: &str,
    ) -> Result<Value, Error> {
        let process_id = self.require(process_id, "process id")?;
        let key = self.require(key, "metadata key")?;
        let path = PathBuilder::api()
            .lit("process")
            .id(process_id)
            .lit("metadata")
            .id(key)
            .build();
        self.get(&path).await
    }

    /// `PUT /api/v3/process/{id}/metadata/{key}`
    pub async fn set_process_metadata(
        &mut self,
        process_id: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let key = self.require(key, "metadata key")?;
        debug!(process_id, key, "storing process metadata");
        let path = PathBuilder::api()
            .lit("process")
            .id(process_id)
            .lit("metadata")
            .id(key)
            .build();
        self.send_json(Method::PUT, &path, value).await?;
        Ok(())
    }
}
