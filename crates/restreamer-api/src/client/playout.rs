// Playout endpoints
//
// Per-input view of a running process: connection status, live input
// switching, reconnect and keyframe snapshots.

use bytes::Bytes;
use reqwest::Method;
use serde_json::json;
use tracing::info;

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::PlayoutStatus;

fn playout_path(process_id: &str, input_id: &str) -> PathBuilder {
    PathBuilder::api()
        .lit("process")
        .id(process_id)
        .lit("playout")
        .id(input_id)
}

impl RestreamerClient {
    /// Status of one process input.
    ///
    /// `GET /api/v3/process/{id}/playout/{input}/status`
    pub async fn get_playout_status(
        &mut self,
        process_id: &str,
        input_id: &str,
    ) -> Result<PlayoutStatus, Error> {
        let process_id = self.require(process_id, "process id")?;
        let input_id = self.require(input_id, "input id")?;
        let mut status: PlayoutStatus = self
            .get(&playout_path(process_id, input_id).lit("status").build())
            .await?;
        status.input_id = input_id.to_owned();
        Ok(status)
    }

    /// Point an input at a different source without restarting the process.
    ///
    /// `PUT /api/v3/process/{id}/playout/{input}/stream` with `{"url": ...}`
    pub async fn switch_input_stream(
        &mut self,
        process_id: &str,
        input_id: &str,
        url: &str,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let input_id = self.require(input_id, "input id")?;
        self.require(url, "input URL")?;
        let path = playout_path(process_id, input_id).lit("stream").build();
        self.send_json(Method::PUT, &path, &json!({ "url": url }))
            .await?;
        info!(process_id, input_id, "switched input stream");
        Ok(())
    }

    /// Force an input to reconnect.
    ///
    /// `GET /api/v3/process/{id}/playout/{input}/reopen`
    pub async fn reopen_input(&mut self, process_id: &str, input_id: &str) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let input_id = self.require(input_id, "input id")?;
        let path = playout_path(process_id, input_id).lit("reopen").build();
        self.call(Method::GET, &path, None).await?;
        info!(process_id, input_id, "reopened input");
        Ok(())
    }

    /// Latest keyframe of an input as an encoded image.
    ///
    /// `GET /api/v3/process/{id}/playout/{input}/keyframe/{name}`
    ///
    /// The name selects the format, e.g. `last.jpg` or `last.png`.
    pub async fn get_keyframe(
        &mut self,
        process_id: &str,
        input_id: &str,
        name: &str,
    ) -> Result<Bytes, Error> {
        let process_id = self.require(process_id, "process id")?;
        let input_id = self.require(input_id, "input id")?;
        let name = self.require(name, "keyframe name")?;
        let path = playout_path(process_id, input_id)
            .lit("keyframe")
            .id(name)
            .build();
        let resp = self.call(Method::GET, &path, None).await?;
        Ok(resp.body)
    }
}
