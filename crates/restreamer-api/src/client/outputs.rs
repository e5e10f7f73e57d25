// Dynamic output endpoints
//
// Destinations attached to a running process can be added, retargeted and
// removed without restarting it. Each output also carries its own encoding
// overrides.

use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::{EncodingParams, EncodingWire, OutputList};

fn outputs_path(process_id: &str) -> PathBuilder {
    PathBuilder::api().lit("process").id(process_id).lit("outputs")
}

impl RestreamerClient {
    /// List the outputs of a process.
    ///
    /// `GET /api/v3/process/{id}/outputs` -> `{"outputs": [...]}`
    pub async fn get_process_outputs(&mut self, process_id: &str) -> Result<OutputList, Error> {
        let process_id = self.require(process_id, "process id")?;
        let resp = self
            .call(Method::GET, &outputs_path(process_id).build(), None)
            .await?;
        self.decode_list(&resp, Some("outputs"))
    }

    /// Attach a new output to a running process.
    ///
    /// `POST /api/v3/process/{id}/outputs` with `{id, url, video_filter?}`
    pub async fn add_process_output(
        &mut self,
        process_id: &str,
        output_id: &str,
        url: &str,
        video_filter: Option<&str>,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let output_id = self.require(output_id, "output id")?;
        self.require(url, "output URL")?;

        let mut body = json!({ "id": output_id, "url": url });
        if let Some(filter) = video_filter.filter(|f| !f.is_empty()) {
            body["video_filter"] = json!(filter);
        }

        self.send_json(Method::POST, &outputs_path(process_id).build(), &body)
            .await?;
        info!(process_id, output_id, "added output");
        Ok(())
    }

    /// Detach an output from a running process.
    ///
    /// `DELETE /api/v3/process/{id}/outputs/{output_id}`
    pub async fn remove_process_output(
        &mut self,
        process_id: &str,
        output_id: &str,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let output_id = self.require(output_id, "output id")?;
        self.delete(&outputs_path(process_id).id(output_id).build())
            .await?;
        info!(process_id, output_id, "removed output");
        Ok(())
    }

    /// Change the URL and/or video filter of an output. `None` fields are
    /// left out of the request and keep their current value.
    ///
    /// `PUT /api/v3/process/{id}/outputs/{output_id}`
    pub async fn update_process_output(
        &mut self,
        process_id: &str,
        output_id: &str,
        url: Option<&str>,
        video_filter: Option<&str>,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let output_id = self.require(output_id, "output id")?;

        let mut body = Map::new();
        if let Some(url) = url {
            body.insert("url".into(), json!(url));
        }
        if let Some(filter) = video_filter {
            body.insert("video_filter".into(), json!(filter));
        }

        self.send_json(
            Method::PUT,
            &outputs_path(process_id).id(output_id).build(),
            &Value::Object(body),
        )
        .await?;
        info!(process_id, output_id, "updated output");
        Ok(())
    }

    /// Read the encoding settings of an output.
    ///
    /// `GET /api/v3/process/{id}/outputs/{output_id}/encoding`
    pub async fn get_output_encoding(
        &mut self,
        process_id: &str,
        output_id: &str,
    ) -> Result<EncodingParams, Error> {
        let process_id = self.require(process_id, "process id")?;
        let output_id = self.require(output_id, "output id")?;
        let path = outputs_path(process_id).id(output_id).lit("encoding").build();
        let wire: EncodingWire = self.get(&path).await?;
        Ok(EncodingParams::from(wire))
    }

    /// Change the encoding settings of an output on the fly. Zero/`None`
    /// fields are left unchanged.
    ///
    /// `PUT /api/v3/process/{id}/outputs/{output_id}/encoding`
    pub async fn update_output_encoding(
        &mut self,
        process_id: &str,
        output_id: &str,
        params: &EncodingParams,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        let output_id = self.require(output_id, "output id")?;
        let path = outputs_path(process_id).id(output_id).lit("encoding").build();
        self.send_json(Method::PUT, &path, &params.to_wire()).await?;
        info!(process_id, output_id, "updated output encoding");
        Ok(())
    }
}
