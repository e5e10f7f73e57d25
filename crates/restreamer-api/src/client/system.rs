// System endpoints
//
// Liveness, version info, daemon configuration, ingest stream listings and
// the FFmpeg capability catalog.

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::{ApiInfo, Skills};

impl RestreamerClient {
    /// Liveness probe. Succeeds only when the daemon answers `"pong"`.
    ///
    /// `GET /ping` (no token)
    pub async fn ping(&mut self) -> Result<(), Error> {
        let resp = self
            .call_public(Method::GET, &PathBuilder::root("/ping").build())
            .await?;
        let pong = serde_json::from_slice::<Value>(&resp.body)
            .ok()
            .is_some_and(|v| v.as_str() == Some("pong"));
        if pong {
            Ok(())
        } else {
            self.fail(Error::UnexpectedResponse(
                "Server did not respond with 'pong'".into(),
            ))
        }
    }

    /// Daemon name and version.
    ///
    /// `GET /api` (no token)
    pub async fn get_info(&mut self) -> Result<ApiInfo, Error> {
        let resp = self
            .call_public(Method::GET, &PathBuilder::root("/api").build())
            .await?;
        self.decode(&resp)
    }

    /// Active daemon configuration.
    ///
    /// `GET /api/v3/config`
    pub async fn get_config(&mut self) -> Result<Value, Error> {
        self.get(&PathBuilder::api().lit("config").build()).await
    }

    /// Store a new daemon configuration. Takes effect after
    /// [`reload_config`](Self::reload_config).
    ///
    /// `PUT /api/v3/config`
    pub async fn set_config(&mut self, config: &Value) -> Result<(), Error> {
        if !config.is_object() {
            return self.invalid("daemon config must be a JSON object");
        }
        self.send_json(Method::PUT, &PathBuilder::api().lit("config").build(), config)
            .await?;
        info!("stored daemon config");
        Ok(())
    }

    /// `GET /api/v3/config/reload`
    pub async fn reload_config(&mut self) -> Result<(), Error> {
        let path = PathBuilder::api().lit("config").lit("reload").build();
        self.call(Method::GET, &path, None).await?;
        info!("reloaded daemon config");
        Ok(())
    }

    /// Publishers currently connected to the RTMP server.
    ///
    /// `GET /api/v3/rtmp`
    pub async fn get_rtmp_streams(&mut self) -> Result<Value, Error> {
        self.get(&PathBuilder::api().lit("rtmp").build()).await
    }

    /// Streams currently served by the SRT server.
    ///
    /// `GET /api/v3/srt`
    pub async fn get_srt_streams(&mut self) -> Result<Value, Error> {
        self.get(&PathBuilder::api().lit("srt").build()).await
    }

    /// FFmpeg capabilities: codecs, formats, protocols, filters and
    /// hardware accelerators.
    ///
    /// `GET /api/v3/skills`
    pub async fn get_skills(&mut self) -> Result<Skills, Error> {
        self.get(&PathBuilder::api().lit("skills").build()).await
    }

    /// Re-detect FFmpeg capabilities, e.g. after an FFmpeg upgrade.
    ///
    /// `GET /api/v3/skills/reload`
    pub async fn reload_skills(&mut self) -> Result<(), Error> {
        let path = PathBuilder::api().lit("skills").lit("reload").build();
        self.call(Method::GET, &path, None).await?;
        info!("reloaded skills");
        Ok(())
    }
}
