// Process endpoints
//
// Lifecycle (create, update, delete, start/stop/restart) and per-process
// introspection: state, logs, config, input probe.

use reqwest::Method;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::client::RestreamerClient;
use crate::endpoint::PathBuilder;
use crate::error::Error;
use crate::models::{
    LogList, NewProcess, ProbeInfo, Process, ProcessCommand, ProcessList, ProcessState,
    ProcessStateWire, ProbeWire,
};

fn process_path(id: &str) -> PathBuilder {
    PathBuilder::api().lit("process").id(id)
}

impl RestreamerClient {
    /// List all processes.
    ///
    /// `GET /api/v3/process`
    pub async fn get_processes(&mut self) -> Result<ProcessList, Error> {
        debug!("listing processes");
        let path = PathBuilder::api().lit("process").build();
        let resp = self.call(Method::GET, &path, None).await?;
        self.decode_list(&resp, None)
    }

    /// First process whose reference matches.
    ///
    /// Lists every process; fails with `NotFound` when none carries
    /// `reference`.
    pub async fn find_process_by_reference(&mut self, reference: &str) -> Result<Process, Error> {
        let reference = self.require(reference, "process reference")?;
        let found = self
            .get_processes()
            .await?
            .into_iter()
            .find(|p| p.reference == reference);
        match found {
            Some(process) => Ok(process),
            None => self.fail(Error::NotFound {
                message: format!("no process with reference {reference:?}"),
            }),
        }
    }

    /// Get one process.
    ///
    /// `GET /api/v3/process/{id}`
    ///
    /// A response without a process id fails with `UnexpectedResponse`.
    pub async fn get_process(&mut self, process_id: &str) -> Result<Process, Error> {
        let process_id = self.require(process_id, "process id")?;
        let process: Process = self.get(&process_path(process_id).build()).await?;
        if process.id.is_empty() {
            return self.fail(Error::UnexpectedResponse(format!(
                "no process id in response for {process_id:?}"
            )));
        }
        Ok(process)
    }

    /// Create a process that restreams one input to every output URL.
    ///
    /// `POST /api/v3/process` with `{reference, command, autostart: true}`
    pub async fn create_process(&mut self, params: &NewProcess) -> Result<(), Error> {
        self.require(&params.reference, "process reference")?;
        self.require(&params.input_url, "input URL")?;
        if params.output_urls.is_empty() {
            return self.invalid("at least one output URL is required");
        }
        if params.output_urls.iter().any(String::is_empty) {
            return self.invalid("output URLs may not be empty");
        }

        // The command embeds stream keys; only the reference is logged.
        info!(
            reference = %params.reference,
            outputs = params.output_urls.len(),
            "creating process"
        );
        let body = json!({
            "reference": params.reference,
            "command": params.ffmpeg_command(),
            "autostart": true,
        });
        let path = PathBuilder::api().lit("process").build();
        self.send_json(Method::POST, &path, &body).await?;
        Ok(())
    }

    /// Replace a process configuration.
    ///
    /// `PUT /api/v3/process/{id}`
    pub async fn update_process(&mut self, process_id: &str, config: &Value) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        if !config.is_object() {
            return self.invalid("process config must be a JSON object");
        }
        debug!(process_id, "updating process");
        self.send_json(Method::PUT, &process_path(process_id).build(), config)
            .await?;
        Ok(())
    }

    /// Delete a process.
    ///
    /// `DELETE /api/v3/process/{id}`
    pub async fn delete_process(&mut self, process_id: &str) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        info!(process_id, "deleting process");
        self.delete(&process_path(process_id).build()).await
    }

    /// Send a lifecycle command.
    ///
    /// `POST /api/v3/process/{id}/command` with `{"command": "start"|"stop"|"restart"}`
    pub async fn process_command(
        &mut self,
        process_id: &str,
        command: ProcessCommand,
    ) -> Result<(), Error> {
        let process_id = self.require(process_id, "process id")?;
        debug!(process_id, %command, "process command");
        let path = process_path(process_id).lit("command").build();
        self.send_json(Method::POST, &path, &json!({ "command": command.to_string() }))
            .await?;
        Ok(())
    }

    pub async fn start_process(&mut self, process_id: &str) -> Result<(), Error> {
        self.process_command(process_id, ProcessCommand::Start).await
    }

    pub async fn stop_process(&mut self, process_id: &str) -> Result<(), Error> {
        self.process_command(process_id, ProcessCommand::Stop).await
    }

    pub async fn restart_process(&mut self, process_id: &str) -> Result<(), Error> {
        self.process_command(process_id, ProcessCommand::Restart).await
    }

    /// Get live telemetry for a process.
    ///
    /// `GET /api/v3/process/{id}/state`
    pub async fn get_process_state(&mut self, process_id: &str) -> Result<ProcessState, Error> {
        let process_id = self.require(process_id, "process id")?;
        let wire: ProcessStateWire = self
            .get(&process_path(process_id).lit("state").build())
            .await?;
        Ok(ProcessState::from(wire))
    }

    /// Get the log lines of a process.
    ///
    /// `GET /api/v3/process/{id}/log`
    pub async fn get_process_logs(&mut self, process_id: &str) -> Result<LogList, Error> {
        let process_id = self.require(process_id, "process id")?;
        let path = process_path(process_id).lit("log").build();
        let resp = self.call(Method::GET, &path, None).await?;
        self.decode_list(&resp, None)
    }

    /// Get the stored configuration of a process as raw JSON.
    ///
    /// `GET /api/v3/process/{id}/config`
    pub async fn get_process_config(&mut self, process_id: &str) -> Result<Value, Error> {
        let process_id = self.require(process_id, "process id")?;
        self.get(&process_path(process_id).lit("config").build())
            .await
    }

    /// Probe the input of a process for format and stream details.
    ///
    /// `GET /api/v3/process/{id}/probe`
    pub async fn probe_input(&mut self, process_id: &str) -> Result<ProbeInfo, Error> {
        let process_id = self.require(process_id, "process id")?;
        let wire: ProbeWire = self
            .get(&process_path(process_id).lit("probe").build())
            .await?;
        Ok(ProbeInfo::from(wire))
    }
}
