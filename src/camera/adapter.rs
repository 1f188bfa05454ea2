use std::sync::Arc;
use std::time::Duration;

use crate::config::CameraConfig;
use crate::tools::ToolOutput;

use super::onvif::OnvifConnector;
use super::stream::{encode_png, FfmpegStreamOpener};
use super::{CameraConnector, CameraCredentials, CameraError, CameraSession, StreamOpener};

pub const CREDENTIALS_MISSING: &str = "Error: Camera credentials are not configured on the server.";
pub const NO_PROFILES: &str = "Error: No media profiles available on camera.";
pub const NO_STREAM_URI: &str = "Error: Camera did not return a stream URI.";
pub const STREAM_OPEN_FAILED: &str = "Error: Could not open camera stream.";
pub const FRAME_READ_FAILED: &str = "Error: Failed to read a frame from the camera stream.";
pub const REBOOTING: &str = "Success! The camera is now rebooting.";
pub const AUTH_FAILED: &str = "Error: Camera authentication failed. Please check credentials.";

/// Drives the real camera for the dispatch engine.
///
/// Every failure on this path comes back as descriptive text; nothing here
/// returns an error to the caller.
pub struct CameraAdapter {
    credentials: Option<CameraCredentials>,
    connector: Arc<dyn CameraConnector>,
    streams: Arc<dyn StreamOpener>,
}

impl CameraAdapter {
    pub fn new(
        credentials: Option<CameraCredentials>,
        connector: Arc<dyn CameraConnector>,
        streams: Arc<dyn StreamOpener>,
    ) -> Self {
        Self {
            credentials,
            connector,
            streams,
        }
    }

    /// ONVIF + ffmpeg, configured from the `[camera]` section.
    pub fn from_config(config: &CameraConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self::new(
            config.credentials(),
            Arc::new(OnvifConnector::new(timeout)),
            Arc::new(FfmpegStreamOpener::new(config.ffmpeg.clone(), timeout)),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub async fn execute(&self, action: &str) -> ToolOutput {
        let Some(creds) = &self.credentials else {
            return ToolOutput::text(CREDENTIALS_MISSING);
        };

        tracing::debug!(action, host = %creds.host, "starting camera command");
        match self.run(creds, action).await {
            Ok(output) => output,
            Err(err) => ToolOutput::text(describe_failure(&err, &creds.host)),
        }
    }

    async fn run(
        &self,
        creds: &CameraCredentials,
        action: &str,
    ) -> Result<ToolOutput, CameraError> {
        let session = self.connector.connect(creds).await?;

        match action {
            "take_snapshot" => self.snapshot(creds, session.as_ref()).await,
            // A camera has no on/off state; every power action is a reboot.
            "reboot" | "turn_on" | "turn_off" => {
                session.reboot().await?;
                Ok(ToolOutput::text(REBOOTING))
            }
            "get_status" => {
                let info = session.get_device_info().await?;
                Ok(ToolOutput::text(format!(
                    "Success! Camera is online. Model: {}, Firmware: {}.",
                    info.model, info.firmware
                )))
            }
            other => Ok(ToolOutput::text(format!(
                "Error: The command '{other}' is not supported for the camera."
            ))),
        }
    }

    async fn snapshot(
        &self,
        creds: &CameraCredentials,
        session: &dyn CameraSession,
    ) -> Result<ToolOutput, CameraError> {
        let profiles = session.get_profiles().await?;
        let Some(profile) = profiles.first() else {
            return Ok(ToolOutput::text(NO_PROFILES));
        };

        let uri = match session.get_stream_uri(profile).await? {
            Some(uri) if !uri.trim().is_empty() => uri,
            _ => return Ok(ToolOutput::text(NO_STREAM_URI)),
        };
        let uri = inject_credentials(&uri, &creds.username, &creds.password);

        let mut stream = match self.streams.open(&uri).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("could not open camera stream: {e}");
                return Ok(ToolOutput::text(STREAM_OPEN_FAILED));
            }
        };
        let frame = stream.read_frame().await;
        stream.release().await;

        let Some(frame) = frame else {
            return Ok(ToolOutput::text(FRAME_READ_FAILED));
        };
        Ok(ToolOutput::png(encode_png(&frame)?))
    }
}

/// Insert `user:pass@` after the scheme separator. URIs without one, or
/// empty credentials, pass through unchanged.
pub fn inject_credentials(uri: &str, username: &str, password: &str) -> String {
    if username.is_empty() || password.is_empty() {
        return uri.to_string();
    }
    match uri.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{username}:{password}@{rest}"),
        None => uri.to_string(),
    }
}

/// Translate a camera error into the text handed back to the agent.
pub fn describe_failure(err: &CameraError, host: &str) -> String {
    if matches!(err, CameraError::Timeout) {
        tracing::warn!(host, "camera connection timed out");
        return format!("Error: Connection timed out to camera at {host}.");
    }
    if err.is_auth_failure() {
        tracing::warn!(host, "camera rejected credentials");
        return AUTH_FAILED.to_string();
    }
    tracing::warn!(host, "unexpected camera error: {err}");
    format!("An unexpected camera error occurred: {err}")
}
