//! ONVIF device-management and media client (SOAP over reqwest).
//!
//! Authentication uses a WS-Security UsernameToken with PasswordDigest, the
//! same scheme the PTZ calls of most consumer cameras accept.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use reqwest::{Client, StatusCode};
use sha1::{Digest, Sha1};

use super::xml::{attribute_values, capability_xaddr, element_text, fault_reason};
use super::{
    CameraConnector, CameraCredentials, CameraError, CameraSession, DeviceInfo, MediaProfile,
};

const DEVICE_NS: &str = "http://www.onvif.org/ver10/device/wsdl";
const MEDIA_NS: &str = "http://www.onvif.org/ver10/media/wsdl";
const SCHEMA_NS: &str = "http://www.onvif.org/ver10/schema";

/// Opens sessions against `http://host:port/onvif/device_service`.
pub struct OnvifConnector {
    client: Client,
}

impl OnvifConnector {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl CameraConnector for OnvifConnector {
    /// Resolve the media service address via `GetCapabilities`.
    async fn connect(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<Box<dyn CameraSession>, CameraError> {
        let base = format!("http://{}:{}", credentials.host, credentials.port);
        let mut session = OnvifSession {
            client: self.client.clone(),
            device_url: format!("{base}/onvif/device_service"),
            media_url: format!("{base}/onvif/media_service"),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        };

        let body = session
            .call(
                &session.device_url,
                &format!(
                    r#"<tds:GetCapabilities xmlns:tds="{DEVICE_NS}"><tds:Category>All</tds:Category></tds:GetCapabilities>"#
                ),
            )
            .await?;
        if let Some(xaddr) = capability_xaddr(&body, "Media") {
            session.media_url = xaddr;
        }
        tracing::debug!(media_url = %session.media_url, "onvif session ready");
        Ok(Box::new(session))
    }
}

pub struct OnvifSession {
    client: Client,
    device_url: String,
    media_url: String,
    username: String,
    password: String,
}

impl OnvifSession {
    /// POST one SOAP operation and return the raw response body.
    async fn call(&self, url: &str, operation: &str) -> Result<String, CameraError> {
        let envelope = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
  <s:Header>{}</s:Header>
  <s:Body>{operation}</s:Body>
</s:Envelope>"#,
            ws_security_header(&self.username, &self.password)
        );

        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/soap+xml; charset=utf-8")
            .body(envelope)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CameraError::Unauthorized);
        }
        let body = resp.text().await?;

        if let Some(reason) = fault_reason(&body) {
            if body.contains("NotAuthorized") {
                return Err(CameraError::Unauthorized);
            }
            return Err(CameraError::Protocol(format!("SOAP fault: {reason}")));
        }
        if !status.is_success() {
            return Err(CameraError::Protocol(format!("HTTP {status} from {url}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl CameraSession for OnvifSession {
    async fn get_profiles(&self) -> Result<Vec<MediaProfile>, CameraError> {
        let body = self
            .call(
                &self.media_url,
                &format!(r#"<trt:GetProfiles xmlns:trt="{MEDIA_NS}"/>"#),
            )
            .await?;
        Ok(attribute_values(&body, "Profiles", "token")
            .into_iter()
            .map(|token| MediaProfile { token })
            .collect())
    }

    async fn get_stream_uri(&self, profile: &MediaProfile) -> Result<Option<String>, CameraError> {
        let operation = format!(
            r#"<trt:GetStreamUri xmlns:trt="{MEDIA_NS}" xmlns:tt="{SCHEMA_NS}">
  <trt:StreamSetup>
    <tt:Stream>RTP-Unicast</tt:Stream>
    <tt:Transport><tt:Protocol>RTSP</tt:Protocol></tt:Transport>
  </trt:StreamSetup>
  <trt:ProfileToken>{}</trt:ProfileToken>
</trt:GetStreamUri>"#,
            profile.token
        );
        let body = self.call(&self.media_url, &operation).await?;
        Ok(element_text(&body, "Uri"))
    }

    async fn reboot(&self) -> Result<(), CameraError> {
        let body = self
            .call(
                &self.device_url,
                &format!(r#"<tds:SystemReboot xmlns:tds="{DEVICE_NS}"/>"#),
            )
            .await?;
        if let Some(message) = element_text(&body, "Message") {
            tracing::info!("camera reboot: {message}");
        }
        Ok(())
    }

    async fn get_device_info(&self) -> Result<DeviceInfo, CameraError> {
        let body = self
            .call(
                &self.device_url,
                &format!(r#"<tds:GetDeviceInformation xmlns:tds="{DEVICE_NS}"/>"#),
            )
            .await?;
        Ok(DeviceInfo {
            model: element_text(&body, "Model").unwrap_or_else(|| "unknown".to_string()),
            firmware: element_text(&body, "FirmwareVersion")
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Build ONVIF WS-Security UsernameToken header (PasswordDigest).
///
/// PasswordDigest = Base64(SHA1(nonce_bytes + created_utf8 + password_utf8))
pub fn ws_security_header(username: &str, password: &str) -> String {
    // UUID v4 bytes as a random nonce
    let nonce_bytes = uuid::Uuid::new_v4().as_bytes().to_vec();
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let digest = password_digest(&nonce_bytes, &created, password);
    let nonce_b64 = B64.encode(&nonce_bytes);

    format!(
        r#"<wsse:Security xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd"
                             xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
  <wsse:UsernameToken>
    <wsse:Username>{username}</wsse:Username>
    <wsse:Password Type="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest">{digest}</wsse:Password>
    <wsse:Nonce EncodingType="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary">{nonce_b64}</wsse:Nonce>
    <wsu:Created>{created}</wsu:Created>
  </wsse:UsernameToken>
</wsse:Security>"#
    )
}

fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    B64.encode(hasher.finalize())
}
