//! Camera capability surface and the control adapter that drives it.
//!
//! The adapter only talks to the traits below. `onvif` and `stream` hold the
//! real implementations (ONVIF SOAP over reqwest, ffmpeg frame grab); tests
//! plug in fakes.

pub mod adapter;
pub mod onvif;
pub mod stream;
pub mod xml;

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

pub use adapter::CameraAdapter;

/// Everything needed to open an ONVIF session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaProfile {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeviceInfo {
    pub model: String,
    pub firmware: String,
}

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("connection timed out")]
    Timeout,
    #[error("401 Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Protocol(String),
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<reqwest::Error> for CameraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CameraError::Timeout
        } else if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            CameraError::Unauthorized
        } else {
            CameraError::Http(err)
        }
    }
}

impl CameraError {
    /// Explicit variant first; opaque errors fall back to sniffing their text.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            CameraError::Unauthorized => true,
            CameraError::Timeout => false,
            other => {
                let text = other.to_string().to_lowercase();
                text.contains("401") || text.contains("unauthorized")
            }
        }
    }
}

#[async_trait]
pub trait CameraConnector: Send + Sync {
    async fn connect(
        &self,
        credentials: &CameraCredentials,
    ) -> Result<Box<dyn CameraSession>, CameraError>;
}

#[async_trait]
pub trait CameraSession: Send + Sync {
    async fn get_profiles(&self) -> Result<Vec<MediaProfile>, CameraError>;
    /// `None` when the camera answered without a URI.
    async fn get_stream_uri(&self, profile: &MediaProfile) -> Result<Option<String>, CameraError>;
    async fn reboot(&self) -> Result<(), CameraError>;
    async fn get_device_info(&self) -> Result<DeviceInfo, CameraError>;
}

#[async_trait]
pub trait StreamOpener: Send + Sync {
    async fn open(&self, uri: &str) -> Result<Box<dyn FrameStream>, CameraError>;
}

/// An open video stream. Must be released as soon as a frame was read.
#[async_trait]
pub trait FrameStream: Send {
    async fn read_frame(&mut self) -> Option<DynamicImage>;
    async fn release(&mut self);
}
