//! Single-frame RTSP capture via an ffmpeg subprocess.

use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tokio::process::Command;

use super::{CameraError, FrameStream, StreamOpener};

pub struct FfmpegStreamOpener {
    ffmpeg: String,
    timeout: Duration,
}

impl FfmpegStreamOpener {
    pub fn new(ffmpeg: impl Into<String>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            timeout,
        }
    }
}

#[async_trait]
impl StreamOpener for FfmpegStreamOpener {
    /// Run ffmpeg against the stream until it exits.
    ///
    /// The stream counts as open once ffmpeg exits cleanly or hands back
    /// bytes. A spawn failure, a timeout, or a non-zero exit with nothing on
    /// stdout (refused, 404, RTSP 401) is an open failure.
    async fn open(&self, uri: &str) -> Result<Box<dyn FrameStream>, CameraError> {
        let child = Command::new(&self.ffmpeg)
            .args([
                "-loglevel",
                "error",
                "-rtsp_transport",
                "tcp",
                "-i",
                uri,
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // On timeout the future is dropped and kill_on_drop reaps ffmpeg
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| CameraError::Timeout)??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(status = ?output.status.code(), "ffmpeg capture failed: {}", stderr.trim());
            if output.stdout.is_empty() {
                return Err(CameraError::Protocol(format!(
                    "ffmpeg could not open the stream: {}",
                    stderr.trim()
                )));
            }
        }

        Ok(Box::new(FfmpegStream {
            bytes: Some(output.stdout),
        }))
    }
}

/// Captured ffmpeg output, decoded on read.
pub struct FfmpegStream {
    bytes: Option<Vec<u8>>,
}

#[async_trait]
impl FrameStream for FfmpegStream {
    async fn read_frame(&mut self) -> Option<DynamicImage> {
        let bytes = self.bytes.take()?;
        if bytes.is_empty() {
            tracing::warn!("ffmpeg exited without producing a frame");
            return None;
        }
        match image::load_from_memory(&bytes) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!("could not decode captured frame: {e}");
                None
            }
        }
    }

    async fn release(&mut self) {
        self.bytes = None;
    }
}

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &DynamicImage) -> Result<Vec<u8>, CameraError> {
    let mut buf = Vec::new();
    frame.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
