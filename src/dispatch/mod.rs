//! Dispatch engine: device lookup, class branch, execution.

pub mod mock;

use std::sync::{Arc, RwLock};

use crate::camera::CameraAdapter;
use crate::command::StructuredCommand;
use crate::devices::{Device, DeviceClass, DeviceRegistry};
use crate::error::{ToolError, ToolResult};
use crate::tools::ToolOutput;

/// Registry shared between the tools that read and mutate it.
pub type SharedRegistry = Arc<RwLock<DeviceRegistry>>;

pub struct Dispatcher {
    registry: SharedRegistry,
    camera: CameraAdapter,
}

impl Dispatcher {
    pub fn new(registry: SharedRegistry, camera: CameraAdapter) -> Self {
        Self { registry, camera }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Snapshot of one device. The lock is released before returning, so
    /// nothing downstream ever awaits while holding it.
    pub fn lookup(&self, device_id: &str) -> ToolResult<Device> {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry
            .get(device_id)
            .cloned()
            .ok_or_else(|| ToolError::invalid_params(format!("Device {device_id} not found")))
    }

    /// Caller-input mistakes come back as `Err`; device and network
    /// failures come back as descriptive text inside `Ok`.
    pub async fn dispatch(&self, command: &StructuredCommand) -> ToolResult<ToolOutput> {
        tracing::debug!(device = %command.device_id, action = %command.action, "dispatch received");
        let device = self.lookup(&command.device_id)?;
        tracing::debug!(device = %device.id, class = %device.class, "device resolved");

        match device.class {
            DeviceClass::Light | DeviceClass::Plug | DeviceClass::Thermostat => {
                mock::execute(&device, command).map(ToolOutput::Text)
            }
            DeviceClass::Camera => Ok(self.camera.execute(&command.action).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::adapter::tests::{adapter, FakeCamera, FakeStreams, StreamMode};
    use crate::camera::adapter::CREDENTIALS_MISSING;
    use crate::camera::onvif::OnvifConnector;
    use crate::camera::stream::FfmpegStreamOpener;
    use crate::command::CommandParams;
    use std::time::Duration;

    fn unconfigured_camera() -> CameraAdapter {
        CameraAdapter::new(
            None,
            Arc::new(OnvifConnector::new(Duration::from_secs(1))),
            Arc::new(FfmpegStreamOpener::new("ffmpeg", Duration::from_secs(1))),
        )
    }

    fn dispatcher(camera: CameraAdapter) -> Dispatcher {
        Dispatcher::new(
            Arc::new(RwLock::new(DeviceRegistry::with_defaults())),
            camera,
        )
    }

    // ── lookup ────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_device_is_invalid_params() {
        let d = dispatcher(unconfigured_camera());
        let err = d
            .dispatch(&StructuredCommand::new("garage", "turn_on"))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::invalid_params("Device garage not found"));
    }

    #[tokio::test]
    async fn unknown_camera_like_id_is_still_invalid_params() {
        // Never degrades to a descriptive string.
        let d = dispatcher(unconfigured_camera());
        assert!(d
            .dispatch(&StructuredCommand::new("cam2", "take_snapshot"))
            .await
            .is_err());
    }

    // ── mock path ─────────────────────────────────────────────────

    #[tokio::test]
    async fn mock_device_turns_on() {
        let d = dispatcher(unconfigured_camera());
        let out = d
            .dispatch(&StructuredCommand::new("lamp", "turn_on"))
            .await
            .unwrap();
        assert_eq!(out.as_text(), Some("OK: Mock Desk Lamp is now ON"));
    }

    #[tokio::test]
    async fn every_simulated_class_stays_off_the_camera() {
        let d = dispatcher(unconfigured_camera());
        for (id, class) in [
            ("hall", DeviceClass::Light),
            ("kettle", DeviceClass::Plug),
            ("attic", DeviceClass::Thermostat),
        ] {
            d.registry()
                .write()
                .unwrap()
                .add_device(id, "Spare", vec![], class)
                .unwrap();
            let out = d
                .dispatch(&StructuredCommand::new(id, "turn_on"))
                .await
                .unwrap();
            assert_eq!(out.as_text(), Some("OK: Mock Spare is now ON"), "{class}");
        }
    }

    #[tokio::test]
    async fn thermostat_temperature() {
        let d = dispatcher(unconfigured_camera());
        let missing = d
            .dispatch(&StructuredCommand::new("therm", "set_temperature"))
            .await;
        assert_eq!(missing.unwrap_err(), ToolError::invalid_params("Missing temperature"));

        let out = d
            .dispatch(
                &StructuredCommand::new("therm", "set_temperature")
                    .with_params(CommandParams::SetTemperature { value: 24 }),
            )
            .await
            .unwrap();
        assert!(out.as_text().unwrap().contains("24"));
    }

    #[tokio::test]
    async fn mock_unsupported_action() {
        let d = dispatcher(unconfigured_camera());
        let err = d
            .dispatch(&StructuredCommand::new("plug", "take_snapshot"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported command 'take_snapshot' for device type 'plug'"
        );
    }

    // ── camera path ───────────────────────────────────────────────

    #[tokio::test]
    async fn camera_without_credentials_is_descriptive() {
        let d = dispatcher(unconfigured_camera());
        let out = d
            .dispatch(&StructuredCommand::new("cam", "take_snapshot"))
            .await
            .unwrap();
        assert_eq!(out.as_text(), Some(CREDENTIALS_MISSING));
    }

    #[tokio::test]
    async fn camera_snapshot_yields_image() {
        let d = dispatcher(adapter(
            FakeCamera::healthy(),
            FakeStreams::new(StreamMode::Frame),
        ));
        let out = d
            .dispatch(&StructuredCommand::new("cam", "take_snapshot"))
            .await
            .unwrap();
        assert!(matches!(out, ToolOutput::Image { ref mime_type, .. } if mime_type == "image/png"));
    }

    #[tokio::test]
    async fn added_camera_uses_camera_path() {
        let d = dispatcher(adapter(
            FakeCamera::healthy(),
            FakeStreams::new(StreamMode::Frame),
        ));
        d.registry()
            .write()
            .unwrap()
            .add_device("porch", "Porch Cam", vec![], DeviceClass::Camera)
            .unwrap();
        let out = d
            .dispatch(&StructuredCommand::new("porch", "get_status"))
            .await
            .unwrap();
        assert!(out.as_text().unwrap().starts_with("Success! Camera is online."));
    }
}
