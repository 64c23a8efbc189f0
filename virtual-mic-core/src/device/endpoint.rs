use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::dispatch::{self, CommandOutcome};
use crate::device::context::DeviceContext;
use crate::models::config::DeviceConfiguration;
use crate::models::error::DeviceError;
use crate::models::stats::StatsSnapshot;
use crate::stats::reporter::StatsReporter;
use crate::traits::device_delegate::DeviceDelegate;

/// Identity of a registered endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub instance_id: Uuid,
    pub device_path: String,
    pub symbolic_link: String,
    pub capacity: usize,
    pub activated_at: DateTime<Utc>,
}

/// Registration layer for one virtual microphone endpoint.
///
/// Sole owner of the [`DeviceContext`]: it creates the context, activates
/// it with ring storage and the default format, routes control codes and
/// reads to it, and tears it down. Dropping the device tears it down.
pub struct VirtualDevice {
    config: DeviceConfiguration,
    context: Arc<DeviceContext>,
    info: DeviceInfo,
    open_handles: AtomicUsize,
}

impl VirtualDevice {
    /// Create and activate an endpoint. Transitions: uninitialized → active.
    pub fn register(
        config: DeviceConfiguration,
        delegate: Option<Arc<dyn DeviceDelegate>>,
    ) -> Result<Self, DeviceError> {
        config.validate()?;

        log::info!("Registering {} ({})", config.device_path(), config.symbolic_link());

        let context = Arc::new(DeviceContext::new(delegate));
        let activated =
            context.activate(config.buffer_size, &config.default_format, config.start_muted);
        if let Err(e) = activated {
            log::error!("Failed to activate {}: {}", config.device_path(), e);
            return Err(e);
        }

        let info = DeviceInfo {
            instance_id: Uuid::new_v4(),
            device_path: config.device_path(),
            symbolic_link: config.symbolic_link(),
            capacity: config.buffer_size,
            activated_at: Utc::now(),
        };
        log::info!(
            "Device {} active: {} byte ring, {} Hz / {} ch / {} bit",
            info.instance_id,
            info.capacity,
            config.default_format.sample_rate,
            config.default_format.channels,
            config.default_format.bits_per_sample
        );

        Ok(Self {
            config,
            context,
            info,
            open_handles: AtomicUsize::new(0),
        })
    }

    /// Handle for code that calls the command handlers directly.
    pub fn context(&self) -> &Arc<DeviceContext> {
        &self.context
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn config(&self) -> &DeviceConfiguration {
        &self.config
    }

    /// Open a client handle, returning how many are now open.
    pub fn open_handle(&self) -> Result<usize, DeviceError> {
        if self.context.state().is_terminal() {
            return Err(DeviceError::DeviceNotReady);
        }
        let open = self.open_handles.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Device opened ({} handles)", open);
        Ok(open)
    }

    /// Close a client handle, returning how many remain open.
    pub fn close_handle(&self) -> usize {
        let previous = self
            .open_handles
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        let open = previous.saturating_sub(1);
        log::debug!("Device closed ({} handles)", open);
        open
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    /// Route a numeric control code with its request and response buffers.
    pub fn device_control(&self, code: u32, input: &[u8], output: &mut [u8]) -> CommandOutcome {
        dispatch::dispatch(&self.context, code, input, output)
    }

    /// Consumer read: drain buffered audio into `out`.
    pub fn read(&self, out: &mut [u8]) -> CommandOutcome {
        let result = self.context.read_audio(out);
        if let Ok(read) = result {
            log::debug!("Read {} bytes from ring store", read);
        }
        CommandOutcome::from_result(&result)
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsReporter::snapshot(&self.context)
    }

    /// Release ring storage and retire the endpoint. Transitions: active → removed.
    ///
    /// Idempotent: later calls do nothing.
    pub fn teardown(&self) {
        if self.context.deactivate() {
            log::info!("Device {} removed ({})", self.info.instance_id, self.info.symbolic_link);
        }
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::commands::dispatch::Command;
    use crate::models::format::{FormatDescriptor, FormatRequest};
    use crate::models::packet::AudioPacket;
    use crate::models::state::DeviceState;
    use crate::models::stats::STATS_SIZE;
    use crate::models::status::Status;

    fn small_device(buffer_size: usize) -> VirtualDevice {
        let config = DeviceConfiguration {
            buffer_size,
            ..Default::default()
        };
        VirtualDevice::register(config, None).unwrap()
    }

    #[derive(Default)]
    struct RecordingDelegate {
        events: Mutex<Vec<String>>,
    }

    impl DeviceDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: DeviceState) {
            self.events.lock().push(format!("state:{:?}", state));
        }

        fn on_format_changed(&self, format: &FormatDescriptor) {
            self.events.lock().push(format!("format:{}", format.sample_rate));
        }

        fn on_mute_changed(&self, muted: bool) {
            self.events.lock().push(format!("mute:{}", muted));
        }
    }

    #[test]
    fn register_activates_with_defaults() {
        let device = small_device(8192);
        assert_eq!(device.context().state(), DeviceState::Active);
        assert_eq!(device.info().capacity, 8192);
        assert_eq!(device.info().symbolic_link, "\\DosDevices\\VirtualMicrophone");

        let stats = device.stats();
        assert!(stats.is_active);
        assert_eq!(stats.current_format, FormatDescriptor::default());
    }

    #[test]
    fn invalid_configuration_is_refused() {
        let config = DeviceConfiguration {
            buffer_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            VirtualDevice::register(config, None),
            Err(DeviceError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn oversized_buffer_is_a_resource_error() {
        let config = DeviceConfiguration {
            buffer_size: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            VirtualDevice::register(config, None),
            Err(DeviceError::InsufficientResources(_))
        ));
    }

    #[test]
    fn start_muted_is_honored() {
        let config = DeviceConfiguration {
            start_muted: true,
            ..Default::default()
        };
        let device = VirtualDevice::register(config, None).unwrap();
        assert!(device.context().is_muted());
    }

    #[test]
    fn submit_and_read_through_the_endpoint() {
        let device = small_device(1024);
        let data: Vec<u8> = (0..200u8).collect();
        let payload = AudioPacket::encode(42, &data);

        let outcome = device.device_control(Command::SubmitAudio.code(), &payload, &mut []);
        assert_eq!(outcome, CommandOutcome { status: Status::Success, information: 200 });

        let mut out = [0u8; 256];
        let outcome = device.read(&mut out);
        assert_eq!(outcome, CommandOutcome { status: Status::Success, information: 200 });
        assert_eq!(&out[..200], data.as_slice());

        // Empty read is success with nothing returned.
        let outcome = device.read(&mut out);
        assert_eq!(outcome, CommandOutcome { status: Status::Success, information: 0 });
        assert_eq!(device.stats().underruns, 1);
    }

    #[test]
    fn twenty_cycles_without_reset() {
        let device = small_device(1024);
        let mut out = [0u8; 100];
        for cycle in 0..20u8 {
            let data = [cycle; 100];
            let payload = AudioPacket::encode(cycle as u64, &data);
            let outcome = device.device_control(Command::SubmitAudio.code(), &payload, &mut []);
            assert_eq!(outcome.information, 100);

            assert_eq!(device.read(&mut out).information, 100);
            assert_eq!(out, data);
            assert_eq!(device.stats().occupancy_percent, 0);
        }
        assert_eq!(device.stats().samples_processed, 20 * 50);
    }

    #[test]
    fn format_reported_by_stats() {
        let device = small_device(1024);
        let request = FormatRequest::new(48_000, 2, 16).encode();
        let outcome = device.device_control(Command::SetFormat.code(), &request, &mut []);
        assert!(outcome.status.is_success());

        let mut out = [0u8; STATS_SIZE];
        let outcome = device.device_control(Command::GetStats.code(), &[], &mut out);
        assert_eq!(outcome.information, STATS_SIZE);
        let stats = StatsSnapshot::decode(&out).unwrap();
        let format = stats.current_format;
        assert_eq!((format.sample_rate, format.channels, format.bits_per_sample), (48_000, 2, 16));
    }

    #[test]
    fn teardown_makes_commands_not_ready() {
        let device = small_device(64);
        device.teardown();
        device.teardown();

        let payload = AudioPacket::encode(1, &[1u8; 4]);
        let outcome = device.device_control(Command::SubmitAudio.code(), &payload, &mut []);
        assert_eq!(outcome.status, Status::DeviceNotReady);
        assert_eq!(device.read(&mut [0u8; 4]).status, Status::DeviceNotReady);
        assert_eq!(device.open_handle(), Err(DeviceError::DeviceNotReady));
        assert!(!device.stats().is_active);
    }

    #[test]
    fn handles_are_counted() {
        let device = small_device(64);
        assert_eq!(device.open_handle(), Ok(1));
        assert_eq!(device.open_handle(), Ok(2));
        assert_eq!(device.close_handle(), 1);
        assert_eq!(device.close_handle(), 0);
        assert_eq!(device.close_handle(), 0);
        assert_eq!(device.open_handles(), 0);
    }

    #[test]
    fn delegate_sees_lifecycle_and_control_events() {
        let delegate = Arc::new(RecordingDelegate::default());
        {
            let device =
                VirtualDevice::register(DeviceConfiguration::default(), Some(delegate.clone()))
                    .unwrap();
            let request = FormatRequest::new(96_000, 2, 24).encode();
            device.device_control(Command::SetFormat.code(), &request, &mut []);
            device.device_control(Command::SetMute.code(), &[1], &mut []);
        } // dropped: torn down

        let events = delegate.events.lock().clone();
        assert_eq!(
            events,
            vec!["state:Active", "format:96000", "mute:true", "state:Removed"]
        );
    }

    #[test]
    fn info_serializes() {
        let device = small_device(64);
        let json = serde_json::to_string(device.info()).unwrap();
        assert!(json.contains("\"capacity\":64"));
        let back: DeviceInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, device.info());
    }
}
