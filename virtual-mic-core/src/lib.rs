//! # virtual-mic-core
//!
//! Core of a virtual microphone endpoint.
//!
//! One producer submits audio, one consumer drains it, and a small command
//! protocol negotiates the sample format, reports statistics and toggles
//! mute. Everything funnels through a fixed-capacity ring store guarded by a
//! single lock; every command payload is validated before it is trusted.
//!
//! ## Architecture
//!
//! ```text
//! virtual-mic-core (this crate)
//! ├── models/       ← DeviceError, Status, FormatDescriptor, AudioPacket,
//! │                   StatsSnapshot, DeviceConfiguration
//! ├── processing/   ← RingStore (cursor arithmetic, no locking)
//! ├── device/       ← DeviceContext (guarded state + counters),
//! │                   VirtualDevice (registration layer)
//! ├── commands/     ← CommandValidator, handlers, Command dispatch table
//! ├── stats/        ← StatsReporter
//! └── traits/       ← DeviceDelegate
//! ```
//!
//! ## Usage
//! ```
//! use virtual_mic_core::{AudioPacket, Command, DeviceConfiguration, Status, VirtualDevice};
//!
//! let device = VirtualDevice::register(DeviceConfiguration::default(), None).unwrap();
//! let payload = AudioPacket::encode(0, &[0u8; 480]);
//! let outcome = device.device_control(Command::SubmitAudio.code(), &payload, &mut []);
//! assert_eq!(outcome.status, Status::Success);
//! assert_eq!(outcome.information, 480);
//! ```

pub mod commands;
pub mod device;
pub mod models;
pub mod processing;
pub mod stats;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use commands::dispatch::{dispatch, Command, CommandOutcome};
pub use commands::handlers::CommandHandler;
pub use commands::validator::CommandValidator;
pub use device::context::{DeviceContext, DeviceCounters, DeviceView};
pub use device::endpoint::{DeviceInfo, VirtualDevice};
pub use models::config::DeviceConfiguration;
pub use models::error::DeviceError;
pub use models::format::{FormatDescriptor, FormatRequest};
pub use models::packet::AudioPacket;
pub use models::state::DeviceState;
pub use models::stats::StatsSnapshot;
pub use models::status::Status;
pub use processing::ring_buffer::RingStore;
pub use stats::reporter::StatsReporter;
pub use traits::device_delegate::DeviceDelegate;
