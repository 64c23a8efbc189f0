use serde::{Deserialize, Serialize};

use crate::commands::handlers::{self, CommandHandler};
use crate::device::context::DeviceContext;
use crate::models::error::DeviceError;
use crate::models::status::Status;

const FILE_DEVICE_UNKNOWN: u32 = 0x22;
const METHOD_BUFFERED: u32 = 0;
const FILE_ANY_ACCESS: u32 = 0;
const FILE_READ_ACCESS: u32 = 1;
const FILE_WRITE_ACCESS: u32 = 2;

/// Compose a device-control code: `type << 16 | access << 14 | function << 2 | method`.
pub const fn control_code(device_type: u32, function: u32, method: u32, access: u32) -> u32 {
    (device_type << 16) | (access << 14) | (function << 2) | method
}

/// The commands the endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    SubmitAudio,
    SetFormat,
    GetStats,
    SetMute,
}

impl Command {
    pub const ALL: [Command; 4] =
        [Self::SubmitAudio, Self::SetFormat, Self::GetStats, Self::SetMute];

    pub const fn code(self) -> u32 {
        let (function, access) = match self {
            Self::SubmitAudio => (0x800, FILE_ANY_ACCESS),
            Self::SetFormat => (0x801, FILE_ANY_ACCESS),
            Self::GetStats => (0x802, FILE_READ_ACCESS),
            Self::SetMute => (0x803, FILE_WRITE_ACCESS),
        };
        control_code(FILE_DEVICE_UNKNOWN, function, METHOD_BUFFERED, access)
    }

    pub fn handler(self) -> CommandHandler {
        match self {
            Self::SubmitAudio => handlers::submit_audio,
            Self::SetFormat => handlers::set_format,
            Self::GetStats => handlers::get_stats,
            Self::SetMute => handlers::set_mute,
        }
    }
}

impl TryFrom<u32> for Command {
    type Error = DeviceError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|command| command.code() == code)
            .ok_or(DeviceError::UnsupportedCommand(code))
    }
}

/// Completion of one command: a status plus the information count.
///
/// `information` is zero whenever `status` is not success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub status: Status,
    pub information: usize,
}

impl CommandOutcome {
    pub fn from_result(result: &Result<usize, DeviceError>) -> Self {
        Self {
            status: Status::from(result),
            information: result.as_ref().copied().unwrap_or(0),
        }
    }
}

/// Route a raw control code to its handler.
pub fn dispatch(
    ctx: &DeviceContext,
    code: u32,
    input: &[u8],
    output: &mut [u8],
) -> CommandOutcome {
    log::debug!("Control code {:#010x} received", code);

    let result = Command::try_from(code).and_then(|command| execute(ctx, command, input, output));
    if let Err(ref e) = result {
        if e.is_caller_error() {
            log::warn!("Command {:#010x} rejected: {}", code, e);
        } else {
            log::debug!("Command {:#010x} failed: {}", code, e);
        }
    }
    CommandOutcome::from_result(&result)
}

/// Run an already decoded command.
pub fn execute(
    ctx: &DeviceContext,
    command: Command,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize, DeviceError> {
    (command.handler())(ctx, input, output)
}
