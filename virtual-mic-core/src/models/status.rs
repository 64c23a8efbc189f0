use serde::{Deserialize, Serialize};

use super::error::DeviceError;

/// Completion status returned across the command boundary.
///
/// The numeric codes keep the NT-status values the endpoint has always
/// reported, so existing clients keep interpreting them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    InvalidParameter,
    InvalidBufferSize,
    DeviceNotReady,
    BufferSaturated,
    UnsupportedCommand,
    InsufficientResources,
}

impl Status {
    pub const fn code(self) -> u32 {
        match self {
            Self::Success => 0x0000_0000,
            Self::InvalidParameter => 0xC000_000D,
            Self::InvalidBufferSize => 0xC000_0206,
            Self::DeviceNotReady => 0xC000_00A3,
            Self::BufferSaturated => 0xC000_0023,
            Self::UnsupportedCommand => 0xC000_0010,
            Self::InsufficientResources => 0xC000_009A,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        [
            Self::Success,
            Self::InvalidParameter,
            Self::InvalidBufferSize,
            Self::DeviceNotReady,
            Self::BufferSaturated,
            Self::UnsupportedCommand,
            Self::InsufficientResources,
        ]
        .into_iter()
        .find(|status| status.code() == code)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<&DeviceError> for Status {
    fn from(err: &DeviceError) -> Self {
        match err {
            DeviceError::InvalidParameter(_) => Self::InvalidParameter,
            DeviceError::InvalidBufferSize { .. } => Self::InvalidBufferSize,
            DeviceError::DeviceNotReady => Self::DeviceNotReady,
            DeviceError::BufferSaturated => Self::BufferSaturated,
            DeviceError::UnsupportedCommand(_) => Self::UnsupportedCommand,
            DeviceError::InsufficientResources(_) => Self::InsufficientResources,
            // Configuration problems surface as a bad parameter on the wire.
            DeviceError::ConfigurationFailed(_) => Self::InvalidParameter,
        }
    }
}

impl<T> From<&Result<T, DeviceError>> for Status {
    fn from(result: &Result<T, DeviceError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for status in [
            Status::Success,
            Status::InvalidParameter,
            Status::InvalidBufferSize,
            Status::DeviceNotReady,
            Status::BufferSaturated,
            Status::UnsupportedCommand,
            Status::InsufficientResources,
        ] {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(0xDEAD_BEEF), None);
    }

    #[test]
    fn saturation_and_bad_length_are_distinct() {
        let saturated = Status::from(&DeviceError::BufferSaturated);
        let malformed = Status::from(&DeviceError::InvalidBufferSize { required: 20, actual: 12 });
        assert_ne!(saturated, malformed);
        assert_ne!(saturated.code(), malformed.code());
    }

    #[test]
    fn ok_result_maps_to_success() {
        let ok: Result<usize, DeviceError> = Ok(0);
        assert!(Status::from(&ok).is_success());

        let err: Result<usize, DeviceError> = Err(DeviceError::DeviceNotReady);
        assert_eq!(Status::from(&err), Status::DeviceNotReady);
    }
}
