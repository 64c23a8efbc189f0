use serde::{Deserialize, Serialize};

use super::error::DeviceError;
use super::format::{FormatDescriptor, FORMAT_DESCRIPTOR_SIZE};

/// Encoded size of a [`StatsSnapshot`].
///
/// Layout:
/// ```text
/// [0]      is_active (0/1)
/// [1-8]    samples_processed
/// [9-12]   occupancy_percent (0..=100)
/// [13-16]  underruns
/// [17-20]  overruns
/// [21-36]  current format (see FORMAT_DESCRIPTOR_SIZE)
/// [37-44]  uptime_ms
/// ```
pub const STATS_SIZE: usize = 1 + 8 + 4 + 4 + 4 + FORMAT_DESCRIPTOR_SIZE + 8;

/// Point-in-time device statistics, freshly computed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub is_active: bool,
    pub samples_processed: u64,
    /// Ring store occupancy as an integer percentage of capacity.
    pub occupancy_percent: u32,
    pub underruns: u32,
    pub overruns: u32,
    pub current_format: FormatDescriptor,
    pub uptime_ms: u64,
}

impl StatsSnapshot {
    /// Serialize into `out`, returning the number of bytes produced.
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize, DeviceError> {
        if out.len() < STATS_SIZE {
            return Err(DeviceError::InvalidBufferSize {
                required: STATS_SIZE,
                actual: out.len(),
            });
        }
        let out = &mut out[..STATS_SIZE];
        out.fill(0);
        out[0] = u8::from(self.is_active);
        out[1..9].copy_from_slice(&self.samples_processed.to_le_bytes());
        out[9..13].copy_from_slice(&self.occupancy_percent.to_le_bytes());
        out[13..17].copy_from_slice(&self.underruns.to_le_bytes());
        out[17..21].copy_from_slice(&self.overruns.to_le_bytes());
        self.current_format.encode_into(&mut out[21..37]);
        out[37..45].copy_from_slice(&self.uptime_ms.to_le_bytes());
        Ok(STATS_SIZE)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DeviceError> {
        if bytes.len() < STATS_SIZE {
            return Err(DeviceError::InvalidBufferSize {
                required: STATS_SIZE,
                actual: bytes.len(),
            });
        }
        let u32_at = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let mut u64_bytes = [0u8; 8];
        u64_bytes.copy_from_slice(&bytes[1..9]);
        let samples_processed = u64::from_le_bytes(u64_bytes);
        u64_bytes.copy_from_slice(&bytes[37..45]);
        let uptime_ms = u64::from_le_bytes(u64_bytes);

        Ok(Self {
            is_active: bytes[0] != 0,
            samples_processed,
            occupancy_percent: u32_at(9),
            underruns: u32_at(13),
            overruns: u32_at(17),
            current_format: FormatDescriptor::decode(&bytes[21..37])?,
            uptime_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StatsSnapshot {
        StatsSnapshot {
            is_active: true,
            samples_processed: 1_234_567,
            occupancy_percent: 42,
            underruns: 3,
            overruns: 7,
            current_format: FormatDescriptor::default(),
            uptime_ms: 90_000,
        }
    }

    #[test]
    fn stats_size_is_45_bytes() {
        assert_eq!(STATS_SIZE, 45);
    }

    #[test]
    fn field_offsets() {
        let mut out = [0xFFu8; 64];
        assert_eq!(sample().encode_into(&mut out).unwrap(), STATS_SIZE);

        assert_eq!(out[0], 1);
        assert_eq!(u32::from_le_bytes([out[9], out[10], out[11], out[12]]), 42);
        assert_eq!(u32::from_le_bytes([out[17], out[18], out[19], out[20]]), 7);
        assert_eq!(u32::from_le_bytes([out[21], out[22], out[23], out[24]]), 48_000);
        // Bytes past the record are untouched.
        assert_eq!(out[STATS_SIZE], 0xFF);
        assert_eq!(StatsSnapshot::decode(&out).unwrap(), sample());
    }

    #[test]
    fn short_output_is_rejected() {
        let mut out = [0u8; STATS_SIZE - 1];
        let err = sample().encode_into(&mut out).unwrap_err();
        assert_eq!(err, DeviceError::InvalidBufferSize { required: 45, actual: 44 });
    }
}
