use serde::{Deserialize, Serialize};

use super::error::DeviceError;

pub const MIN_SAMPLE_RATE: u32 = 8_000;
pub const MAX_SAMPLE_RATE: u32 = 192_000;
pub const MAX_CHANNELS: u16 = 8;
pub const SUPPORTED_BIT_DEPTHS: [u16; 3] = [16, 24, 32];

/// `WAVE_FORMAT_PCM`.
pub const FORMAT_TAG_PCM: u16 = 1;

/// Encoded size of a [`FormatRequest`]: rate(4) + channels(2) + bits(2).
pub const FORMAT_REQUEST_SIZE: usize = 8;

/// Encoded size of a [`FormatDescriptor`].
///
/// Layout:
/// ```text
/// [0-3]    sample_rate
/// [4-5]    channels
/// [6-7]    bits_per_sample
/// [8-9]    block_align
/// [10-13]  bytes_per_second
/// [14-15]  format_tag
/// ```
pub const FORMAT_DESCRIPTOR_SIZE: usize = 16;

/// A sample format as requested by a caller, before derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequest {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl FormatRequest {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Check every negotiation rule; nothing is derived unless all hold.
    pub fn validate(&self) -> Result<(), DeviceError> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(DeviceError::InvalidParameter(format!(
                "sample rate {} Hz outside {}..={}",
                self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE
            )));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(DeviceError::InvalidParameter(format!(
                "unsupported channel count: {}",
                self.channels
            )));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bits_per_sample) {
            return Err(DeviceError::InvalidParameter(format!(
                "unsupported bit depth: {}",
                self.bits_per_sample
            )));
        }
        Ok(())
    }

    /// Decode from a payload that has already passed the size check.
    pub fn decode(payload: &[u8]) -> Result<Self, DeviceError> {
        if payload.len() < FORMAT_REQUEST_SIZE {
            return Err(DeviceError::InvalidBufferSize {
                required: FORMAT_REQUEST_SIZE,
                actual: payload.len(),
            });
        }
        Ok(Self {
            sample_rate: u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
            channels: u16::from_le_bytes([payload[4], payload[5]]),
            bits_per_sample: u16::from_le_bytes([payload[6], payload[7]]),
        })
    }

    pub fn encode(&self) -> [u8; FORMAT_REQUEST_SIZE] {
        let mut out = [0u8; FORMAT_REQUEST_SIZE];
        out[0..4].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[4..6].copy_from_slice(&self.channels.to_le_bytes());
        out[6..8].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out
    }
}

impl Default for FormatRequest {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// The negotiated sample format, with its derived fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub block_align: u16,
    pub bytes_per_second: u32,
    pub format_tag: u16,
}

impl FormatDescriptor {
    /// Validate `request` and derive block alignment and byte rate from it.
    pub fn negotiate(request: &FormatRequest) -> Result<Self, DeviceError> {
        request.validate()?;
        let block_align = request.channels * (request.bits_per_sample / 8);
        Ok(Self {
            sample_rate: request.sample_rate,
            channels: request.channels,
            bits_per_sample: request.bits_per_sample,
            block_align,
            bytes_per_second: request.sample_rate * block_align as u32,
            format_tag: FORMAT_TAG_PCM,
        })
    }

    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample / 8) as usize
    }

    pub fn encode_into(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[4..6].copy_from_slice(&self.channels.to_le_bytes());
        out[6..8].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[8..10].copy_from_slice(&self.block_align.to_le_bytes());
        out[10..14].copy_from_slice(&self.bytes_per_second.to_le_bytes());
        out[14..16].copy_from_slice(&self.format_tag.to_le_bytes());
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DeviceError> {
        if bytes.len() < FORMAT_DESCRIPTOR_SIZE {
            return Err(DeviceError::InvalidBufferSize {
                required: FORMAT_DESCRIPTOR_SIZE,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            sample_rate: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            channels: u16::from_le_bytes([bytes[4], bytes[5]]),
            bits_per_sample: u16::from_le_bytes([bytes[6], bytes[7]]),
            block_align: u16::from_le_bytes([bytes[8], bytes[9]]),
            bytes_per_second: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
            format_tag: u16::from_le_bytes([bytes[14], bytes[15]]),
        })
    }
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        // 48 kHz / stereo / 16-bit
        Self {
            sample_rate: 48_000,
            channels: 2,
            bits_per_sample: 16,
            block_align: 4,
            bytes_per_second: 192_000,
            format_tag: FORMAT_TAG_PCM,
        }
    }
}
