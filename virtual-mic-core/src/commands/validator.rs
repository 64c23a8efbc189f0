use crate::models::error::DeviceError;
use crate::models::format::{FormatRequest, FORMAT_REQUEST_SIZE};
use crate::models::packet::{AudioPacket, AUDIO_PACKET_HEADER_SIZE};
use crate::models::stats::STATS_SIZE;

/// Minimum size of a mute request: one boolean byte.
pub const MUTE_REQUEST_SIZE: usize = 1;

/// Structural checks on untrusted request and response buffers.
///
/// Every check runs before a payload is interpreted and before any device
/// state is touched. A missing (empty) payload is an invalid parameter; a
/// payload that is present but too short, or that declares more data than it
/// carries, is an invalid buffer size.
pub struct CommandValidator;

impl CommandValidator {
    /// Check a submit-audio payload and borrow its audio data.
    pub fn audio_packet(payload: &[u8]) -> Result<AudioPacket<'_>, DeviceError> {
        Self::require(payload, AUDIO_PACKET_HEADER_SIZE, "submit-audio")?;

        let mut timestamp = [0u8; 8];
        timestamp.copy_from_slice(&payload[0..8]);
        let declared_length =
            u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]);

        let supplied = payload.len() - AUDIO_PACKET_HEADER_SIZE;
        if declared_length as usize > supplied {
            return Err(DeviceError::InvalidBufferSize {
                required: AUDIO_PACKET_HEADER_SIZE.saturating_add(declared_length as usize),
                actual: payload.len(),
            });
        }
        if declared_length == 0 {
            return Err(DeviceError::InvalidParameter("audio packet declares no data".into()));
        }

        let end = AUDIO_PACKET_HEADER_SIZE + declared_length as usize;
        Ok(AudioPacket {
            timestamp: u64::from_le_bytes(timestamp),
            declared_length,
            data: &payload[AUDIO_PACKET_HEADER_SIZE..end],
        })
    }

    /// Check a set-format payload; the requested values must also be in range.
    pub fn format_request(payload: &[u8]) -> Result<FormatRequest, DeviceError> {
        Self::require(payload, FORMAT_REQUEST_SIZE, "set-format")?;
        let request = FormatRequest::decode(payload)?;
        request.validate()?;
        Ok(request)
    }

    /// Check that a caller-supplied stats buffer can hold the full record.
    pub fn stats_output(capacity: usize) -> Result<(), DeviceError> {
        if capacity < STATS_SIZE {
            return Err(DeviceError::InvalidBufferSize {
                required: STATS_SIZE,
                actual: capacity,
            });
        }
        Ok(())
    }

    /// Check a mute payload. Any nonzero first byte means muted.
    pub fn mute_request(payload: &[u8]) -> Result<bool, DeviceError> {
        Self::require(payload, MUTE_REQUEST_SIZE, "mute")?;
        Ok(payload[0] != 0)
    }

    fn require(payload: &[u8], required: usize, command: &str) -> Result<(), DeviceError> {
        if payload.is_empty() {
            return Err(DeviceError::InvalidParameter(format!(
                "{} request has no payload",
                command
            )));
        }
        if payload.len() < required {
            return Err(DeviceError::InvalidBufferSize {
                required,
                actual: payload.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_packet(timestamp: u64, declared: u32, data: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&timestamp.to_le_bytes());
        payload.extend_from_slice(&declared.to_le_bytes());
        payload.extend_from_slice(data);
        payload
    }

    #[test]
    fn valid_packet_borrows_declared_bytes() {
        let payload = raw_packet(123_456_789, 3, &[0xAA, 0xBB, 0xCC, 0xDD]);
        let packet = CommandValidator::audio_packet(&payload).unwrap();

        assert_eq!(packet.timestamp, 123_456_789);
        assert_eq!(packet.declared_length, 3);
        assert_eq!(packet.data, &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn packet_shorter_than_header() {
        let err = CommandValidator::audio_packet(&[0u8; 11]).unwrap_err();
        assert_eq!(err, DeviceError::InvalidBufferSize { required: 12, actual: 11 });
    }

    #[test]
    fn declared_length_past_supplied_data() {
        let payload = raw_packet(0, 1000, &[0xAA; 100]);
        let err = CommandValidator::audio_packet(&payload).unwrap_err();
        assert_eq!(err, DeviceError::InvalidBufferSize { required: 1012, actual: 112 });
    }

    #[test]
    fn declared_length_at_u32_max_does_not_overflow() {
        let payload = raw_packet(0, u32::MAX, &[0xAA; 4]);
        assert!(matches!(
            CommandValidator::audio_packet(&payload),
            Err(DeviceError::InvalidBufferSize { .. })
        ));
    }

    #[test]
    fn zero_length_packet_is_invalid() {
        let payload = raw_packet(0, 0, &[]);
        assert!(matches!(
            CommandValidator::audio_packet(&payload),
            Err(DeviceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn missing_payloads_are_invalid_parameters() {
        assert!(matches!(
            CommandValidator::audio_packet(&[]),
            Err(DeviceError::InvalidParameter(_))
        ));
        assert!(matches!(
            CommandValidator::format_request(&[]),
            Err(DeviceError::InvalidParameter(_))
        ));
        assert!(matches!(
            CommandValidator::mute_request(&[]),
            Err(DeviceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn format_request_size_and_range() {
        let good = FormatRequest::new(48_000, 2, 16).encode();
        let decoded = CommandValidator::format_request(&good).unwrap();
        assert_eq!(decoded, FormatRequest::new(48_000, 2, 16));

        let err = CommandValidator::format_request(&good[..6]).unwrap_err();
        assert_eq!(err, DeviceError::InvalidBufferSize { required: 8, actual: 6 });

        let low_rate = FormatRequest::new(4_000, 2, 16).encode();
        assert!(matches!(
            CommandValidator::format_request(&low_rate),
            Err(DeviceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn stats_output_capacity() {
        assert!(CommandValidator::stats_output(STATS_SIZE).is_ok());
        assert!(CommandValidator::stats_output(STATS_SIZE + 10).is_ok());
        assert_eq!(
            CommandValidator::stats_output(8),
            Err(DeviceError::InvalidBufferSize { required: STATS_SIZE, actual: 8 })
        );
    }

    #[test]
    fn mute_flag_reads_first_byte() {
        assert!(CommandValidator::mute_request(&[1]).unwrap());
        assert!(!CommandValidator::mute_request(&[0, 1, 1, 1]).unwrap());
        // A four-byte BOOL from a native client.
        assert!(CommandValidator::mute_request(&1u32.to_le_bytes()).unwrap());
    }
}
