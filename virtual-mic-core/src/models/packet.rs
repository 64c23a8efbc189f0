/// Size of the submit-audio header: timestamp(8) + declared length(4).
pub const AUDIO_PACKET_HEADER_SIZE: usize = 12;

/// A caller-supplied audio packet, borrowed from the request payload.
///
/// Only [`CommandValidator`](crate::commands::validator::CommandValidator)
/// constructs one from raw bytes, after checking that `declared_length`
/// fits inside what the caller actually sent. `data` is exactly
/// `declared_length` bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioPacket<'a> {
    pub timestamp: u64,
    pub declared_length: u32,
    pub data: &'a [u8],
}

impl AudioPacket<'_> {
    /// Build a wire payload for `data`, declaring its full length.
    pub fn encode(timestamp: u64, data: &[u8]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(AUDIO_PACKET_HEADER_SIZE + data.len());
        payload.extend_from_slice(&timestamp.to_le_bytes());
        payload.extend_from_slice(&(data.len() as u32).to_le_bytes());
        payload.extend_from_slice(data);
        payload
    }
}
