use crate::commands::validator::CommandValidator;
use crate::device::context::DeviceContext;
use crate::models::error::DeviceError;
use crate::stats::reporter::StatsReporter;

/// Signature shared by every command handler.
///
/// Handlers read an untrusted `input`, may fill `output`, and on success
/// return the number of bytes of information to report back: bytes accepted
/// for a submit, bytes of stats produced for a stats query, otherwise zero.
pub type CommandHandler = fn(&DeviceContext, &[u8], &mut [u8]) -> Result<usize, DeviceError>;

/// Validate an audio packet and store its data in the ring.
pub fn submit_audio(
    ctx: &DeviceContext,
    input: &[u8],
    _output: &mut [u8],
) -> Result<usize, DeviceError> {
    let packet = CommandValidator::audio_packet(input)?;

    if !ctx.state().is_active() {
        log::warn!("Audio submitted while device is not active");
        return Err(DeviceError::DeviceNotReady);
    }

    let written = ctx.write_audio(packet.data)?;
    if written < packet.data.len() {
        log::debug!(
            "Packet @{} truncated: stored {} of {} bytes",
            packet.timestamp,
            written,
            packet.declared_length
        );
    } else {
        log::debug!("Packet @{}: stored {} bytes", packet.timestamp, written);
    }
    Ok(written)
}

/// Validate and apply a new sample format. Buffered audio is left untouched.
pub fn set_format(
    ctx: &DeviceContext,
    input: &[u8],
    _output: &mut [u8],
) -> Result<usize, DeviceError> {
    let request = CommandValidator::format_request(input)?;
    let format = ctx.set_format(&request)?;
    log::info!(
        "Audio format set: {} Hz, {} ch, {} bit ({} B/s)",
        format.sample_rate,
        format.channels,
        format.bits_per_sample,
        format.bytes_per_second
    );
    Ok(0)
}

/// Copy a fresh statistics record into `output`.
pub fn get_stats(
    ctx: &DeviceContext,
    _input: &[u8],
    output: &mut [u8],
) -> Result<usize, DeviceError> {
    CommandValidator::stats_output(output.len())?;
    let snapshot = StatsReporter::snapshot(ctx);
    let written = snapshot.encode_into(output)?;
    log::debug!("Stats retrieved: {}% occupied", snapshot.occupancy_percent);
    Ok(written)
}

/// Record the mute flag.
pub fn set_mute(
    ctx: &DeviceContext,
    input: &[u8],
    _output: &mut [u8],
) -> Result<usize, DeviceError> {
    let muted = CommandValidator::mute_request(input)?;
    let previous = ctx.set_muted(muted)?;
    if previous != muted {
        log::info!("Device {}", if muted { "muted" } else { "unmuted" });
    }
    Ok(0)
}
