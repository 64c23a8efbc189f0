use crate::models::format::FormatDescriptor;
use crate::models::state::DeviceState;

/// Event sink for device notifications.
///
/// All methods are called on the thread that issued the command, after the
/// device guard has been released. Implementations may block or log freely
/// but should not call back into the same device.
///
/// Every method has an empty default so sinks only implement what they need.
pub trait DeviceDelegate: Send + Sync {
    /// Called when the device moves between lifecycle states.
    fn on_state_changed(&self, _state: DeviceState) {}

    /// Called after a format negotiation succeeded.
    fn on_format_changed(&self, _format: &FormatDescriptor) {}

    /// Called when the mute flag is set, whether or not it changed.
    fn on_mute_changed(&self, _muted: bool) {}

    /// Called when a submit found the ring store saturated.
    fn on_overrun(&self, _total_overruns: u32) {}

    /// Called when a read found the ring store empty.
    fn on_underrun(&self, _total_underruns: u32) {}
}
