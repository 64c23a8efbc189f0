use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::error::DeviceError;
use crate::models::format::{FormatDescriptor, FormatRequest};
use crate::models::state::DeviceState;
use crate::processing::ring_buffer::RingStore;
use crate::traits::device_delegate::DeviceDelegate;

/// Monotonic device counters. They saturate instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCounters {
    pub samples_processed: u64,
    pub underruns: u32,
    pub overruns: u32,
}

/// Everything the guard protects.
///
/// Code holding the guard only does cursor arithmetic and memory copies:
/// no allocation, no logging, no delegate calls.
struct GuardedState {
    state: DeviceState,
    ring: Option<RingStore>,
    format: FormatDescriptor,
    muted: bool,
    counters: DeviceCounters,
    /// Bytes of a sample split across submits, not yet counted.
    partial_sample_bytes: usize,
    activated_at: Option<Instant>,
}

/// A consistent copy of the guarded state, taken under one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceView {
    pub state: DeviceState,
    pub capacity: usize,
    pub used_space: usize,
    pub free_space: usize,
    pub occupancy_percent: u32,
    pub format: FormatDescriptor,
    pub muted: bool,
    pub counters: DeviceCounters,
    pub activated_at: Option<Instant>,
}

/// Long-lived state bundle for one virtual microphone endpoint.
///
/// Owned by the registration layer ([`VirtualDevice`](super::endpoint::VirtualDevice))
/// and lent to command handlers by reference. A single `parking_lot::Mutex`
/// serializes every read and write of the ring store, so a read and a write
/// never run concurrently even though they move different cursors.
///
/// ```text
/// producer ──submit──┐                  ┌──read── consumer
///                    ├→ [Mutex<ring, format, counters>] ←┤
/// control ──format/mute/stats──────────┘
/// ```
pub struct DeviceContext {
    guard: Mutex<GuardedState>,
    delegate: Option<Arc<dyn DeviceDelegate>>,
}

impl DeviceContext {
    pub fn new(delegate: Option<Arc<dyn DeviceDelegate>>) -> Self {
        Self {
            guard: Mutex::new(GuardedState {
                state: DeviceState::Uninitialized,
                ring: None,
                format: FormatDescriptor::default(),
                muted: false,
                counters: DeviceCounters::default(),
                partial_sample_bytes: 0,
                activated_at: None,
            }),
            delegate,
        }
    }

    /// Allocate ring storage and move Uninitialized → Active.
    ///
    /// On allocation failure the context stays Uninitialized.
    pub fn activate(
        &self,
        capacity: usize,
        format: &FormatRequest,
        muted: bool,
    ) -> Result<(), DeviceError> {
        let format = FormatDescriptor::negotiate(format)?;

        // Allocate before taking the guard.
        let ring = RingStore::with_capacity(capacity)?;

        {
            let mut g = self.guard.lock();
            if !g.state.can_transition_to(DeviceState::Active) {
                return Err(DeviceError::ConfigurationFailed(format!(
                    "cannot activate from {:?} state",
                    g.state
                )));
            }
            g.ring = Some(ring);
            g.format = format;
            g.muted = muted;
            g.counters = DeviceCounters::default();
            g.partial_sample_bytes = 0;
            g.activated_at = Some(Instant::now());
            g.state = DeviceState::Active;
        }

        self.notify(|d| d.on_state_changed(DeviceState::Active));
        Ok(())
    }

    /// Move to the terminal Removed state and release ring storage.
    ///
    /// Returns `false` if the context was already removed.
    pub fn deactivate(&self) -> bool {
        let released = {
            let mut g = self.guard.lock();
            if g.state.is_terminal() {
                return false;
            }
            g.state = DeviceState::Removed;
            g.activated_at = None;
            g.ring.take()
        };
        // Storage is freed outside the guard.
        drop(released);

        self.notify(|d| d.on_state_changed(DeviceState::Removed));
        true
    }

    pub fn state(&self) -> DeviceState {
        self.guard.lock().state
    }

    /// Store audio bytes for the consumer.
    ///
    /// Returns the number of bytes accepted, which may be less than
    /// `data.len()`. A saturated store counts as an overrun.
    pub fn write_audio(&self, data: &[u8]) -> Result<usize, DeviceError> {
        let (result, overruns) = {
            let mut g = self.guard.lock();
            let GuardedState {
                state,
                ring,
                format,
                counters,
                partial_sample_bytes,
                ..
            } = &mut *g;
            let ring = match ring {
                Some(ring) if state.is_active() => ring,
                _ => return Err(DeviceError::DeviceNotReady),
            };

            let result = ring.write(data);
            let overruns = match &result {
                Ok(written) => {
                    let pending = *partial_sample_bytes + *written;
                    let bytes_per_sample = format.bytes_per_sample();
                    *partial_sample_bytes = pending % bytes_per_sample;
                    let samples = (pending / bytes_per_sample) as u64;
                    counters.samples_processed =
                        counters.samples_processed.saturating_add(samples);
                    None
                }
                Err(DeviceError::BufferSaturated) => {
                    counters.overruns = counters.overruns.saturating_add(1);
                    Some(counters.overruns)
                }
                Err(_) => None,
            };
            (result, overruns)
        };

        if let Some(total) = overruns {
            log::warn!("Ring store saturated, overrun #{}", total);
            self.notify(|d| d.on_overrun(total));
        }
        result
    }

    /// Drain up to `out.len()` bytes for the consumer.
    ///
    /// An empty store yields `Ok(0)` and counts as an underrun. While muted
    /// the bytes are still drained but `out` is filled with silence.
    pub fn read_audio(&self, out: &mut [u8]) -> Result<usize, DeviceError> {
        if out.is_empty() {
            return Err(DeviceError::InvalidParameter("read buffer is empty".into()));
        }

        let (read, muted, underruns) = {
            let mut g = self.guard.lock();
            let GuardedState {
                state,
                ring,
                muted,
                counters,
                ..
            } = &mut *g;
            let ring = match ring {
                Some(ring) if state.is_active() => ring,
                _ => return Err(DeviceError::DeviceNotReady),
            };

            let read = ring.read(out);
            let underruns = if read == 0 {
                counters.underruns = counters.underruns.saturating_add(1);
                Some(counters.underruns)
            } else {
                None
            };
            (read, *muted, underruns)
        };

        if muted {
            out[..read].fill(0);
        }
        if let Some(total) = underruns {
            log::debug!("Ring store empty on read, underrun #{}", total);
            self.notify(|d| d.on_underrun(total));
        }
        Ok(read)
    }

    /// Replace the negotiated format. The ring store is neither flushed nor resized.
    pub fn set_format(&self, request: &FormatRequest) -> Result<FormatDescriptor, DeviceError> {
        let format = FormatDescriptor::negotiate(request)?;
        {
            let mut g = self.guard.lock();
            if !g.state.is_active() {
                return Err(DeviceError::DeviceNotReady);
            }
            g.format = format;
            // A split sample is not carried over into a different sample width.
            g.partial_sample_bytes = 0;
        }

        self.notify(|d| d.on_format_changed(&format));
        Ok(format)
    }

    pub fn format(&self) -> FormatDescriptor {
        self.guard.lock().format
    }

    /// Record the mute flag, returning the previous value.
    pub fn set_muted(&self, muted: bool) -> Result<bool, DeviceError> {
        let previous = {
            let mut g = self.guard.lock();
            if !g.state.is_active() {
                return Err(DeviceError::DeviceNotReady);
            }
            std::mem::replace(&mut g.muted, muted)
        };

        self.notify(|d| d.on_mute_changed(muted));
        Ok(previous)
    }

    pub fn is_muted(&self) -> bool {
        self.guard.lock().muted
    }

    pub fn counters(&self) -> DeviceCounters {
        self.guard.lock().counters
    }

    pub fn free_space(&self) -> usize {
        self.guard.lock().ring.as_ref().map_or(0, RingStore::free_space)
    }

    pub fn used_space(&self) -> usize {
        self.guard.lock().ring.as_ref().map_or(0, RingStore::used_space)
    }

    pub fn is_empty(&self) -> bool {
        self.guard.lock().ring.as_ref().map_or(true, RingStore::is_empty)
    }

    pub fn is_full(&self) -> bool {
        self.guard.lock().ring.as_ref().map_or(false, RingStore::is_full)
    }

    pub fn capacity(&self) -> usize {
        self.guard.lock().ring.as_ref().map_or(0, RingStore::capacity)
    }

    /// Copy out the whole guarded state in one acquisition.
    pub fn view(&self) -> DeviceView {
        let g = self.guard.lock();
        let (capacity, used_space, free_space, occupancy_percent) = match &g.ring {
            Some(ring) => (
                ring.capacity(),
                ring.used_space(),
                ring.free_space(),
                ring.occupancy_percent(),
            ),
            None => (0, 0, 0, 0),
        };
        DeviceView {
            state: g.state,
            capacity,
            used_space,
            free_space,
            occupancy_percent,
            format: g.format,
            muted: g.muted,
            counters: g.counters,
            activated_at: g.activated_at,
        }
    }

    fn notify(&self, event: impl FnOnce(&dyn DeviceDelegate)) {
        if let Some(ref delegate) = self.delegate {
            event(delegate.as_ref());
        }
    }
}
