use std::time::Instant;

use crate::device::context::{DeviceContext, DeviceView};
use crate::models::stats::StatsSnapshot;

/// Derives point-in-time statistics from a device context. Read-only.
pub struct StatsReporter;

impl StatsReporter {
    /// Take a snapshot of `ctx`. Occupancy, counters and format come from a
    /// single guard acquisition, so they are mutually consistent.
    pub fn snapshot(ctx: &DeviceContext) -> StatsSnapshot {
        Self::from_view(&ctx.view(), Instant::now())
    }

    /// Build a snapshot from an already captured view, measuring uptime up to `now`.
    pub fn from_view(view: &DeviceView, now: Instant) -> StatsSnapshot {
        let is_active = view.state.is_active();
        let uptime_ms = match view.activated_at {
            Some(start) if is_active => now.saturating_duration_since(start).as_millis() as u64,
            _ => 0,
        };

        StatsSnapshot {
            is_active,
            samples_processed: view.counters.samples_processed,
            occupancy_percent: view.occupancy_percent,
            underruns: view.counters.underruns,
            overruns: view.counters.overruns,
            current_format: view.format,
            uptime_ms,
        }
    }
}
