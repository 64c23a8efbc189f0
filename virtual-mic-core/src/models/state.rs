use serde::{Deserialize, Serialize};

/// Device context lifecycle.
///
/// State transitions:
/// ```text
/// uninitialized → active → removed
///        ↓                    ↑
///        └────────────────────┘
/// ```
///
/// Only the registration layer moves between states; command handlers
/// observe the state and refuse data-path work unless it is `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Uninitialized,
    Active,
    Removed,
}

impl DeviceState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Removed)
    }

    pub fn can_transition_to(&self, next: DeviceState) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Active)
                | (Self::Uninitialized, Self::Removed)
                | (Self::Active, Self::Removed)
        )
    }
}
