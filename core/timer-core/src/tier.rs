//! Tier classification and text formatting.

use crate::types::{DisplayTier, Presentation, SessionState};

/// Countdowns below this many minutes are urgent.
pub const URGENT_BELOW_MINUTES: u64 = 30;
/// Countdowns below this many minutes (and not urgent) are a warning.
pub const WARNING_BELOW_MINUTES: u64 = 60;

pub const INFINITE_TEXT: &str = "∞";
pub const INFINITE_TOOLTIP: &str = "Session preserved indefinitely";

impl DisplayTier {
    /// Buckets a countdown. Boundaries belong to the upper tier.
    pub fn for_minutes(minutes_left: u64) -> Self {
        if minutes_left < URGENT_BELOW_MINUTES {
            DisplayTier::Urgent
        } else if minutes_left < WARNING_BELOW_MINUTES {
            DisplayTier::Warning
        } else {
            DisplayTier::Normal
        }
    }
}

/// Maps a validated state to what the status item shows. Total: never fails.
pub fn classify(state: &SessionState) -> Presentation {
    match *state {
        SessionState::Preserved => Presentation {
            tier: DisplayTier::Infinite,
            text: INFINITE_TEXT.to_string(),
            tooltip: INFINITE_TOOLTIP.to_string(),
        },
        SessionState::Counting { minutes_left } => Presentation {
            tier: DisplayTier::for_minutes(minutes_left),
            text: format_minutes(minutes_left),
            tooltip: format!("{} minute(s) left", minutes_left),
        },
    }
}

/// Renders minutes as `{h}h{mm}m`, e.g. 95 → `1h35m`.
pub fn format_minutes(minutes: u64) -> String {
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}
