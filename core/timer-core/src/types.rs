//! Core types shared by the parser, classifier, and coordinator.

/// A validated snapshot of the state file.
///
/// Produced by [`parse`](crate::parse). The shape itself is the invariant: either
/// the session is preserved, or there is a finite countdown. Never cached past the
/// refresh that read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session is held indefinitely; any countdown in the file is ignored.
    Preserved,
    /// Whole minutes left, already floored and clamped at zero.
    Counting { minutes_left: u64 },
}

/// Discrete bucket driving the status item's color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayTier {
    Infinite,
    /// Less than 30 minutes left.
    Urgent,
    /// 30 up to (not including) 60 minutes left.
    Warning,
    /// 60 minutes or more left.
    Normal,
}

impl DisplayTier {
    /// Host theme color key for the item background, if the tier has one.
    pub fn background_color(&self) -> Option<&'static str> {
        match self {
            DisplayTier::Urgent => Some("statusBarItem.errorBackground"),
            DisplayTier::Warning => Some("statusBarItem.warningBackground"),
            DisplayTier::Normal | DisplayTier::Infinite => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayTier::Infinite => "infinite",
            DisplayTier::Urgent => "urgent",
            DisplayTier::Warning => "warning",
            DisplayTier::Normal => "normal",
        }
    }
}

/// Everything the status item needs to render one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub tier: DisplayTier,
    pub text: String,
    pub tooltip: String,
}
