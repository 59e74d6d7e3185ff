//! The status item contract.
//!
//! The presenter is a write-only sink owned by the coordinator. Implementations
//! must start hidden and show themselves on the first `publish`.

use crate::types::Presentation;

/// Display name of the status item.
pub const STATUS_ITEM_NAME: &str = "Session Timer";
/// Icon shown in front of the status text.
pub const STATUS_ICON: &str = "hourglass";

pub trait StatusPresenter: Send {
    /// Render a new presentation. Only ever called with complete, validated data.
    fn publish(&mut self, presentation: &Presentation);

    /// Tear down the status item. Called once at coordinator shutdown.
    fn release(&mut self) {}
}
