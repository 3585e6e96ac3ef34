//! Order lifecycle state machine
//!
//! The lifecycle is Unpriced -> Priced -> Placed, driven by recorded
//! status conditions. Each reconcile pass takes at most one forward
//! step, so every milestone is durably recorded before the next one is
//! attempted.

use shared::OrderStatus;

/// Next action for an order, decided purely from recorded state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do this pass
    Hold,
    /// Price the order against the commerce service
    Price,
    /// Place the order (spend money)
    Place,
    /// A placement attempt was recorded but never confirmed placed;
    /// placing again could duplicate the purchase, so the order is
    /// parked until an operator intervenes.
    PlacementBlocked,
}

/// Decide the next lifecycle step
///
/// `confirmed` is the spec's placement gate. The attempted-but-not-placed
/// check comes first: once that state is recorded, no path places again.
pub fn next_step(status: &OrderStatus, confirmed: bool) -> Step {
    if status.is_placed() {
        return Step::Hold;
    }
    if status.placement_attempted() {
        return Step::PlacementBlocked;
    }
    if !status.is_priced() {
        return Step::Price;
    }
    if confirmed {
        return Step::Place;
    }
    Step::Hold
}
