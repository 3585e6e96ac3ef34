//! Order domain logic
//!
//! Pure functions only: the state machine that picks the next lifecycle
//! step from recorded conditions, and the assembler that turns resource
//! state into a protocol-ready payload. No I/O here, which is what
//! makes the order reconciler's decisions unit-testable.

mod assemble;
mod lifecycle;

pub use assemble::assemble_order;
pub use lifecycle::{next_step, Step};
