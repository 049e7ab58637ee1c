//! Optimistic board reconciliation layer.
//!
//! The board view is derived by partitioning the canonical job set by
//! status. A drag between columns is applied to the local view immediately
//! (the optimistic step) and reconciled once the authoritative state
//! machine accepts or rejects the move.

mod session;
mod view;

pub use session::{BoardSession, PendingMove};
pub use view::{BoardCard, BoardColumn, BoardView};
