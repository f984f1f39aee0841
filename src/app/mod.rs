//! Application services: orchestration, session state, synchronization.

mod orchestrator;
mod session;
mod state;
mod sync;

pub use orchestrator::TradeOrchestrator;
pub use session::RoleResolver;
pub use state::{Reconciliation, SessionState};
pub use sync::{ReconcileOutcome, Reconciler, SyncHandle, SyncLoop};
