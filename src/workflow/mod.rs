//! The wizard's step machine and the session that runs its backend calls.

pub mod service;
pub mod session;
pub mod state;

pub use service::StyleService;
pub use session::Session;
pub use state::{Command, Event, Step, Ticket, WorkflowState};
