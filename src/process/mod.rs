/*!
 * Process Module
 *
 * CPU scheduling: pure domain types (`types`), the primitive operations the
 * scheduler replays (`operations`), the validated request algebra
 * (`request`), and the seven scheduling strategies (`strategy`).
 */

pub mod operations;
pub mod request;
pub mod strategy;
pub mod types;

pub use request::{Request, RequestError};
pub use strategy::ProcessStrategy;
pub use types::{ProcState, Process, ProcessesState, TypeError, QUEUE_COUNT};
