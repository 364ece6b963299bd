/*!
 * algosim
 *
 * A contiguous-memory allocator and CPU scheduler simulator: pure,
 * replayable primitive operations (`memory`, `process`) composed by
 * placement/scheduling strategies, packaged into replay-validated `Task`
 * values, generated randomly (`generator`) and serialized to JSON (`codec`).
 */

pub mod codec;
pub mod error;
pub mod generator;
pub mod memory;
pub mod process;
pub mod task;

// Re-exports
pub use error::{OperationError, OperationResult};
pub use task::{MemoryTask, ProcessesTask, Task, TaskError};
