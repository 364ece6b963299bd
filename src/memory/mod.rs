/*!
 * Memory Module
 *
 * Contiguous memory allocation: pure domain types (`types`), the primitive
 * operations the allocator replays (`operations`), the validated request
 * algebra (`request`), and the placement strategies that tie them together
 * (`strategy`).
 */

pub mod operations;
pub mod request;
pub mod strategy;
pub mod types;

pub use request::{Request, RequestError};
pub use strategy::MemoryStrategy;
pub use types::{MemoryBlock, MemoryState, TypeError, TOTAL_PAGES};
