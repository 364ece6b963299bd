/*!
 * Shared error taxonomy
 *
 * `OperationError` is the single set of domain-failure kinds raised by the
 * memory and process primitive operations (C1/C3). Strategies never let one
 * escape: every call site matches on the `Result` and falls back to
 * "return the input state unchanged" (see `memory::strategy` / `process::strategy`).
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-failure kinds shared by the memory and process primitive operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationError {
    #[error("block is already in use")]
    BlockIsUsed,
    #[error("block is too small for the requested size")]
    TooSmall,
    #[error("pid does not match the block's owner")]
    PidMismatch,
    #[error("fewer than two adjacent free blocks to compress")]
    SingleBlock,
    #[error("no such process")]
    NoSuchProcess,
    #[error("process is already present in a queue")]
    AlreadyInQueue,
    #[error("queue is empty")]
    EmptyQueue,
    #[error("process is not in the required state")]
    InvalidState,
    #[error("process already exists")]
    ProcessExists,
    #[error("parent process does not exist")]
    NoSuchPpid,
    #[error("index out of range")]
    OutOfRange,
}

/// Result alias used by every primitive operation in C1/C3.
pub type OperationResult<T> = Result<T, OperationError>;
