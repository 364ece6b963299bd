/*!
 * Memory Types
 *
 * `MemoryBlock`/`MemoryState` model a 256-page contiguous address space
 * carved into blocks that are either free (`pid == -1`) or owned by a
 * single process.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total addressable pages in the simulated address space.
pub const TOTAL_PAGES: i32 = 256;

/// Range/consistency failures raised when constructing a domain value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeError {
    #[error("invalid pid: {0}")]
    InvalidPid(i32),
    #[error("invalid address: {0}")]
    InvalidAddress(i32),
    #[error("invalid size: {0}")]
    InvalidSize(i32),
    #[error("block extends out of bounds: address {address} + size {size} > 256")]
    OutOfBounds { address: i32, size: i32 },
}

/// A contiguous region of the address space: free (`pid == -1`) or owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemoryBlock {
    pub pid: i32,
    pub address: i32,
    pub size: i32,
}

impl MemoryBlock {
    /// Validating constructor; mirrors the ranges in SPEC_FULL.md §3.
    pub fn new(pid: i32, address: i32, size: i32) -> Result<Self, TypeError> {
        if !(-1..=255).contains(&pid) {
            return Err(TypeError::InvalidPid(pid));
        }
        if !(0..=255).contains(&address) {
            return Err(TypeError::InvalidAddress(address));
        }
        if !(1..=TOTAL_PAGES).contains(&size) {
            return Err(TypeError::InvalidSize(size));
        }
        if address + size > TOTAL_PAGES {
            return Err(TypeError::OutOfBounds { address, size });
        }
        Ok(Self { pid, address, size })
    }

    /// Construct without re-validating; used internally by primitive
    /// operations that derive blocks from already-valid state.
    pub(crate) fn raw(pid: i32, address: i32, size: i32) -> Self {
        Self { pid, address, size }
    }

    pub fn is_free(&self) -> bool {
        self.pid == -1
    }

    /// Re-checks this block's fields against the same ranges `new` enforces.
    /// Used to validate blocks that arrived through deserialization rather
    /// than through the constructor.
    pub fn validate(&self) -> Result<(), TypeError> {
        Self::new(self.pid, self.address, self.size).map(|_| ())
    }
}

/// The pair of (blocks, free_blocks) views over the address space.
///
/// `blocks` is sorted by address and covers `[0, 256)` with no gaps or
/// overlap. `free_blocks` is an independent ordering used by the placement
/// strategies; it always holds the same multiset of blocks as the
/// `pid == -1` entries of `blocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryState {
    pub blocks: Vec<MemoryBlock>,
    pub free_blocks: Vec<MemoryBlock>,
}

impl MemoryState {
    pub fn new(blocks: Vec<MemoryBlock>, free_blocks: Vec<MemoryBlock>) -> Self {
        Self { blocks, free_blocks }
    }

    /// The state before any request has been processed: one free block
    /// spanning the whole address space.
    pub fn initial() -> Self {
        let block = MemoryBlock::raw(-1, 0, TOTAL_PAGES);
        Self {
            blocks: vec![block],
            free_blocks: vec![block],
        }
    }

    /// Total free pages across `free_blocks`.
    pub fn total_free(&self) -> i32 {
        self.free_blocks.iter().map(|b| b.size).sum()
    }

    /// Re-validates every block in `blocks` and `free_blocks`. Used when a
    /// state arrives through deserialization (see `crate::task`).
    pub fn validate(&self) -> Result<(), TypeError> {
        self.blocks.iter().chain(self.free_blocks.iter()).try_for_each(MemoryBlock::validate)
    }
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_one_free_block() {
        let state = MemoryState::initial();
        assert_eq!(state.blocks, vec![MemoryBlock::raw(-1, 0, 256)]);
        assert_eq!(state.free_blocks, vec![MemoryBlock::raw(-1, 0, 256)]);
    }

    #[test]
    fn block_equality_is_structural() {
        let a = MemoryBlock::new(2, 10, 5).unwrap();
        let b = MemoryBlock::new(2, 10, 5).unwrap();
        let c = MemoryBlock::new(3, 10, 5).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_out_of_range_pid() {
        assert_eq!(MemoryBlock::new(256, 0, 10), Err(TypeError::InvalidPid(256)));
        assert_eq!(MemoryBlock::new(-2, 0, 10), Err(TypeError::InvalidPid(-2)));
    }

    #[test]
    fn rejects_out_of_range_address() {
        assert_eq!(
            MemoryBlock::new(0, 300, 10),
            Err(TypeError::InvalidAddress(300))
        );
    }

    #[test]
    fn rejects_invalid_size() {
        assert_eq!(MemoryBlock::new(0, 0, 0), Err(TypeError::InvalidSize(0)));
        assert_eq!(MemoryBlock::new(0, 0, 257), Err(TypeError::InvalidSize(257)));
    }

    #[test]
    fn rejects_out_of_bounds() {
        assert_eq!(
            MemoryBlock::new(0, 250, 10),
            Err(TypeError::OutOfBounds {
                address: 250,
                size: 10
            })
        );
    }
}
