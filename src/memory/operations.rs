/*!
 * Memory primitive operations
 *
 * Pure, allocation-by-value transformations over `MemoryState`. Each
 * primitive returns a new state rather than mutating in place, mirroring
 * the reference implementation's value semantics.
 */

use crate::error::{OperationError, OperationResult};
use crate::memory::types::{MemoryBlock, MemoryState};

/// Allocates `pages` pages to `pid` out of the free block at `block_index`.
///
/// The allocation is placed at the start of the block; any remainder stays
/// free and is appended to the tail of `free_blocks`.
pub fn allocate_memory(
    state: &MemoryState,
    block_index: usize,
    pid: i32,
    pages: i32,
) -> OperationResult<MemoryState> {
    let mut blocks = state.blocks.clone();
    let mut free_blocks = state.free_blocks.clone();

    let block = *blocks.get(block_index).ok_or(OperationError::OutOfRange)?;
    if !block.is_free() {
        return Err(OperationError::BlockIsUsed);
    }
    if block.size < pages {
        return Err(OperationError::TooSmall);
    }

    let allocated = MemoryBlock::raw(pid, block.address, pages);
    let remainder_size = block.size - pages;
    let remainder_address = block.address + pages;

    blocks.remove(block_index);
    if remainder_size > 0 {
        blocks.insert(block_index, MemoryBlock::raw(-1, remainder_address, remainder_size));
    }
    blocks.insert(block_index, allocated);

    let pos = free_blocks
        .iter()
        .position(|b| *b == block)
        .expect("free block list out of sync with blocks list");
    free_blocks.remove(pos);
    if remainder_size > 0 {
        free_blocks.push(MemoryBlock::raw(-1, remainder_address, remainder_size));
    }

    Ok(MemoryState::new(blocks, free_blocks))
}

/// Frees the block owned by `pid` at `block_index`, appending it to the
/// tail of `free_blocks`.
pub fn free_memory(state: &MemoryState, pid: i32, block_index: usize) -> OperationResult<MemoryState> {
    let mut blocks = state.blocks.clone();
    let mut free_blocks = state.free_blocks.clone();

    let block = *blocks.get(block_index).ok_or(OperationError::OutOfRange)?;
    if block.pid != pid {
        return Err(OperationError::PidMismatch);
    }

    let freed = MemoryBlock::raw(-1, block.address, block.size);
    blocks[block_index] = freed;
    free_blocks.push(freed);

    Ok(MemoryState::new(blocks, free_blocks))
}

/// Moves every owned block to the front of the address space in order,
/// collapsing all free pages into a single trailing block.
pub fn defragment_memory(state: &MemoryState) -> MemoryState {
    let mut address = 0;
    let mut free_total = 0;
    let mut new_blocks = Vec::with_capacity(state.blocks.len());

    for block in &state.blocks {
        if !block.is_free() {
            new_blocks.push(MemoryBlock::raw(block.pid, address, block.size));
            address += block.size;
        } else {
            free_total += block.size;
        }
    }

    let tail = MemoryBlock::raw(-1, address, free_total);
    new_blocks.push(tail);

    MemoryState::new(new_blocks, vec![tail])
}

/// Merges the run of adjacent free blocks starting at `start_block_index`
/// into a single block. Requires at least two free blocks in the run.
pub fn compress_memory(state: &MemoryState, start_block_index: usize) -> OperationResult<MemoryState> {
    let blocks = &state.blocks;
    let mut free_blocks = state.free_blocks.clone();

    let mut new_blocks = blocks[..start_block_index].to_vec();

    let mut current = start_block_index;
    let mut compressing = 0;
    let address = blocks.get(start_block_index).ok_or(OperationError::OutOfRange)?.address;
    let mut free_total = 0;

    while current < blocks.len() && blocks[current].is_free() {
        free_total += blocks[current].size;
        let pos = free_blocks
            .iter()
            .position(|b| *b == blocks[current])
            .expect("free block list out of sync with blocks list");
        free_blocks.remove(pos);
        current += 1;
        compressing += 1;
    }

    if compressing < 2 {
        return Err(OperationError::SingleBlock);
    }

    new_blocks.push(MemoryBlock::raw(-1, address, free_total));
    new_blocks.extend_from_slice(&blocks[current..]);
    free_blocks.push(MemoryBlock::raw(-1, address, free_total));

    Ok(MemoryState::new(new_blocks, free_blocks))
}

/// Repeatedly compresses the first compressible run of adjacent free
/// blocks until none remain.
pub fn compress_all_memory(state: &MemoryState) -> MemoryState {
    let mut current = state.clone();

    loop {
        let blocks = &current.blocks;
        if blocks.len() < 2 {
            break;
        }
        let mut index = 0;
        while index < blocks.len() - 1 && !(blocks[index].is_free() && blocks[index + 1].is_free()) {
            index += 1;
        }

        if index < blocks.len() - 1 {
            current = compress_memory(&current, index).expect("run of >=2 free blocks located by scan");
        } else {
            break;
        }
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_free(size: i32) -> MemoryState {
        MemoryState::initial_with_size(size)
    }

    impl MemoryState {
        fn initial_with_size(size: i32) -> Self {
            let b = MemoryBlock::raw(-1, 0, size);
            MemoryState::new(vec![b], vec![b])
        }
    }

    #[test]
    fn allocate_splits_block_when_remainder() {
        let state = single_free(256);
        let next = allocate_memory(&state, 0, 3, 100).unwrap();
        assert_eq!(next.blocks[0], MemoryBlock::raw(3, 0, 100));
        assert_eq!(next.blocks[1], MemoryBlock::raw(-1, 100, 156));
        assert_eq!(next.free_blocks, vec![MemoryBlock::raw(-1, 100, 156)]);
    }

    #[test]
    fn allocate_exact_fit_consumes_block() {
        let state = single_free(256);
        let next = allocate_memory(&state, 0, 3, 256).unwrap();
        assert_eq!(next.blocks, vec![MemoryBlock::raw(3, 0, 256)]);
        assert!(next.free_blocks.is_empty());
    }

    #[test]
    fn allocate_rejects_used_block() {
        let state = MemoryState::new(
            vec![MemoryBlock::raw(1, 0, 256)],
            vec![],
        );
        assert_eq!(allocate_memory(&state, 0, 2, 10), Err(OperationError::BlockIsUsed));
    }

    #[test]
    fn allocate_rejects_too_small() {
        let state = single_free(50);
        assert_eq!(allocate_memory(&state, 0, 2, 100), Err(OperationError::TooSmall));
    }

    #[test]
    fn free_rejects_pid_mismatch() {
        let state = MemoryState::new(vec![MemoryBlock::raw(1, 0, 10)], vec![]);
        assert_eq!(free_memory(&state, 2, 0), Err(OperationError::PidMismatch));
    }

    #[test]
    fn compress_requires_two_blocks() {
        let state = MemoryState::new(
            vec![MemoryBlock::raw(-1, 0, 10), MemoryBlock::raw(1, 10, 10)],
            vec![MemoryBlock::raw(-1, 0, 10)],
        );
        assert_eq!(compress_memory(&state, 0), Err(OperationError::SingleBlock));
    }

    #[test]
    fn compress_merges_adjacent_free_blocks() {
        let a = MemoryBlock::raw(-1, 0, 10);
        let b = MemoryBlock::raw(-1, 10, 20);
        let c = MemoryBlock::raw(2, 30, 5);
        let state = MemoryState::new(vec![a, b, c], vec![a, b]);
        let next = compress_memory(&state, 0).unwrap();
        assert_eq!(next.blocks, vec![MemoryBlock::raw(-1, 0, 30), c]);
    }

    #[test]
    fn defragment_packs_owned_blocks_to_front() {
        let a = MemoryBlock::raw(-1, 0, 10);
        let b = MemoryBlock::raw(1, 10, 20);
        let c = MemoryBlock::raw(-1, 30, 5);
        let d = MemoryBlock::raw(2, 35, 5);
        let state = MemoryState::new(vec![a, b, c, d], vec![a, c]);
        let next = defragment_memory(&state);
        assert_eq!(
            next.blocks,
            vec![
                MemoryBlock::raw(1, 0, 20),
                MemoryBlock::raw(2, 20, 5),
                MemoryBlock::raw(-1, 25, 15),
            ]
        );
        assert_eq!(next.free_blocks, vec![MemoryBlock::raw(-1, 25, 15)]);
    }

    #[test]
    fn compress_all_collapses_every_run() {
        let a = MemoryBlock::raw(-1, 0, 10);
        let b = MemoryBlock::raw(-1, 10, 10);
        let c = MemoryBlock::raw(1, 20, 5);
        let d = MemoryBlock::raw(-1, 25, 5);
        let e = MemoryBlock::raw(-1, 30, 5);
        let state = MemoryState::new(vec![a, b, c, d, e], vec![a, b, d, e]);
        let next = compress_all_memory(&state);
        assert_eq!(
            next.blocks,
            vec![MemoryBlock::raw(-1, 0, 20), c, MemoryBlock::raw(-1, 25, 10)]
        );
    }
}
