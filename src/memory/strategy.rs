/*!
 * Memory placement strategies
 *
 * Modeled as a fieldless enum rather than a trait object: every strategy
 * shares the same request pipeline (`operations.rs`) and differs only in
 * how it orders `free_blocks` before a placement decision is made.
 */

use crate::memory::operations::{
    allocate_memory, compress_all_memory, defragment_memory, free_memory,
};
use crate::memory::request::{
    AllocateMemoryReq, CreateProcessReq, FreeMemoryReq, Request, TerminateProcessReq,
};
use crate::memory::types::MemoryState;

/// The three contiguous-allocation placement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryStrategy {
    FirstAppropriate,
    MostAppropriate,
    LeastAppropriate,
}

impl MemoryStrategy {
    pub fn name(self) -> &'static str {
        match self {
            MemoryStrategy::FirstAppropriate => "FIRST_APPROPRIATE",
            MemoryStrategy::MostAppropriate => "MOST_APPROPRIATE",
            MemoryStrategy::LeastAppropriate => "LEAST_APPROPRIATE",
        }
    }

    /// Inverse of `name`, used by the JSON codec when decoding a task.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FIRST_APPROPRIATE" => Some(MemoryStrategy::FirstAppropriate),
            "MOST_APPROPRIATE" => Some(MemoryStrategy::MostAppropriate),
            "LEAST_APPROPRIATE" => Some(MemoryStrategy::LeastAppropriate),
            _ => None,
        }
    }

    /// Human-readable description of a request, used by the CLI/task
    /// `dump` surface and test fixtures.
    pub fn describe_request(request: &Request) -> String {
        match request {
            Request::CreateProcess(r) => {
                format!("CREATE_PROCESS pid={} bytes={} pages={}", r.pid, r.bytes, r.pages)
            }
            Request::TerminateProcess(r) => format!("TERMINATE_PROCESS pid={}", r.pid),
            Request::AllocateMemory(r) => {
                format!("ALLOCATE_MEMORY pid={} bytes={} pages={}", r.pid, r.bytes, r.pages)
            }
            Request::FreeMemory(r) => format!("FREE_MEMORY pid={} address={}", r.pid, r.address),
        }
    }

    /// Dispatches `request` against `state`, returning the resulting state.
    pub fn process_request(self, request: &Request, state: &MemoryState) -> MemoryState {
        match request {
            Request::CreateProcess(r) => self.process_create_process(r, state),
            Request::TerminateProcess(r) => self.process_terminate_process(r, state),
            Request::AllocateMemory(r) => self.process_allocate_memory(r, state),
            Request::FreeMemory(r) => self.process_free_memory(r, state),
        }
    }

    fn process_create_process(self, request: &CreateProcessReq, state: &MemoryState) -> MemoryState {
        let req = AllocateMemoryReq {
            pid: request.pid,
            bytes: request.bytes,
            pages: request.pages,
        };
        self.sort_free_blocks(&self.allocate_general(&req, state, true))
    }

    fn process_terminate_process(self, request: &TerminateProcessReq, state: &MemoryState) -> MemoryState {
        let mut current = state.clone();

        loop {
            let pos = current.blocks.iter().position(|b| b.pid == request.pid);
            let Some(index) = pos else { break };
            current = free_memory(&current, request.pid, index)
                .expect("owning process's pid always matches the block it owns");
        }

        self.sort_free_blocks(&compress_all_memory(&current))
    }

    fn process_allocate_memory(self, request: &AllocateMemoryReq, state: &MemoryState) -> MemoryState {
        self.sort_free_blocks(&self.allocate_general(request, state, false))
    }

    fn process_free_memory(self, request: &FreeMemoryReq, state: &MemoryState) -> MemoryState {
        let pos = state.blocks.iter().position(|b| b.address == request.address);
        let Some(index) = pos else { return state.clone() };
        if state.blocks[index].pid != request.pid {
            return state.clone();
        }

        let next = free_memory(state, request.pid, index).expect("index and pid just checked");
        self.sort_free_blocks(&compress_all_memory(&next))
    }

    /// Shared allocation algorithm backing both `CreateProcess` and
    /// `AllocateMemory`: look for a free block that already fits, else
    /// defragment and retry, else ignore the request.
    fn allocate_general(self, request: &AllocateMemoryReq, state: &MemoryState, create_process: bool) -> MemoryState {
        let owns_memory = state.blocks.iter().any(|b| b.pid == request.pid);
        if (owns_memory && create_process) || (!owns_memory && !create_process) {
            return state.clone();
        }

        let total_free = state.total_free();

        if let Some(index) = self.find_free_block(state, request.pages) {
            return allocate_memory(state, index, request.pid, request.pages)
                .expect("find_free_block only returns blocks large enough and free");
        }

        if total_free >= request.pages {
            let defragmented = defragment_memory(state);
            let index = self
                .find_free_block(&defragmented, request.pages)
                .expect("defragmentation coalesces all free pages into one block");
            return allocate_memory(&defragmented, index, request.pid, request.pages)
                .expect("index just located");
        }

        state.clone()
    }

    /// Locates, in `free_blocks` order, the first block large enough to
    /// hold `size` pages, returning its index within `blocks`.
    fn find_free_block(self, state: &MemoryState, size: i32) -> Option<usize> {
        let candidate = state.free_blocks.iter().find(|b| size <= b.size)?;
        state.blocks.iter().position(|b| b == candidate)
    }

    /// Re-orders `free_blocks` according to the strategy's placement rule.
    /// `blocks` is untouched.
    fn sort_free_blocks(self, state: &MemoryState) -> MemoryState {
        let mut free_blocks = state.free_blocks.clone();
        match self {
            MemoryStrategy::FirstAppropriate => {
                free_blocks.sort_by_key(|b| b.address);
            }
            MemoryStrategy::MostAppropriate => {
                free_blocks.sort_by_key(|b| (b.size, b.address));
            }
            MemoryStrategy::LeastAppropriate => {
                free_blocks.sort_by(|a, b| b.size.cmp(&a.size).then(a.address.cmp(&b.address)));
            }
        }
        MemoryState::new(state.blocks.clone(), free_blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::MemoryBlock;

    #[test]
    fn first_appropriate_orders_by_address() {
        let a = MemoryBlock::raw(-1, 50, 10);
        let b = MemoryBlock::raw(-1, 0, 10);
        let state = MemoryState::new(vec![b, a], vec![a, b]);
        let sorted = MemoryStrategy::FirstAppropriate.sort_free_blocks(&state);
        assert_eq!(sorted.free_blocks, vec![b, a]);
    }

    #[test]
    fn most_appropriate_orders_by_size_then_address() {
        let small = MemoryBlock::raw(-1, 10, 5);
        let big = MemoryBlock::raw(-1, 0, 20);
        let state = MemoryState::new(vec![big, small], vec![big, small]);
        let sorted = MemoryStrategy::MostAppropriate.sort_free_blocks(&state);
        assert_eq!(sorted.free_blocks, vec![small, big]);
    }

    #[test]
    fn least_appropriate_orders_by_size_descending() {
        let small = MemoryBlock::raw(-1, 10, 5);
        let big = MemoryBlock::raw(-1, 0, 20);
        let state = MemoryState::new(vec![big, small], vec![small, big]);
        let sorted = MemoryStrategy::LeastAppropriate.sort_free_blocks(&state);
        assert_eq!(sorted.free_blocks, vec![big, small]);
    }

    #[test]
    fn create_process_allocates_from_initial_state() {
        let state = MemoryState::initial();
        let req = CreateProcessReq::new(1, 4096, 1).unwrap();
        let next = MemoryStrategy::FirstAppropriate.process_create_process(&req, &state);
        assert_eq!(next.blocks[0], MemoryBlock::raw(1, 0, 1));
    }

    #[test]
    fn create_process_ignored_when_pid_already_owns_memory() {
        let state = MemoryState::new(
            vec![MemoryBlock::raw(1, 0, 10), MemoryBlock::raw(-1, 10, 246)],
            vec![MemoryBlock::raw(-1, 10, 246)],
        );
        let req = CreateProcessReq::new(1, 4096, 1).unwrap();
        let next = MemoryStrategy::FirstAppropriate.process_create_process(&req, &state);
        assert_eq!(next.blocks, state.blocks);
    }

    #[test]
    fn terminate_process_frees_and_compresses() {
        let owned = MemoryBlock::raw(1, 0, 10);
        let free_a = MemoryBlock::raw(-1, 10, 10);
        let state = MemoryState::new(vec![owned, free_a], vec![free_a]);
        let req = TerminateProcessReq::new(1).unwrap();
        let next = MemoryStrategy::FirstAppropriate.process_terminate_process(&req, &state);
        assert_eq!(next.blocks, vec![MemoryBlock::raw(-1, 0, 20)]);
    }

    #[test]
    fn free_memory_ignored_when_pid_mismatch() {
        let state = MemoryState::new(vec![MemoryBlock::raw(1, 0, 10)], vec![]);
        let req = FreeMemoryReq::new(2, 0).unwrap();
        let next = MemoryStrategy::FirstAppropriate.process_free_memory(&req, &state);
        assert_eq!(next, state);
    }
}
