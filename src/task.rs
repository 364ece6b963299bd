/*!
 * Task objects
 *
 * A `Task` pairs a strategy with a fixed list of requests and a running
 * state: it tracks how many requests have been replayed so far, how many
 * times the caller submitted a wrong next state, and the free-text actions
 * a caller attached to each step. `MemoryTask`/`ProcessesTask` are the two
 * concrete kinds; `Task` unifies them the way the CLI and codec need.
 *
 * Grounded on `examples/original_source/schedulers/utils/tasks.h`.
 */

use thiserror::Error;

use crate::memory::strategy::MemoryStrategy;
use crate::memory::types::{MemoryState, TypeError as MemoryTypeError};
use crate::memory::request::Request as MemoryRequest;
use crate::process::strategy::ProcessStrategy;
use crate::process::types::{ProcessesState, TypeError as ProcessTypeError};
use crate::process::request::Request as ProcessRequest;

/// Failures raised when constructing or replaying a task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("completed count exceeds the number of requests")]
    InvalidTask,
    #[error("state does not match replaying the task's own requests")]
    StateMismatch,
    #[error("memory state is invalid: {0}")]
    Memory(#[from] MemoryTypeError),
    #[error("process state is invalid: {0}")]
    Process(#[from] ProcessTypeError),
}

/// "Contiguous memory allocation" task: a strategy, a fixed request list,
/// and the state reached after replaying the first `completed` of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTask {
    strategy: MemoryStrategy,
    completed: u32,
    state: MemoryState,
    requests: Vec<MemoryRequest>,
    fails: u32,
    actions: Vec<String>,
}

impl MemoryTask {
    /// Builds a task, replaying its own requests to confirm `state` and
    /// `completed` are mutually consistent.
    pub fn create(
        strategy: MemoryStrategy,
        completed: u32,
        fails: u32,
        state: MemoryState,
        requests: Vec<MemoryRequest>,
        actions: Vec<String>,
    ) -> Result<Self, TaskError> {
        Self::validate(strategy, completed, &state, &requests)?;
        Ok(Self { strategy, completed, state, requests, fails, actions })
    }

    /// Convenience constructor for a freshly-generated task: no errors
    /// recorded yet, no user actions attached.
    pub fn new(
        strategy: MemoryStrategy,
        completed: u32,
        state: MemoryState,
        requests: Vec<MemoryRequest>,
    ) -> Result<Self, TaskError> {
        Self::create(strategy, completed, 0, state, requests, Vec::new())
    }

    fn validate(
        strategy: MemoryStrategy,
        completed: u32,
        state: &MemoryState,
        requests: &[MemoryRequest],
    ) -> Result<(), TaskError> {
        state.validate()?;

        if (requests.len() as u32) < completed {
            return Err(TaskError::InvalidTask);
        }

        let mut current = MemoryState::initial();
        for request in &requests[..completed as usize] {
            current = strategy.process_request(request, &current);
        }
        if current != *state {
            return Err(TaskError::StateMismatch);
        }
        Ok(())
    }

    pub fn strategy(&self) -> MemoryStrategy {
        self.strategy
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn state(&self) -> &MemoryState {
        &self.state
    }

    pub fn requests(&self) -> &[MemoryRequest] {
        &self.requests
    }

    pub fn fails(&self) -> u32 {
        self.fails
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Whether every request in the task has been replayed.
    pub fn done(&self) -> bool {
        self.completed as usize == self.requests.len()
    }

    /// Checks a candidate next state against what strategy replay expects.
    ///
    /// On a match, returns `(true, task)` with `completed` advanced by one
    /// and `state` updated. On a mismatch, returns `(false, task)` with
    /// `fails` incremented and everything else unchanged. If the task is
    /// already `done()`, returns `(true, self)` untouched.
    pub fn next(&self, state: &MemoryState) -> (bool, Self) {
        if self.done() {
            return (true, self.clone());
        }

        let request = &self.requests[self.completed as usize];
        let expected = self.strategy.process_request(request, &self.state);

        if expected == *state {
            (
                true,
                Self {
                    strategy: self.strategy,
                    completed: self.completed + 1,
                    fails: self.fails,
                    state: expected,
                    requests: self.requests.clone(),
                    actions: self.actions.clone(),
                },
            )
        } else {
            (
                false,
                Self {
                    strategy: self.strategy,
                    completed: self.completed,
                    fails: self.fails + 1,
                    state: self.state.clone(),
                    requests: self.requests.clone(),
                    actions: self.actions.clone(),
                },
            )
        }
    }
}

/// "CPU scheduling" task: a strategy, a fixed request list, and the state
/// reached after replaying the first `completed` of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessesTask {
    strategy: ProcessStrategy,
    completed: u32,
    state: ProcessesState,
    requests: Vec<ProcessRequest>,
    fails: u32,
    actions: Vec<String>,
}

impl ProcessesTask {
    pub fn create(
        strategy: ProcessStrategy,
        completed: u32,
        fails: u32,
        state: ProcessesState,
        requests: Vec<ProcessRequest>,
        actions: Vec<String>,
    ) -> Result<Self, TaskError> {
        Self::validate(strategy, completed, &state, &requests)?;
        Ok(Self { strategy, completed, state, requests, fails, actions })
    }

    pub fn new(
        strategy: ProcessStrategy,
        completed: u32,
        state: ProcessesState,
        requests: Vec<ProcessRequest>,
    ) -> Result<Self, TaskError> {
        Self::create(strategy, completed, 0, state, requests, Vec::new())
    }

    fn validate(
        strategy: ProcessStrategy,
        completed: u32,
        state: &ProcessesState,
        requests: &[ProcessRequest],
    ) -> Result<(), TaskError> {
        state.validate()?;

        if (requests.len() as u32) < completed {
            return Err(TaskError::InvalidTask);
        }

        let mut current = ProcessesState::initial();
        for request in &requests[..completed as usize] {
            current = strategy.process_request(request, &current);
        }
        if current != *state {
            return Err(TaskError::StateMismatch);
        }
        Ok(())
    }

    pub fn strategy(&self) -> ProcessStrategy {
        self.strategy
    }

    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn state(&self) -> &ProcessesState {
        &self.state
    }

    pub fn requests(&self) -> &[ProcessRequest] {
        &self.requests
    }

    pub fn fails(&self) -> u32 {
        self.fails
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn done(&self) -> bool {
        self.completed as usize == self.requests.len()
    }

    pub fn next(&self, state: &ProcessesState) -> (bool, Self) {
        if self.done() {
            return (true, self.clone());
        }

        let request = &self.requests[self.completed as usize];
        let expected = self.strategy.process_request(request, &self.state);

        if expected == *state {
            (
                true,
                Self {
                    strategy: self.strategy,
                    completed: self.completed + 1,
                    fails: self.fails,
                    state: expected,
                    requests: self.requests.clone(),
                    actions: self.actions.clone(),
                },
            )
        } else {
            (
                false,
                Self {
                    strategy: self.strategy,
                    completed: self.completed,
                    fails: self.fails + 1,
                    state: self.state.clone(),
                    requests: self.requests.clone(),
                    actions: self.actions.clone(),
                },
            )
        }
    }
}

/// Either kind of task, as produced by the generators and the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Memory(MemoryTask),
    Processes(ProcessesTask),
}

impl Task {
    pub fn done(&self) -> bool {
        match self {
            Task::Memory(t) => t.done(),
            Task::Processes(t) => t.done(),
        }
    }
}

impl From<MemoryTask> for Task {
    fn from(task: MemoryTask) -> Self {
        Task::Memory(task)
    }
}

impl From<ProcessesTask> for Task {
    fn from(task: ProcessesTask) -> Self {
        Task::Processes(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::request::{CreateProcessReq as MemCreate, Request as MemReq};
    use crate::memory::types::MemoryBlock;
    use crate::process::request::{CreateProcessReq as ProcCreate, Request as ProcReq};

    #[test]
    fn fresh_memory_task_is_valid_and_not_done() {
        let requests = vec![MemReq::CreateProcess(MemCreate::new(1, 4096, 1).unwrap())];
        let task = MemoryTask::new(MemoryStrategy::FirstAppropriate, 0, MemoryState::initial(), requests).unwrap();
        assert!(!task.done());
        assert_eq!(task.fails(), 0);
    }

    #[test]
    fn memory_task_rejects_state_mismatch() {
        let requests = vec![MemReq::CreateProcess(MemCreate::new(1, 4096, 1).unwrap())];
        let wrong_state = MemoryState::new(vec![MemoryBlock::raw(-1, 0, 256)], vec![MemoryBlock::raw(-1, 0, 256)]);
        let err = MemoryTask::create(
            MemoryStrategy::FirstAppropriate,
            1,
            0,
            wrong_state,
            requests,
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, TaskError::StateMismatch);
    }

    #[test]
    fn memory_task_rejects_completed_past_request_count() {
        let err = MemoryTask::new(MemoryStrategy::FirstAppropriate, 5, MemoryState::initial(), Vec::new()).unwrap_err();
        assert_eq!(err, TaskError::InvalidTask);
    }

    #[test]
    fn memory_task_next_advances_on_correct_state() {
        let requests = vec![MemReq::CreateProcess(MemCreate::new(1, 4096, 1).unwrap())];
        let task = MemoryTask::new(MemoryStrategy::FirstAppropriate, 0, MemoryState::initial(), requests).unwrap();
        let candidate_state = MemoryStrategy::FirstAppropriate.process_request(
            &MemReq::CreateProcess(MemCreate::new(1, 4096, 1).unwrap()),
            &MemoryState::initial(),
        );
        let (ok, next) = task.next(&candidate_state);
        assert!(ok);
        assert_eq!(next.completed(), 1);
        assert!(next.done());
    }

    #[test]
    fn memory_task_next_records_failure_on_wrong_state() {
        let requests = vec![MemReq::CreateProcess(MemCreate::new(1, 4096, 1).unwrap())];
        let task = MemoryTask::new(MemoryStrategy::FirstAppropriate, 0, MemoryState::initial(), requests).unwrap();
        let (ok, next) = task.next(&MemoryState::initial());
        assert!(!ok);
        assert_eq!(next.completed(), 0);
        assert_eq!(next.fails(), 1);
    }

    #[test]
    fn fresh_processes_task_is_valid() {
        let requests = vec![ProcReq::CreateProcess(ProcCreate::new(1, -1, 0, 0, 0, 10).unwrap())];
        let task = ProcessesTask::new(ProcessStrategy::Fcfs, 0, ProcessesState::initial(), requests).unwrap();
        assert!(!task.done());
    }

    #[test]
    fn processes_task_next_advances_on_correct_state() {
        let requests = vec![ProcReq::CreateProcess(ProcCreate::new(1, -1, 0, 0, 0, 10).unwrap())];
        let task = ProcessesTask::new(ProcessStrategy::Fcfs, 0, ProcessesState::initial(), requests.clone()).unwrap();
        let candidate_state = ProcessStrategy::Fcfs.process_request(&requests[0], &ProcessesState::initial());
        let (ok, next) = task.next(&candidate_state);
        assert!(ok);
        assert!(next.done());
    }

    #[test]
    fn task_enum_dispatches_done() {
        let requests: Vec<MemReq> = Vec::new();
        let task: Task = MemoryTask::new(MemoryStrategy::FirstAppropriate, 0, MemoryState::initial(), requests)
            .unwrap()
            .into();
        assert!(task.done());
    }
}
