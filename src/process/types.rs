/*!
 * Process domain types
 *
 * `Process`/`ProcessesState` model the scheduler's view of a process: pid
 * space `[0, 255]`, 16 priority levels, and 16 corresponding ready queues.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of priority levels / ready queues.
pub const QUEUE_COUNT: usize = 16;

/// Range/consistency failures raised when changing a `Process` field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeError {
    #[error("invalid pid: {0}")]
    InvalidPid(i32),
    #[error("invalid ppid: {0}")]
    InvalidPpid(i32),
    #[error("invalid priority: {0}")]
    InvalidPriority(i32),
    #[error("invalid base priority: {0}")]
    InvalidBasePriority(i32),
    #[error("invalid timer: {0}")]
    InvalidTimer(i32),
    #[error("invalid work time: {0}")]
    InvalidWorkTime(i32),
}

/// Where a process currently sits relative to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcState {
    Active,
    Executing,
    Waiting,
}

/// A process control block.
///
/// Field setters are pure: each returns a new, validated `Process` rather
/// than mutating in place, matching the value-semantics of the reference
/// algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Process {
    pub pid: i32,
    pub ppid: i32,
    pub priority: i32,
    #[serde(rename = "basePriority")]
    pub base_priority: i32,
    pub timer: i32,
    #[serde(rename = "workTime")]
    pub work_time: i32,
    pub state: ProcState,
}

impl Default for Process {
    fn default() -> Self {
        Self {
            pid: 0,
            ppid: -1,
            priority: 0,
            base_priority: 0,
            timer: 0,
            work_time: 0,
            state: ProcState::Active,
        }
    }
}

impl Process {
    pub fn with_pid(mut self, pid: i32) -> Result<Self, TypeError> {
        if !(0..=255).contains(&pid) {
            return Err(TypeError::InvalidPid(pid));
        }
        self.pid = pid;
        Ok(self)
    }

    pub fn with_ppid(mut self, ppid: i32) -> Result<Self, TypeError> {
        if !(-1..=255).contains(&ppid) {
            return Err(TypeError::InvalidPpid(ppid));
        }
        self.ppid = ppid;
        Ok(self)
    }

    pub fn with_priority(mut self, priority: i32) -> Result<Self, TypeError> {
        if !(0..=15).contains(&priority) {
            return Err(TypeError::InvalidPriority(priority));
        }
        self.priority = priority;
        Ok(self)
    }

    pub fn with_base_priority(mut self, base_priority: i32) -> Result<Self, TypeError> {
        if !(0..=15).contains(&base_priority) || base_priority > self.priority {
            return Err(TypeError::InvalidBasePriority(base_priority));
        }
        self.base_priority = base_priority;
        Ok(self)
    }

    pub fn with_timer(mut self, timer: i32) -> Result<Self, TypeError> {
        if timer < 0 {
            return Err(TypeError::InvalidTimer(timer));
        }
        self.timer = timer;
        Ok(self)
    }

    pub fn with_work_time(mut self, work_time: i32) -> Result<Self, TypeError> {
        if work_time < 0 {
            return Err(TypeError::InvalidWorkTime(work_time));
        }
        self.work_time = work_time;
        Ok(self)
    }

    pub fn with_state(mut self, state: ProcState) -> Self {
        self.state = state;
        self
    }

    /// Re-checks this process's fields against the same ranges the `with_*`
    /// setters enforce. Used to validate processes that arrived through
    /// deserialization rather than through the setter chain.
    pub fn validate(&self) -> Result<(), TypeError> {
        Self::default()
            .with_pid(self.pid)?
            .with_ppid(self.ppid)?
            .with_priority(self.priority)?
            .with_base_priority(self.base_priority)?
            .with_timer(self.timer)?
            .with_work_time(self.work_time)?;
        Ok(())
    }
}

/// Process table plus the 16 priority-indexed ready queues.
///
/// Before the first request is processed, no process has been created and
/// every queue is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessesState {
    pub processes: Vec<Process>,
    pub queues: [Vec<i32>; QUEUE_COUNT],
}

impl ProcessesState {
    pub fn new(processes: Vec<Process>, queues: [Vec<i32>; QUEUE_COUNT]) -> Self {
        Self { processes, queues }
    }

    pub fn initial() -> Self {
        Self::new(Vec::new(), Default::default())
    }

    pub fn by_pid(&self, pid: i32) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn current(&self) -> Option<&Process> {
        self.processes.iter().find(|p| p.state == ProcState::Executing)
    }

    /// Re-validates every process in the table. Used when a state arrives
    /// through deserialization (see `crate::task`).
    pub fn validate(&self) -> Result<(), TypeError> {
        self.processes.iter().try_for_each(Process::validate)
    }
}

impl Default for ProcessesState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_empty() {
        let state = ProcessesState::initial();
        assert!(state.processes.is_empty());
        assert!(state.queues.iter().all(Vec::is_empty));
    }

    #[test]
    fn base_priority_cannot_exceed_priority() {
        let p = Process::default().with_priority(3).unwrap();
        assert_eq!(p.with_base_priority(4), Err(TypeError::InvalidBasePriority(4)));
    }

    #[test]
    fn setters_are_pure() {
        let p = Process::default();
        let q = p.with_pid(5).unwrap();
        assert_eq!(p.pid, 0);
        assert_eq!(q.pid, 5);
    }
}
