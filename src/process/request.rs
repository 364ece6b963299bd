/*!
 * Process request algebra
 */

use crate::process::types::Process;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Range/consistency failures raised when constructing a `Request`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestError {
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
    #[error("invalid augment: {0}")]
    InvalidAugment(i32),
}

fn check_pid(pid: i32) -> Result<(), RequestError> {
    if !(0..=255).contains(&pid) {
        return Err(RequestError::InvalidPid(pid));
    }
    Ok(())
}

/// Requests a new process be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProcessReq {
    pub pid: i32,
    pub ppid: i32,
    pub priority: i32,
    #[serde(rename = "basePriority")]
    pub base_priority: i32,
    pub timer: i32,
    #[serde(rename = "workTime")]
    pub work_time: i32,
}

impl CreateProcessReq {
    pub fn new(pid: i32, ppid: i32, priority: i32, base_priority: i32, timer: i32, work_time: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        if !(-1..=255).contains(&ppid) {
            return Err(RequestError::InvalidPpid(ppid));
        }
        if !(0..=15).contains(&priority) {
            return Err(RequestError::InvalidPriority(priority));
        }
        if !(0..=15).contains(&base_priority) || base_priority > priority {
            return Err(RequestError::InvalidBasePriority(base_priority));
        }
        if timer < 0 {
            return Err(RequestError::InvalidTimer(timer));
        }
        if work_time < 0 {
            return Err(RequestError::InvalidWorkTime(work_time));
        }
        Ok(Self { pid, ppid, priority, base_priority, timer, work_time })
    }

    /// The process descriptor this request describes.
    pub fn to_process(self) -> Process {
        Process::default()
            .with_pid(self.pid)
            .and_then(|p| p.with_ppid(self.ppid))
            .and_then(|p| p.with_priority(self.priority))
            .and_then(|p| p.with_base_priority(self.base_priority))
            .and_then(|p| p.with_timer(self.timer))
            .and_then(|p| p.with_work_time(self.work_time))
            .expect("CreateProcessReq::new already validated every field")
    }
}

/// Requests `pid` and all of its descendants be terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateProcessReq {
    pub pid: i32,
}

impl TerminateProcessReq {
    pub fn new(pid: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        Ok(Self { pid })
    }
}

/// Requests `pid` begin an I/O wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitIo {
    pub pid: i32,
}

impl InitIo {
    pub fn new(pid: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        Ok(Self { pid })
    }
}

/// Requests `pid` finish its I/O wait and rejoin the ready queues.
///
/// `augment` is the number of priority levels WinNT-style strategies raise
/// the process by on completion (clamped to the lowest queue); strategies
/// that don't model a variable I/O boost ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminateIo {
    pub pid: i32,
    #[serde(default = "default_augment")]
    pub augment: i32,
}

fn default_augment() -> i32 {
    1
}

impl TerminateIo {
    pub fn new(pid: i32, augment: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        if augment < 0 {
            return Err(RequestError::InvalidAugment(augment));
        }
        Ok(Self { pid, augment })
    }
}

/// Requests `pid` voluntarily yield the CPU back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferControl {
    pub pid: i32,
}

impl TransferControl {
    pub fn new(pid: i32) -> Result<Self, RequestError> {
        check_pid(pid)?;
        Ok(Self { pid })
    }
}

/// Signals that the currently executing process's time quantum has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeQuantumExpired;

/// A validated request against the process scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "CREATE_PROCESS")]
    CreateProcess(CreateProcessReq),
    #[serde(rename = "TERMINATE_PROCESS")]
    TerminateProcess(TerminateProcessReq),
    #[serde(rename = "INIT_IO")]
    InitIo(InitIo),
    #[serde(rename = "TERMINATE_IO")]
    TerminateIo(TerminateIo),
    #[serde(rename = "TRANSFER_CONTROL")]
    TransferControl(TransferControl),
    #[serde(rename = "TIME_QUANTUM_EXPIRED")]
    TimeQuantumExpired(TimeQuantumExpired),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_process_req_rejects_base_priority_above_priority() {
        assert_eq!(
            CreateProcessReq::new(1, -1, 2, 5, 0, 0),
            Err(RequestError::InvalidBasePriority(5))
        );
    }

    #[test]
    fn terminate_io_default_augment_is_one() {
        let req: TerminateIo = serde_json::from_str(r#"{"pid": 1}"#).unwrap();
        assert_eq!(req.augment, 1);
    }
}
