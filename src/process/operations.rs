/*!
 * Process primitive operations
 *
 * Pure transformations over `ProcessesState`, mirroring the reference
 * algorithm's value semantics: every primitive returns a new state.
 */

use crate::error::{OperationError, OperationResult};
use crate::process::types::{ProcState, Process, ProcessesState, QUEUE_COUNT};
use std::collections::{HashMap, HashSet};

/// Changes the state of the process identified by `pid`.
pub fn change_process_state(state: &ProcessesState, pid: i32, new_state: ProcState) -> OperationResult<ProcessesState> {
    let mut next = state.clone();
    let process = next
        .processes
        .iter_mut()
        .find(|p| p.pid == pid)
        .ok_or(OperationError::NoSuchProcess)?;
    process.state = new_state;
    Ok(next)
}

/// Appends `pid` to queue `queue_index` and records that queue's index as
/// the process's current priority.
pub fn push_to_queue(state: &ProcessesState, queue_index: usize, pid: i32) -> OperationResult<ProcessesState> {
    let mut next = state.clone();

    if !next.processes.iter().any(|p| p.pid == pid) {
        return Err(OperationError::NoSuchProcess);
    }
    if next.queues.iter().any(|q| q.contains(&pid)) {
        return Err(OperationError::AlreadyInQueue);
    }

    next.queues
        .get_mut(queue_index)
        .ok_or(OperationError::OutOfRange)?
        .push(pid);

    let process = next
        .processes
        .iter_mut()
        .find(|p| p.pid == pid)
        .expect("existence just checked");
    process.priority = queue_index as i32;

    Ok(next)
}

/// Removes and returns the pid at the front of queue `queue_index`.
pub fn pop_from_queue(state: &ProcessesState, queue_index: usize) -> OperationResult<ProcessesState> {
    let mut next = state.clone();
    let queue = next.queues.get_mut(queue_index).ok_or(OperationError::OutOfRange)?;
    if queue.is_empty() {
        return Err(OperationError::EmptyQueue);
    }
    let pid = queue.remove(0);
    if !next.processes.iter().any(|p| p.pid == pid) {
        return Err(OperationError::NoSuchProcess);
    }
    Ok(next)
}

/// Switches execution to `next_pid`: the current `EXECUTING` process (if
/// any) goes back to `ACTIVE`, and `next_pid` becomes `EXECUTING`.
///
/// A no-op if `next_pid` is already executing.
pub fn switch_to(state: &ProcessesState, next_pid: i32) -> OperationResult<ProcessesState> {
    let mut next = state.clone();

    let current_pid = next.current().map(|p| p.pid);
    if current_pid == Some(next_pid) {
        return Ok(next);
    }

    {
        let target = next
            .processes
            .iter()
            .find(|p| p.pid == next_pid)
            .ok_or(OperationError::NoSuchProcess)?;
        if target.state != ProcState::Active {
            return Err(OperationError::InvalidState);
        }
    }

    if let Some(pid) = current_pid {
        if let Some(p) = next.processes.iter_mut().find(|p| p.pid == pid) {
            p.state = ProcState::Active;
        }
    }
    next.processes.iter_mut().find(|p| p.pid == next_pid).unwrap().state = ProcState::Executing;

    Ok(next)
}

/// Terminates `pid` and every descendant process (recursively, through the
/// `ppid` chain), removing them from the process table and every queue.
pub fn terminate_process(state: &ProcessesState, pid: i32) -> OperationResult<ProcessesState> {
    if !state.processes.iter().any(|p| p.pid == pid) {
        return Err(OperationError::NoSuchProcess);
    }

    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for process in &state.processes {
        if process.ppid != -1 {
            children.entry(process.ppid).or_default().push(process.pid);
        }
    }

    let mut to_terminate = HashSet::new();
    let mut stack = vec![pid];
    while let Some(current) = stack.pop() {
        if to_terminate.insert(current) {
            if let Some(kids) = children.get(&current) {
                stack.extend(kids.iter().copied());
            }
        }
    }

    let processes = state
        .processes
        .iter()
        .filter(|p| !to_terminate.contains(&p.pid))
        .copied()
        .collect();

    let mut queues: [Vec<i32>; QUEUE_COUNT] = Default::default();
    for (i, queue) in state.queues.iter().enumerate() {
        queues[i] = queue.iter().copied().filter(|pid| !to_terminate.contains(pid)).collect();
    }

    Ok(ProcessesState::new(processes, queues))
}

/// Adds a new process to the table, keeping `processes` in sorted order.
pub fn add_process(state: &ProcessesState, process: Process) -> OperationResult<ProcessesState> {
    if state.processes.iter().any(|p| p.pid == process.pid) {
        return Err(OperationError::ProcessExists);
    }
    if process.ppid != -1 && !state.processes.iter().any(|p| p.pid == process.ppid) {
        return Err(OperationError::NoSuchPpid);
    }

    let mut next = state.clone();
    next.processes.push(process);
    next.processes.sort();
    Ok(next)
}

/// Increments the timer of the currently `EXECUTING` process, if any.
pub fn update_timer(state: &ProcessesState) -> ProcessesState {
    let mut next = state.clone();
    if let Some(p) = next.processes.iter_mut().find(|p| p.state == ProcState::Executing) {
        p.timer += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: i32, ppid: i32) -> Process {
        Process::default().with_pid(pid).unwrap().with_ppid(ppid).unwrap()
    }

    #[test]
    fn terminate_process_removes_descendants() {
        let state = ProcessesState::new(vec![proc(1, -1), proc(2, 1), proc(3, 2), proc(4, -1)], Default::default());
        let next = terminate_process(&state, 1).unwrap();
        assert_eq!(next.processes.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn push_to_queue_rejects_duplicate_membership() {
        let mut queues: [Vec<i32>; QUEUE_COUNT] = Default::default();
        queues[2].push(7);
        let state = ProcessesState::new(vec![proc(7, -1)], queues);
        assert_eq!(push_to_queue(&state, 3, 7), Err(OperationError::AlreadyInQueue));
    }

    #[test]
    fn switch_to_is_noop_when_already_executing() {
        let p = proc(1, -1).with_state(ProcState::Executing);
        let state = ProcessesState::new(vec![p], Default::default());
        let next = switch_to(&state, 1).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn switch_to_rejects_non_active_target() {
        let p = proc(1, -1).with_state(ProcState::Waiting);
        let state = ProcessesState::new(vec![p], Default::default());
        assert_eq!(switch_to(&state, 1), Err(OperationError::InvalidState));
    }

    #[test]
    fn add_process_keeps_table_sorted() {
        let state = ProcessesState::initial();
        let next = add_process(&state, proc(5, -1)).unwrap();
        let next = add_process(&next, proc(1, -1)).unwrap();
        assert_eq!(next.processes.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn update_timer_increments_only_executing() {
        let state = ProcessesState::new(vec![proc(1, -1).with_state(ProcState::Executing), proc(2, -1)], Default::default());
        let next = update_timer(&state);
        assert_eq!(next.by_pid(1).unwrap().timer, 1);
        assert_eq!(next.by_pid(2).unwrap().timer, 0);
    }
}
