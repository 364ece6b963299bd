//! WinNT: 16 priority queues, plus explicit preemption — a process that
//! newly becomes ready at a strictly higher priority than the one
//! currently executing bumps it back onto its queue and takes the CPU.

use crate::process::operations::{add_process, change_process_state, push_to_queue, terminate_process};
use crate::process::request::Request;
use crate::process::strategy::pop_and_switch;
use crate::process::types::{ProcState, ProcessesState, QUEUE_COUNT};

fn schedule(state: &ProcessesState) -> Option<(i32, usize)> {
    state
        .queues
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, q)| q.first().map(|&pid| (pid, i)))
}

/// Pops the scheduled process and switches to it, preempting the current
/// executing process (by requeueing it) if the new candidate outranks it.
fn schedule_with_preemption(state: &ProcessesState) -> ProcessesState {
    let mut next = state.clone();
    let Some((pid, queue)) = schedule(&next) else { return next };
    let candidate_priority = next.by_pid(pid).expect("scheduled pid is in the table").priority;

    match next.current() {
        None => {
            next = pop_and_switch(&next, pid, queue);
        }
        Some(current) if candidate_priority > current.priority => {
            let (current_pid, current_priority) = (current.pid, current.priority);
            next = push_to_queue(&next, current_priority as usize, current_pid).expect("current, not queued");
            next = pop_and_switch(&next, pid, queue);
        }
        _ => {}
    }
    next
}

pub(super) fn process_request(request: &Request, state: &ProcessesState) -> ProcessesState {
    match request {
        Request::CreateProcess(r) => {
            let process = r.to_process();
            if state.by_pid(process.pid).is_some() {
                return state.clone();
            }
            if process.ppid != -1 {
                match state.by_pid(process.ppid) {
                    Some(parent) if parent.state == ProcState::Executing => {}
                    _ => return state.clone(),
                }
            }

            let mut next = add_process(state, process).expect("existence/parentage just checked");
            next = push_to_queue(&next, process.base_priority as usize, process.pid).expect("just added");
            schedule_with_preemption(&next)
        }
        Request::TerminateProcess(r) => {
            if state.by_pid(r.pid).is_none() {
                return state.clone();
            }
            let mut next = terminate_process(state, r.pid).expect("existence just checked");
            if next.current().is_none() {
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::InitIo(r) => {
            let Some(process) = state.by_pid(r.pid) else { return state.clone() };
            if process.state != ProcState::Executing {
                return state.clone();
            }
            let mut next = change_process_state(state, r.pid, ProcState::Waiting).expect("just checked");
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TerminateIo(r) => {
            let Some(process) = state.by_pid(r.pid) else { return state.clone() };
            if process.state != ProcState::Waiting {
                return state.clone();
            }
            let new_priority = std::cmp::min(QUEUE_COUNT as i32 - 1, process.priority + r.augment);
            let mut next = push_to_queue(state, new_priority as usize, r.pid).expect("just checked");
            next = change_process_state(&next, r.pid, ProcState::Active).expect("pid exists");
            schedule_with_preemption(&next)
        }
        Request::TransferControl(r) => {
            let Some(process) = state.by_pid(r.pid) else { return state.clone() };
            if process.state != ProcState::Executing {
                return state.clone();
            }
            let new_priority = std::cmp::max(process.base_priority, process.priority - 1);
            let mut next = push_to_queue(state, new_priority as usize, r.pid).expect("pid exists, not queued");
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => {
            let mut next = state.clone();
            if let Some(current) = next.current() {
                let (pid, priority) = (current.pid, std::cmp::max(current.base_priority, current.priority - 1));
                next = push_to_queue(&next, priority as usize, pid).expect("current process, not queued");
            }
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::request::CreateProcessReq;

    #[test]
    fn higher_priority_arrival_preempts_current() {
        let state = ProcessesState::initial();
        let low = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 10).unwrap());
        let state = process_request(&low, &state);
        assert_eq!(state.current().map(|p| p.pid), Some(1));

        let high = Request::CreateProcess(CreateProcessReq::new(2, -1, 5, 5, 0, 10).unwrap());
        let next = process_request(&high, &state);
        assert_eq!(next.current().map(|p| p.pid), Some(2));
        assert_eq!(next.queues[0], vec![1]);
    }

    #[test]
    fn equal_or_lower_priority_arrival_does_not_preempt() {
        let state = ProcessesState::initial();
        let first = Request::CreateProcess(CreateProcessReq::new(1, -1, 5, 5, 0, 10).unwrap());
        let state = process_request(&first, &state);

        let second = Request::CreateProcess(CreateProcessReq::new(2, -1, 5, 5, 0, 10).unwrap());
        let next = process_request(&second, &state);
        assert_eq!(next.current().map(|p| p.pid), Some(1));
        assert_eq!(next.queues[5], vec![2]);
    }
}
