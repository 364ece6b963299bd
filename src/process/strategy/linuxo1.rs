//! Linux O(1): an active queue (0) and an expired queue (1). Quantum
//! expiry moves the current process to the expired queue; once the
//! active queue empties, the two queues swap (the `exchange_queues` step).
//!
//! No scheduler-specific request fields (priority, work time, augment) —
//! generated requests for this strategy are plain CREATE_PROCESS/etc., so
//! its task generator reuses RoundRobin's (see `generator::process`).

use crate::process::operations::{add_process, change_process_state, push_to_queue, terminate_process};
use crate::process::request::Request;
use crate::process::strategy::pop_and_switch;
use crate::process::types::{ProcState, ProcessesState};

fn schedule(state: &ProcessesState) -> Option<(i32, usize)> {
    state.queues[0].first().map(|&pid| (pid, 0))
}

fn exchange_queues(state: &ProcessesState) -> ProcessesState {
    if state.queues[1].is_empty() || !state.queues[0].is_empty() {
        return state.clone();
    }
    let expired = state.queues[1].clone();
    let mut next = state.clone();
    next.queues[1].clear();
    for pid in expired {
        next = push_to_queue(&next, 0, pid).expect("drained from the expired queue, not yet queued");
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
            next = push_to_queue(&next, 0, process.pid).expect("just added");
            if next.current().is_none() {
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::TerminateProcess(r) => {
            if state.by_pid(r.pid).is_none() {
                return state.clone();
            }
            let mut next = terminate_process(state, r.pid).expect("existence just checked");
            if next.current().is_none() {
                next = exchange_queues(&next);
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
            next = exchange_queues(&next);
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
            let mut next = push_to_queue(state, 0, r.pid).expect("just checked");
            next = change_process_state(&next, r.pid, ProcState::Active).expect("pid exists");
            if next.current().is_none() {
                next = exchange_queues(&next);
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::TransferControl(r) => {
            let Some(process) = state.by_pid(r.pid) else { return state.clone() };
            if process.state != ProcState::Executing {
                return state.clone();
            }
            let mut next = push_to_queue(state, 0, r.pid).expect("pid exists, not queued");
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => {
            let mut next = state.clone();
            if let Some(current) = next.current() {
                let pid = current.pid;
                next = push_to_queue(&next, 1, pid).expect("current process, not queued");
            }
            next = exchange_queues(&next);
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
    use crate::process::request::{CreateProcessReq, TimeQuantumExpired as TqReq};

    #[test]
    fn quantum_expiry_moves_current_to_expired_queue_then_swaps() {
        let state = ProcessesState::initial();
        let a = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 10).unwrap());
        let state = process_request(&a, &state);
        assert_eq!(state.current().map(|p| p.pid), Some(1));

        let tqe = Request::TimeQuantumExpired(TqReq);
        let next = process_request(&tqe, &state);
        // queue[0] was empty, queue[1] got pid 1, so they swap: pid 1 is
        // rescheduled immediately from the now-active queue[0].
        assert_eq!(next.current().map(|p| p.pid), Some(1));
        assert!(next.queues[1].is_empty());
    }
}
