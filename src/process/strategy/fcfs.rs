//! First-Come-First-Served: two static queues, 0 (I/O returnees) ahead of
//! 1 (new arrivals), no preemption and no reordering within a queue.

use crate::process::operations::{add_process, change_process_state, push_to_queue, terminate_process};
use crate::process::request::Request;
use crate::process::strategy::pop_and_switch;
use crate::process::types::{ProcState, ProcessesState};

fn schedule(state: &ProcessesState) -> Option<(i32, usize)> {
    if let Some(&pid) = state.queues[0].first() {
        return Some((pid, 0));
    }
    if let Some(&pid) = state.queues[1].first() {
        return Some((pid, 1));
    }
    None
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
            next = push_to_queue(&next, 1, process.pid).expect("just added");

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
            let mut next = push_to_queue(state, 0, r.pid).expect("just checked membership implicitly");
            next = change_process_state(&next, r.pid, ProcState::Active).expect("pid exists");
            if next.current().is_none() {
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
            let mut next = push_to_queue(state, 0, r.pid).expect("pid exists, not already queued");
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::request::CreateProcessReq;

    #[test]
    fn new_arrivals_queue_behind_io_returnees() {
        let state = ProcessesState::initial();
        let req = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 5).unwrap());
        let next = process_request(&req, &state);
        assert_eq!(next.current().map(|p| p.pid), Some(1));
    }
}
