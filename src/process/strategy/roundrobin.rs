//! Round Robin: a single queue (0), always appended to the tail, no
//! priority levels in play.

use crate::process::operations::{add_process, change_process_state, push_to_queue, terminate_process};
use crate::process::request::Request;
use crate::process::strategy::pop_and_switch;
use crate::process::types::{ProcState, ProcessesState};

fn schedule(state: &ProcessesState) -> Option<(i32, usize)> {
    state.queues[0].first().map(|&pid| (pid, 0))
}

pub(super) fn process_request(request: &Request, state: &ProcessesState) -> ProcessesState {
    match request {
        Request::CreateProcess(r) => {
            let process = r.to_process();
            let mut next = add_process(state, process).unwrap_or_else(|_| state.clone());
            next = push_to_queue(&next, 0, process.pid).unwrap_or(next);
            if next.current().is_none() {
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::TerminateProcess(r) => {
            let mut next = terminate_process(state, r.pid).unwrap_or_else(|_| state.clone());
            if next.current().is_none() {
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::InitIo(r) => {
            let mut next = change_process_state(state, r.pid, ProcState::Waiting).unwrap_or_else(|_| state.clone());
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TerminateIo(r) => {
            let mut next = push_to_queue(state, 0, r.pid).unwrap_or_else(|_| state.clone());
            next = change_process_state(&next, r.pid, ProcState::Active).unwrap_or(next);
            if next.current().is_none() {
                if let Some((pid, queue)) = schedule(&next) {
                    next = pop_and_switch(&next, pid, queue);
                }
            }
            next
        }
        Request::TransferControl(r) => {
            let mut next = push_to_queue(state, 0, r.pid).unwrap_or_else(|_| state.clone());
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => {
            let mut next = state.clone();
            if let Some(current) = next.current() {
                let pid = current.pid;
                next = push_to_queue(&next, 0, pid).unwrap_or(next);
            }
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
    }
}
