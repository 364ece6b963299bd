//! Shortest Job Next: a single non-preemptive queue (0), reordered by
//! remaining estimated runtime every time a process joins or returns.
//!
//! SRT shares this module's pipeline and only swaps out the sort key
//! (`sjn::sort_queue` vs `srt::sort_queue`), matching the reference
//! `SjnStrategy`/`SrtStrategy` inheritance relationship.

use crate::process::operations::{add_process, change_process_state, terminate_process};
use crate::process::request::Request;
use crate::process::strategy::pop_and_switch;
use crate::process::types::{ProcState, ProcessesState};

fn schedule(state: &ProcessesState) -> Option<(i32, usize)> {
    state.queues[0].first().map(|&pid| (pid, 0))
}

/// Stable-sorts queue 0 so that processes still within their estimated
/// `work_time` come first, ordered by `key`; processes that have already
/// overrun their estimate keep their relative order at the tail.
pub(super) fn sort_queue_by<F: Fn(&crate::process::types::Process) -> i32>(state: &ProcessesState, key: F) -> ProcessesState {
    let mut next = state.clone();
    let within: Vec<i32> = state.queues[0]
        .iter()
        .copied()
        .filter(|&pid| {
            let p = state.by_pid(pid).expect("queued pid always present in process table");
            p.work_time >= p.timer
        })
        .collect();
    let overrun: Vec<i32> = state.queues[0]
        .iter()
        .copied()
        .filter(|&pid| {
            let p = state.by_pid(pid).expect("queued pid always present in process table");
            p.work_time < p.timer
        })
        .collect();

    let mut within = within;
    within.sort_by_key(|&pid| key(state.by_pid(pid).unwrap()));

    next.queues[0] = within.into_iter().chain(overrun).collect();
    next
}

pub(super) fn sort_queue(state: &ProcessesState) -> ProcessesState {
    sort_queue_by(state, |p| p.work_time)
}

pub(super) fn process_request_with_sort(
    request: &Request,
    state: &ProcessesState,
    sort: fn(&ProcessesState) -> ProcessesState,
) -> ProcessesState {
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
            next = crate::process::operations::push_to_queue(&next, 0, process.pid).expect("just added");
            next = sort(&next);

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
            let mut next = crate::process::operations::push_to_queue(state, 0, r.pid).expect("just checked");
            next = sort(&next);
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
            let mut next = crate::process::operations::push_to_queue(state, 0, r.pid).expect("pid exists, not queued");
            next = sort(&next);
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => state.clone(),
    }
}

pub(super) fn process_request(request: &Request, state: &ProcessesState) -> ProcessesState {
    process_request_with_sort(request, state, sort_queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::request::CreateProcessReq;

    #[test]
    fn shorter_job_queues_ahead_of_longer_one() {
        let state = ProcessesState::initial();
        let first = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 100).unwrap());
        let state = process_request(&first, &state);
        assert_eq!(state.current().map(|p| p.pid), Some(1));

        let long = Request::CreateProcess(CreateProcessReq::new(2, -1, 0, 0, 0, 20).unwrap());
        let state = process_request(&long, &state);
        let short = Request::CreateProcess(CreateProcessReq::new(3, -1, 0, 0, 0, 5).unwrap());
        let next = process_request(&short, &state);
        assert_eq!(next.queues[0], vec![3, 2]);
    }

    #[test]
    fn time_quantum_expired_is_a_noop() {
        let state = ProcessesState::initial();
        let req = Request::TimeQuantumExpired(crate::process::request::TimeQuantumExpired);
        assert_eq!(process_request(&req, &state), state);
    }
}
