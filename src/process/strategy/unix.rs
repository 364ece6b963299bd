//! UNIX: 16 priority queues, ready process with the highest priority wins,
//! and every two ticks an executing process's priority decays by one
//! (bottoming out at priority 1, never touching priorities 8-15).
//!
//! Only schedules when the CPU is idle — unlike WinNT, a newly-created or
//! I/O-returning higher-priority process does not preempt the process
//! currently executing.

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

fn reset_timer(state: &ProcessesState, pid: i32) -> ProcessesState {
    let mut next = state.clone();
    if let Some(p) = next.processes.iter_mut().find(|p| p.pid == pid) {
        p.timer = 0;
    }
    next
}

fn age_executing(state: &ProcessesState) -> ProcessesState {
    let mut next = state.clone();
    if let Some(current) = next.processes.iter_mut().find(|p| p.state == ProcState::Executing) {
        if current.timer % 2 == 0 && current.timer > 0 && current.priority > 0 && current.priority < 8 {
            current.priority -= 1;
        }
    }
    next
}

pub(super) fn process_request(request: &Request, state: &ProcessesState) -> ProcessesState {
    // Priority ageing is read against the timer from *before* this
    // request's own updateTimer call, so it runs first.
    let state = &age_executing(state);

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
            next = push_to_queue(&next, process.priority as usize, process.pid).expect("just added");

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
            next = reset_timer(&next, r.pid);
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
            let new_priority = if process.priority < 7 { process.priority + 1 } else { process.priority };
            let mut next = push_to_queue(state, new_priority as usize, r.pid).expect("just checked");
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
            let priority = process.priority;
            let mut next = push_to_queue(state, priority as usize, r.pid).expect("pid exists, not queued");
            if let Some((pid, queue)) = schedule(&next) {
                next = pop_and_switch(&next, pid, queue);
            }
            next
        }
        Request::TimeQuantumExpired(_) => {
            let mut next = state.clone();
            if let Some(current) = next.current() {
                let (pid, priority) = (current.pid, current.priority);
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
    fn highest_priority_queue_wins() {
        let mut queues: [Vec<i32>; QUEUE_COUNT] = Default::default();
        queues[3].push(1);
        queues[9].push(2);
        let state = ProcessesState::new(
            vec![
                crate::process::types::Process::default().with_pid(1).unwrap().with_priority(3).unwrap(),
                crate::process::types::Process::default().with_pid(2).unwrap().with_priority(9).unwrap(),
            ],
            queues,
        );
        assert_eq!(schedule(&state), Some((2, 9)));
    }

    #[test]
    fn ageing_decays_priority_every_two_ticks_within_range() {
        let p = crate::process::types::Process::default()
            .with_pid(1)
            .unwrap()
            .with_priority(5)
            .unwrap()
            .with_timer(2)
            .unwrap()
            .with_state(ProcState::Executing);
        let state = ProcessesState::new(vec![p], Default::default());
        let next = age_executing(&state);
        assert_eq!(next.by_pid(1).unwrap().priority, 4);
    }

    #[test]
    fn ageing_does_not_touch_priority_above_seven() {
        let p = crate::process::types::Process::default()
            .with_pid(1)
            .unwrap()
            .with_priority(9)
            .unwrap()
            .with_timer(2)
            .unwrap()
            .with_state(ProcState::Executing);
        let state = ProcessesState::new(vec![p], Default::default());
        let next = age_executing(&state);
        assert_eq!(next.by_pid(1).unwrap().priority, 9);
    }

    #[test]
    fn solo_process_schedules_without_preemption_check() {
        let state = ProcessesState::initial();
        let req = Request::CreateProcess(CreateProcessReq::new(1, -1, 4, 0, 0, 5).unwrap());
        let next = process_request(&req, &state);
        assert_eq!(next.current().map(|p| p.pid), Some(1));
    }
}
