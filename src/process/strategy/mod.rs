/*!
 * Process scheduling strategies
 *
 * Modeled as a fieldless enum rather than a trait object: every strategy
 * shares the same outer pipeline (dispatch by request kind, then
 * `update_timer`) and differs only in queueing/scheduling policy. Each
 * variant's policy lives in its own module, named after the strategy it
 * implements.
 */

mod fcfs;
mod linuxo1;
mod roundrobin;
mod sjn;
mod srt;
mod unix;
mod winnt;

use crate::process::operations::{pop_from_queue, switch_to, update_timer};
use crate::process::request::Request;
use crate::process::types::ProcessesState;

/// The seven CPU scheduling strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStrategy {
    Fcfs,
    RoundRobin,
    Sjn,
    Srt,
    Unix,
    WinNt,
    LinuxO1,
}

impl ProcessStrategy {
    pub fn name(self) -> &'static str {
        match self {
            ProcessStrategy::Fcfs => "FCFS",
            ProcessStrategy::RoundRobin => "ROUNDROBIN",
            ProcessStrategy::Sjn => "SJN",
            ProcessStrategy::Srt => "SRT",
            ProcessStrategy::Unix => "UNIX",
            ProcessStrategy::WinNt => "WINNT",
            ProcessStrategy::LinuxO1 => "LINUXO1",
        }
    }

    /// Inverse of `name`, used by the JSON codec when decoding a task.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FCFS" => Some(ProcessStrategy::Fcfs),
            "ROUNDROBIN" => Some(ProcessStrategy::RoundRobin),
            "SJN" => Some(ProcessStrategy::Sjn),
            "SRT" => Some(ProcessStrategy::Srt),
            "UNIX" => Some(ProcessStrategy::Unix),
            "WINNT" => Some(ProcessStrategy::WinNt),
            "LINUXO1" => Some(ProcessStrategy::LinuxO1),
            _ => None,
        }
    }

    /// Whether this strategy can switch away from a running process before
    /// it voluntarily yields (I/O, quantum expiry, termination).
    ///
    /// RoundRobin, WinNT and LinuxO1 only ever switch when the CPU is
    /// idle too, so "preemptive" here specifically means WinNT's explicit
    /// priority-comparison preemption on `CreateProcess`/`TerminateIO`.
    pub fn preemptive(self) -> bool {
        matches!(self, ProcessStrategy::WinNt)
    }

    /// Dispatches `request` against `state`, then advances the executing
    /// process's timer. Mirrors `AbstractStrategy::processRequest`'s outer
    /// `std::visit(...)` + trailing `updateTimer` wrapper.
    pub fn process_request(self, request: &Request, state: &ProcessesState) -> ProcessesState {
        let next = match self {
            ProcessStrategy::Fcfs => fcfs::process_request(request, state),
            ProcessStrategy::RoundRobin => roundrobin::process_request(request, state),
            ProcessStrategy::Sjn => sjn::process_request(request, state),
            ProcessStrategy::Srt => srt::process_request(request, state),
            ProcessStrategy::Unix => unix::process_request(request, state),
            ProcessStrategy::WinNt => winnt::process_request(request, state),
            ProcessStrategy::LinuxO1 => linuxo1::process_request(request, state),
        };
        update_timer(&next)
    }

    /// Human-readable description of a request, used by the CLI/task
    /// `dump` surface and test fixtures. Strategy-specific fields (e.g.
    /// UNIX's priority, WinNT's base priority/augment) are appended the
    /// way the reference `getRequestDescription` overrides do.
    pub fn describe_request(self, request: &Request) -> String {
        let base = match request {
            Request::CreateProcess(r) => format!("CREATE_PROCESS pid={}", r.pid),
            Request::TerminateProcess(r) => format!("TERMINATE_PROCESS pid={}", r.pid),
            Request::InitIo(r) => format!("INIT_IO pid={}", r.pid),
            Request::TerminateIo(r) => format!("TERMINATE_IO pid={}", r.pid),
            Request::TransferControl(r) => format!("TRANSFER_CONTROL pid={}", r.pid),
            Request::TimeQuantumExpired(_) => "TIME_QUANTUM_EXPIRED".to_string(),
        };

        match (self, request) {
            (ProcessStrategy::Unix, Request::CreateProcess(r)) => {
                format!("{base}. Priority: {}", r.priority)
            }
            (ProcessStrategy::Sjn | ProcessStrategy::Srt, Request::CreateProcess(r)) => {
                format!("{base}. Expected runtime: {}", r.work_time)
            }
            (ProcessStrategy::WinNt, Request::CreateProcess(r)) => {
                format!("{base}. Base priority: {}", r.base_priority)
            }
            (ProcessStrategy::WinNt, Request::TerminateIo(r)) => {
                format!("{base}. Augment: {}", r.augment)
            }
            _ => base,
        }
    }
}

/// Pops `pid` from `queue` and switches execution to it. Shared tail used
/// by nearly every strategy once `schedule()` names a winner.
pub(super) fn pop_and_switch(state: &ProcessesState, pid: i32, queue: usize) -> ProcessesState {
    let popped = pop_from_queue(state, queue).expect("schedule() only names non-empty queues");
    switch_to(&popped, pid).expect("schedule() only names ACTIVE processes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::request::{CreateProcessReq, TerminateProcessReq};

    #[test]
    fn every_strategy_schedules_a_solo_process() {
        let create = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 10).unwrap());
        for strategy in [
            ProcessStrategy::Fcfs,
            ProcessStrategy::RoundRobin,
            ProcessStrategy::Sjn,
            ProcessStrategy::Srt,
            ProcessStrategy::Unix,
            ProcessStrategy::WinNt,
            ProcessStrategy::LinuxO1,
        ] {
            let state = ProcessesState::initial();
            let next = strategy.process_request(&create, &state);
            assert_eq!(next.current().map(|p| p.pid), Some(1), "{:?}", strategy);
        }
    }

    #[test]
    fn terminate_unknown_pid_is_a_noop() {
        let state = ProcessesState::initial();
        let req = Request::TerminateProcess(TerminateProcessReq::new(9).unwrap());
        let next = ProcessStrategy::Fcfs.process_request(&req, &state);
        assert_eq!(next, state);
    }

    #[test]
    fn only_winnt_is_marked_preemptive() {
        assert!(ProcessStrategy::WinNt.preemptive());
        assert!(!ProcessStrategy::Unix.preemptive());
        assert!(!ProcessStrategy::RoundRobin.preemptive());
    }
}
