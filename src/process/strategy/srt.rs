//! Shortest Remaining Time: same pipeline as SJN, but re-sorts by
//! remaining time (`work_time - timer`) rather than the original estimate,
//! so a process can jump the queue after a partial run.

use crate::process::request::Request;
use crate::process::strategy::sjn;
use crate::process::types::ProcessesState;

fn sort_queue(state: &ProcessesState) -> ProcessesState {
    sjn::sort_queue_by(state, |p| p.work_time - p.timer)
}

pub(super) fn process_request(request: &Request, state: &ProcessesState) -> ProcessesState {
    sjn::process_request_with_sort(request, state, sort_queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::request::CreateProcessReq;

    #[test]
    fn shortest_remaining_time_wins_over_shortest_total() {
        let state = ProcessesState::initial();
        let first = Request::CreateProcess(CreateProcessReq::new(1, -1, 0, 0, 0, 100).unwrap());
        let state = process_request(&first, &state);

        // pid 2 has less total work (10) but pid 3, already partway through
        // a longer job, has less *remaining* work (15 - 10 = 5).
        let a = Request::CreateProcess(CreateProcessReq::new(2, -1, 0, 0, 0, 10).unwrap());
        let state = process_request(&a, &state);
        let b = Request::CreateProcess(CreateProcessReq::new(3, -1, 0, 0, 10, 15).unwrap());
        let next = process_request(&b, &state);

        assert_eq!(next.queues[0], vec![3, 2]);
    }
}
