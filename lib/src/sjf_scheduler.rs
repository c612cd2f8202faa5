//! Shortest Job First scheduling, optionally preemptive (SRTF).
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use std::cmp::Ordering;

const SRTF_TIME_QUANTUM: f32 = 1.0;

/// Selects the process with the shortest remaining time; ties are broken by
/// arrival time, then pid. The preemptive variant (SRTF) preempts the running
/// process whenever a strictly shorter one is waiting.
pub struct SjfScheduler {
    num_cores: usize,
    preemptive: bool,
    name: String,
}

impl SjfScheduler {
    pub fn new(num_cores: usize, preemptive: bool) -> Self {
        let name = if preemptive { "SRTF" } else { "SJF" };
        Self {
            num_cores,
            preemptive,
            name: name.to_string(),
        }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    fn shortest_remaining(ready_queue: &[ProcessId], processes: &[Process]) -> Option<ProcessId> {
        ready_queue.iter().copied().min_by(|&a, &b| {
            let (pa, pb) = (&processes[a], &processes[b]);
            pa.remaining_time()
                .partial_cmp(&pb.remaining_time())
                .unwrap_or(Ordering::Equal)
                .then(
                    pa.arrival_time()
                        .partial_cmp(&pb.arrival_time())
                        .unwrap_or(Ordering::Equal),
                )
                .then(pa.pid().cmp(&pb.pid()))
        })
    }
}

impl SchedulerBase for SjfScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_process(
        &mut self,
        _core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        _current_time: f32,
    ) -> Option<ProcessId> {
        Self::shortest_remaining(ready_queue, processes)
    }

    fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    fn should_preempt(
        &mut self,
        running: ProcessId,
        ready_queue: &[ProcessId],
        processes: &[Process],
        _current_time: f32,
    ) -> bool {
        if !self.preemptive || ready_queue.is_empty() {
            return false;
        }
        match Self::shortest_remaining(ready_queue, processes) {
            Some(shortest) => {
                processes[shortest].remaining_time() < processes[running].remaining_time()
            }
            None => false,
        }
    }

    fn get_time_quantum(&self) -> f32 {
        if self.preemptive {
            SRTF_TIME_QUANTUM
        } else {
            f32::INFINITY
        }
    }

    fn reset(&mut self) {}
}
