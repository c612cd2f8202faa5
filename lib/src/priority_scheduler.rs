//! Priority scheduling with optional aging.
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_AGING_FACTOR: f32 = 0.1;
const PREEMPTIVE_TIME_QUANTUM: f32 = 1.0;

/// Lower priority value means more urgent. With aging enabled, the effective
/// priority of a waiting process decreases linearly with its wait time,
/// floored at zero, so long waiters cannot starve.
pub struct PriorityScheduler {
    num_cores: usize,
    preemptive: bool,
    aging: bool,
    aging_factor: f32,
    name: String,
    wait_started: HashMap<ProcessId, f32>,
}

impl PriorityScheduler {
    pub fn new(num_cores: usize, preemptive: bool, aging: bool) -> Self {
        let name = if preemptive {
            "Priority (Preemptive)"
        } else {
            "Priority (Non-preemptive)"
        };
        Self {
            num_cores,
            preemptive,
            aging,
            aging_factor: DEFAULT_AGING_FACTOR,
            name: name.to_string(),
            wait_started: HashMap::new(),
        }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn effective_priority(&mut self, pid: ProcessId, processes: &[Process], current_time: f32) -> f32 {
        let process = &processes[pid];
        if !self.aging {
            return process.priority() as f32;
        }
        let wait_start = *self
            .wait_started
            .entry(pid)
            .or_insert_with(|| process.arrival_time());
        let wait_time = current_time - wait_start;
        (process.priority() as f32 - wait_time * self.aging_factor).max(0.0)
    }

    fn apply_aging(&mut self, ready_queue: &[ProcessId], current_time: f32) {
        for &pid in ready_queue {
            self.wait_started.entry(pid).or_insert(current_time);
        }
    }

    fn most_urgent(
        &mut self,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> Option<ProcessId> {
        let keyed: Vec<(ProcessId, f32)> = ready_queue
            .iter()
            .map(|&pid| (pid, self.effective_priority(pid, processes, current_time)))
            .collect();
        keyed
            .into_iter()
            .min_by(|&(a, ea), &(b, eb)| {
                let (pa, pb) = (&processes[a], &processes[b]);
                ea.partial_cmp(&eb)
                    .unwrap_or(Ordering::Equal)
                    .then(
                        pa.arrival_time()
                            .partial_cmp(&pb.arrival_time())
                            .unwrap_or(Ordering::Equal),
                    )
                    .then(pa.pid().cmp(&pb.pid()))
            })
            .map(|(pid, _)| pid)
    }
}

impl SchedulerBase for PriorityScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_process(
        &mut self,
        _core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> Option<ProcessId> {
        if ready_queue.is_empty() {
            return None;
        }
        if self.aging {
            self.apply_aging(ready_queue, current_time);
        }
        self.most_urgent(ready_queue, processes, current_time)
    }

    fn is_preemptive(&self) -> bool {
        self.preemptive
    }

    fn should_preempt(
        &mut self,
        running: ProcessId,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> bool {
        if !self.preemptive || ready_queue.is_empty() {
            return false;
        }
        let running_priority = self.effective_priority(running, processes, current_time);
        match self.most_urgent(ready_queue, processes, current_time) {
            Some(best) => {
                self.effective_priority(best, processes, current_time) < running_priority
            }
            None => false,
        }
    }

    fn get_time_quantum(&self) -> f32 {
        if self.preemptive {
            PREEMPTIVE_TIME_QUANTUM
        } else {
            f32::INFINITY
        }
    }

    fn on_process_arrival(&mut self, pid: ProcessId, _processes: &[Process], current_time: f32) {
        self.wait_started.insert(pid, current_time);
    }

    fn on_process_completion(
        &mut self,
        pid: ProcessId,
        _processes: &[Process],
        _current_time: f32,
    ) {
        self.wait_started.remove(&pid);
    }

    fn reset(&mut self) {
        self.wait_started.clear();
    }
}
