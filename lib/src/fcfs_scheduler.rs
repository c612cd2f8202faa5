//! First-Come, First-Served scheduling.
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use std::cmp::Ordering;

/// Non-preemptive policy that runs processes in arrival order. Ties are
/// broken by pid.
pub struct FcfsScheduler {
    num_cores: usize,
}

impl FcfsScheduler {
    pub fn new(num_cores: usize) -> Self {
        Self { num_cores }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }
}

impl SchedulerBase for FcfsScheduler {
    fn name(&self) -> &str {
        "FCFS"
    }

    fn select_process(
        &mut self,
        _core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        _current_time: f32,
    ) -> Option<ProcessId> {
        ready_queue.iter().copied().min_by(|&a, &b| {
            processes[a]
                .arrival_time()
                .partial_cmp(&processes[b].arrival_time())
                .unwrap_or(Ordering::Equal)
                .then(processes[a].pid().cmp(&processes[b].pid()))
        })
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_process;

    #[test]
    fn test_fcfs_selects_earliest_arrival() {
        let mut scheduler = FcfsScheduler::new(1);
        let processes = vec![
            create_process(0, 4.0, 5.0),
            create_process(1, 1.0, 3.0),
            create_process(2, 2.0, 1.0),
        ];
        let core = Core::new(0);
        let selected = scheduler.select_process(&core, &[0, 1, 2], &processes, 5.0);
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn test_fcfs_ties_broken_by_pid() {
        let mut scheduler = FcfsScheduler::new(1);
        let processes = vec![
            create_process(0, 3.0, 5.0),
            create_process(1, 3.0, 3.0),
            create_process(2, 3.0, 1.0),
        ];
        let core = Core::new(0);
        // Reversed queue order must not matter.
        let selected = scheduler.select_process(&core, &[2, 1, 0], &processes, 5.0);
        assert_eq!(selected, Some(0));
    }

    #[test]
    fn test_fcfs_empty_queue() {
        let mut scheduler = FcfsScheduler::new(1);
        let core = Core::new(0);
        assert_eq!(scheduler.select_process(&core, &[], &[], 0.0), None);
    }

    #[test]
    fn test_fcfs_non_preemptive() {
        let scheduler = FcfsScheduler::new(2);
        assert!(!scheduler.is_preemptive());
        assert_eq!(scheduler.get_time_quantum(), f32::INFINITY);
    }
}
