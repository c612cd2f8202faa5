//! Round Robin scheduling with a fixed time quantum.
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_TIME_QUANTUM: f32 = 4.0;

/// Strict FIFO rotation: new arrivals are appended once, quantum expiry moves
/// the process to the tail with a fresh quantum. Reconciling the rotation
/// queue with the ready queue is idempotent: repeated selection without new
/// arrivals neither duplicates nor reorders entries.
pub struct RoundRobinScheduler {
    num_cores: usize,
    time_quantum: f32,
    name: String,
    rr_queue: VecDeque<ProcessId>,
    quantum_remaining: HashMap<ProcessId, f32>,
}

impl RoundRobinScheduler {
    pub fn new(num_cores: usize, time_quantum: f32) -> Self {
        Self {
            num_cores,
            time_quantum,
            name: format!("Round Robin (q={})", time_quantum),
            rr_queue: VecDeque::new(),
            quantum_remaining: HashMap::new(),
        }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    /// Remaining quantum tracked for a process, if any.
    pub fn quantum_remaining(&self, pid: ProcessId) -> Option<f32> {
        self.quantum_remaining.get(&pid).copied()
    }

    pub fn rotation_order(&self) -> impl Iterator<Item = ProcessId> + '_ {
        self.rr_queue.iter().copied()
    }
}

impl SchedulerBase for RoundRobinScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_process(
        &mut self,
        _core: &Core,
        ready_queue: &[ProcessId],
        _processes: &[Process],
        _current_time: f32,
    ) -> Option<ProcessId> {
        // Append ready processes not yet tracked, in queue order.
        for &pid in ready_queue {
            if !self.rr_queue.contains(&pid) {
                self.rr_queue.push_back(pid);
                self.quantum_remaining.insert(pid, self.time_quantum);
            }
        }

        // The front of the rotation may already be running on another core;
        // pick the first entry that is actually waiting.
        self.rr_queue
            .iter()
            .copied()
            .find(|pid| ready_queue.contains(pid))
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn get_time_quantum(&self) -> f32 {
        self.time_quantum
    }

    fn on_process_completion(
        &mut self,
        pid: ProcessId,
        _processes: &[Process],
        _current_time: f32,
    ) {
        if let Some(position) = self.rr_queue.iter().position(|&p| p == pid) {
            self.rr_queue.remove(position);
        }
        self.quantum_remaining.remove(&pid);
    }

    fn rotate_queue(&mut self, pid: ProcessId) {
        if let Some(position) = self.rr_queue.iter().position(|&p| p == pid) {
            self.rr_queue.remove(position);
            self.rr_queue.push_back(pid);
            self.quantum_remaining.insert(pid, self.time_quantum);
        }
    }

    fn reset(&mut self) {
        self.rr_queue.clear();
        self.quantum_remaining.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_process;

    fn ready_set(n: usize) -> (Vec<crate::process::Process>, Vec<ProcessId>) {
        let processes = (0..n).map(|i| create_process(i, 0.0, 4.0)).collect();
        let ready = (0..n).collect();
        (processes, ready)
    }

    #[test]
    fn test_round_robin_fifo_order() {
        let mut scheduler = RoundRobinScheduler::new(1, 4.0);
        let (processes, ready) = ready_set(3);
        let core = Core::new(0);
        assert_eq!(
            scheduler.select_process(&core, &ready, &processes, 0.0),
            Some(0)
        );
        assert_eq!(scheduler.rotation_order().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_round_robin_selection_is_idempotent() {
        let mut scheduler = RoundRobinScheduler::new(1, 4.0);
        let (processes, ready) = ready_set(3);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        assert_eq!(scheduler.rotation_order().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_round_robin_skips_running_front() {
        let mut scheduler = RoundRobinScheduler::new(2, 4.0);
        let (processes, ready) = ready_set(3);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        // Process 0 was dispatched and removed from the ready queue.
        let selected = scheduler.select_process(&core, &[1, 2], &processes, 0.0);
        assert_eq!(selected, Some(1));
    }

    #[test]
    fn test_round_robin_rotate_queue_resets_quantum() {
        let mut scheduler = RoundRobinScheduler::new(1, 2.0);
        let (processes, ready) = ready_set(2);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        scheduler.rotate_queue(0);
        assert_eq!(scheduler.rotation_order().collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(scheduler.quantum_remaining(0), Some(2.0));
    }

    #[test]
    fn test_round_robin_completion_purges_process() {
        let mut scheduler = RoundRobinScheduler::new(1, 4.0);
        let (processes, ready) = ready_set(2);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        scheduler.on_process_completion(0, &processes, 4.0);
        assert_eq!(scheduler.rotation_order().collect::<Vec<_>>(), vec![1]);
        assert_eq!(scheduler.quantum_remaining(0), None);
    }

    #[test]
    fn test_round_robin_is_preemptive_with_quantum() {
        let scheduler = RoundRobinScheduler::new(1, 4.0);
        assert!(scheduler.is_preemptive());
        assert_eq!(scheduler.get_time_quantum(), 4.0);
        assert_eq!(scheduler.name(), "Round Robin (q=4)");
    }

    #[test]
    fn test_round_robin_reset() {
        let mut scheduler = RoundRobinScheduler::new(1, 4.0);
        let (processes, ready) = ready_set(2);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        scheduler.reset();
        assert_eq!(scheduler.rotation_order().count(), 0);
        assert_eq!(scheduler.quantum_remaining(0), None);
    }
}
