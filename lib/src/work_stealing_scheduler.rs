//! Work stealing with per-core local queues.
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_STEAL_ATTEMPTS: usize = 3;
const STEALING_TIME_QUANTUM: f32 = 10.0;

/// Each core keeps a local FIFO queue. Unassigned arrivals wait in a staging
/// queue and are distributed greedily to the emptiest local queue. An idle
/// core with an empty local queue samples a bounded number of random peers
/// and steals from the tail of the fullest sampled queue, provided the victim
/// keeps at least one entry.
pub struct WorkStealingScheduler {
    num_cores: usize,
    steal_attempts: usize,
    core_queues: Vec<VecDeque<ProcessId>>,
    process_core_map: HashMap<ProcessId, usize>,
    staging_queue: VecDeque<ProcessId>,
    rng: StdRng,
}

impl WorkStealingScheduler {
    pub fn new(num_cores: usize) -> Self {
        Self::with_seed(num_cores, 0)
    }

    /// The victim-sampling randomness is seeded so runs stay reproducible.
    pub fn with_seed(num_cores: usize, seed: u64) -> Self {
        Self {
            num_cores,
            steal_attempts: DEFAULT_STEAL_ATTEMPTS,
            core_queues: vec![VecDeque::new(); num_cores],
            process_core_map: HashMap::new(),
            staging_queue: VecDeque::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn get_queue_sizes(&self) -> Vec<usize> {
        self.core_queues.iter().map(|queue| queue.len()).collect()
    }

    pub fn bound_core(&self, pid: ProcessId) -> Option<usize> {
        self.process_core_map.get(&pid).copied()
    }

    /// Stage unseen ready processes, then drain the staging queue one at a
    /// time into whichever local queue is currently smallest (ties go to the
    /// lowest core id).
    fn distribute_new_processes(&mut self, ready_queue: &[ProcessId]) {
        for &pid in ready_queue {
            if !self.process_core_map.contains_key(&pid) && !self.staging_queue.contains(&pid) {
                self.staging_queue.push_back(pid);
            }
        }

        while let Some(pid) = self.staging_queue.pop_front() {
            let target = (0..self.num_cores)
                .min_by_key(|&core_id| (self.core_queues[core_id].len(), core_id))
                .expect("work stealing requires at least one core");
            self.core_queues[target].push_back(pid);
            self.process_core_map.insert(pid, target);
        }
    }

    fn steal_work(&mut self, thief_core_id: usize) -> Option<ProcessId> {
        let mut victims: Vec<usize> = (0..self.num_cores)
            .filter(|&core_id| core_id != thief_core_id)
            .collect();
        if victims.is_empty() {
            return None;
        }
        victims.shuffle(&mut self.rng);
        victims.truncate(self.steal_attempts);

        let mut best_victim = None;
        let mut max_queue_size = 0;
        for victim in victims {
            let queue_size = self.core_queues[victim].len();
            if queue_size > max_queue_size {
                max_queue_size = queue_size;
                best_victim = Some(victim);
            }
        }

        // Only steal if the victim keeps at least one entry.
        let victim = best_victim?;
        if self.core_queues[victim].len() < 2 {
            return None;
        }
        let stolen = self.core_queues[victim].pop_back()?;
        self.process_core_map.insert(stolen, thief_core_id);
        Some(stolen)
    }
}

impl SchedulerBase for WorkStealingScheduler {
    fn name(&self) -> &str {
        "Work Stealing"
    }

    fn select_process(
        &mut self,
        core: &Core,
        ready_queue: &[ProcessId],
        _processes: &[Process],
        _current_time: f32,
    ) -> Option<ProcessId> {
        self.distribute_new_processes(ready_queue);

        if let Some(pid) = self.core_queues[core.core_id].pop_front() {
            return Some(pid);
        }
        self.steal_work(core.core_id)
    }

    fn get_time_quantum(&self) -> f32 {
        STEALING_TIME_QUANTUM
    }

    fn on_process_completion(
        &mut self,
        pid: ProcessId,
        _processes: &[Process],
        _current_time: f32,
    ) {
        self.process_core_map.remove(&pid);
        // Consistency check: the process must not linger in any local queue.
        for queue in self.core_queues.iter_mut() {
            queue.retain(|&queued| queued != pid);
        }
    }

    fn reset(&mut self) {
        self.core_queues = vec![VecDeque::new(); self.num_cores];
        self.process_core_map.clear();
        self.staging_queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_process;

    fn ready_set(n: usize) -> (Vec<Process>, Vec<ProcessId>) {
        let processes = (0..n).map(|i| create_process(i, 0.0, 4.0)).collect();
        let ready = (0..n).collect();
        (processes, ready)
    }

    #[test]
    fn test_work_stealing_distributes_to_emptiest_queue() {
        let mut scheduler = WorkStealingScheduler::new(2);
        let (processes, ready) = ready_set(4);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        // Four processes spread over two cores; core 0 popped one.
        assert_eq!(scheduler.get_queue_sizes(), vec![1, 2]);
        assert_eq!(scheduler.bound_core(0), Some(0));
        assert_eq!(scheduler.bound_core(1), Some(1));
    }

    #[test]
    fn test_work_stealing_local_fifo_order() {
        let mut scheduler = WorkStealingScheduler::new(1);
        let (processes, ready) = ready_set(3);
        let core = Core::new(0);
        assert_eq!(
            scheduler.select_process(&core, &ready, &processes, 0.0),
            Some(0)
        );
        assert_eq!(
            scheduler.select_process(&core, &[1, 2], &processes, 0.0),
            Some(1)
        );
    }

    #[test]
    fn test_work_stealing_steals_from_busy_peer() {
        let mut scheduler = WorkStealingScheduler::new(2);
        let (processes, _) = ready_set(4);
        // All four processes queue on core 1.
        for pid in 0..4 {
            scheduler.core_queues[1].push_back(pid);
            scheduler.process_core_map.insert(pid, 1);
        }
        let core0 = Core::new(0);
        let stolen = scheduler.select_process(&core0, &[0, 1, 2, 3], &processes, 0.0);
        // Steal takes the tail of the victim queue.
        assert_eq!(stolen, Some(3));
        assert_eq!(scheduler.bound_core(3), Some(0));
        assert_eq!(scheduler.get_queue_sizes(), vec![0, 3]);
    }

    #[test]
    fn test_work_stealing_leaves_small_victims_alone() {
        let mut scheduler = WorkStealingScheduler::new(2);
        let (processes, _) = ready_set(1);
        scheduler.core_queues[1].push_back(0);
        scheduler.process_core_map.insert(0, 1);
        let core0 = Core::new(0);
        assert_eq!(scheduler.select_process(&core0, &[0], &processes, 0.0), None);
    }

    #[test]
    fn test_work_stealing_single_core_cannot_steal() {
        let mut scheduler = WorkStealingScheduler::new(1);
        let core = Core::new(0);
        assert_eq!(scheduler.steal_work(core.core_id), None);
    }

    #[test]
    fn test_work_stealing_completion_purges_everywhere() {
        let mut scheduler = WorkStealingScheduler::new(2);
        let (processes, ready) = ready_set(4);
        let core = Core::new(0);
        scheduler.select_process(&core, &ready, &processes, 0.0);
        scheduler.on_process_completion(1, &processes, 4.0);
        assert_eq!(scheduler.bound_core(1), None);
        assert!(!scheduler.core_queues.iter().any(|q| q.contains(&1)));
    }

    #[test]
    fn test_work_stealing_distribution_is_idempotent() {
        let mut scheduler = WorkStealingScheduler::new(2);
        let (_processes, ready) = ready_set(2);
        scheduler.distribute_new_processes(&ready);
        scheduler.distribute_new_processes(&ready);
        let total: usize = scheduler.get_queue_sizes().iter().sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_work_stealing_deterministic_with_seed() {
        let mut first = WorkStealingScheduler::with_seed(4, 7);
        let mut second = WorkStealingScheduler::with_seed(4, 7);
        for pid in 0..6 {
            first.core_queues[1].push_back(pid);
            first.process_core_map.insert(pid, 1);
            second.core_queues[1].push_back(pid);
            second.process_core_map.insert(pid, 1);
        }
        assert_eq!(first.steal_work(0), second.steal_work(0));
    }

    #[test]
    fn test_work_stealing_non_preemptive_with_moderate_quantum() {
        let scheduler = WorkStealingScheduler::new(2);
        assert!(!scheduler.is_preemptive());
        assert_eq!(scheduler.get_time_quantum(), 10.0);
    }
}
