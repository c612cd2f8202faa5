//! Load balancing across cores by binding processes to the least loaded core
//! and stealing from overloaded peers.
use crate::core::Core;
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const DEFAULT_REBALANCE_THRESHOLD: f32 = 0.3;
const REBALANCE_TIME_QUANTUM: f32 = 5.0;

/// Binds each ready process to a core and keeps per-core load totals (sum of
/// remaining time of the processes bound to the core). A core with nothing
/// bound to it claims the shortest unassigned process; if everything is bound
/// elsewhere, it steals the candidate whose binding exceeds its own load by
/// more than the threshold fraction of the victim's load.
pub struct LoadBalancingScheduler {
    num_cores: usize,
    rebalance_threshold: f32,
    core_loads: HashMap<usize, f32>,
    process_assignments: HashMap<ProcessId, usize>,
}

impl LoadBalancingScheduler {
    pub fn new(num_cores: usize) -> Self {
        Self::with_threshold(num_cores, DEFAULT_REBALANCE_THRESHOLD)
    }

    pub fn with_threshold(num_cores: usize, rebalance_threshold: f32) -> Self {
        Self {
            num_cores,
            rebalance_threshold,
            core_loads: HashMap::new(),
            process_assignments: HashMap::new(),
        }
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn get_core_loads(&self) -> &HashMap<usize, f32> {
        &self.core_loads
    }

    pub fn assigned_core(&self, pid: ProcessId) -> Option<usize> {
        self.process_assignments.get(&pid).copied()
    }

    /// How well balanced the bound loads are: 1 minus the coefficient of
    /// variation, floored at zero.
    pub fn get_load_balance_score(&self) -> f32 {
        if self.core_loads.is_empty() {
            return 1.0;
        }
        let loads: Vec<f32> = self.core_loads.values().copied().collect();
        let average = loads.iter().sum::<f32>() / loads.len() as f32;
        if average == 0.0 {
            return 1.0;
        }
        let variance =
            loads.iter().map(|load| (load - average).powi(2)).sum::<f32>() / loads.len() as f32;
        let coefficient_of_variation = variance.sqrt() / average;
        (1.0 - coefficient_of_variation).max(0.0)
    }

    fn shortest_of(
        candidates: &[ProcessId],
        processes: &[Process],
    ) -> Option<ProcessId> {
        candidates.iter().copied().min_by(|&a, &b| {
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

    /// Steal a process bound to a heavily loaded core, rebinding it to the
    /// requesting core and transferring its remaining time between the load
    /// totals.
    fn try_rebalance(
        &mut self,
        requesting_core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
    ) -> Option<ProcessId> {
        let requesting_load = requesting_core.get_load();

        let mut best: Option<(ProcessId, f32)> = None;
        for &pid in ready_queue {
            let victim = match self.process_assignments.get(&pid) {
                Some(&core_id) => core_id,
                None => continue,
            };
            let victim_load = self.core_loads.get(&victim).copied().unwrap_or(0.0);
            let load_difference = victim_load - requesting_load;
            if load_difference > self.rebalance_threshold * victim_load
                && best.map_or(true, |(_, difference)| load_difference > difference)
            {
                best = Some((pid, load_difference));
            }
        }

        let (stolen, _) = best?;
        let remaining = processes[stolen].remaining_time();
        let old_core = self.process_assignments[&stolen];
        let old_load = self.core_loads.get(&old_core).copied().unwrap_or(0.0);
        self.core_loads.insert(old_core, (old_load - remaining).max(0.0));
        *self
            .core_loads
            .entry(requesting_core.core_id)
            .or_insert(0.0) += remaining;
        self.process_assignments.insert(stolen, requesting_core.core_id);
        Some(stolen)
    }
}

impl SchedulerBase for LoadBalancingScheduler {
    fn name(&self) -> &str {
        "Load Balancing"
    }

    fn select_process(
        &mut self,
        core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        _current_time: f32,
    ) -> Option<ProcessId> {
        if ready_queue.is_empty() {
            return None;
        }

        // Processes already bound to this core come first.
        let assigned: Vec<ProcessId> = ready_queue
            .iter()
            .copied()
            .filter(|pid| self.process_assignments.get(pid) == Some(&core.core_id))
            .collect();
        if let Some(pid) = Self::shortest_of(&assigned, processes) {
            return Some(pid);
        }

        // Claim the shortest unassigned process and bind it here.
        let unassigned: Vec<ProcessId> = ready_queue
            .iter()
            .copied()
            .filter(|pid| !self.process_assignments.contains_key(pid))
            .collect();
        if let Some(pid) = Self::shortest_of(&unassigned, processes) {
            self.process_assignments.insert(pid, core.core_id);
            *self.core_loads.entry(core.core_id).or_insert(0.0) +=
                processes[pid].remaining_time();
            return Some(pid);
        }

        self.try_rebalance(core, ready_queue, processes)
    }

    fn is_preemptive(&self) -> bool {
        // Preemption here means rebalance opportunities at quantum expiry,
        // not single-process comparisons.
        true
    }

    fn get_time_quantum(&self) -> f32 {
        REBALANCE_TIME_QUANTUM
    }

    fn on_process_completion(&mut self, pid: ProcessId, processes: &[Process], _current_time: f32) {
        if let Some(core_id) = self.process_assignments.remove(&pid) {
            let load = self.core_loads.get(&core_id).copied().unwrap_or(0.0);
            self.core_loads
                .insert(core_id, (load - processes[pid].burst_time()).max(0.0));
        }
    }

    fn reset(&mut self) {
        self.core_loads.clear();
        self.process_assignments.clear();
    }
}
