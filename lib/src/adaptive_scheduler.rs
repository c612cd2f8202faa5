//! Adaptive meta-policy that delegates to whichever concrete policy fits the
//! observed system load and workload composition.
use crate::core::Core;
use crate::fcfs_scheduler::FcfsScheduler;
use crate::load_balancing_scheduler::LoadBalancingScheduler;
use crate::priority_scheduler::PriorityScheduler;
use crate::process::{Process, ProcessId, ProcessType};
use crate::round_robin_scheduler::{RoundRobinScheduler, DEFAULT_TIME_QUANTUM};
use crate::scheduler::SchedulerBase;
use crate::sjf_scheduler::SjfScheduler;
use crate::work_stealing_scheduler::WorkStealingScheduler;
use log::info;
use serde_derive::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub const DEFAULT_ADAPTATION_INTERVAL: f32 = 50.0;
const RECENT_TURNAROUND_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    LowLoad,
    MediumLoad,
    HighLoad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadCharacteristic {
    CpuIntensive,
    IoIntensive,
    ShortJobs,
    LongJobs,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PolicyName {
    Fcfs,
    Sjf,
    RoundRobin,
    Priority,
    LoadBalancing,
    WorkStealing,
}

impl PolicyName {
    pub const ALL: [PolicyName; 6] = [
        PolicyName::Fcfs,
        PolicyName::Sjf,
        PolicyName::RoundRobin,
        PolicyName::Priority,
        PolicyName::LoadBalancing,
        PolicyName::WorkStealing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyName::Fcfs => "fcfs",
            PolicyName::Sjf => "sjf",
            PolicyName::RoundRobin => "round_robin",
            PolicyName::Priority => "priority",
            PolicyName::LoadBalancing => "load_balancing",
            PolicyName::WorkStealing => "work_stealing",
        }
    }
}

/// Reporting snapshot for external rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptiveReport {
    pub current_algorithm: String,
    pub usage_percentages: BTreeMap<String, f32>,
    pub average_turnaround_times: BTreeMap<String, f32>,
}

/// Holds one live instance of each concrete policy and forwards every call to
/// the current one. Switching abandons the old policy's in-flight bookkeeping
/// and starts fresh on the new one; a configurable hook observes switches so
/// callers can layer their own state carry-over.
pub struct AdaptiveScheduler {
    num_cores: usize,
    adaptation_interval: f32,
    last_adaptation_time: f32,
    fcfs: FcfsScheduler,
    sjf: SjfScheduler,
    round_robin: RoundRobinScheduler,
    priority: PriorityScheduler,
    load_balancing: LoadBalancingScheduler,
    work_stealing: WorkStealingScheduler,
    current: PolicyName,
    usage_counts: BTreeMap<PolicyName, u32>,
    performance_log: BTreeMap<PolicyName, Vec<f32>>,
    recent_turnaround_times: VecDeque<f32>,
    adaptation_history: Vec<(SystemState, WorkloadCharacteristic)>,
    switch_hook: Option<Box<dyn FnMut(PolicyName, PolicyName)>>,
}

impl AdaptiveScheduler {
    pub fn new(num_cores: usize) -> Self {
        Self::with_interval(num_cores, DEFAULT_ADAPTATION_INTERVAL)
    }

    pub fn with_interval(num_cores: usize, adaptation_interval: f32) -> Self {
        Self {
            num_cores,
            adaptation_interval,
            last_adaptation_time: 0.0,
            fcfs: FcfsScheduler::new(num_cores),
            sjf: SjfScheduler::new(num_cores, true),
            round_robin: RoundRobinScheduler::new(num_cores, DEFAULT_TIME_QUANTUM),
            priority: PriorityScheduler::new(num_cores, true, true),
            load_balancing: LoadBalancingScheduler::new(num_cores),
            work_stealing: WorkStealingScheduler::new(num_cores),
            current: PolicyName::LoadBalancing,
            usage_counts: BTreeMap::new(),
            performance_log: BTreeMap::new(),
            recent_turnaround_times: VecDeque::new(),
            adaptation_history: Vec::new(),
            switch_hook: None,
        }
    }

    /// Observe policy switches. State transfer itself stays a no-op.
    pub fn set_switch_hook(&mut self, hook: impl FnMut(PolicyName, PolicyName) + 'static) {
        self.switch_hook = Some(Box::new(hook));
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn current_algorithm(&self) -> PolicyName {
        self.current
    }

    pub fn adaptation_history(&self) -> &[(SystemState, WorkloadCharacteristic)] {
        &self.adaptation_history
    }

    pub fn recent_turnaround_times(&self) -> impl Iterator<Item = f32> + '_ {
        self.recent_turnaround_times.iter().copied()
    }

    /// Classify system load from the ready-queue length per core.
    pub fn classify_system_state(queue_length: usize, num_cores: usize) -> SystemState {
        let load_ratio = queue_length as f32 / num_cores as f32;
        if load_ratio < 1.0 {
            SystemState::LowLoad
        } else if load_ratio < 3.0 {
            SystemState::MediumLoad
        } else {
            SystemState::HighLoad
        }
    }

    /// Classify the ready queue's composition. An empty queue reads as mixed.
    pub fn classify_workload(
        ready_queue: &[ProcessId],
        processes: &[Process],
    ) -> WorkloadCharacteristic {
        if ready_queue.is_empty() {
            return WorkloadCharacteristic::Mixed;
        }
        let len = ready_queue.len() as f32;
        let cpu_bound = ready_queue
            .iter()
            .filter(|&&pid| processes[pid].process_type() == ProcessType::CpuBound)
            .count() as f32;
        let io_bound = ready_queue
            .iter()
            .filter(|&&pid| processes[pid].process_type() == ProcessType::IoBound)
            .count() as f32;
        let average_remaining = ready_queue
            .iter()
            .map(|&pid| processes[pid].remaining_time())
            .sum::<f32>()
            / len;

        if cpu_bound / len > 0.6 {
            WorkloadCharacteristic::CpuIntensive
        } else if io_bound / len > 0.6 {
            WorkloadCharacteristic::IoIntensive
        } else if average_remaining < 10.0 {
            WorkloadCharacteristic::ShortJobs
        } else if average_remaining > 50.0 {
            WorkloadCharacteristic::LongJobs
        } else {
            WorkloadCharacteristic::Mixed
        }
    }

    /// The fixed decision table. Pure: identical inputs always pick the same
    /// policy.
    pub fn select_algorithm(
        system_state: SystemState,
        workload: WorkloadCharacteristic,
    ) -> PolicyName {
        match system_state {
            SystemState::HighLoad => match workload {
                WorkloadCharacteristic::LongJobs => PolicyName::RoundRobin,
                _ => PolicyName::LoadBalancing,
            },
            SystemState::MediumLoad => match workload {
                WorkloadCharacteristic::ShortJobs => PolicyName::Sjf,
                WorkloadCharacteristic::IoIntensive => PolicyName::Priority,
                _ => PolicyName::WorkStealing,
            },
            SystemState::LowLoad => match workload {
                WorkloadCharacteristic::ShortJobs => PolicyName::Sjf,
                WorkloadCharacteristic::Mixed => PolicyName::WorkStealing,
                _ => PolicyName::Fcfs,
            },
        }
    }

    pub fn get_algorithm_usage_stats(&self) -> BTreeMap<String, f32> {
        let total: u32 = self.usage_counts.values().sum();
        if total == 0 {
            return PolicyName::ALL
                .iter()
                .map(|name| (name.as_str().to_string(), 0.0))
                .collect();
        }
        self.usage_counts
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(name, &count)| {
                (
                    name.as_str().to_string(),
                    count as f32 / total as f32 * 100.0,
                )
            })
            .collect()
    }

    pub fn get_algorithm_performance_stats(&self) -> BTreeMap<String, f32> {
        PolicyName::ALL
            .iter()
            .map(|name| {
                let average = match self.performance_log.get(name) {
                    Some(turnarounds) if !turnarounds.is_empty() => {
                        turnarounds.iter().sum::<f32>() / turnarounds.len() as f32
                    }
                    _ => 0.0,
                };
                (name.as_str().to_string(), average)
            })
            .collect()
    }

    fn current_scheduler_mut(&mut self) -> &mut dyn SchedulerBase {
        match self.current {
            PolicyName::Fcfs => &mut self.fcfs,
            PolicyName::Sjf => &mut self.sjf,
            PolicyName::RoundRobin => &mut self.round_robin,
            PolicyName::Priority => &mut self.priority,
            PolicyName::LoadBalancing => &mut self.load_balancing,
            PolicyName::WorkStealing => &mut self.work_stealing,
        }
    }

    fn current_scheduler(&self) -> &dyn SchedulerBase {
        match self.current {
            PolicyName::Fcfs => &self.fcfs,
            PolicyName::Sjf => &self.sjf,
            PolicyName::RoundRobin => &self.round_robin,
            PolicyName::Priority => &self.priority,
            PolicyName::LoadBalancing => &self.load_balancing,
            PolicyName::WorkStealing => &self.work_stealing,
        }
    }

    fn adapt(&mut self, ready_queue: &[ProcessId], processes: &[Process], current_time: f32) {
        let system_state = Self::classify_system_state(ready_queue.len(), self.num_cores);
        let workload = Self::classify_workload(ready_queue, processes);
        self.adaptation_history.push((system_state, workload));

        let chosen = Self::select_algorithm(system_state, workload);
        if chosen != self.current {
            let old = self.current;
            self.current = chosen;
            if let Some(hook) = self.switch_hook.as_mut() {
                hook(old, chosen);
            }
            info!(
                "adaptive: switched from {} to {} at time {}",
                old.as_str(),
                chosen.as_str(),
                current_time
            );
        }
        *self.usage_counts.entry(self.current).or_insert(0) += 1;
    }
}

impl SchedulerBase for AdaptiveScheduler {
    fn name(&self) -> &str {
        "Adaptive Scheduler"
    }

    fn select_process(
        &mut self,
        core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> Option<ProcessId> {
        if current_time - self.last_adaptation_time >= self.adaptation_interval {
            self.adapt(ready_queue, processes, current_time);
            self.last_adaptation_time = current_time;
        }
        self.current_scheduler_mut()
            .select_process(core, ready_queue, processes, current_time)
    }

    fn is_preemptive(&self) -> bool {
        self.current_scheduler().is_preemptive()
    }

    fn should_preempt(
        &mut self,
        running: ProcessId,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> bool {
        self.current_scheduler_mut()
            .should_preempt(running, ready_queue, processes, current_time)
    }

    fn get_time_quantum(&self) -> f32 {
        self.current_scheduler().get_time_quantum()
    }

    fn on_process_arrival(&mut self, pid: ProcessId, processes: &[Process], current_time: f32) {
        self.current_scheduler_mut()
            .on_process_arrival(pid, processes, current_time);
    }

    fn on_process_completion(&mut self, pid: ProcessId, processes: &[Process], current_time: f32) {
        let turnaround_time = processes[pid].turnaround_time();
        self.recent_turnaround_times.push_back(turnaround_time);
        if self.recent_turnaround_times.len() > RECENT_TURNAROUND_WINDOW {
            self.recent_turnaround_times.pop_front();
        }
        self.performance_log
            .entry(self.current)
            .or_default()
            .push(turnaround_time);
        self.current_scheduler_mut()
            .on_process_completion(pid, processes, current_time);
    }

    fn rotate_queue(&mut self, pid: ProcessId) {
        self.current_scheduler_mut().rotate_queue(pid);
    }

    fn adaptive_report(&self) -> Option<AdaptiveReport> {
        Some(AdaptiveReport {
            current_algorithm: self.current.as_str().to_string(),
            usage_percentages: self.get_algorithm_usage_stats(),
            average_turnaround_times: self.get_algorithm_performance_stats(),
        })
    }

    fn reset(&mut self) {
        self.fcfs.reset();
        self.sjf.reset();
        self.round_robin.reset();
        self.priority.reset();
        self.load_balancing.reset();
        self.work_stealing.reset();
        self.current = PolicyName::LoadBalancing;
        self.last_adaptation_time = 0.0;
        self.usage_counts.clear();
        self.performance_log.clear();
        self.recent_turnaround_times.clear();
        self.adaptation_history.clear();
    }
}
