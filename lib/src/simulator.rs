//! The discrete-time multicore scheduling engine.
use crate::adaptive_scheduler::AdaptiveReport;
use crate::core::Core;
use crate::error::SimulatorError;
use crate::log::SimulationLog;
use crate::metrics::{MetricsCollector, PerformanceMetrics};
use crate::process::{Process, ProcessId};
use crate::scheduler::SchedulerBase;
use crate::workload::{generate_workload, WorkloadConfig};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;

/// Owns the cores, the process arena, the canonical ready queue and the
/// active policy, and drives the time-stepped dispatch loop.
///
/// Each step admits arrivals, assigns ready processes to idle cores in
/// core-id order, applies preemption, executes up to the policy's time
/// quantum, and advances the clock by the minimum execution observed, or
/// jumps straight to the next arrival when the whole system is idle.
pub struct MulticoreSchedulerSimulator {
    num_cores: usize,
    cores: Vec<Core>,
    processes: Vec<Process>,
    ready_queue: Vec<ProcessId>,
    completed: Vec<ProcessId>,
    scheduler: Option<Box<dyn SchedulerBase>>,
    current_time: f32,
    total_dispatches: u32,
    metrics: Option<PerformanceMetrics>,
}

impl MulticoreSchedulerSimulator {
    pub fn new(num_cores: usize) -> Self {
        Self {
            num_cores,
            cores: (0..num_cores).map(Core::new).collect(),
            processes: Vec::new(),
            ready_queue: Vec::new(),
            completed: Vec::new(),
            scheduler: None,
            current_time: 0.0,
            total_dispatches: 0,
            metrics: None,
        }
    }

    pub fn set_scheduler(&mut self, scheduler: Box<dyn SchedulerBase>) {
        info!("Scheduler set to: {}", scheduler.name());
        self.scheduler = Some(scheduler);
    }

    /// Append an externally constructed process and return its arena id.
    pub fn add_process(&mut self, process: Process) -> ProcessId {
        self.processes.push(process);
        self.processes.len() - 1
    }

    /// Replace the workload with freshly generated processes.
    pub fn generate_processes(&mut self, config: &WorkloadConfig, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.processes = generate_workload(config, &mut rng);
        info!(
            "Generated {} processes (seed {})",
            self.processes.len(),
            seed
        );
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn total_dispatches(&self) -> u32 {
        self.total_dispatches
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn completed_processes(&self) -> Vec<&Process> {
        self.completed.iter().map(|&pid| &self.processes[pid]).collect()
    }

    pub fn get_metrics(&self) -> Option<&PerformanceMetrics> {
        self.metrics.as_ref()
    }

    /// Name of the policy currently making decisions: for the adaptive
    /// meta-policy this is the delegate, otherwise the bound policy itself.
    pub fn current_algorithm_name(&self) -> Option<String> {
        self.scheduler.as_ref().map(|scheduler| {
            scheduler
                .adaptive_report()
                .map(|report| report.current_algorithm)
                .unwrap_or_else(|| scheduler.name().to_string())
        })
    }

    pub fn adaptive_report(&self) -> Option<AdaptiveReport> {
        self.scheduler.as_ref().and_then(|s| s.adaptive_report())
    }

    /// Run-log snapshot for external reporting. Available once a run has
    /// produced metrics.
    pub fn simulation_log(&self) -> Option<SimulationLog> {
        self.metrics
            .as_ref()
            .map(|metrics| SimulationLog::new(&self.processes, &self.cores, metrics))
    }

    /// Run the simulation until every process completes, or until `max_time`
    /// is reached (a normal termination path, not an error).
    pub fn run_simulation(
        &mut self,
        max_time: Option<f32>,
    ) -> Result<PerformanceMetrics, SimulatorError> {
        let mut scheduler = self.scheduler.take().ok_or(SimulatorError::NoSchedulerSet)?;
        if self.processes.is_empty() {
            self.scheduler = Some(scheduler);
            return Err(SimulatorError::NoProcesses);
        }

        self.reset_run(scheduler.as_mut());

        // Arena indices stay stable; arrivals are walked through a sorted
        // index list instead of reordering the processes themselves.
        let mut arrival_order: Vec<ProcessId> = (0..self.processes.len()).collect();
        arrival_order.sort_by(|&a, &b| {
            self.processes[a]
                .arrival_time()
                .partial_cmp(&self.processes[b].arrival_time())
                .unwrap_or(Ordering::Equal)
                .then(self.processes[a].pid().cmp(&self.processes[b].pid()))
        });
        let mut next_arrival = 0;

        loop {
            if let Some(bound) = max_time {
                if self.current_time >= bound {
                    break;
                }
            }
            if self.completed.len() >= self.processes.len() {
                break;
            }

            // Admit every process whose arrival time has been reached.
            while next_arrival < arrival_order.len() {
                let pid = arrival_order[next_arrival];
                if self.processes[pid].arrival_time() > self.current_time {
                    break;
                }
                self.processes[pid].set_ready();
                self.ready_queue.push(pid);
                scheduler.on_process_arrival(pid, &self.processes, self.current_time);
                next_arrival += 1;
            }

            self.assign_processes_to_cores(scheduler.as_mut());
            let min_time_slice = self.execute_all_cores(scheduler.as_mut());

            if min_time_slice.is_finite() && min_time_slice > 0.0 {
                self.current_time += min_time_slice;
            } else {
                let system_idle =
                    self.ready_queue.is_empty() && self.cores.iter().all(|core| core.is_idle());
                if next_arrival < arrival_order.len() {
                    if system_idle {
                        // Never stall on an idle system with pending arrivals.
                        self.current_time =
                            self.processes[arrival_order[next_arrival]].arrival_time();
                    }
                } else if system_idle {
                    break;
                }
            }
        }

        let metrics = MetricsCollector::calculate_metrics(
            &self.processes,
            &self.cores,
            self.current_time,
            scheduler.name(),
            self.total_dispatches,
        );
        self.scheduler = Some(scheduler);
        self.metrics = Some(metrics.clone());
        Ok(metrics)
    }

    /// Ask the policy for a process for every idle core, in core-id order.
    /// The engine performs the removal from the ready queue; a selection that
    /// is not actually waiting is refused.
    fn assign_processes_to_cores(&mut self, scheduler: &mut dyn SchedulerBase) {
        for core_index in 0..self.num_cores {
            if !self.cores[core_index].is_idle() || self.ready_queue.is_empty() {
                continue;
            }
            let selected = scheduler.select_process(
                &self.cores[core_index],
                &self.ready_queue,
                &self.processes,
                self.current_time,
            );
            if let Some(pid) = selected {
                match self.ready_queue.iter().position(|&queued| queued == pid) {
                    Some(position) => {
                        self.ready_queue.remove(position);
                        self.cores[core_index].assign_process(pid, self.current_time);
                        self.total_dispatches += 1;
                    }
                    None => {
                        warn!(
                            "scheduler selected process {} which is not in the ready queue",
                            pid
                        );
                    }
                }
            }
        }
    }

    /// Execute every busy core for up to the policy's quantum and return the
    /// minimum execution time observed, or infinity if nothing executed.
    fn execute_all_cores(&mut self, scheduler: &mut dyn SchedulerBase) -> f32 {
        let time_quantum = scheduler.get_time_quantum();
        let mut min_time_slice = f32::INFINITY;

        for core_index in 0..self.num_cores {
            let running = match self.cores[core_index].current_process {
                Some(pid) => pid,
                None => continue,
            };

            if scheduler.should_preempt(
                running,
                &self.ready_queue,
                &self.processes,
                self.current_time,
            ) {
                if let Some(pid) = self.cores[core_index].preempt_current_process(self.current_time)
                {
                    self.ready_queue.push(pid);
                }
                continue;
            }

            let core = &mut self.cores[core_index];
            let process = &mut self.processes[running];
            let actual_time = match core.execute_current_process(process, time_quantum, self.current_time)
            {
                Some(actual_time) => actual_time,
                None => continue,
            };
            min_time_slice = min_time_slice.min(actual_time);

            if self.processes[running].is_completed() {
                self.completed.push(running);
                scheduler.on_process_completion(
                    running,
                    &self.processes,
                    self.current_time + actual_time,
                );
            } else if scheduler.is_preemptive() {
                if let Some(pid) =
                    self.cores[core_index].preempt_current_process(self.current_time + actual_time)
                {
                    self.ready_queue.push(pid);
                    // Round Robin preserves FIFO order with a fresh quantum.
                    scheduler.rotate_queue(pid);
                }
            }
        }

        min_time_slice
    }

    fn reset_run(&mut self, scheduler: &mut dyn SchedulerBase) {
        self.current_time = 0.0;
        self.ready_queue.clear();
        self.completed.clear();
        self.total_dispatches = 0;
        self.metrics = None;
        for core in self.cores.iter_mut() {
            core.reset();
        }
        for process in self.processes.iter_mut() {
            process.reset();
        }
        scheduler.reset();
    }
}
