//! This module contains the definition of the process entity and its lifecycle states.
use getset::CopyGetters;
use serde_derive::{Deserialize, Serialize};

/// Index of a process in the simulator's process arena.
pub type ProcessId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    New,
    Ready,
    Running,
    /// Reserved for future I/O modeling. The engine never enters this state.
    Waiting,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    CpuBound,
    IoBound,
    Mixed,
}

impl ProcessType {
    /// CPU intensity factor in [0.0, 1.0]. Higher values mean more CPU-bound.
    pub fn cpu_intensity(&self) -> f32 {
        match self {
            ProcessType::CpuBound => 0.9,
            ProcessType::Mixed => 0.5,
            ProcessType::IoBound => 0.2,
        }
    }
}

/// A schedulable unit of work.
///
/// The immutable inputs (arrival time, burst time, priority, process type,
/// affinity hint) are fixed at construction. The timing state is mutated
/// exclusively by `execute` and `reset`; remaining time is monotonically
/// non-increasing and never negative.
#[derive(Debug, Clone, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Process {
    pid: usize,
    arrival_time: f32,
    burst_time: f32,
    priority: i32,
    process_type: ProcessType,
    core_affinity: Option<usize>,
    remaining_time: f32,
    state: ProcessState,
    start_time: Option<f32>,
    completion_time: Option<f32>,
    last_executed_time: Option<f32>,
    waiting_time: f32,
    turnaround_time: f32,
    response_time: f32,
    executed_on_core: Option<usize>,
    context_switches: u32,
}

impl Process {
    pub fn new(
        pid: usize,
        arrival_time: f32,
        burst_time: f32,
        priority: i32,
        process_type: ProcessType,
    ) -> Self {
        Self {
            pid,
            arrival_time,
            burst_time,
            priority,
            process_type,
            core_affinity: None,
            remaining_time: burst_time,
            state: ProcessState::New,
            start_time: None,
            completion_time: None,
            last_executed_time: None,
            waiting_time: 0.0,
            turnaround_time: 0.0,
            response_time: 0.0,
            executed_on_core: None,
            context_switches: 0,
        }
    }

    /// Attach a preferred-core hint. No shipped policy consumes it yet.
    pub fn with_core_affinity(mut self, core_id: usize) -> Self {
        self.core_affinity = Some(core_id);
        self
    }

    /// Execute the process for up to `time_slice` starting at `current_time`
    /// on core `core_id`, and return the time actually executed.
    ///
    /// On the first execution the start time and response time are recorded.
    /// Resuming on a different core than last time counts a context switch.
    /// Reaching zero remaining time transitions to `Terminated` and fills the
    /// completion/turnaround/waiting fields; otherwise the process returns to
    /// `Ready` and the caller decides whether to re-enqueue it.
    pub fn execute(&mut self, time_slice: f32, current_time: f32, core_id: usize) -> f32 {
        if matches!(self.state, ProcessState::New | ProcessState::Ready) {
            if self.start_time.is_none() {
                self.start_time = Some(current_time);
                self.response_time = current_time - self.arrival_time;
            }
            self.state = ProcessState::Running;
        }

        if let Some(previous_core) = self.executed_on_core {
            if previous_core != core_id {
                self.context_switches += 1;
            }
        }
        self.executed_on_core = Some(core_id);

        let actual_time = time_slice.min(self.remaining_time);
        self.remaining_time -= actual_time;
        self.last_executed_time = Some(current_time + actual_time);

        if self.remaining_time <= 0.0 {
            self.remaining_time = 0.0;
            self.state = ProcessState::Terminated;
            let completion_time = current_time + actual_time;
            self.completion_time = Some(completion_time);
            self.turnaround_time = completion_time - self.arrival_time;
            self.waiting_time = self.turnaround_time - self.burst_time;
        } else {
            self.state = ProcessState::Ready;
        }

        actual_time
    }

    /// Admit the process into the ready queue.
    pub fn set_ready(&mut self) {
        self.state = ProcessState::Ready;
    }

    pub fn is_completed(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    pub fn cpu_intensity(&self) -> f32 {
        self.process_type.cpu_intensity()
    }

    /// Clear all simulation state so the process can be scheduled again.
    pub fn reset(&mut self) {
        self.remaining_time = self.burst_time;
        self.state = ProcessState::New;
        self.start_time = None;
        self.completion_time = None;
        self.last_executed_time = None;
        self.waiting_time = 0.0;
        self.turnaround_time = 0.0;
        self.response_time = 0.0;
        self.executed_on_core = None;
        self.context_switches = 0;
    }
}
