//! This module contains the definition of a single execution core.
use crate::process::{Process, ProcessId};
use log::warn;
use std::collections::VecDeque;

/// Upper bound on retained instantaneous load samples.
pub const MAX_LOAD_HISTORY: usize = 1024;

/// One logical execution unit. At most one process occupies a core at any
/// simulated instant; `total_busy_time + total_idle_time` tracks the elapsed
/// simulated time since the last reset.
#[derive(Debug, Clone)]
pub struct Core {
    pub core_id: usize,
    pub current_process: Option<ProcessId>,
    pub is_busy: bool,
    pub total_busy_time: f32,
    pub total_idle_time: f32,
    pub processes_executed: u32,
    pub last_update_time: f32,
    pub current_load: f32,
    load_history: VecDeque<f32>,
}

impl Core {
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            current_process: None,
            is_busy: false,
            total_busy_time: 0.0,
            total_idle_time: 0.0,
            processes_executed: 0,
            last_update_time: 0.0,
            current_load: 0.0,
            load_history: VecDeque::new(),
        }
    }

    /// Attach a process to this core. Refuses a double assignment; the engine
    /// checks `is_idle` before calling.
    pub fn assign_process(&mut self, pid: ProcessId, current_time: f32) -> bool {
        if self.is_busy && self.current_process.is_some() {
            warn!("core {} is already occupied", self.core_id);
            return false;
        }
        self.update_accounting(current_time);
        self.current_process = Some(pid);
        self.is_busy = true;
        self.processes_executed += 1;
        true
    }

    /// Execute the current occupant for up to `time_slice`. Returns the time
    /// actually executed, or `None` if the core is idle. Frees the core when
    /// the process completes.
    pub fn execute_current_process(
        &mut self,
        process: &mut Process,
        time_slice: f32,
        current_time: f32,
    ) -> Option<f32> {
        if self.current_process.is_none() {
            self.update_accounting(current_time);
            return None;
        }

        let actual_time = process.execute(time_slice, current_time, self.core_id);
        self.total_busy_time += actual_time;
        self.last_update_time = current_time + actual_time;

        self.current_load = if process.is_completed() {
            0.0
        } else {
            process.remaining_time()
        };
        if self.load_history.len() == MAX_LOAD_HISTORY {
            self.load_history.pop_front();
        }
        self.load_history.push_back(self.current_load);

        if process.is_completed() {
            self.current_process = None;
            self.is_busy = false;
        }

        Some(actual_time)
    }

    /// Forcibly detach the current occupant, regardless of completion, and
    /// return it for re-queueing.
    pub fn preempt_current_process(&mut self, current_time: f32) -> Option<ProcessId> {
        let pid = self.current_process.take()?;
        self.update_accounting(current_time);
        self.is_busy = false;
        self.current_load = 0.0;
        Some(pid)
    }

    pub fn is_idle(&self) -> bool {
        !self.is_busy || self.current_process.is_none()
    }

    /// Utilization as a percentage of `total_time`.
    pub fn get_utilization(&self, total_time: f32) -> f32 {
        if total_time == 0.0 {
            return 0.0;
        }
        (self.total_busy_time / total_time) * 100.0
    }

    /// Remaining time of the current occupant, or 0 when idle.
    pub fn get_load(&self) -> f32 {
        self.current_load
    }

    pub fn get_average_load(&self) -> f32 {
        if self.load_history.is_empty() {
            return 0.0;
        }
        self.load_history.iter().sum::<f32>() / self.load_history.len() as f32
    }

    pub fn load_history(&self) -> impl Iterator<Item = f32> + '_ {
        self.load_history.iter().copied()
    }

    pub fn reset(&mut self) {
        self.current_process = None;
        self.is_busy = false;
        self.total_busy_time = 0.0;
        self.total_idle_time = 0.0;
        self.processes_executed = 0;
        self.last_update_time = 0.0;
        self.current_load = 0.0;
        self.load_history.clear();
    }

    /// Account elapsed busy/idle time since the last update.
    fn update_accounting(&mut self, current_time: f32) {
        let elapsed = current_time - self.last_update_time;
        if elapsed > 0.0 {
            if self.is_busy {
                self.total_busy_time += elapsed;
            } else {
                self.total_idle_time += elapsed;
            }
        }
        self.last_update_time = current_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessType;

    fn create_process(pid: usize, arrival_time: f32, burst_time: f32) -> Process {
        Process::new(pid, arrival_time, burst_time, 0, ProcessType::Mixed)
    }

    #[test]
    fn test_core_default_params() {
        let core = Core::new(2);
        assert_eq!(core.core_id, 2);
        assert!(core.is_idle());
        assert_eq!(core.current_process, None);
        assert_eq!(core.total_busy_time, 0.0);
        assert_eq!(core.total_idle_time, 0.0);
        assert_eq!(core.processes_executed, 0);
        assert_eq!(core.get_load(), 0.0);
    }

    #[test]
    fn test_core_assign_process_normal() {
        let mut core = Core::new(0);
        assert!(core.assign_process(0, 3.0));
        assert!(!core.is_idle());
        assert_eq!(core.current_process, Some(0));
        assert_eq!(core.processes_executed, 1);
        // The core was idle from time 0 to 3.
        assert_eq!(core.total_idle_time, 3.0);
    }

    #[test]
    fn test_core_assign_process_already_occupied() {
        let mut core = Core::new(0);
        assert!(core.assign_process(0, 0.0));
        assert!(!core.assign_process(1, 0.0));
        assert_eq!(core.current_process, Some(0));
        assert_eq!(core.processes_executed, 1);
    }

    #[test]
    fn test_core_execute_accumulates_busy_time() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 10.0);
        core.assign_process(0, 0.0);
        let actual = core.execute_current_process(&mut process, 4.0, 0.0);
        assert_eq!(actual, Some(4.0));
        assert_eq!(core.total_busy_time, 4.0);
        assert_eq!(core.last_update_time, 4.0);
        assert_eq!(core.get_load(), 6.0);
        assert!(!core.is_idle());
    }

    #[test]
    fn test_core_execute_frees_core_on_completion() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 3.0);
        core.assign_process(0, 0.0);
        let actual = core.execute_current_process(&mut process, 10.0, 0.0);
        assert_eq!(actual, Some(3.0));
        assert!(core.is_idle());
        assert_eq!(core.current_process, None);
        assert_eq!(core.get_load(), 0.0);
    }

    #[test]
    fn test_core_execute_idle_core() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 3.0);
        assert_eq!(core.execute_current_process(&mut process, 1.0, 5.0), None);
        assert_eq!(core.total_idle_time, 5.0);
    }

    #[test]
    fn test_core_preempt_current_process() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 10.0);
        core.assign_process(0, 0.0);
        core.execute_current_process(&mut process, 4.0, 0.0);
        let preempted = core.preempt_current_process(4.0);
        assert_eq!(preempted, Some(0));
        assert!(core.is_idle());
        assert_eq!(core.get_load(), 0.0);
        assert_eq!(core.preempt_current_process(4.0), None);
    }

    #[test]
    fn test_core_utilization() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 5.0);
        core.assign_process(0, 0.0);
        core.execute_current_process(&mut process, 10.0, 0.0);
        assert_eq!(core.get_utilization(10.0), 50.0);
        assert_eq!(core.get_utilization(0.0), 0.0);
    }

    #[test]
    fn test_core_load_history_bounded() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 2.0 * MAX_LOAD_HISTORY as f32);
        core.assign_process(0, 0.0);
        let mut current_time = 0.0;
        for _ in 0..MAX_LOAD_HISTORY + 8 {
            core.execute_current_process(&mut process, 1.0, current_time);
            current_time += 1.0;
        }
        assert_eq!(core.load_history().count(), MAX_LOAD_HISTORY);
    }

    #[test]
    fn test_core_average_load() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 6.0);
        core.assign_process(0, 0.0);
        core.execute_current_process(&mut process, 2.0, 0.0);
        core.execute_current_process(&mut process, 2.0, 2.0);
        // Samples are 4.0 and 2.0.
        assert_eq!(core.get_average_load(), 3.0);
    }

    #[test]
    fn test_core_reset() {
        let mut core = Core::new(0);
        let mut process = create_process(0, 0.0, 10.0);
        core.assign_process(0, 0.0);
        core.execute_current_process(&mut process, 4.0, 0.0);
        core.reset();
        assert!(core.is_idle());
        assert_eq!(core.total_busy_time, 0.0);
        assert_eq!(core.total_idle_time, 0.0);
        assert_eq!(core.processes_executed, 0);
        assert_eq!(core.load_history().count(), 0);
        assert_eq!(core.last_update_time, 0.0);
    }
}
