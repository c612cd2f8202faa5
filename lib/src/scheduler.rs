//! Common contract implemented by every scheduling policy.
use crate::adaptive_scheduler::AdaptiveReport;
use crate::core::Core;
use crate::process::{Process, ProcessId};

/// A scheduling policy bound to a fixed core count.
///
/// The engine owns the canonical ready queue: `select_process` receives the
/// process arena together with the ready ids and returns a selection; the
/// engine performs the actual removal and assignment. Policies may keep
/// whatever auxiliary structures they need, but must never duplicate or
/// silently drop a ready process.
pub trait SchedulerBase {
    fn name(&self) -> &str;

    /// Pick the next process to run on `core`, or `None` if no suitable
    /// process is available.
    fn select_process(
        &mut self,
        core: &Core,
        ready_queue: &[ProcessId],
        processes: &[Process],
        current_time: f32,
    ) -> Option<ProcessId>;

    fn is_preemptive(&self) -> bool {
        false
    }

    /// Whether the process running on a core should be preempted in favor of
    /// a waiting one.
    fn should_preempt(
        &mut self,
        _running: ProcessId,
        _ready_queue: &[ProcessId],
        _processes: &[Process],
        _current_time: f32,
    ) -> bool {
        false
    }

    /// Bounds how long the engine executes before re-consulting the policy.
    /// Non-preemptive policies run processes to completion.
    fn get_time_quantum(&self) -> f32 {
        f32::INFINITY
    }

    fn on_process_arrival(&mut self, _pid: ProcessId, _processes: &[Process], _current_time: f32) {}

    fn on_process_completion(
        &mut self,
        _pid: ProcessId,
        _processes: &[Process],
        _current_time: f32,
    ) {
    }

    /// Move a preempted process to the tail of the policy's rotation order.
    /// Only Round Robin overrides this; the engine invokes it on quantum
    /// expiry so FIFO order is preserved with a fresh quantum.
    fn rotate_queue(&mut self, _pid: ProcessId) {}

    /// Reporting surface of the adaptive meta-policy. Concrete policies
    /// return `None`.
    fn adaptive_report(&self) -> Option<AdaptiveReport> {
        None
    }

    fn reset(&mut self);
}
