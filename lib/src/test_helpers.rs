//! Process constructors shared by unit tests and downstream test code.
use crate::process::{Process, ProcessType};

pub fn create_process(pid: usize, arrival_time: f32, burst_time: f32) -> Process {
    Process::new(pid, arrival_time, burst_time, 0, ProcessType::Mixed)
}

pub fn create_priority_process(
    pid: usize,
    arrival_time: f32,
    burst_time: f32,
    priority: i32,
) -> Process {
    Process::new(pid, arrival_time, burst_time, priority, ProcessType::Mixed)
}

pub fn create_typed_process(pid: usize, process_type: ProcessType) -> Process {
    Process::new(pid, 0.0, 5.0, 0, process_type)
}
