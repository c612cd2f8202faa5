//! Serializable run logs handed to external reporting.
use serde_derive::{Deserialize, Serialize};

use crate::core::Core;
use crate::metrics::PerformanceMetrics;
use crate::output_log::append_info_to_yaml;
use crate::process::Process;

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub algorithm: String,
    pub number_of_cores: usize,
    pub number_of_processes: usize,
    pub schedule_length: f32,
}

impl SimulationInfo {
    pub fn dump_simulation_info_to_yaml(&self, file_path: &str) {
        let yaml =
            serde_yaml::to_string(&self).expect("Failed to serialize SimulationInfo to YAML");
        append_info_to_yaml(file_path, &yaml);
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProcessLog {
    pub pid: usize,
    pub core_id: Option<usize>,
    pub arrival_time: f32,
    pub start_time: Option<f32>,
    pub completion_time: Option<f32>,
    pub turnaround_time: f32,
    pub waiting_time: f32,
    pub response_time: f32,
    pub context_switches: u32,
}

impl ProcessLog {
    pub fn new(process: &Process) -> Self {
        Self {
            pid: process.pid(),
            core_id: process.executed_on_core(),
            arrival_time: process.arrival_time(),
            start_time: process.start_time(),
            completion_time: process.completion_time(),
            turnaround_time: process.turnaround_time(),
            waiting_time: process.waiting_time(),
            response_time: process.response_time(),
            context_switches: process.context_switches(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProcessLogs {
    pub process_logs: Vec<ProcessLog>,
}

impl ProcessLogs {
    pub fn new(processes: &[Process]) -> Self {
        Self {
            process_logs: processes.iter().map(ProcessLog::new).collect(),
        }
    }

    pub fn dump_process_logs_to_yaml(&self, file_path: &str) {
        let yaml = serde_yaml::to_string(&self).expect("Failed to serialize ProcessLogs to YAML");
        append_info_to_yaml(file_path, &yaml);
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CoreLog {
    pub core_id: usize,
    pub total_busy_time: f32,
    pub total_idle_time: f32,
    pub processes_executed: u32,
    pub utilization: f32,
    pub average_load: f32,
}

impl CoreLog {
    pub fn new(core: &Core, total_time: f32) -> Self {
        Self {
            core_id: core.core_id,
            total_busy_time: core.total_busy_time,
            total_idle_time: core.total_idle_time,
            processes_executed: core.processes_executed,
            utilization: core.get_utilization(total_time),
            average_load: core.get_average_load(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProcessorLog {
    pub average_utilization: f32,
    pub variance_utilization: f32,
    pub core_logs: Vec<CoreLog>,
}

impl ProcessorLog {
    pub fn new(cores: &[Core], total_time: f32) -> Self {
        let mut log = Self {
            average_utilization: Default::default(),
            variance_utilization: Default::default(),
            core_logs: cores.iter().map(|core| CoreLog::new(core, total_time)).collect(),
        };
        log.calculate_average_utilization();
        log.calculate_variance_utilization();
        log
    }

    pub fn calculate_average_utilization(&mut self) {
        self.average_utilization = self
            .core_logs
            .iter()
            .map(|core_log| core_log.utilization)
            .sum::<f32>()
            / self.core_logs.len() as f32;
    }

    pub fn calculate_variance_utilization(&mut self) {
        self.variance_utilization = self
            .core_logs
            .iter()
            .map(|core_log| (core_log.utilization - self.average_utilization).powi(2))
            .sum::<f32>()
            / self.core_logs.len() as f32;
    }

    pub fn dump_processor_log_to_yaml(&self, file_path: &str) {
        let yaml = serde_yaml::to_string(&self).expect("Failed to serialize ProcessorLog to YAML");
        append_info_to_yaml(file_path, &yaml);
    }
}

pub fn dump_metrics_to_yaml(file_path: &str, metrics: &PerformanceMetrics) {
    let yaml =
        serde_yaml::to_string(metrics).expect("Failed to serialize PerformanceMetrics to YAML");
    append_info_to_yaml(file_path, &yaml);
}

/// Everything external reporting needs from one finished run.
pub struct SimulationLog {
    pub simulation_info: SimulationInfo,
    pub process_logs: ProcessLogs,
    pub processor_log: ProcessorLog,
    pub metrics: PerformanceMetrics,
}

impl SimulationLog {
    pub fn new(processes: &[Process], cores: &[Core], metrics: &PerformanceMetrics) -> Self {
        let simulation_info = SimulationInfo {
            algorithm: metrics.algorithm_name.clone(),
            number_of_cores: metrics.num_cores,
            number_of_processes: metrics.num_processes,
            schedule_length: metrics.total_simulation_time,
        };

        Self {
            simulation_info,
            process_logs: ProcessLogs::new(processes),
            processor_log: ProcessorLog::new(cores, metrics.total_simulation_time),
            metrics: metrics.clone(),
        }
    }

    pub fn dump_log_to_yaml(&self, file_path: &str) {
        self.simulation_info.dump_simulation_info_to_yaml(file_path);
        dump_metrics_to_yaml(file_path, &self.metrics);
        self.process_logs.dump_process_logs_to_yaml(file_path);
        self.processor_log.dump_processor_log_to_yaml(file_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output_log::create_yaml_file;
    use crate::process::ProcessType;
    use std::fs::remove_file;

    fn create_finished_process(pid: usize, arrival_time: f32, burst_time: f32) -> Process {
        let mut process = Process::new(pid, arrival_time, burst_time, 0, ProcessType::Mixed);
        process.set_ready();
        process.execute(burst_time, arrival_time, 0);
        process
    }

    #[test]
    fn test_process_log_captures_timing_fields() {
        let process = create_finished_process(3, 2.0, 4.0);
        let log = ProcessLog::new(&process);
        assert_eq!(log.pid, 3);
        assert_eq!(log.core_id, Some(0));
        assert_eq!(log.start_time, Some(2.0));
        assert_eq!(log.completion_time, Some(6.0));
        assert_eq!(log.turnaround_time, 4.0);
        assert_eq!(log.waiting_time, 0.0);
    }

    #[test]
    fn test_processor_log_statistics() {
        let mut busy = Core::new(0);
        let mut process = Process::new(0, 0.0, 10.0, 0, ProcessType::Mixed);
        busy.assign_process(0, 0.0);
        busy.execute_current_process(&mut process, 10.0, 0.0);
        let idle = Core::new(1);

        let log = ProcessorLog::new(&[busy, idle], 10.0);
        assert_eq!(log.core_logs.len(), 2);
        assert_eq!(log.core_logs[0].utilization, 100.0);
        assert_eq!(log.core_logs[1].utilization, 0.0);
        assert_eq!(log.average_utilization, 50.0);
        assert_eq!(log.variance_utilization, 2500.0);
    }

    #[test]
    fn test_dump_simulation_log_to_yaml() {
        let processes = vec![create_finished_process(0, 0.0, 5.0)];
        let mut core = Core::new(0);
        let mut runner = processes[0].clone();
        runner.reset();
        runner.set_ready();
        core.assign_process(0, 0.0);
        core.execute_current_process(&mut runner, 5.0, 0.0);

        let cores = vec![core];
        let metrics = crate::metrics::MetricsCollector::calculate_metrics(
            &processes, &cores, 5.0, "FCFS", 1,
        );
        let log = SimulationLog::new(&processes, &cores, &metrics);

        let file_path = create_yaml_file("../outputs", "test_simulation_log");
        log.dump_log_to_yaml(&file_path);

        let contents = std::fs::read_to_string(&file_path).unwrap();
        assert!(contents.contains("algorithm: FCFS"));
        assert!(contents.contains("process_logs:"));
        assert!(contents.contains("core_logs:"));
        remove_file(file_path).unwrap();
    }
}
