use lib::adaptive_scheduler::AdaptiveReport;
use lib::output_log::append_info_to_yaml;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct ResultInfo {
    algorithm: String,
    schedule_length: f32,
    completed_processes: usize,
    total_processes: usize,
    finished: bool,
}

pub fn dump_simulation_result_to_file(
    file_path: &str,
    algorithm: &str,
    schedule_length: f32,
    completed_processes: usize,
    total_processes: usize,
) {
    let result_info = ResultInfo {
        algorithm: algorithm.to_string(),
        schedule_length,
        completed_processes,
        total_processes,
        finished: completed_processes == total_processes,
    };
    let yaml = serde_yaml::to_string(&result_info)
        .expect("Failed to serialize simulation result to YAML");

    append_info_to_yaml(file_path, &yaml);
}

pub fn dump_adaptive_report_to_file(file_path: &str, report: &AdaptiveReport) {
    let yaml =
        serde_yaml::to_string(report).expect("Failed to serialize AdaptiveReport to YAML");
    append_info_to_yaml(file_path, &yaml);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::fcfs_scheduler::FcfsScheduler;
    use lib::output_log::create_yaml_file;
    use lib::simulator::MulticoreSchedulerSimulator;
    use lib::test_helpers::create_process;
    use std::fs::remove_file;

    #[test]
    fn test_dump_simulation_result_to_file_normal() {
        let mut simulator = MulticoreSchedulerSimulator::new(1);
        simulator.add_process(create_process(0, 0.0, 5.0));
        simulator.add_process(create_process(1, 1.0, 3.0));
        simulator.set_scheduler(Box::new(FcfsScheduler::new(1)));
        let metrics = simulator.run_simulation(None).unwrap();

        let file_path = create_yaml_file("../outputs", "test_dump_simulation_result_normal");
        dump_simulation_result_to_file(
            &file_path,
            &metrics.algorithm_name,
            metrics.total_simulation_time,
            simulator.completed_processes().len(),
            simulator.processes().len(),
        );

        let file_contents = std::fs::read_to_string(&file_path).unwrap();
        let result_info: ResultInfo = serde_yaml::from_str(&file_contents).unwrap();

        assert_eq!(result_info.algorithm, "FCFS");
        assert_eq!(result_info.schedule_length, 8.0);
        assert_eq!(result_info.completed_processes, 2);
        assert!(result_info.finished);

        remove_file(file_path).unwrap();
    }
}
