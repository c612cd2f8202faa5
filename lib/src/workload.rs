//! Workload synthesis and workload files.
//!
//! A workload is either generated from a seeded random configuration
//! (exponential inter-arrival times, uniform burst times and priorities) or
//! read from a YAML file listing explicit processes.
use crate::error::SimulatorError;
use crate::process::{Process, ProcessType};
use log::warn;
use rand::rngs::StdRng;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};
use std::fs;
use yaml_rust::{Yaml, YamlLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadType {
    CpuBound,
    IoBound,
    #[default]
    Mixed,
}

/// Parameters for random workload generation. The defaults mirror a mixed
/// interactive workload: arrivals every 5 time units on average, bursts
/// between 5 and 50, priorities 0 to 10.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadConfig {
    pub num_processes: usize,
    #[serde(default = "default_arrival_rate")]
    pub arrival_rate: f32,
    #[serde(default = "default_min_burst")]
    pub min_burst: f32,
    #[serde(default = "default_max_burst")]
    pub max_burst: f32,
    #[serde(default)]
    pub workload_type: WorkloadType,
    #[serde(default = "default_min_priority")]
    pub min_priority: i32,
    #[serde(default = "default_max_priority")]
    pub max_priority: i32,
}

fn default_arrival_rate() -> f32 {
    5.0
}
fn default_min_burst() -> f32 {
    5.0
}
fn default_max_burst() -> f32 {
    50.0
}
fn default_min_priority() -> i32 {
    0
}
fn default_max_priority() -> i32 {
    10
}

impl WorkloadConfig {
    pub fn new(num_processes: usize) -> Self {
        Self {
            num_processes,
            arrival_rate: default_arrival_rate(),
            min_burst: default_min_burst(),
            max_burst: default_max_burst(),
            workload_type: WorkloadType::default(),
            min_priority: default_min_priority(),
            max_priority: default_max_priority(),
        }
    }
}

/// Sample an exponentially distributed duration with the given mean.
fn sample_exponential(rng: &mut StdRng, mean: f32) -> f32 {
    let uniform: f32 = rng.gen();
    -mean * (1.0 - uniform).ln()
}

/// Generate processes with pids 0..n. The first process arrives at time 0;
/// later arrivals follow exponential inter-arrival gaps.
pub fn generate_workload(config: &WorkloadConfig, rng: &mut StdRng) -> Vec<Process> {
    let mut processes = Vec::with_capacity(config.num_processes);
    let mut arrival_time = 0.0;

    for pid in 0..config.num_processes {
        if pid > 0 {
            arrival_time += sample_exponential(rng, config.arrival_rate);
        }
        let burst_time = rng.gen_range(config.min_burst..=config.max_burst);
        let process_type = match config.workload_type {
            WorkloadType::CpuBound => ProcessType::CpuBound,
            WorkloadType::IoBound => ProcessType::IoBound,
            WorkloadType::Mixed => match rng.gen_range(0..3) {
                0 => ProcessType::CpuBound,
                1 => ProcessType::IoBound,
                _ => ProcessType::Mixed,
            },
        };
        let priority = rng.gen_range(config.min_priority..=config.max_priority);
        processes.push(Process::new(
            pid,
            arrival_time,
            burst_time,
            priority,
            process_type,
        ));
    }

    processes
}

/// Load generator parameters from a YAML file.
pub fn load_workload_config_from_yaml(file_path: &str) -> Result<WorkloadConfig, SimulatorError> {
    let content = fs::read_to_string(file_path).map_err(|source| SimulatorError::WorkloadFileRead {
        path: file_path.to_string(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|err| SimulatorError::WorkloadFileParse {
        path: file_path.to_string(),
        reason: err.to_string(),
    })
}

/// Load an explicit process list from a YAML file.
///
/// Expected layout:
///
/// ```yaml
/// processes:
///   - id: 0
///     arrival_time: 0.0
///     burst_time: 12.5
///     priority: 3
///     type: cpu_bound
///     core_affinity: 1
/// ```
///
/// `priority`, `type` and `core_affinity` are optional.
pub fn create_workload_from_yaml(file_path: &str) -> Result<Vec<Process>, SimulatorError> {
    let content = fs::read_to_string(file_path).map_err(|source| SimulatorError::WorkloadFileRead {
        path: file_path.to_string(),
        source,
    })?;
    let docs = YamlLoader::load_from_str(&content).map_err(|err| {
        SimulatorError::WorkloadFileParse {
            path: file_path.to_string(),
            reason: err.to_string(),
        }
    })?;
    let doc = docs.first().ok_or_else(|| SimulatorError::WorkloadFileParse {
        path: file_path.to_string(),
        reason: "empty document".to_string(),
    })?;

    let entries = match &doc["processes"] {
        Yaml::Array(entries) => entries,
        _ => {
            return Err(SimulatorError::WorkloadFileParse {
                path: file_path.to_string(),
                reason: "missing `processes` list".to_string(),
            })
        }
    };

    let mut processes = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let pid = yaml_to_usize(&entry["id"]).unwrap_or(index);
        let arrival_time = match yaml_to_f32(&entry["arrival_time"]) {
            Some(value) => value,
            None => {
                return Err(SimulatorError::WorkloadFileParse {
                    path: file_path.to_string(),
                    reason: format!("process {} has no arrival_time", pid),
                })
            }
        };
        let burst_time = match yaml_to_f32(&entry["burst_time"]) {
            Some(value) => value,
            None => {
                return Err(SimulatorError::WorkloadFileParse {
                    path: file_path.to_string(),
                    reason: format!("process {} has no burst_time", pid),
                })
            }
        };
        let priority = yaml_to_i32(&entry["priority"]).unwrap_or(0);
        let process_type = match entry["type"].as_str() {
            Some("cpu_bound") => ProcessType::CpuBound,
            Some("io_bound") => ProcessType::IoBound,
            Some("mixed") | None => ProcessType::Mixed,
            Some(other) => {
                warn!("unknown process type \"{}\", treating as mixed", other);
                ProcessType::Mixed
            }
        };

        let mut process = Process::new(pid, arrival_time, burst_time, priority, process_type);
        if let Some(core_id) = yaml_to_usize(&entry["core_affinity"]) {
            process = process.with_core_affinity(core_id);
        }
        processes.push(process);
    }

    Ok(processes)
}

fn yaml_to_f32(yaml: &Yaml) -> Option<f32> {
    match yaml {
        Yaml::Real(real) => real.parse().ok(),
        Yaml::Integer(integer) => Some(*integer as f32),
        _ => None,
    }
}

fn yaml_to_i32(yaml: &Yaml) -> Option<i32> {
    match yaml {
        Yaml::Integer(integer) => Some(*integer as i32),
        _ => None,
    }
}

fn yaml_to_usize(yaml: &Yaml) -> Option<usize> {
    match yaml {
        Yaml::Integer(integer) if *integer >= 0 => Some(*integer as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::fs::remove_file;

    #[test]
    fn test_generate_workload_counts_and_bounds() {
        let config = WorkloadConfig::new(50);
        let mut rng = StdRng::seed_from_u64(1);
        let processes = generate_workload(&config, &mut rng);
        assert_eq!(processes.len(), 50);
        assert_eq!(processes[0].arrival_time(), 0.0);
        for process in &processes {
            assert!(process.burst_time() >= config.min_burst);
            assert!(process.burst_time() <= config.max_burst);
            assert!(process.priority() >= config.min_priority);
            assert!(process.priority() <= config.max_priority);
        }
        // Arrival times are non-decreasing.
        for pair in processes.windows(2) {
            assert!(pair[0].arrival_time() <= pair[1].arrival_time());
        }
    }

    #[test]
    fn test_generate_workload_deterministic_for_seed() {
        let config = WorkloadConfig::new(20);
        let mut first_rng = StdRng::seed_from_u64(42);
        let mut second_rng = StdRng::seed_from_u64(42);
        let first = generate_workload(&config, &mut first_rng);
        let second = generate_workload(&config, &mut second_rng);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.arrival_time(), b.arrival_time());
            assert_eq!(a.burst_time(), b.burst_time());
            assert_eq!(a.priority(), b.priority());
            assert_eq!(a.process_type(), b.process_type());
        }
    }

    #[test]
    fn test_generate_workload_type_restriction() {
        let mut config = WorkloadConfig::new(10);
        config.workload_type = WorkloadType::CpuBound;
        let mut rng = StdRng::seed_from_u64(3);
        let processes = generate_workload(&config, &mut rng);
        assert!(processes
            .iter()
            .all(|p| p.process_type() == ProcessType::CpuBound));
    }

    #[test]
    fn test_create_workload_from_yaml_normal() {
        let file_path = "../outputs/test_workload_normal.yaml";
        let _ = fs::create_dir_all("../outputs");
        fs::write(
            file_path,
            "processes:\n\
             - id: 0\n  arrival_time: 0.0\n  burst_time: 5.0\n\
             - id: 1\n  arrival_time: 1.5\n  burst_time: 3\n  priority: 4\n  type: io_bound\n  core_affinity: 1\n",
        )
        .unwrap();

        let processes = create_workload_from_yaml(file_path).unwrap();
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].pid(), 0);
        assert_eq!(processes[0].burst_time(), 5.0);
        assert_eq!(processes[0].priority(), 0);
        assert_eq!(processes[1].arrival_time(), 1.5);
        assert_eq!(processes[1].burst_time(), 3.0);
        assert_eq!(processes[1].priority(), 4);
        assert_eq!(processes[1].process_type(), ProcessType::IoBound);
        assert_eq!(processes[1].core_affinity(), Some(1));
        remove_file(file_path).unwrap();
    }

    #[test]
    fn test_create_workload_from_yaml_missing_burst() {
        let file_path = "../outputs/test_workload_missing_burst.yaml";
        let _ = fs::create_dir_all("../outputs");
        fs::write(file_path, "processes:\n- id: 0\n  arrival_time: 0.0\n").unwrap();
        assert!(create_workload_from_yaml(file_path).is_err());
        remove_file(file_path).unwrap();
    }

    #[test]
    fn test_create_workload_from_yaml_missing_file() {
        assert!(create_workload_from_yaml("no_such_workload.yaml").is_err());
    }

    #[test]
    fn test_load_workload_config_from_yaml() {
        let file_path = "../outputs/test_workload_config.yaml";
        let _ = fs::create_dir_all("../outputs");
        fs::write(
            file_path,
            "num_processes: 8\narrival_rate: 2.5\nworkload_type: cpu_bound\n",
        )
        .unwrap();
        let config = load_workload_config_from_yaml(file_path).unwrap();
        assert_eq!(config.num_processes, 8);
        assert_eq!(config.arrival_rate, 2.5);
        assert_eq!(config.workload_type, WorkloadType::CpuBound);
        // Unspecified fields fall back to the defaults.
        assert_eq!(config.min_burst, 5.0);
        assert_eq!(config.max_priority, 10);
        remove_file(file_path).unwrap();
    }
}
