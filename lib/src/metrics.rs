//! Performance statistics derived from a finished run.
use crate::core::Core;
use crate::process::Process;
use serde_derive::{Deserialize, Serialize};

/// Read-only snapshot computed once after a run completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub average_turnaround_time: f32,
    pub average_waiting_time: f32,
    pub average_response_time: f32,
    pub cpu_utilization: f32,
    pub throughput: f32,
    pub total_context_switches: u32,
    pub load_balance_score: f32,
    pub algorithm_name: String,
    pub num_cores: usize,
    pub num_processes: usize,
    pub total_simulation_time: f32,
}

/// Names of the best metric holder per dimension across a comparison run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsComparison {
    pub best_turnaround: String,
    pub best_waiting: String,
    pub best_response: String,
    pub best_utilization: String,
    pub best_throughput: String,
    pub best_load_balance: String,
    pub fewest_context_switches: String,
}

pub struct MetricsCollector;

impl MetricsCollector {
    /// Aggregate the final process and core state of a run.
    ///
    /// `dispatch_count` is the engine's count of core assignments; the total
    /// context-switch figure adds the per-process cross-core migrations.
    pub fn calculate_metrics(
        processes: &[Process],
        cores: &[Core],
        total_time: f32,
        algorithm_name: &str,
        dispatch_count: u32,
    ) -> PerformanceMetrics {
        let completed: Vec<&Process> = processes.iter().filter(|p| p.is_completed()).collect();
        let load_balance_score = Self::load_balance_score(cores, total_time);

        if completed.is_empty() {
            return PerformanceMetrics {
                total_context_switches: dispatch_count,
                load_balance_score,
                algorithm_name: algorithm_name.to_string(),
                num_cores: cores.len(),
                num_processes: processes.len(),
                total_simulation_time: total_time,
                ..Default::default()
            };
        }

        let count = completed.len() as f32;
        let average_turnaround_time =
            completed.iter().map(|p| p.turnaround_time()).sum::<f32>() / count;
        let average_waiting_time = completed.iter().map(|p| p.waiting_time()).sum::<f32>() / count;
        let average_response_time =
            completed.iter().map(|p| p.response_time()).sum::<f32>() / count;

        let total_busy_time = cores.iter().map(|c| c.total_busy_time).sum::<f32>();
        let total_possible_time = total_time * cores.len() as f32;
        let cpu_utilization = if total_possible_time > 0.0 {
            total_busy_time / total_possible_time * 100.0
        } else {
            0.0
        };

        let throughput = if total_time > 0.0 {
            completed.len() as f32 / total_time
        } else {
            0.0
        };

        let total_context_switches =
            dispatch_count + completed.iter().map(|p| p.context_switches()).sum::<u32>();

        PerformanceMetrics {
            average_turnaround_time,
            average_waiting_time,
            average_response_time,
            cpu_utilization,
            throughput,
            total_context_switches,
            load_balance_score,
            algorithm_name: algorithm_name.to_string(),
            num_cores: cores.len(),
            num_processes: processes.len(),
            total_simulation_time: total_time,
        }
    }

    /// 1 minus the coefficient of variation of per-core utilization, clamped
    /// to [0, 1]. Defined as 1.0 for a single core or zero variance.
    pub fn load_balance_score(cores: &[Core], total_time: f32) -> f32 {
        if cores.len() <= 1 {
            return 1.0;
        }
        let utilizations: Vec<f32> = cores.iter().map(|c| c.get_utilization(total_time)).collect();
        let mean = utilizations.iter().sum::<f32>() / utilizations.len() as f32;
        let variance = utilizations
            .iter()
            .map(|u| (u - mean).powi(2))
            .sum::<f32>()
            / utilizations.len() as f32;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 {
            return 1.0;
        }
        (1.0 - std_dev / mean).clamp(0.0, 1.0)
    }

    /// Identify the best performer per dimension.
    pub fn compare(metrics_list: &[PerformanceMetrics]) -> Option<MetricsComparison> {
        if metrics_list.is_empty() {
            return None;
        }
        let name_of = |choice: &PerformanceMetrics| choice.algorithm_name.clone();
        let min_by = |key: fn(&PerformanceMetrics) -> f32| {
            metrics_list
                .iter()
                .min_by(|a, b| {
                    key(a)
                        .partial_cmp(&key(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(name_of)
                .unwrap_or_default()
        };
        let max_by = |key: fn(&PerformanceMetrics) -> f32| {
            metrics_list
                .iter()
                .max_by(|a, b| {
                    key(a)
                        .partial_cmp(&key(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(name_of)
                .unwrap_or_default()
        };

        Some(MetricsComparison {
            best_turnaround: min_by(|m| m.average_turnaround_time),
            best_waiting: min_by(|m| m.average_waiting_time),
            best_response: min_by(|m| m.average_response_time),
            best_utilization: max_by(|m| m.cpu_utilization),
            best_throughput: max_by(|m| m.throughput),
            best_load_balance: max_by(|m| m.load_balance_score),
            fewest_context_switches: metrics_list
                .iter()
                .min_by_key(|m| m.total_context_switches)
                .map(|m| m.algorithm_name.clone())
                .unwrap_or_default(),
        })
    }
}
