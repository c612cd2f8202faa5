use lib::metrics::{MetricsComparison, PerformanceMetrics};
use lib::output_log::append_info_to_yaml;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct ComparisonResult {
    policies: Vec<PerformanceMetrics>,
    summary: MetricsComparison,
}

pub fn dump_comparison_result_to_file(
    file_path: &str,
    policies: &[PerformanceMetrics],
    summary: &MetricsComparison,
) {
    let comparison_result = ComparisonResult {
        policies: policies.to_vec(),
        summary: summary.clone(),
    };
    let yaml = serde_yaml::to_string(&comparison_result)
        .expect("Failed to serialize comparison result to YAML");

    append_info_to_yaml(file_path, &yaml);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib::metrics::MetricsCollector;
    use lib::output_log::create_yaml_file;
    use std::fs::remove_file;

    #[test]
    fn test_dump_comparison_result_to_file_normal() {
        let policies = vec![
            PerformanceMetrics {
                average_waiting_time: 4.0,
                algorithm_name: "FCFS".to_string(),
                ..Default::default()
            },
            PerformanceMetrics {
                average_waiting_time: 2.0,
                algorithm_name: "SRTF".to_string(),
                ..Default::default()
            },
        ];
        let summary = MetricsCollector::compare(&policies).unwrap();

        let file_path = create_yaml_file("../outputs", "test_dump_comparison_result_normal");
        dump_comparison_result_to_file(&file_path, &policies, &summary);

        let file_contents = std::fs::read_to_string(&file_path).unwrap();
        let comparison_result: ComparisonResult = serde_yaml::from_str(&file_contents).unwrap();

        assert_eq!(comparison_result.policies.len(), 2);
        assert_eq!(comparison_result.summary.best_waiting, "SRTF");

        remove_file(file_path).unwrap();
    }
}
