mod outputs_result;

use clap::Parser;
use lib::adaptive_scheduler::AdaptiveScheduler;
use lib::fcfs_scheduler::FcfsScheduler;
use lib::load_balancing_scheduler::LoadBalancingScheduler;
use lib::metrics::{MetricsCollector, PerformanceMetrics};
use lib::output_log::create_simulation_log_yaml;
use lib::priority_scheduler::PriorityScheduler;
use lib::process::Process;
use lib::round_robin_scheduler::RoundRobinScheduler;
use lib::scheduler::SchedulerBase;
use lib::simulator::MulticoreSchedulerSimulator;
use lib::sjf_scheduler::SjfScheduler;
use lib::work_stealing_scheduler::WorkStealingScheduler;
use lib::workload::{create_workload_from_yaml, WorkloadConfig};
use outputs_result::dump_comparison_result_to_file;

#[derive(Parser)]
#[clap(
    name = "compare_policies",
    version = "1.0",
    about = "About:
    Runs every scheduling policy over the same workload on a simulated
    multicore processor and dumps the metrics of each together with a
    best-per-dimension summary. The workload is either an explicit
    process-list YAML or an identically seeded generated set."
)]
struct ArgParser {
    ///Number of processing cores.
    #[clap(short = 'c', long = "number_of_cores", required = true)]
    number_of_cores: usize,
    ///Path to an explicit process-list YAML.
    #[clap(short = 'w', long = "workload_file_path")]
    workload_file_path: Option<String>,
    ///Number of generated processes when no file is given.
    #[clap(short = 'n', long = "number_of_processes", default_value_t = 20)]
    number_of_processes: usize,
    ///Seed for workload generation.
    #[clap(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,
    ///Time quantum for the round-robin entry.
    #[clap(short = 'q', long = "time_quantum", default_value_t = 4.0)]
    time_quantum: f32,
    ///Optional simulated-time bound applied to every run.
    #[clap(short = 'm', long = "max_time")]
    max_time: Option<f32>,
    ///Path to output directory.
    #[clap(short = 'o', long = "output_dir_path", default_value = "../outputs")]
    output_dir_path: String,
}

fn all_schedulers(
    number_of_cores: usize,
    time_quantum: f32,
    seed: u64,
) -> Vec<Box<dyn SchedulerBase>> {
    vec![
        Box::new(FcfsScheduler::new(number_of_cores)),
        Box::new(SjfScheduler::new(number_of_cores, false)),
        Box::new(SjfScheduler::new(number_of_cores, true)),
        Box::new(RoundRobinScheduler::new(number_of_cores, time_quantum)),
        Box::new(PriorityScheduler::new(number_of_cores, true, true)),
        Box::new(LoadBalancingScheduler::new(number_of_cores)),
        Box::new(WorkStealingScheduler::with_seed(number_of_cores, seed)),
        Box::new(AdaptiveScheduler::new(number_of_cores)),
    ]
}

fn main() {
    env_logger::init();
    let arg: ArgParser = ArgParser::parse();

    let workload: Vec<Process> = match &arg.workload_file_path {
        Some(workload_file_path) => create_workload_from_yaml(workload_file_path)
            .expect("Failed to load the workload file."),
        None => Vec::new(),
    };

    let mut results: Vec<PerformanceMetrics> = Vec::new();
    for scheduler in all_schedulers(arg.number_of_cores, arg.time_quantum, arg.seed) {
        let mut simulator = MulticoreSchedulerSimulator::new(arg.number_of_cores);
        if workload.is_empty() {
            // Identical seed, identical workload for every policy.
            simulator.generate_processes(&WorkloadConfig::new(arg.number_of_processes), arg.seed);
        } else {
            for process in workload.iter().cloned() {
                simulator.add_process(process);
            }
        }
        simulator.set_scheduler(scheduler);
        let metrics = simulator
            .run_simulation(arg.max_time)
            .expect("The comparison run is misconfigured.");
        println!(
            "{}: avg waiting {:.2}, avg turnaround {:.2}, utilization {:.2}%",
            metrics.algorithm_name,
            metrics.average_waiting_time,
            metrics.average_turnaround_time,
            metrics.cpu_utilization
        );
        results.push(metrics);
    }

    let summary =
        MetricsCollector::compare(&results).expect("At least one policy was compared.");
    let file_path = create_simulation_log_yaml(&arg.output_dir_path, "comparison");
    dump_comparison_result_to_file(&file_path, &results, &summary);

    println!("Comparison dumped to {}", file_path);
}
