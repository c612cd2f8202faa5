mod outputs_result;

use clap::Parser;
use lib::adaptive_scheduler::AdaptiveScheduler;
use lib::fcfs_scheduler::FcfsScheduler;
use lib::load_balancing_scheduler::LoadBalancingScheduler;
use lib::output_log::create_simulation_log_yaml;
use lib::priority_scheduler::PriorityScheduler;
use lib::round_robin_scheduler::RoundRobinScheduler;
use lib::scheduler::SchedulerBase;
use lib::simulator::MulticoreSchedulerSimulator;
use lib::sjf_scheduler::SjfScheduler;
use lib::work_stealing_scheduler::WorkStealingScheduler;
use lib::workload::{create_workload_from_yaml, load_workload_config_from_yaml, WorkloadConfig};
use log::warn;
use outputs_result::{dump_adaptive_report_to_file, dump_simulation_result_to_file};

#[derive(Parser)]
#[clap(
    name = "simulate",
    version = "1.0",
    about = "About:
    Runs one scheduling policy over a workload on a simulated multicore
    processor and dumps the run log as YAML.
    The workload comes from an explicit process list (-w), a generator
    config file (-g), or the built-in generator defaults."
)]
struct ArgParser {
    ///Scheduling policy: fcfs | sjf | srtf | rr | priority | priority_np | load_balancing | work_stealing | adaptive.
    #[clap(short = 'a', long = "algorithm", default_value = "fcfs")]
    algorithm: String,
    ///Number of processing cores.
    #[clap(short = 'c', long = "number_of_cores", required = true)]
    number_of_cores: usize,
    ///Path to an explicit process-list YAML.
    #[clap(short = 'w', long = "workload_file_path")]
    workload_file_path: Option<String>,
    ///Path to a generator-config YAML.
    #[clap(short = 'g', long = "config_file_path")]
    config_file_path: Option<String>,
    ///Number of generated processes when no file is given.
    #[clap(short = 'n', long = "number_of_processes", default_value_t = 20)]
    number_of_processes: usize,
    ///Seed for workload generation.
    #[clap(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,
    ///Time quantum for the rr policy.
    #[clap(short = 'q', long = "time_quantum", default_value_t = 4.0)]
    time_quantum: f32,
    ///Optional simulated-time bound.
    #[clap(short = 'm', long = "max_time")]
    max_time: Option<f32>,
    ///Path to output directory.
    #[clap(short = 'o', long = "output_dir_path", default_value = "../outputs")]
    output_dir_path: String,
}

fn create_scheduler(
    algorithm: &str,
    number_of_cores: usize,
    time_quantum: f32,
    seed: u64,
) -> Option<Box<dyn SchedulerBase>> {
    match algorithm {
        "fcfs" => Some(Box::new(FcfsScheduler::new(number_of_cores))),
        "sjf" => Some(Box::new(SjfScheduler::new(number_of_cores, false))),
        "srtf" => Some(Box::new(SjfScheduler::new(number_of_cores, true))),
        "rr" => Some(Box::new(RoundRobinScheduler::new(
            number_of_cores,
            time_quantum,
        ))),
        "priority" => Some(Box::new(PriorityScheduler::new(number_of_cores, true, true))),
        "priority_np" => Some(Box::new(PriorityScheduler::new(
            number_of_cores,
            false,
            true,
        ))),
        "load_balancing" => Some(Box::new(LoadBalancingScheduler::new(number_of_cores))),
        "work_stealing" => Some(Box::new(WorkStealingScheduler::with_seed(
            number_of_cores,
            seed,
        ))),
        "adaptive" => Some(Box::new(AdaptiveScheduler::new(number_of_cores))),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    let arg: ArgParser = ArgParser::parse();

    let scheduler = create_scheduler(
        &arg.algorithm,
        arg.number_of_cores,
        arg.time_quantum,
        arg.seed,
    )
    .unwrap_or_else(|| {
        warn!("Unknown algorithm \"{}\", using fcfs instead", arg.algorithm);
        Box::new(FcfsScheduler::new(arg.number_of_cores))
    });

    let mut simulator = MulticoreSchedulerSimulator::new(arg.number_of_cores);
    if let Some(workload_file_path) = &arg.workload_file_path {
        let processes = create_workload_from_yaml(workload_file_path)
            .expect("Failed to load the workload file.");
        for process in processes {
            simulator.add_process(process);
        }
    } else if let Some(config_file_path) = &arg.config_file_path {
        let config = load_workload_config_from_yaml(config_file_path)
            .expect("Failed to load the workload config file.");
        simulator.generate_processes(&config, arg.seed);
    } else {
        let config = WorkloadConfig::new(arg.number_of_processes);
        simulator.generate_processes(&config, arg.seed);
    }

    simulator.set_scheduler(scheduler);
    let metrics = simulator
        .run_simulation(arg.max_time)
        .expect("The simulation is misconfigured.");

    let file_path = create_simulation_log_yaml(&arg.output_dir_path, &arg.algorithm);
    dump_simulation_result_to_file(
        &file_path,
        &metrics.algorithm_name,
        metrics.total_simulation_time,
        simulator.completed_processes().len(),
        simulator.processes().len(),
    );
    let simulation_log = simulator
        .simulation_log()
        .expect("Metrics exist, so the run log does too.");
    simulation_log.dump_log_to_yaml(&file_path);
    if let Some(report) = simulator.adaptive_report() {
        dump_adaptive_report_to_file(&file_path, &report);
    }

    println!("Simulation log dumped to {}", file_path);
}
