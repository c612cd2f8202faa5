//! Error taxonomy of the simulator. The domain is closed, so this stays
//! narrow: configuration mistakes and workload-file problems.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("no scheduler set; call set_scheduler() before running")]
    NoSchedulerSet,
    #[error("no processes to simulate; generate or add processes before running")]
    NoProcesses,
    #[error("failed to read workload file {path}: {source}")]
    WorkloadFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse workload file {path}: {reason}")]
    WorkloadFileParse { path: String, reason: String },
}
