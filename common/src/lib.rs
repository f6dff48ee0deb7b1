pub mod config;
pub mod control;
pub mod error;
pub mod interval;
pub mod inventory;
pub mod job;
pub mod results;
pub mod setup;
pub mod sorting;
pub mod tracker;

pub use config::BatchConfig;
pub use error::{BatchError, JobError, RangeError, SetupError};
pub use interval::{parse_date, partition, DateInterval};
pub use job::{Executable, JobId, JobSpec, JobSpecBuilder};
pub use results::{BatchReport, JobOutcome, JobResult, SkippedJob};
pub use setup::Installation;
