pub mod engine;
pub mod runner;
pub mod scheduler;

pub use engine::{run_batch, BatchOutcome};
pub use runner::{JobExecutor, ProcessRunner};
pub use scheduler::{render_plan, Scheduler};
