use common::{
    interval, tracker, BatchConfig, BatchError, BatchReport, Executable, JobSpecBuilder,
    SetupError, SkippedJob,
};
use std::{fmt::Write as _, fs, path::Path};
use tracing::info;

use crate::runner::JobExecutor;
use crate::scheduler::{render_plan, Scheduler};

/// Lo que produce una corrida del batch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// Dry-run: resumen de lo que se ejecutaría
    Planned {
        plan: String,
        skipped: Vec<SkippedJob>,
    },
    Executed(BatchReport),
}

/// Corre un batch completo:
/// 1. parte el rango de fechas
/// 2. arma un job por intervalo (con su copia del CONTROL file)
/// 3. descarta los jobs que ya tienen marcador
/// 4. ejecuta el resto con a lo sumo `config.workers` en paralelo
///
/// Los errores de preparación abortan antes de lanzar cualquier job.
pub async fn run_batch<E: JobExecutor + 'static>(
    config: &BatchConfig,
    executable: Executable,
    control_file: &Path,
    executor: E,
) -> Result<BatchOutcome, BatchError> {
    let intervals = interval::partition(config.start, config.end, config.days_per_job)?;
    let scheduler = Scheduler::new(executor, config.workers)?;

    let base_config =
        fs::read_to_string(control_file).map_err(|source| SetupError::ReadControlFile {
            path: control_file.to_path_buf(),
            source,
        })?;

    let builder = JobSpecBuilder {
        executable,
        base_config_path: control_file.to_path_buf(),
        base_config,
        job_prefix: config.job_prefix.clone(),
        output_root: config.output_dir.clone(),
        log_dir: config.log_dir().to_path_buf(),
        timeout: config.timeout(),
        max_retries: config.timeout_retries,
        retry_on_failure: config.retry_on_failure,
        isolate_config: config.copy_control,
    };
    let jobs = builder.build(&intervals)?;
    let (pending, skipped) = tracker::filter_pending(jobs);

    info!(
        "{} job(s) pendientes, {} salteados por {}",
        pending.len(),
        skipped.len(),
        tracker::MARKER_FILE
    );

    if config.dry_run {
        let mut plan = render_header(config, pending.len(), scheduler.workers());
        plan.push_str(&render_plan(&pending));
        return Ok(BatchOutcome::Planned { plan, skipped });
    }

    let results = scheduler.execute(pending).await;
    Ok(BatchOutcome::Executed(BatchReport { skipped, results }))
}

fn render_header(config: &BatchConfig, n_jobs: usize, workers: usize) -> String {
    let total_days = (config.end - config.start).num_days() + 1;

    let mut out = String::new();
    let _ = writeln!(out, "####### Resumen del batch #######");
    let _ = writeln!(
        out,
        "Periodo: {} - {}",
        config.start.format(interval::DATE_FORMAT),
        config.end.format(interval::DATE_FORMAT)
    );
    let _ = writeln!(out, "Total de días = {}", total_days);
    let _ = writeln!(out, "Días por job = {}", config.days_per_job);
    let _ = writeln!(out, "Cantidad de jobs = {}", n_jobs);
    let _ = writeln!(out, "Máximo de jobs en paralelo = {}", workers);
    out
}
