use common::{BatchError, JobResult, JobSpec};
use std::{fmt::Write as _, sync::Arc};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::runner::JobExecutor;

/// Reparte los jobs en `workers` slots concurrentes.
pub struct Scheduler<E> {
    executor: Arc<E>,
    workers: usize,
}

impl<E: JobExecutor + 'static> Scheduler<E> {
    pub fn new(executor: E, workers: usize) -> Result<Self, BatchError> {
        Self::with_shared(Arc::new(executor), workers)
    }

    pub fn with_shared(executor: Arc<E>, workers: usize) -> Result<Self, BatchError> {
        if workers < 1 {
            return Err(BatchError::InvalidWorkerCount(workers));
        }
        Ok(Self { executor, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Corre todos los jobs y devuelve sus resultados en orden de envío.
    ///
    /// Cada job toma un permiso antes de lanzarse, así el despacho respeta el
    /// orden de la lista. El fallo de un job nunca cancela a los demás.
    pub async fn execute(&self, jobs: Vec<JobSpec>) -> Vec<JobResult> {
        let sem = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(jobs.len());

        info!(
            "despachando {} job(s) con {} worker(s)",
            jobs.len(),
            self.workers
        );

        for spec in jobs {
            let Ok(permit) = sem.clone().acquire_owned().await else {
                warn!("semáforo cerrado, no se despachan más jobs");
                break;
            };

            let executor = self.executor.clone();
            let id = spec.id.clone();
            let interval = spec.interval;
            let handle = tokio::spawn(async move {
                let result = match executor.run(&spec).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("job #{} inválido: {}", spec.id, e);
                        JobResult::not_launched(&spec, 0)
                    }
                };
                // liberar el slot
                drop(permit);
                result
            });
            handles.push((id, interval, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (id, interval, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("panic o join error en job #{}: {:?}", id, e);
                    results.push(JobResult {
                        id,
                        interval,
                        exit_code: None,
                        attempts: 0,
                        outcome: common::JobOutcome::LaunchFailed,
                    });
                }
            }
        }
        results
    }
}

/// Resumen de cada job para el modo dry-run. No ejecuta nada.
pub fn render_plan(jobs: &[JobSpec]) -> String {
    let mut out = String::new();
    for job in jobs {
        let timeout = job
            .timeout
            .map(|t| t.as_secs().to_string())
            .unwrap_or_else(|| "sin timeout".to_string());

        let _ = writeln!(out, "\n#### Job #{}:", job.id);
        let _ = writeln!(
            out,
            "Periodo: {} - {}",
            job.interval.start_str(),
            job.interval.end_str()
        );
        let _ = writeln!(out, "CONTROL file: {}", job.config_path.display());
        let _ = writeln!(out, "Log: {}", job.log_path.display());
        let _ = writeln!(out, "inputdir: {}", job.input_dir.display());
        let _ = writeln!(out, "outputdir: {}", job.output_dir.display());
        let _ = writeln!(out, "Timeout (segundos): {}", timeout);
        let _ = writeln!(out, "Reintentos por timeout: {}", job.max_retries);
    }
    out
}
