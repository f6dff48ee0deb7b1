use async_trait::async_trait;
use common::{tracker, JobError, JobOutcome, JobResult, JobSpec};
use std::{
    fs::File,
    io,
    process::{ExitStatus, Stdio},
};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Ejecuta un job completo (con sus reintentos) y devuelve su resultado.
///
/// Sólo devuelve `Err` si la especificación del job es inutilizable;
/// los fallos normales del proceso quedan en el `JobResult`.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn run(&self, spec: &JobSpec) -> Result<JobResult, JobError>;
}

/// Lanza el job como proceso del sistema operativo.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

/// Resultado de un intento individual.
enum Attempt {
    Exited(ExitStatus),
    TimedOut,
    LaunchFailed(io::Error),
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    async fn attempt(&self, spec: &JobSpec, log: &File) -> Result<Attempt, JobError> {
        let log_err = |source| JobError::Log {
            path: spec.log_path.clone(),
            source,
        };
        // stdout y stderr van al mismo archivo, sin buffer intermedio
        let stdout = log.try_clone().map_err(log_err)?;
        let stderr = log.try_clone().map_err(log_err)?;

        let mut command = Command::new(&spec.executable.program);
        command
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => return Ok(Attempt::LaunchFailed(e)),
        };

        let waited = match spec.timeout {
            Some(limit) => {
                let res = timeout(limit, child.wait()).await;
                match res {
                    Ok(waited) => waited,
                    Err(_) => {
                        // kill() manda SIGKILL y espera a que el proceso termine
                        if let Err(e) = child.kill().await {
                            warn!("no se pudo matar el proceso del job {}: {:?}", spec.id, e);
                        }
                        return Ok(Attempt::TimedOut);
                    }
                }
            }
            None => child.wait().await,
        };

        Ok(match waited {
            Ok(status) => Attempt::Exited(status),
            Err(e) => Attempt::LaunchFailed(e),
        })
    }
}

#[async_trait]
impl JobExecutor for ProcessRunner {
    async fn run(&self, spec: &JobSpec) -> Result<JobResult, JobError> {
        // El log se trunca en cada corrida del job y se cierra al salir de run()
        let log = File::create(&spec.log_path).map_err(|source| JobError::Log {
            path: spec.log_path.clone(),
            source,
        })?;

        let max_attempts = spec.max_attempts();
        let mut attempts: u32 = 0;
        let mut exit_code: Option<i32> = None;
        debug!("job #{}: {}", spec.id, spec.command_line());

        let outcome = loop {
            attempts += 1;
            info!(
                "lanzando job #{} ({}) intento {}/{}",
                spec.id, spec.interval, attempts, max_attempts
            );

            match self.attempt(spec, &log).await? {
                Attempt::Exited(status) if status.success() => {
                    exit_code = status.code();
                    match tracker::mark_done(&spec.output_dir) {
                        Ok(true) => {}
                        Ok(false) => warn!(
                            "job #{} terminó bien pero {} no existe; no se escribe {}",
                            spec.id,
                            spec.output_dir.display(),
                            tracker::MARKER_FILE
                        ),
                        Err(e) => {
                            // sin marcador la próxima corrida lo repetiría: se reporta como fallido
                            warn!(
                                "job #{} salió con 0 pero no se pudo escribir {}: {:?}",
                                spec.id,
                                tracker::marker_path(&spec.output_dir).display(),
                                e
                            );
                            break JobOutcome::Failed;
                        }
                    }
                    info!("job #{} terminado en {} intento(s)", spec.id, attempts);
                    break JobOutcome::Succeeded;
                }
                Attempt::Exited(status) => {
                    exit_code = status.code();
                    warn!(
                        "job #{} ({}) salió con estado {:?} en el intento {}",
                        spec.id, spec.interval, exit_code, attempts
                    );
                    if spec.retry_on_failure && attempts < max_attempts {
                        continue;
                    }
                    break JobOutcome::Failed;
                }
                Attempt::TimedOut => {
                    exit_code = None;
                    warn!(
                        "intento {} del job #{} ({}) superó el timeout de {:?}",
                        attempts, spec.id, spec.interval, spec.timeout
                    );
                    if attempts < max_attempts {
                        continue;
                    }
                    break JobOutcome::TimedOut;
                }
                Attempt::LaunchFailed(e) => {
                    warn!(
                        "job #{} ({}) falló al lanzar {}: {:?}",
                        spec.id,
                        spec.interval,
                        spec.executable.program.display(),
                        e
                    );
                    break JobOutcome::LaunchFailed;
                }
            }
        };

        Ok(JobResult {
            id: spec.id.clone(),
            interval: spec.interval,
            exit_code,
            attempts,
            outcome,
        })
    }
}
