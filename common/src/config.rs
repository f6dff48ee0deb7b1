use chrono::NaiveDate;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_CONTROL_FILE: &str = "CONTROL_EI.public";
pub const DEFAULT_DAYS_PER_JOB: u32 = 1;
/// 4 horas por llamada a submit.py
pub const DEFAULT_TIMEOUT_SECS: u64 = 4 * 60 * 60;
pub const DEFAULT_TIMEOUT_RETRIES: u32 = 3;
pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_JOB_PREFIX: &str = "EI_job";

/// Configuración de un batch. Vive lo que dura una corrida de `run_batch`.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days_per_job: u32,

    /// Máximo de jobs corriendo en paralelo
    pub workers: usize,

    /// Carpeta donde se crean los `<prefijo>_<id>_<inicio>-<fin>_{tmp,out}`
    pub output_dir: PathBuf,
    /// Carpeta de logs por job; si no viene se usa `output_dir`
    pub log_dir: Option<PathBuf>,

    /// `None` = sin timeout
    pub timeout_secs: Option<u64>,
    pub timeout_retries: u32,
    /// Reintentar también salidas con código distinto de 0 (apagado por defecto)
    pub retry_on_failure: bool,

    pub job_prefix: String,
    /// Copia privada del CONTROL file por job
    pub copy_control: bool,
    pub dry_run: bool,
}

impl BatchConfig {
    pub fn new(start: NaiveDate, end: NaiveDate, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            start,
            end,
            days_per_job: DEFAULT_DAYS_PER_JOB,
            workers: DEFAULT_WORKERS,
            output_dir: output_dir.into(),
            log_dir: None,
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            timeout_retries: DEFAULT_TIMEOUT_RETRIES,
            retry_on_failure: false,
            job_prefix: DEFAULT_JOB_PREFIX.to_string(),
            copy_control: true,
            dry_run: false,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn log_dir(&self) -> &Path {
        self.log_dir.as_deref().unwrap_or(&self.output_dir)
    }
}
