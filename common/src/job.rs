use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::control::replace_control_dates;
use crate::error::SetupError;
use crate::interval::DateInterval;
use crate::tracker;

pub type JobId = String;

pub const CONTROL_FLAG: &str = "--controlfile";
pub const INPUT_FLAG: &str = "--inputdir";
pub const OUTPUT_FLAG: &str = "--outputdir";

/// Programa externo a lanzar por cada job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    /// Ej: "python3" o la ruta a un binario
    pub program: PathBuf,
    /// Argumentos previos a los flags del job, ej: ["-u", "/ruta/submit.py"]
    pub leading_args: Vec<String>,
}

impl Executable {
    /// `-u` desactiva el buffer de stdout, así el log se puede seguir con `tail -f`.
    pub fn python(interpreter: &str, script: &Path) -> Self {
        Self {
            program: PathBuf::from(interpreter),
            leading_args: vec!["-u".to_string(), script.display().to_string()],
        }
    }

    pub fn direct(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            leading_args: Vec::new(),
        }
    }
}

/// Un sub-job: un intervalo de fechas mapeado a una invocación externa.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: JobId,
    pub interval: DateInterval,
    pub executable: Executable,

    /// CONTROL file que recibe `--controlfile` (copia privada o el base)
    pub config_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub log_path: PathBuf,

    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub retry_on_failure: bool,
}

impl JobSpec {
    /// Argumentos completos (sin el programa) de la invocación.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = self
            .executable
            .leading_args
            .iter()
            .map(OsString::from)
            .collect();

        args.push(CONTROL_FLAG.into());
        args.push(self.config_path.clone().into_os_string());
        args.push(INPUT_FLAG.into());
        args.push(self.input_dir.clone().into_os_string());
        args.push(OUTPUT_FLAG.into());
        args.push(self.output_dir.clone().into_os_string());
        args
    }

    /// Intentos máximos: el primero más los reintentos.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Línea de comando legible, sólo para logs y resúmenes.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.executable.program.display().to_string()];
        parts.extend(
            self.args()
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

/// Arma un `JobSpec` por intervalo.
///
/// El contenido del CONTROL file base se recibe ya leído, así que editar el
/// archivo base después de construir los jobs no cambia ninguno de ellos.
#[derive(Debug, Clone)]
pub struct JobSpecBuilder {
    pub executable: Executable,
    pub base_config_path: PathBuf,
    pub base_config: String,
    pub job_prefix: String,
    pub output_root: PathBuf,
    pub log_dir: PathBuf,
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub retry_on_failure: bool,
    pub isolate_config: bool,
}

impl JobSpecBuilder {
    /// Ids con ancho fijo: 10 jobs -> "00".."09".
    pub fn job_id(index: usize, total: usize) -> JobId {
        let width = total.to_string().len();
        format!("{:0width$}", index, width = width)
    }

    /// Ruta de la copia privada del CONTROL file: junto al base,
    /// `<nombre_base>_<prefijo>_<id>`.
    pub fn isolated_config_path(&self, id: &str) -> PathBuf {
        let file_name = self
            .base_config_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "CONTROL".to_string());

        let name = format!("{}_{}_{}", file_name, self.job_prefix, id);
        match self.base_config_path.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn build(&self, intervals: &[DateInterval]) -> Result<Vec<JobSpec>, SetupError> {
        let total = intervals.len();
        let mut jobs = Vec::with_capacity(total);

        for (idx, interval) in intervals.iter().enumerate() {
            let id = Self::job_id(idx, total);

            let name = format!("{}_{}_{}", self.job_prefix, id, interval);
            let input_dir = self.output_root.join(format!("{}_tmp", name));
            let output_dir = self.output_root.join(format!("{}_out", name));
            let log_path = self
                .log_dir
                .join(format!("{}_{}.txt", self.job_prefix, id));

            // un job ya terminado conserva la copia con la que corrió
            let config_path = if self.isolate_config {
                let path = self.isolated_config_path(&id);
                if !tracker::is_done(&output_dir) {
                    let content = replace_control_dates(&self.base_config, interval);
                    fs::write(&path, content).map_err(|source| {
                        SetupError::WriteControlFile {
                            path: path.clone(),
                            source,
                        }
                    })?;
                }
                path
            } else {
                self.base_config_path.clone()
            };

            debug!("job {} armado: control={}", id, config_path.display());

            jobs.push(JobSpec {
                id,
                interval: *interval,
                executable: self.executable.clone(),
                config_path,
                input_dir,
                output_dir,
                log_path,
                timeout: self.timeout,
                max_retries: self.max_retries,
                retry_on_failure: self.retry_on_failure,
            });
        }

        Ok(jobs)
    }
}
