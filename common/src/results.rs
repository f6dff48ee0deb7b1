use serde::Serialize;

use crate::interval::DateInterval;
use crate::job::{JobId, JobSpec};

/// Estado final de un job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOutcome {
    Succeeded,
    /// Salió con código distinto de 0
    Failed,
    /// Agotó los reintentos por timeout
    TimedOut,
    /// No se pudo lanzar (o esperar) el proceso
    LaunchFailed,
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Succeeded => "ok",
            JobOutcome::Failed => "fallido",
            JobOutcome::TimedOut => "timeout",
            JobOutcome::LaunchFailed => "no lanzado",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub id: JobId,
    pub interval: DateInterval,
    /// Último código de salida observado (`None` si nunca terminó por sí mismo)
    pub exit_code: Option<i32>,
    pub attempts: u32,
    pub outcome: JobOutcome,
}

impl JobResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == JobOutcome::Succeeded
    }

    /// Resultado para un job que no llegó a ejecutarse.
    pub fn not_launched(spec: &JobSpec, attempts: u32) -> Self {
        Self {
            id: spec.id.clone(),
            interval: spec.interval,
            exit_code: None,
            attempts,
            outcome: JobOutcome::LaunchFailed,
        }
    }
}

/// Job salteado porque ya tenía marcador de una corrida anterior.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedJob {
    pub id: JobId,
    pub interval: DateInterval,
}

/// Resultado agregado de un batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub skipped: Vec<SkippedJob>,
    pub results: Vec<JobResult>,
}

impl BatchReport {
    pub fn count(&self, outcome: JobOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(JobOutcome::Succeeded)
    }

    /// Jobs que terminaron en cualquier estado distinto de éxito.
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(JobResult::succeeded)
    }

    /// Total de invocaciones externas realizadas en el batch.
    pub fn total_attempts(&self) -> u32 {
        self.results.iter().map(|r| r.attempts).sum()
    }
}
