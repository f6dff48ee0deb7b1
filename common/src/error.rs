use std::{io, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Errores al validar el rango de fechas o el tamaño de cada chunk.
/// Se detectan antes de partir el rango y abortan el batch completo.
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("fecha inválida {0:?}: se espera YYYYMMDD o YYYY-MM-DD")]
    InvalidDate(String),

    #[error("rango inválido: la fecha de inicio {start} es posterior a la de fin {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("days_per_job debe ser >= 1 (recibido {0})")]
    InvalidChunkSize(u32),
}

/// Errores de preparación: instalación incompleta o CONTROL file ilegible.
/// Siempre se reportan antes de despachar cualquier job.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no se encontró el ejecutable {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("no se encontró el CONTROL file {}", .0.display())]
    MissingControlFile(PathBuf),

    #[error("error al leer el CONTROL file {}: {source}", path.display())]
    ReadControlFile { path: PathBuf, source: io::Error },

    #[error("error al escribir la copia del CONTROL file {}: {source}", path.display())]
    WriteControlFile { path: PathBuf, source: io::Error },
}

/// Errores que invalidan la especificación de un job (no su ejecución).
/// El scheduler los contiene: nunca abortan a los jobs hermanos.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("no se pudo abrir el log {}: {source}", path.display())]
    Log { path: PathBuf, source: io::Error },
}

/// Errores fatales de un batch completo.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("la cantidad de workers debe ser >= 1 (recibido {0})")]
    InvalidWorkerCount(usize),
}
