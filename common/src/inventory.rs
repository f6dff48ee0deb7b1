//! Chequeo de archivos meteorológicos ya descargados.
//!
//! Los archivos de salida se llaman `<prefijo><yyMMddHH>` (ej: `EI13020603`).
//! A partir del rango de fechas y de las horas de cada día se arma la lista
//! esperada, se compara con lo que hay en disco y los faltantes se agrupan
//! en periodos continuos.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use glob::{glob, Pattern};
use serde::Serialize;
use std::{collections::HashSet, io, path::Path};

use crate::error::RangeError;

/// Cada 3 horas, como los datos de ERA-Interim.
pub const DEFAULT_HOURS: [u32; 8] = [0, 3, 6, 9, 12, 15, 18, 21];
pub const DEFAULT_STEP_HOURS: i64 = 3;
pub const DEFAULT_PREFIX: &str = "EI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFile {
    pub name: String,
    pub time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub expected: usize,
    pub found: usize,
    pub missing: Vec<String>,
    /// Periodos faltantes `(primero, último)`
    pub periods: Vec<(NaiveDateTime, NaiveDateTime)>,
}

/// Nombres esperados para `[start, end]`.
///
/// `end` se toma a las 00h, así que del último día sólo entra la hora 0.
pub fn expected_files(
    prefix: &str,
    start: NaiveDate,
    end: NaiveDate,
    hours: &[u32],
) -> Result<Vec<ExpectedFile>, RangeError> {
    if start > end {
        return Err(RangeError::InvalidRange { start, end });
    }

    let t_end = end.and_hms_opt(0, 0, 0).unwrap_or_default();
    let mut out = Vec::new();
    let mut day = start;

    while day <= end {
        let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
        for h in hours {
            let t = midnight + Duration::hours(i64::from(*h));
            if t > t_end {
                break;
            }
            out.push(ExpectedFile {
                name: format!("{}{}", prefix, t.format("%y%m%d%H")),
                time: t,
            });
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(out)
}

/// Agrupa instantes en periodos: se corta donde el hueco supera `step_hours`.
pub fn missing_periods(
    mut times: Vec<NaiveDateTime>,
    step_hours: i64,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    times.sort();

    let mut periods: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    for t in times {
        match periods.last_mut() {
            Some((_, last)) if (t - *last).num_hours() <= step_hours => *last = t,
            _ => periods.push((t, t)),
        }
    }
    periods
}

/// Lista los archivos `<prefix>*` de `dir` y reporta los faltantes.
pub fn check_folder(
    dir: &Path,
    prefix: &str,
    start: NaiveDate,
    end: NaiveDate,
    hours: &[u32],
    step_hours: i64,
) -> io::Result<InventoryReport> {
    let expected = expected_files(prefix, start, end, hours)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let pattern = format!(
        "{}/{}*",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(prefix)
    );
    let entries = glob(&pattern).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("patrón inválido {}: {e}", pattern),
        )
    })?;

    let mut got: HashSet<String> = HashSet::new();
    for entry in entries.flatten() {
        if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
            got.insert(name.to_string());
        }
    }

    let mut missing = Vec::new();
    let mut missing_times = Vec::new();
    for f in &expected {
        if !got.contains(&f.name) {
            missing.push(f.name.clone());
            missing_times.push(f.time);
        }
    }

    Ok(InventoryReport {
        expected: expected.len(),
        found: expected.len() - missing.len(),
        missing,
        periods: missing_periods(missing_times, step_hours),
    })
}
