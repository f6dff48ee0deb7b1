use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::job::JobSpec;
use crate::results::SkippedJob;

/// Archivo testigo de un job terminado. Borrarlo fuerza a correrlo de nuevo.
pub const MARKER_FILE: &str = "job_done";
pub const MARKER_CONTENT: &str = "job done.";

pub fn marker_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MARKER_FILE)
}

/// `true` si una corrida anterior dejó el marcador en `output_dir`.
pub fn is_done(output_dir: &Path) -> bool {
    marker_path(output_dir).exists()
}

/// Escribe el marcador. Si `output_dir` no existe no hace nada y devuelve `false`.
pub fn mark_done(output_dir: &Path) -> io::Result<bool> {
    if !output_dir.is_dir() {
        return Ok(false);
    }
    fs::write(marker_path(output_dir), MARKER_CONTENT)?;
    Ok(true)
}

/// Separa los jobs pendientes de los que ya tienen marcador.
pub fn filter_pending(jobs: Vec<JobSpec>) -> (Vec<JobSpec>, Vec<SkippedJob>) {
    let mut pending = Vec::with_capacity(jobs.len());
    let mut skipped = Vec::new();

    for job in jobs {
        if is_done(&job.output_dir) {
            info!("salteando job #{}: {}", job.id, job.interval);
            skipped.push(SkippedJob {
                id: job.id,
                interval: job.interval,
            });
        } else {
            info!("agregando job #{}: {}", job.id, job.interval);
            pending.push(job);
        }
    }

    (pending, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{parse_date, DateInterval};
    use crate::job::Executable;

    fn spec(id: &str, output_dir: PathBuf) -> JobSpec {
        let day = parse_date("20130206").unwrap();
        JobSpec {
            id: id.to_string(),
            interval: DateInterval::new(day, day).unwrap(),
            executable: Executable::direct(Path::new("/bin/true")),
            config_path: PathBuf::from("CONTROL"),
            input_dir: output_dir.with_extension("tmp"),
            output_dir,
            log_path: PathBuf::from("log.txt"),
            timeout: None,
            max_retries: 0,
            retry_on_failure: false,
        }
    }

    #[test]
    fn mark_done_escribe_contenido_literal() {
        let dir = tempfile::tempdir().unwrap();

        assert!(!is_done(dir.path()));
        assert!(mark_done(dir.path()).unwrap());
        assert!(is_done(dir.path()));
        assert_eq!(
            fs::read_to_string(marker_path(dir.path())).unwrap(),
            MARKER_CONTENT
        );
    }

    #[test]
    fn mark_done_no_crea_directorios() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_existe");

        assert!(!mark_done(&missing).unwrap());
        assert!(!missing.exists());
    }

    #[test]
    fn filter_pending_saltea_los_marcados() {
        let dir = tempfile::tempdir().unwrap();
        let done = dir.path().join("a_out");
        let todo = dir.path().join("b_out");
        fs::create_dir_all(&done).unwrap();
        fs::create_dir_all(&todo).unwrap();
        mark_done(&done).unwrap();

        let (pending, skipped) = filter_pending(vec![spec("0", done), spec("1", todo)]);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "1");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].id, "0");
    }

    #[test]
    fn borrar_el_marcador_fuerza_reejecucion() {
        let dir = tempfile::tempdir().unwrap();
        mark_done(dir.path()).unwrap();
        fs::remove_file(marker_path(dir.path())).unwrap();

        let (pending, skipped) = filter_pending(vec![spec("0", dir.path().to_path_buf())]);
        assert_eq!(pending.len(), 1);
        assert!(skipped.is_empty());
    }
}
