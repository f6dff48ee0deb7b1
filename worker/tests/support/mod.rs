#![allow(dead_code)]

use common::{parse_date, DateInterval, Executable, JobSpec};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Escribe un script de shell y devuelve cómo invocarlo.
///
/// Se lanza como `sh <script>` en vez de ejecutarlo directo, para no
/// depender de permisos de ejecución. Dentro del script `$6` es el outputdir.
pub fn script(dir: &Path, name: &str, body: &str) -> Executable {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    Executable {
        program: PathBuf::from("/bin/sh"),
        leading_args: vec![path.display().to_string()],
    }
}

pub fn spec(dir: &Path, id: &str, executable: Executable) -> JobSpec {
    let day = parse_date("20130206").unwrap();
    JobSpec {
        id: id.to_string(),
        interval: DateInterval::new(day, day).unwrap(),
        executable,
        config_path: dir.join("CONTROL"),
        input_dir: dir.join(format!("job_{}_tmp", id)),
        output_dir: dir.join(format!("job_{}_out", id)),
        log_path: dir.join(format!("job_{}.txt", id)),
        timeout: Some(Duration::from_secs(10)),
        max_retries: 3,
        retry_on_failure: false,
    }
}

/// Cantidad de líneas de un archivo contador (0 si no existe).
pub fn count_lines(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}
