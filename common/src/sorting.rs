use glob::{glob, Pattern};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

/// Año de 4 dígitos a partir de 2 dígitos, con la misma regla que `%y`:
/// 69..=99 -> 19xx, 00..=68 -> 20xx.
pub fn expand_year(yy: u32) -> u32 {
    if yy >= 69 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Año de un archivo `<prefix><yy>...`, o `None` si el nombre no encaja.
pub fn file_year(file_name: &str, prefix: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(prefix)?;
    let yy = rest.get(..2)?;
    if !yy.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    yy.parse::<u32>().ok().map(expand_year)
}

/// Mueve cada `<prefix><yy>*` de `src` a `dst/<yyyy>/`.
/// Devuelve los movimientos hechos `(origen, destino)`.
pub fn sort_by_year(src: &Path, dst: &Path, prefix: &str) -> io::Result<Vec<(PathBuf, PathBuf)>> {
    let pattern = format!(
        "{}/{}*",
        Pattern::escape(&src.to_string_lossy()),
        Pattern::escape(prefix)
    );
    let entries = glob(&pattern).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("patrón inválido {}: {e}", pattern),
        )
    })?;

    let mut moves = Vec::new();
    for path in entries.flatten() {
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(year) = file_year(name, prefix) else {
            continue;
        };

        let year_dir = dst.join(year.to_string());
        fs::create_dir_all(&year_dir)?;

        let target = year_dir.join(name);
        info!("moviendo {} -> {}", path.display(), target.display());
        move_file(&path, &target)?;
        moves.push((path, target));
    }

    Ok(moves)
}

/// `rename` falla entre dispositivos distintos; en ese caso copiamos y borramos.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
