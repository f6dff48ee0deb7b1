use regex::{NoExpand, Regex};
use tracing::debug;

use crate::interval::DateInterval;

pub const START_FIELD: &str = "START_DATE";
pub const END_FIELD: &str = "END_DATE";

/// Patrón de una asignación `CAMPO <YYYYMMDD>` al inicio de línea.
fn field_pattern(field: &str) -> Regex {
    Regex::new(&format!(r"(?m)^{} +\d{{8}}", regex::escape(field)))
        .expect("patrón de campo del CONTROL file inválido")
}

/// Reescribe (o agrega al principio) la línea `field value`.
///
/// Si el campo ya está asignado se reemplaza su valor en todas las líneas
/// donde aparezca; el resto del documento queda intacto.
pub fn set_field(doc: &str, field: &str, value: &str) -> String {
    let pattern = field_pattern(field);
    let line = format!("{} {}", field, value);

    if pattern.is_match(doc) {
        pattern.replace_all(doc, NoExpand(&line)).into_owned()
    } else {
        debug!("línea {} ausente en el CONTROL file, se agrega", field);
        format!("{}\n{}", line, doc)
    }
}

/// Escribe START_DATE / END_DATE del intervalo en el contenido de un CONTROL file.
/// END_DATE se procesa primero, así un documento sin ninguno de los dos
/// queda con START_DATE en la primera línea.
pub fn replace_control_dates(doc: &str, interval: &DateInterval) -> String {
    let doc = set_field(doc, END_FIELD, &interval.end_str());
    set_field(&doc, START_FIELD, &interval.start_str())
}
