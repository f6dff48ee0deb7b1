use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::error::RangeError;

/// Formato de fecha usado en nombres de carpetas y en el CONTROL file.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Intervalo cerrado de fechas `[start, end]`.
/// Sólo se construye validado, así que siempre vale `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Cantidad de días cubiertos, contando ambos extremos.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_str(), self.end_str())
    }
}

/// Parsea una fecha `YYYYMMDD` (o `YYYY-MM-DD`).
pub fn parse_date(raw: &str) -> Result<NaiveDate, RangeError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| RangeError::InvalidDate(raw.to_string()))
}

/// Parte `[start, end]` en intervalos consecutivos de a lo sumo `chunk_days` días.
///
/// El último intervalo se recorta a `end`. El resultado está ordenado,
/// no tiene huecos ni solapamientos y cubre exactamente el rango pedido.
pub fn partition(
    start: NaiveDate,
    end: NaiveDate,
    chunk_days: u32,
) -> Result<Vec<DateInterval>, RangeError> {
    if chunk_days < 1 {
        return Err(RangeError::InvalidChunkSize(chunk_days));
    }
    // valida start <= end
    DateInterval::new(start, end)?;

    let span = Days::new(u64::from(chunk_days - 1));
    let mut out = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let chunk_end = cursor
            .checked_add_days(span)
            .map_or(end, |d| d.min(end));

        out.push(DateInterval {
            start: cursor,
            end: chunk_end,
        });

        match chunk_end.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    #[test]
    fn partition_escenario_de_dos_dias() {
        let out = partition(d("20130203"), d("20130207"), 2).unwrap();

        let got: Vec<(String, String)> = out
            .iter()
            .map(|i| (i.start_str(), i.end_str()))
            .collect();

        assert_eq!(
            got,
            vec![
                ("20130203".to_string(), "20130204".to_string()),
                ("20130205".to_string(), "20130206".to_string()),
                ("20130207".to_string(), "20130207".to_string()),
            ]
        );
    }

    #[test]
    fn partition_chunk_mayor_que_el_rango_da_un_solo_intervalo() {
        let out = partition(d("20130203"), d("20130207"), 30).unwrap();
        assert_eq!(out, vec![DateInterval::new(d("20130203"), d("20130207")).unwrap()]);
    }

    #[test]
    fn partition_un_solo_dia() {
        let out = partition(d("20200229"), d("20200229"), 1).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].num_days(), 1);
    }

    #[test]
    fn partition_cubre_el_rango_sin_huecos_ni_solapes() {
        let start = d("20121220");
        for total_days in 0..40_u64 {
            let end = start.checked_add_days(Days::new(total_days)).unwrap();
            for chunk in 1..12_u32 {
                let out = partition(start, end, chunk).unwrap();

                assert_eq!(out.first().unwrap().start(), start);
                assert_eq!(out.last().unwrap().end(), end);

                for pair in out.windows(2) {
                    assert_eq!(pair[0].end().succ_opt().unwrap(), pair[1].start());
                }
                for i in &out {
                    assert!(i.start() <= i.end());
                    assert!(i.num_days() <= i64::from(chunk));
                }

                let covered: i64 = out.iter().map(|i| i.num_days()).sum();
                assert_eq!(covered, total_days as i64 + 1);
            }
        }
    }

    #[test]
    fn partition_rechaza_rango_invertido() {
        let err = partition(d("20130207"), d("20130203"), 1).unwrap_err();
        assert!(matches!(err, RangeError::InvalidRange { .. }));
    }

    #[test]
    fn partition_rechaza_chunk_cero() {
        let err = partition(d("20130203"), d("20130207"), 0).unwrap_err();
        assert!(matches!(err, RangeError::InvalidChunkSize(0)));
    }

    #[test]
    fn parse_date_acepta_ambos_formatos() {
        assert_eq!(d("20130206"), d("2013-02-06"));
        assert!(matches!(
            parse_date("2013/02/06"),
            Err(RangeError::InvalidDate(_))
        ));
    }

    #[test]
    fn display_usa_formato_compacto() {
        let i = DateInterval::new(d("20130205"), d("20130206")).unwrap();
        assert_eq!(i.to_string(), "20130205-20130206");
    }
}
