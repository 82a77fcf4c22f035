//! Parser for the vehicle schedule flat file.
//!
//! One record per line, eleven comma-separated fields in fixed order:
//!
//! ```text
//! vehicle_type,route,schedule,shift,bus_number,low_floor,trip_start,trip_end,direction_id,direction_type,direction_name
//! ```
//!
//! Fields are trimmed. The last field keeps any further commas, so direction
//! names like `Center, Station` survive. Blank lines are skipped. Any other
//! deviation is a [`IngestError::Parse`] naming the line and field.

use std::iter::Enumerate;
use std::str::{Lines, SplitN};

use super::IngestError;
use crate::storage::ScheduleRecord;

const FIELD_COUNT: usize = 11;

/// Lazy iterator over the records of a schedule file.
///
/// Cloning yields an independent iterator from the same position, so a
/// fresh `parse` (or a clone taken up front) restarts the sequence.
#[derive(Debug, Clone)]
pub struct ScheduleRecords<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl Iterator for ScheduleRecords<'_> {
    type Item = Result<ScheduleRecord, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, line) = self.lines.next()?;
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_line(idx + 1, line));
        }
    }
}

/// Start parsing raw schedule bytes.
///
/// Only UTF-8 validation happens eagerly; lines are parsed on demand.
pub fn parse(raw: &[u8]) -> Result<ScheduleRecords<'_>, IngestError> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        let valid = raw.get(..e.valid_up_to()).unwrap_or_default();
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        IngestError::Parse {
            line,
            field: "line",
            reason: "invalid UTF-8".into(),
        }
    })?;

    Ok(ScheduleRecords {
        lines: text.lines().enumerate(),
    })
}

/// Parse every record, aborting on the first malformed line.
pub fn parse_all(raw: &[u8]) -> Result<Vec<ScheduleRecord>, IngestError> {
    parse(raw)?.collect()
}

/// Sequential reader over the fields of one line.
struct Fields<'a> {
    line: usize,
    parts: SplitN<'a, char>,
}

impl<'a> Fields<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        Self {
            line,
            parts: text.splitn(FIELD_COUNT, ','),
        }
    }

    fn error(&self, field: &'static str, reason: impl Into<String>) -> IngestError {
        IngestError::Parse {
            line: self.line,
            field,
            reason: reason.into(),
        }
    }

    fn text(&mut self, field: &'static str) -> Result<&'a str, IngestError> {
        self.parts
            .next()
            .map(str::trim)
            .ok_or_else(|| self.error(field, format!("missing field (expected {FIELD_COUNT})")))
    }

    fn owned(&mut self, field: &'static str) -> Result<String, IngestError> {
        self.text(field).map(str::to_string)
    }

    fn int(&mut self, field: &'static str) -> Result<i64, IngestError> {
        let raw = self.text(field)?;
        raw.parse()
            .map_err(|_| self.error(field, format!("'{raw}' is not an integer")))
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, IngestError> {
        match self.text(field)? {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => Err(self.error(field, format!("'{other}' is not a flag (0/1)"))),
        }
    }
}

fn parse_line(line: usize, text: &str) -> Result<ScheduleRecord, IngestError> {
    let mut f = Fields::new(line, text);

    let vehicle_type = f.owned("vehicle_type")?;
    let route = f.owned("route")?;
    let schedule = f.int("schedule")?;
    let shift = f.int("shift")?;
    let bus_number = f.owned("bus_number")?;
    if bus_number.is_empty() {
        return Err(f.error("bus_number", "empty key"));
    }
    let low_floor = f.flag("low_floor")?;
    let trip_start = f.int("trip_start")?;
    let trip_end = f.int("trip_end")?;
    let direction_id = f.int("direction_id")?;
    let direction_type = f.owned("direction_type")?;
    let direction_name = f.owned("direction_name")?;

    Ok(ScheduleRecord {
        vehicle_type,
        route,
        schedule,
        shift,
        bus_number,
        low_floor,
        trip_start,
        trip_end,
        direction_id,
        direction_type,
        direction_name,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TWO_LINES: &str = "\
bus,3G,101,1,B1,1,330,1410,1,a-b,Center - Airport
trolleybus,7,202,2,T9,0,345,1380,2,b-a,Depot, North Gate
";

    fn parse_err(input: &str) -> (usize, &'static str) {
        match parse_all(input.as_bytes()).unwrap_err() {
            IngestError::Parse { line, field, .. } => (line, field),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn parses_all_fields() {
        let records = parse_all(TWO_LINES.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.vehicle_type, "bus");
        assert_eq!(first.route, "3G");
        assert_eq!(first.schedule, 101);
        assert_eq!(first.shift, 1);
        assert_eq!(first.bus_number, "B1");
        assert!(first.low_floor);
        assert_eq!(first.trip_start, 330);
        assert_eq!(first.trip_end, 1410);
        assert_eq!(first.direction_id, 1);
        assert_eq!(first.direction_type, "a-b");
        assert_eq!(first.direction_name, "Center - Airport");
    }

    #[test]
    fn last_field_keeps_commas() {
        let records = parse_all(TWO_LINES.as_bytes()).unwrap();
        assert_eq!(records[1].direction_name, "Depot, North Gate");
        assert!(!records[1].low_floor);
    }

    #[test]
    fn skips_blank_lines_and_handles_crlf() {
        let input = "\r\n bus , 1 ,1,1, B1 ,true,0,0,0,x,y \r\n\r\n";
        let records = parse_all(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bus_number, "B1");
        assert_eq!(records[0].route, "1");
        assert_eq!(records[0].direction_name, "y");
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(parse_all(b"").unwrap().is_empty());
    }

    #[test]
    fn iterator_is_lazy_and_restartable() {
        let records = parse(TWO_LINES.as_bytes()).unwrap();
        let snapshot = records.clone();

        assert_eq!(records.count(), 2);
        let again: Vec<_> = snapshot.map(Result::unwrap).collect();
        assert_eq!(again[0].bus_number, "B1");
    }

    #[test]
    fn lazy_iteration_yields_good_records_before_a_bad_line() {
        let input = "bus,1,1,1,B1,1,0,0,0,x,y\nbroken\n";
        let mut records = parse(input.as_bytes()).unwrap();
        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
    }

    #[test]
    fn one_bad_line_aborts_the_whole_parse() {
        let input = "\
bus,1,1,1,B1,1,0,0,0,x,y
bus,1,xx,1,B2,1,0,0,0,x,y
bus,1,1,1,B3,1,0,0,0,x,y
";
        assert_eq!(parse_err(input), (2, "schedule"));
    }

    #[test]
    fn reports_missing_fields() {
        assert_eq!(parse_err("bus,1,1,1,B1,1,0,0"), (1, "direction_id"));
    }

    #[test]
    fn reports_bad_flag() {
        assert_eq!(parse_err("bus,1,1,1,B1,yes,0,0,0,x,y"), (1, "low_floor"));
    }

    #[test]
    fn reports_empty_bus_number() {
        assert_eq!(parse_err("bus,1,1,1,  ,1,0,0,0,x,y"), (1, "bus_number"));
    }

    #[test]
    fn line_numbers_count_skipped_blank_lines() {
        assert_eq!(
            parse_err("\n\nbus,1,1,1,B1,1,zero,0,0,x,y"),
            (3, "trip_start")
        );
    }

    #[test]
    fn invalid_utf8_reports_its_line() {
        let mut input = b"bus,1,1,1,B1,1,0,0,0,x,y\n".to_vec();
        input.extend_from_slice(b"bus,1,1,1,\xff\xfe,1,0,0,0,x,y\n");
        match parse(&input).unwrap_err() {
            IngestError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
