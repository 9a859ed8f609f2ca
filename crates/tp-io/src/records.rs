//! Loaders for the four input record files.
//!
//! Every loader has a path form and a `_reader` form that accepts any
//! `Read` source, for tests (`std::io::Cursor`) and piped input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use tp_fleet::{PresetRecord, VehicleRecord};
use tp_network::{CrossRecord, RoadRecord};

use crate::{IoError, IoResult};

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// One non-comment line as integers, with its 1-based line number.
struct Row {
    line:   u64,
    fields: Vec<i64>,
}

impl Row {
    fn parse(record: &StringRecord) -> IoResult<Option<Row>> {
        let line = record.position().map_or(0, |p| p.line());
        let mut fields = Vec::with_capacity(record.len());
        for raw in record.iter() {
            let field = raw.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace());
            if field.is_empty() {
                continue;
            }
            let value = field
                .parse::<i64>()
                .map_err(|_| IoError::Parse { line, reason: format!("{field:?} is not an integer") })?;
            fields.push(value);
        }
        Ok((!fields.is_empty()).then_some(Row { line, fields }))
    }

    fn error(&self, reason: impl Into<String>) -> IoError {
        IoError::Parse { line: self.line, reason: reason.into() }
    }

    fn expect_len(&self, what: &str, len: usize) -> IoResult<()> {
        if self.fields.len() == len {
            Ok(())
        } else {
            Err(self.error(format!("{what} record needs {len} fields, found {}", self.fields.len())))
        }
    }

    /// Field `i` as a non-negative id or quantity.
    fn uint(&self, i: usize) -> IoResult<u32> {
        let v = self.fields[i];
        u32::try_from(v).map_err(|_| self.error(format!("field {} out of range: {v}", i + 1)))
    }

    /// Field `i` as a `0`/`1` flag.
    fn flag(&self, i: usize) -> IoResult<bool> {
        match self.fields[i] {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(self.error(format!("field {} must be 0 or 1, found {v}", i + 1))),
        }
    }

    /// Field `i` as a road slot, `-1` meaning empty.
    fn slot(&self, i: usize) -> IoResult<Option<u32>> {
        match self.fields[i] {
            -1 => Ok(None),
            _ => self.uint(i).map(Some),
        }
    }
}

fn rows<R: Read>(reader: R) -> IoResult<Vec<Row>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for result in csv_reader.records() {
        if let Some(row) = Row::parse(&result?)? {
            out.push(row);
        }
    }
    Ok(out)
}

fn open(path: &Path) -> IoResult<File> {
    log::debug!("reading {}", path.display());
    Ok(File::open(path)?)
}

// ── Roads ─────────────────────────────────────────────────────────────────────

pub fn load_roads(path: &Path) -> IoResult<Vec<RoadRecord>> {
    load_roads_reader(open(path)?)
}

pub fn load_roads_reader<R: Read>(reader: R) -> IoResult<Vec<RoadRecord>> {
    rows(reader)?
        .iter()
        .map(|row| {
            row.expect_len("road", 7)?;
            Ok(RoadRecord {
                id:          row.uint(0)?,
                length:      row.uint(1)?,
                speed_limit: row.uint(2)?,
                lanes:       row.uint(3)?,
                from:        row.uint(4)?,
                to:          row.uint(5)?,
                duplex:      row.flag(6)?,
            })
        })
        .collect()
}

// ── Intersections ─────────────────────────────────────────────────────────────

pub fn load_crosses(path: &Path) -> IoResult<Vec<CrossRecord>> {
    load_crosses_reader(open(path)?)
}

pub fn load_crosses_reader<R: Read>(reader: R) -> IoResult<Vec<CrossRecord>> {
    rows(reader)?
        .iter()
        .map(|row| {
            row.expect_len("intersection", 5)?;
            Ok(CrossRecord {
                id:    row.uint(0)?,
                roads: [row.slot(1)?, row.slot(2)?, row.slot(3)?, row.slot(4)?],
            })
        })
        .collect()
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

pub fn load_cars(path: &Path) -> IoResult<Vec<VehicleRecord>> {
    load_cars_reader(open(path)?)
}

pub fn load_cars_reader<R: Read>(reader: R) -> IoResult<Vec<VehicleRecord>> {
    rows(reader)?
        .iter()
        .map(|row| {
            row.expect_len("car", 7)?;
            Ok(VehicleRecord {
                id:        row.uint(0)?,
                src:       row.uint(1)?,
                dest:      row.uint(2)?,
                max_speed: row.uint(3)?,
                plan_time: row.uint(4)?,
                priority:  row.flag(5)?,
                preset:    row.flag(6)?,
            })
        })
        .collect()
}

// ── Preset routes ─────────────────────────────────────────────────────────────

pub fn load_presets(path: &Path) -> IoResult<Vec<PresetRecord>> {
    load_presets_reader(open(path)?)
}

pub fn load_presets_reader<R: Read>(reader: R) -> IoResult<Vec<PresetRecord>> {
    rows(reader)?
        .iter()
        .map(|row| {
            if row.fields.len() < 3 {
                return Err(row.error("preset route needs a car, a start time, and at least one road"));
            }
            Ok(PresetRecord {
                vehicle:    row.uint(0)?,
                start_time: row.uint(1)?,
                roads:      (2..row.fields.len()).map(|i| row.uint(i)).collect::<IoResult<_>>()?,
            })
        })
        .collect()
}
