//! JSON-lines boundary: reading load requests and writing decisions.
//!
//! All format validation happens here, once, so the engine only ever sees
//! fully typed requests: a record that fails to parse is a boundary error,
//! never a quota rejection.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Amount;
use crate::amount::ParseAmountError;
use crate::model::{Decision, LoadRequest};

/// Timestamp format carried by load records: ISO-8601 with a literal Z.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Errors that can occur for individual input lines.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("line {line}: {source}")]
    Io { line: usize, source: io::Error },

    #[error("line {line}: failed to parse record: {source}")]
    Record {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: invalid load amount: {source}")]
    Amount {
        line: usize,
        source: ParseAmountError,
    },

    #[error("line {line}: invalid timestamp {time:?}")]
    Timestamp { line: usize, time: String },
}

#[derive(Debug, Deserialize)]
struct InputRecord {
    id: String,
    customer_id: String,
    load_amount: String,
    time: String,
}

#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    id: &'a str,
    customer_id: &'a str,
    accepted: bool,
}

/// Read load requests from a JSON-lines file.
///
/// Blank lines are skipped; every other line yields a fully parsed
/// request or a line-numbered error.
pub fn read_loads(path: impl AsRef<Path>) -> impl Iterator<Item = Result<LoadRequest, JsonError>> {
    let file = File::open(path).expect("failed to open input file");

    BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(|(idx, result)| {
            let line = idx + 1;
            let text = match result {
                Ok(text) => text,
                Err(source) => return Some(Err(JsonError::Io { line, source })),
            };
            if text.trim().is_empty() {
                return None;
            }
            Some(parse_line(line, &text))
        })
}

fn parse_line(line: usize, text: &str) -> Result<LoadRequest, JsonError> {
    let record: InputRecord =
        serde_json::from_str(text).map_err(|source| JsonError::Record { line, source })?;

    let amount = Amount::parse_prefixed(&record.load_amount)
        .map_err(|source| JsonError::Amount { line, source })?;
    let timestamp =
        NaiveDateTime::parse_from_str(&record.time, TIME_FORMAT).map_err(|_| {
            JsonError::Timestamp {
                line,
                time: record.time.clone(),
            }
        })?;

    Ok(LoadRequest {
        customer: record.customer_id,
        load: record.id,
        amount,
        timestamp,
    })
}

/// Serialize one decision as a single JSON line.
pub fn write_decision(writer: &mut impl Write, decision: &Decision) -> io::Result<()> {
    let row = OutputRecord {
        id: &decision.load,
        customer_id: &decision.customer,
        accepted: decision.accepted,
    };
    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")
}

/// Write decisions to stdout, one JSON object per line.
pub fn write_decisions(decisions: impl IntoIterator<Item = Decision>) {
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    for decision in decisions {
        write_decision(&mut writer, &decision).expect("failed to write decision");
    }

    writer.flush().expect("failed to flush decisions");
}
