//! CSV as a list of records.
//!
//! Import requires a header row and yields one object of string fields per
//! record. Export writes arrays of objects with the union of their keys as
//! header; anything other than an array exports as an empty document.

use indexmap::IndexSet;
use serde_json::{Map, Value};

use super::{Codec, DocType};
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl Codec for CsvCodec {
    fn doc_type(&self) -> DocType {
        DocType::Csv
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ParseError::Csv(e.to_string()))?
            .clone();
        if headers.is_empty() {
            return Err(ParseError::MissingCsvHeader);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ParseError::Csv(e.to_string()))?;
            let row: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_owned(), Value::String(v.to_owned())))
                .collect();
            rows.push(Value::Object(row));
        }
        Ok(Value::Array(rows))
    }

    fn stringify(&self, value: &Value) -> Result<String> {
        let Value::Array(rows) = value else {
            return Ok(String::new());
        };

        let header: IndexSet<&str> = rows
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .terminator(::csv::Terminator::CRLF)
            .from_writer(Vec::new());
        let csv_err = |e: ::csv::Error| ParseError::Csv(e.to_string());

        if !header.is_empty() {
            writer.write_record(&header).map_err(csv_err)?;
        }
        for row in rows {
            let fields: Vec<String> = match row {
                Value::Object(map) => header.iter().map(|k| cell(map.get(*k))).collect(),
                Value::Array(items) => items.iter().map(|v| cell(Some(v))).collect(),
                other => vec![cell(Some(other))],
            };
            writer.write_record(&fields).map_err(csv_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ParseError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ParseError::Csv(e.to_string()))
    }
}

/// Text of one cell: strings verbatim, `null`/missing empty, containers as JSON.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
