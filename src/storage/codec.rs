//! Line codec for the flat data files
//!
//! One record per line, fields joined with [`FIELD_DELIMITER`]. Each entity
//! type implements [`Record`] to map itself to and from its field list.
//! Files written by older versions may carry only the leading required
//! fields; decoders fill the optional tail with defaults.

use std::str::FromStr;
use chrono::NaiveDate;
use crate::utils::errors::{Result, TrekError};

pub const FIELD_DELIMITER: &str = "%%%";

/// Values that decoding needs but the line does not carry
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext {
    pub default_capacity: u32,
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self {
            default_capacity: crate::models::attraction::DEFAULT_CAPACITY,
        }
    }
}

/// An entity stored as one line of a data file
pub trait Record: Sized {
    /// Collection name, also the file stem
    const COLLECTION: &'static str;
    /// Field counts a line may have, shortest first
    const FIELD_COUNTS: &'static [usize];

    /// Unique key within the collection
    fn key(&self) -> String;

    fn to_fields(&self) -> Vec<String>;

    fn from_fields(fields: &[&str], ctx: &DecodeContext) -> std::result::Result<Self, String>;
}

/// Reason a value cannot be written as a field, if any
pub fn field_problem(value: &str) -> Option<&'static str> {
    if value.contains(FIELD_DELIMITER) {
        Some("contains the field delimiter")
    } else if value.contains('\n') || value.contains('\r') {
        Some("contains a line break")
    } else if value.ends_with('%') {
        // would merge with the following delimiter
        Some("ends with '%'")
    } else {
        None
    }
}

pub fn encode_line<R: Record>(record: &R) -> Result<String> {
    let fields = record.to_fields();
    for field in &fields {
        if let Some(problem) = field_problem(field) {
            return Err(TrekError::invalid(
                R::COLLECTION,
                format!("record '{}' cannot be stored: a field {}", record.key(), problem),
            ));
        }
    }
    Ok(fields.join(FIELD_DELIMITER))
}

pub fn decode_line<R: Record>(line: &str, ctx: &DecodeContext) -> std::result::Result<R, String> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if !R::FIELD_COUNTS.contains(&fields.len()) {
        return Err(format!(
            "expected {:?} fields, found {}",
            R::FIELD_COUNTS,
            fields.len()
        ));
    }
    R::from_fields(&fields, ctx)
}

pub fn parse_field<T>(name: &str, value: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| format!("invalid {} '{}': {}", name, value, e))
}

/// Finite, non-negative decimal
pub fn parse_amount(name: &str, value: &str) -> std::result::Result<f64, String> {
    let amount: f64 = parse_field(name, value)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("invalid {} '{}': must be a non-negative number", name, value));
    }
    Ok(amount)
}

/// ISO-8601 calendar date
pub fn parse_date(name: &str, value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("invalid {} '{}': {}", name, value, e))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
