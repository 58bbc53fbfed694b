//! Lenient parsing of monetary values.
//!
//! Form fields and backend payloads both carry amounts that may be empty,
//! textual, or missing entirely. None of those cases is an error: anything
//! that does not read as a plain number counts as zero.

use serde::{Deserialize, Deserializer};

/// Parse a monetary form field.
///
/// Empty, non-numeric, negative and non-finite input all yield `0.0`.
pub fn parse_amount(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Parse a signed figure (profit, closing balance). Only non-numeric and
/// non-finite input yield `0.0`.
pub fn parse_figure(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Serde adapter for non-negative amounts: numbers, numeric strings, `null`
/// and garbage are all accepted.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) if n.is_finite() && n > 0.0 => n,
        Some(RawNumber::Text(s)) => parse_amount(&s),
        _ => 0.0,
    })
}

/// Serde adapter for signed figures.
pub fn deserialize_figure<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(RawNumber::Number(n)) if n.is_finite() => n,
        Some(RawNumber::Text(s)) => parse_figure(&s),
        _ => 0.0,
    })
}
