//! Tolerant deserializers for values produced by generative backends.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::expense::rules::amounts::parse_brl_amount;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Text(String),
    Number(Decimal),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

/// Text from a string, number or boolean. Blank strings are null.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawText>::deserialize(deserializer)? {
        Some(RawText::Text(text)) if text.trim().is_empty() => None,
        Some(RawText::Text(text)) => Some(text),
        Some(RawText::Integer(value)) => Some(value.to_string()),
        Some(RawText::Float(value)) => Some(value.to_string()),
        Some(RawText::Flag(value)) => Some(value.to_string()),
        None => None,
    })
}

/// Decimal from a number, `"1234.56"`, `"1.234,56"` or null.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawDecimal>::deserialize(deserializer)? {
        Some(RawDecimal::Number(value)) => Some(value),
        Some(RawDecimal::Text(text)) => parse_brl_amount(&text),
        None => None,
    })
}

/// Date in ISO, day-first or month-first notation. Blank and zero dates are null.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_date(&text))
}

/// Small counts that may arrive quoted.
pub fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCount>::deserialize(deserializer)? {
        Some(RawCount::Number(value)) => Some(value),
        Some(RawCount::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Lists that may arrive as null.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text == "0000-00-00" {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 31);
        assert_eq!(parse_date("2025-01-31"), expected);
        assert_eq!(parse_date("31/01/2025"), expected);
        assert_eq!(parse_date("01/31/2025"), expected);
    }

    #[test]
    fn test_parse_date_blank_and_zero() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("0000-00-00"), None);
        assert_eq!(parse_date("amanhã"), None);
    }
}
