use log::warn;
use serde::{Deserialize, Serialize};

/// A numeric form field as typed: either a JSON number or free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

impl NumericInput {
    /// Parsed value, or None when the field is blank, unparseable or not finite.
    pub fn parse(&self) -> Option<f64> {
        match self {
            NumericInput::Number(value) => Some(*value).filter(|v| v.is_finite()),
            NumericInput::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
    }
}

/// Coerce an optional numeric field to a number; anything unparseable becomes 0.
pub fn coerce_f64(field: &str, value: Option<&NumericInput>) -> f64 {
    match value {
        None => 0.0,
        Some(raw) => match raw.parse() {
            Some(parsed) => parsed,
            None => {
                if !matches!(raw, NumericInput::Text(text) if text.trim().is_empty()) {
                    warn!("Coercing unparseable {} value {:?} to 0", field, raw);
                }
                0.0
            }
        },
    }
}

/// Optional numeric field that stays absent when blank or unparseable.
pub fn optional_f64(field: &str, value: Option<&NumericInput>) -> Option<f64> {
    let raw = value?;
    let parsed = raw.parse();
    if parsed.is_none() && !matches!(raw, NumericInput::Text(text) if text.trim().is_empty()) {
        warn!("Ignoring unparseable {} value {:?}", field, raw);
    }
    parsed
}

/// Positive tick size, falling back to `default` when absent, unparseable or not positive.
pub fn tick_size_or_default(value: Option<&NumericInput>, default: f64) -> f64 {
    match value.and_then(NumericInput::parse) {
        Some(size) if size > 0.0 => size,
        _ => default,
    }
}

/// Whole positive quantity; absent, unparseable or non-positive input becomes 1.
pub fn quantity_or_default(value: Option<&NumericInput>) -> u32 {
    match value.and_then(NumericInput::parse) {
        Some(quantity) if quantity.trunc() >= 1.0 => quantity.trunc().min(u32::MAX as f64) as u32,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_garbage_to_zero() {
        assert_eq!(coerce_f64("entry", Some(&"abc".into())), 0.0);
        assert_eq!(coerce_f64("entry", Some(&"".into())), 0.0);
        assert_eq!(coerce_f64("entry", None), 0.0);
        assert_eq!(coerce_f64("entry", Some(&" 101.25 ".into())), 101.25);
        assert_eq!(coerce_f64("entry", Some(&NumericInput::Number(f64::NAN))), 0.0);
    }

    #[test]
    fn tick_size_falls_back_when_not_positive() {
        assert_eq!(tick_size_or_default(None, 0.25), 0.25);
        assert_eq!(tick_size_or_default(Some(&0.0.into()), 0.25), 0.25);
        assert_eq!(tick_size_or_default(Some(&(-1.0).into()), 0.25), 0.25);
        assert_eq!(tick_size_or_default(Some(&"x".into()), 0.25), 0.25);
        assert_eq!(tick_size_or_default(Some(&"0.1".into()), 0.25), 0.1);
    }

    #[test]
    fn quantity_defaults_to_one() {
        assert_eq!(quantity_or_default(None), 1);
        assert_eq!(quantity_or_default(Some(&0.0.into())), 1);
        assert_eq!(quantity_or_default(Some(&(-3.0).into())), 1);
        assert_eq!(quantity_or_default(Some(&"2.7".into())), 2);
        assert_eq!(quantity_or_default(Some(&4.0.into())), 4);
    }

    #[test]
    fn optional_values_stay_absent_when_blank() {
        assert_eq!(optional_f64("mfe", None), None);
        assert_eq!(optional_f64("mfe", Some(&" ".into())), None);
        assert_eq!(optional_f64("mfe", Some(&"bad".into())), None);
        assert_eq!(optional_f64("mfe", Some(&"107".into())), Some(107.0));
    }
}
