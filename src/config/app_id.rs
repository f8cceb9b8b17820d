//! GitHub App id parsed from free-form text.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Numeric app id, or the raw text when it does not coerce to one.
///
/// Coercion never fails: malformed input becomes [`AppId::NotANumber`] and
/// callers decide downstream whether that matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppId {
    Id(u64),
    NotANumber(String),
}

impl AppId {
    /// Coerces text to an app id.
    ///
    /// Whitespace is trimmed and empty text is `0`. Accepts decimal digits with
    /// an optional `+`, `0x`/`0o`/`0b` prefixed integers, and float literals
    /// that denote a non-negative integer (`"1e3"`, `"42.0"`).
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return AppId::Id(0);
        }

        let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
            .iter()
            .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|rest| (rest, *radix)));
        if let Some((digits, radix)) = radix {
            // `from_str_radix` would accept a sign after the prefix.
            if !digits.chars().next().is_some_and(|c| c.is_digit(radix)) {
                return AppId::NotANumber(text.to_string());
            }
            return u64::from_str_radix(digits, radix)
                .map(AppId::Id)
                .unwrap_or_else(|_| AppId::NotANumber(text.to_string()));
        }

        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if unsigned.starts_with('+') {
            return AppId::NotANumber(text.to_string());
        }
        if let Ok(id) = unsigned.parse::<u64>() {
            return AppId::Id(id);
        }

        // Rust accepts "inf" and "nan" here, the finiteness check rejects both.
        // `u64::MAX as f64` rounds up to 2^64, which must not saturate into an id.
        match unsigned.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64 => {
                AppId::Id(n as u64)
            }
            _ => AppId::NotANumber(text.to_string()),
        }
    }

    /// The numeric id, or `None` for the not-a-number sentinel.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AppId::Id(id) => Some(*id),
            AppId::NotANumber(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, AppId::Id(_))
    }
}

impl From<u64> for AppId {
    fn from(id: u64) -> Self {
        AppId::Id(id)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppId::Id(id) => write!(f, "{}", id),
            AppId::NotANumber(_) => write!(f, "NaN"),
        }
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(id) => AppId::Id(id),
            Raw::Text(text) => AppId::parse(&text),
        })
    }
}
