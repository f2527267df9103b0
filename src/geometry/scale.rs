use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SymbolError};

/// Drawing scales offered to end users (1:10 ... 1:200).
pub const STANDARD_SCALES: [u32; 5] = [10, 20, 50, 100, 200];

/// Real-world centimetres to physical millimetres on paper at `1:scale_ratio`.
pub fn physical_mm(spread_cm: f64, scale_ratio: f64) -> Result<f64> {
    if !scale_ratio.is_finite() || scale_ratio <= 0.0 {
        return Err(SymbolError::scale(
            scale_ratio.to_string(),
            "scale ratio must be a positive number",
        ));
    }
    if !spread_cm.is_finite() || spread_cm < 0.0 {
        return Err(SymbolError::plant(format!(
            "spread must be a non-negative number, got {}",
            spread_cm
        )));
    }
    Ok((spread_cm * 10.0) / scale_ratio)
}

/// A drawing scale `1:ratio`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "ScaleRepr")]
pub struct Scale(f64);

impl Scale {
    pub fn new(ratio: f64) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(SymbolError::scale(
                ratio.to_string(),
                "scale ratio must be a positive number",
            ));
        }
        Ok(Self(ratio))
    }

    pub fn ratio(&self) -> f64 {
        self.0
    }

    pub fn is_standard(&self) -> bool {
        STANDARD_SCALES.iter().any(|&s| f64::from(s) == self.0)
    }

    pub fn physical_mm(&self, length_cm: f64) -> Result<f64> {
        physical_mm(length_cm, self.0)
    }

    /// `1-50`, safe for file names.
    pub fn slug(&self) -> String {
        format!("1-{}", crate::xml::num(self.0))
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(50.0)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1:{}", crate::xml::num(self.0))
    }
}

impl FromStr for Scale {
    type Err = SymbolError;

    /// Accepts `50`, `1:50` and `1/50`.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let ratio = trimmed
            .strip_prefix("1:")
            .or_else(|| trimmed.strip_prefix("1/"))
            .unwrap_or(trimmed)
            .trim();
        let value: f64 = ratio
            .parse()
            .map_err(|_| SymbolError::scale(input, "not a number"))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(SymbolError::scale(
                input,
                "scale ratio must be a positive number",
            ));
        }
        Ok(Self(value))
    }
}

impl Serialize for Scale {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScaleRepr {
    Ratio(f64),
    Text(String),
}

impl TryFrom<ScaleRepr> for Scale {
    type Error = SymbolError;

    fn try_from(repr: ScaleRepr) -> Result<Self> {
        match repr {
            ScaleRepr::Ratio(ratio) => Scale::new(ratio),
            ScaleRepr::Text(text) => text.parse(),
        }
    }
}
