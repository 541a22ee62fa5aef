use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AnalysisError;

/// Most calories a single logged entry may carry.
pub const MAX_ENTRY_CALORIES: u32 = 20_000;

/// Nutrition estimate for one photo, as returned by a vision provider and
/// confirmed by the user before logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub calories: u32,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub fiber: String,
    pub sugar: String,
    pub confidence: f64,
}

pub(crate) fn is_valid_grams(value: &str) -> bool {
    lazy_static! {
        static ref GRAMS_RE: Regex = Regex::new(r"^\d+(\.\d+)?g$").unwrap();
    }
    GRAMS_RE.is_match(value)
}

impl AnalysisResult {
    /// Checks a client-supplied result before it becomes a ledger entry.
    pub fn validate(&self) -> Result<(), String> {
        if self.food_name.trim().is_empty() {
            return Err("foodName must not be empty".into());
        }
        if self.calories > MAX_ENTRY_CALORIES {
            return Err(format!("calories must be at most {MAX_ENTRY_CALORIES}"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err("confidence must be between 0 and 1".into());
        }
        for (field, value) in self.macros() {
            if !is_valid_grams(value) {
                return Err(format!("{field} must look like \"<number>g\", got {value:?}"));
            }
        }
        Ok(())
    }

    fn macros(&self) -> [(&'static str, &str); 5] {
        [
            ("protein", &self.protein),
            ("carbs", &self.carbs),
            ("fat", &self.fat),
            ("fiber", &self.fiber),
            ("sugar", &self.sugar),
        ]
    }

    /// Build a result from a provider's loosely-typed JSON reply.
    pub fn from_provider_json(raw: &Value, default_confidence: f64) -> Result<Self, AnalysisError> {
        let food_name = raw
            .get("foodName")
            .or_else(|| raw.get("food_name"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AnalysisError::InvalidResponse("missing food name".into()))?
            .to_string();

        let calories = raw
            .get("calories")
            .and_then(number_of)
            .map_or(0, |c| c.round().clamp(0.0, f64::from(MAX_ENTRY_CALORIES)) as u32);

        let confidence = raw
            .get("confidence")
            .and_then(number_of)
            .unwrap_or(default_confidence)
            .clamp(0.0, 1.0);

        Ok(Self {
            food_name,
            calories,
            protein: grams_of(raw.get("protein")),
            carbs: grams_of(raw.get("carbs")),
            fat: grams_of(raw.get("fat")),
            fiber: grams_of(raw.get("fiber")),
            sugar: grams_of(raw.get("sugar")),
            confidence,
        })
    }
}

/// Finite number from a JSON number or a numeric string; "NaN" and "inf" read as absent.
fn number_of(value: &Value) -> Option<f64> {
    let n: Option<f64> = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('g').trim().parse().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Render any numeric-ish macro as "<number>g"; missing or garbage reads as "0g".
fn grams_of(value: Option<&Value>) -> String {
    let grams = value.and_then(number_of).filter(|g| *g >= 0.0).unwrap_or(0.0);
    format!("{grams}g")
}

/// Strip Markdown code fences a model may wrap its JSON in.
pub(crate) fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
