use serde::{Deserialize, Serialize};

use super::dates::DateKey;
use super::model::FoodEntry;
use crate::analysis::AnalysisResult;

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// `YYYY-MM-DD`; the selected date when absent.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub direction: i64,
}

/// A confirmed analysis the user chose to log.
#[derive(Debug, Deserialize)]
pub struct AddFoodRequest {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    #[serde(default, alias = "imageReference")]
    pub image_reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LedgerDayResponse {
    pub date: DateKey,
    pub label: String,
    pub total: u64,
    pub foods: Vec<FoodEntry>,
    pub calorie_goal: i64,
    /// Negative once the goal is exceeded.
    pub remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct LoggedDate {
    pub date: DateKey,
    pub label: String,
    pub total: u64,
}
