//! Daily calorie goal from a biometric profile.
//!
//! Basal rate uses the revised Harris-Benedict equations, scaled by an activity
//! multiplier and shifted by the weight-change goal. Nothing here validates its
//! inputs: callers gate on a complete profile before asking for a goal.

use serde::{Deserialize, Serialize};
use tracing::warn;

const KG_PER_LB: f64 = 0.453592;
const CM_PER_IN: f64 = 2.54;

/// Lowest goal handed out on the "lose" branch.
pub const MIN_LOSE_GOAL: i64 = 1200;
/// Daily deficit/surplus for roughly one pound per week.
pub const GOAL_ADJUSTMENT_KCAL: i64 = 500;
/// Half-width of the "on target" band around a goal.
pub const RANGE_HALF_WIDTH_KCAL: i64 = 200;
/// Goal reported before any profile has been saved.
pub const DEFAULT_CALORIE_GOAL: i64 = 2000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Self-reported activity. Unrecognised strings read as `Light`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sedentary" => Self::Sedentary,
            "light" => Self::Light,
            "moderate" => Self::Moderate,
            "active" => Self::Active,
            "veryActive" => Self::VeryActive,
            other => {
                warn!(activity_level = %other, "unknown activity level; using light");
                Self::Light
            }
        }
    }
}

/// Weight-change intent. Unrecognised strings read as `Maintain`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum WeightGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl From<String> for WeightGoal {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "lose" => Self::Lose,
            "maintain" => Self::Maintain,
            "gain" => Self::Gain,
            other => {
                warn!(goal = %other, "unknown weight goal; using maintain");
                Self::Maintain
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BiometricProfile {
    pub gender: Gender,
    pub age: u32,
    /// Pounds.
    pub weight_lb: f64,
    /// Total inches.
    pub height_in: u32,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: WeightGoal,
}

impl BiometricProfile {
    pub fn calorie_goal(&self) -> i64 {
        let bmr = compute_bmr(self.gender, self.age, self.weight_lb, self.height_in);
        let daily = apply_activity_multiplier(bmr, self.activity_level);
        apply_goal_adjustment(daily, self.goal)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CalorieRange {
    pub min: i64,
    pub target: i64,
    pub max: i64,
}

/// Basal metabolic rate in kcal/day. May go negative for absurd inputs.
pub fn compute_bmr(gender: Gender, age_years: u32, weight_lb: f64, height_in: u32) -> f64 {
    let weight_kg = weight_lb * KG_PER_LB;
    let height_cm = f64::from(height_in) * CM_PER_IN;
    let age = f64::from(age_years);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// Rounded; out-of-range products saturate at the `i64` bounds.
pub fn apply_activity_multiplier(basal_rate: f64, level: ActivityLevel) -> i64 {
    (basal_rate * level.multiplier()).round() as i64
}

pub fn apply_goal_adjustment(daily_calories: i64, goal: WeightGoal) -> i64 {
    match goal {
        WeightGoal::Lose => daily_calories
            .saturating_sub(GOAL_ADJUSTMENT_KCAL)
            .max(MIN_LOSE_GOAL),
        WeightGoal::Gain => daily_calories.saturating_add(GOAL_ADJUSTMENT_KCAL),
        WeightGoal::Maintain => daily_calories,
    }
}

pub fn calorie_range(target: i64) -> CalorieRange {
    CalorieRange {
        min: target.saturating_sub(RANGE_HALF_WIDTH_KCAL),
        target,
        max: target.saturating_add(RANGE_HALF_WIDTH_KCAL),
    }
}
