use serde::{Deserialize, Serialize};

use super::calculator::{ActivityLevel, BiometricProfile, CalorieRange, Gender, WeightGoal};

const INCHES_PER_FOOT: i64 = 12;
/// Upper bounds on what the form accepts.
const MAX_AGE_YEARS: u32 = 130;
const MAX_WEIGHT_LB: f64 = 1500.0;
const MAX_HEIGHT_IN: u32 = 108;

/// Profile form as submitted. Every field is optional here so that missing
/// ones can be reported together.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub gender: Option<String>,
    pub age: Option<i64>,
    pub weight_lb: Option<f64>,
    pub height_feet: Option<i64>,
    pub height_inches: Option<i64>,
    /// Total inches; wins over feet + inches when both are sent.
    pub height_in: Option<i64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<WeightGoal>,
}

impl ProfileRequest {
    /// A complete profile within plausible bounds, or a message naming what is wrong.
    pub fn into_profile(self) -> Result<BiometricProfile, String> {
        let mut missing = Vec::new();
        if self.gender.is_none() {
            missing.push("gender");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.weight_lb.is_none() {
            missing.push("weight_lb");
        }
        if self.height_in.is_none() && self.height_feet.is_none() {
            missing.push("height_feet");
        }
        if self.activity_level.is_none() {
            missing.push("activity_level");
        }
        let (Some(gender), Some(age), Some(weight_lb), Some(activity_level)) =
            (self.gender, self.age, self.weight_lb, self.activity_level)
        else {
            return Err(format!("missing fields: {}", missing.join(", ")));
        };
        if !missing.is_empty() {
            return Err(format!("missing fields: {}", missing.join(", ")));
        }

        let gender = match gender.trim().to_ascii_lowercase().as_str() {
            "male" => Gender::Male,
            "female" => Gender::Female,
            other => return Err(format!("gender must be male or female, got {other:?}")),
        };
        let height_in = match (self.height_in, self.height_feet) {
            (Some(total), _) => total,
            (None, Some(feet)) => {
                let inches = self.height_inches.unwrap_or(0);
                if !(0..INCHES_PER_FOOT).contains(&inches) {
                    return Err("height_inches must be between 0 and 11".into());
                }
                feet.checked_mul(INCHES_PER_FOOT)
                    .and_then(|v| v.checked_add(inches))
                    .ok_or_else(|| format!("height must be at most {MAX_HEIGHT_IN} inches"))?
            }
            (None, None) => return Err("missing fields: height_feet".into()),
        };

        let age = bounded_u32("age", age, MAX_AGE_YEARS)?;
        let height_in = bounded_u32("height", height_in, MAX_HEIGHT_IN)?;
        if !weight_lb.is_finite() || weight_lb <= 0.0 || weight_lb > MAX_WEIGHT_LB {
            return Err(format!("weight_lb must be greater than zero and at most {MAX_WEIGHT_LB}"));
        }

        Ok(BiometricProfile {
            gender,
            age,
            weight_lb,
            height_in,
            activity_level,
            goal: self.goal.unwrap_or_default(),
        })
    }
}

fn bounded_u32(field: &str, value: i64, max: u32) -> Result<u32, String> {
    match u32::try_from(value) {
        Ok(v) if (1..=max).contains(&v) => Ok(v),
        _ => Err(format!("{field} must be a whole number between 1 and {max}")),
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Option<BiometricProfile>,
    pub calorie_goal: i64,
    pub range: CalorieRange,
    pub onboarding_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub onboarding_complete: bool,
}
