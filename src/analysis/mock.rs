use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::info;

use super::{AnalysisError, AnalysisResult, FoodAnalyzer, ImagePayload};

struct Sample {
    food_name: &'static str,
    calories: u32,
    protein: &'static str,
    carbs: &'static str,
    fat: &'static str,
    fiber: &'static str,
    sugar: &'static str,
    confidence: f64,
}

static SAMPLES: [Sample; 4] = [
    Sample { food_name: "Apple", calories: 95, protein: "0.5g", carbs: "25g", fat: "0.3g", fiber: "4g", sugar: "19g", confidence: 0.89 },
    Sample { food_name: "Banana", calories: 105, protein: "1.3g", carbs: "27g", fat: "0.4g", fiber: "3g", sugar: "14g", confidence: 0.92 },
    Sample { food_name: "Pizza Slice", calories: 285, protein: "12g", carbs: "36g", fat: "10g", fiber: "2g", sugar: "3g", confidence: 0.85 },
    Sample { food_name: "Mixed Salad", calories: 45, protein: "3g", carbs: "8g", fat: "0.5g", fiber: "3g", sugar: "4g", confidence: 0.78 },
];

impl From<&Sample> for AnalysisResult {
    fn from(s: &Sample) -> Self {
        Self {
            food_name: s.food_name.into(),
            calories: s.calories,
            protein: s.protein.into(),
            carbs: s.carbs.into(),
            fat: s.fat.into(),
            fiber: s.fiber.into(),
            sugar: s.sugar.into(),
            confidence: s.confidence,
        }
    }
}

/// Offline analyzer returning one of a few canned foods after a delay.
/// Selected explicitly with `AI_SERVICE=mock`.
pub struct MockAnalyzer {
    delay: Duration,
}

impl MockAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FoodAnalyzer for MockAnalyzer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let sample = SAMPLES
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| AnalysisError::InvalidResponse("no sample foods".into()))?;
        info!(food = sample.food_name, bytes = image.body.len(), "returning sample analysis");
        Ok(AnalysisResult::from(sample))
    }
}
