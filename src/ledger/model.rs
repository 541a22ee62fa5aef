use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::dates::DateKey;
use crate::analysis::AnalysisResult;

/// One confirmed, logged meal. Never edited after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub nutrition: AnalysisResult,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,
}

impl FoodEntry {
    pub fn new(nutrition: AnalysisResult, image_reference: Option<String>, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            nutrition,
            timestamp: now,
            image_reference,
        }
    }

    pub fn calories(&self) -> u32 {
        self.nutrition.calories
    }
}

/// Read-only view of a single day.
#[derive(Debug, Clone, Copy)]
pub struct DayView<'a> {
    pub total: u64,
    pub foods: &'a [FoodEntry],
}

/// Per-day calorie totals and food lists.
///
/// Operations take the ledger by value and hand back the updated one; the
/// caller decides when to persist and publish it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    totals: BTreeMap<DateKey, u64>,
    foods: BTreeMap<DateKey, Vec<FoodEntry>>,
}

impl Ledger {
    pub fn from_parts(
        totals: BTreeMap<DateKey, u64>,
        foods: BTreeMap<DateKey, Vec<FoodEntry>>,
    ) -> Self {
        Self { totals, foods }
    }

    pub fn totals(&self) -> &BTreeMap<DateKey, u64> {
        &self.totals
    }

    pub fn foods(&self) -> &BTreeMap<DateKey, Vec<FoodEntry>> {
        &self.foods
    }

    /// Days with no logged food read as zero and an empty list.
    pub fn day(&self, key: DateKey) -> DayView<'_> {
        DayView {
            total: self.totals.get(&key).copied().unwrap_or(0),
            foods: self.foods.get(&key).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Dates that hold at least one entry, newest first.
    pub fn logged_dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.foods
            .iter()
            .rev()
            .filter(|(_, list)| !list.is_empty())
            .map(|(key, _)| *key)
    }

    /// Record a confirmed analysis under the local day of `now`.
    pub fn log_food(
        mut self,
        analysis: AnalysisResult,
        image_reference: Option<String>,
        now: OffsetDateTime,
    ) -> (Self, FoodEntry) {
        let key = DateKey::for_instant(now);
        let entry = FoodEntry::new(analysis, image_reference, now);

        let total = self.totals.entry(key).or_insert(0);
        *total = total.saturating_add(u64::from(entry.calories()));
        self.foods.entry(key).or_default().push(entry.clone());

        debug!(date = %key, food_id = %entry.id, calories = entry.calories(), "food logged");
        (self, entry)
    }

    /// Drop `food_id` from `key`'s list. Unknown ids leave the ledger as it was.
    pub fn remove_food(mut self, key: DateKey, food_id: Uuid) -> Self {
        let Some(list) = self.foods.get_mut(&key) else {
            return self;
        };
        let Some(pos) = list.iter().position(|f| f.id == food_id) else {
            return self;
        };
        let removed = list.remove(pos);
        let emptied = list.is_empty();

        if let Some(total) = self.totals.get_mut(&key) {
            *total = total.saturating_sub(u64::from(removed.calories()));
        }
        if emptied {
            self.foods.remove(&key);
            self.totals.remove(&key);
        }

        debug!(date = %key, food_id = %food_id, calories = removed.calories(), "food removed");
        self
    }
}
