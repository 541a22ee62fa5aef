use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::dates::DateKey;
use super::model::{FoodEntry, Ledger};
use crate::storage::{keys, KeyValueStore};

/// Read both persisted maps. Missing or unparseable blobs come back empty.
pub async fn load(store: &dyn KeyValueStore) -> anyhow::Result<Ledger> {
    let totals: BTreeMap<DateKey, u64> = read_map(store, keys::DAILY_CALORIES).await?;
    let foods: BTreeMap<DateKey, Vec<FoodEntry>> = read_map(store, keys::DAILY_FOODS).await?;
    debug!(days = foods.len(), "ledger loaded");
    Ok(Ledger::from_parts(totals, foods))
}

/// Write both maps in one call.
pub async fn save(store: &dyn KeyValueStore, ledger: &Ledger) -> anyhow::Result<()> {
    let totals = serde_json::to_string(ledger.totals())?;
    let foods = serde_json::to_string(ledger.foods())?;
    store
        .set_many(&[(keys::DAILY_CALORIES, totals), (keys::DAILY_FOODS, foods)])
        .await
}

async fn read_map<T>(store: &dyn KeyValueStore, key: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(key, error = %e, "stored ledger data unreadable; starting empty");
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::storage::MemoryStore;
    use time::macros::datetime;

    fn apple() -> AnalysisResult {
        AnalysisResult {
            food_name: "Apple".into(),
            calories: 95,
            protein: "0.5g".into(),
            carbs: "25g".into(),
            fat: "0.3g".into(),
            fiber: "4g".into(),
            sugar: "19g".into(),
            confidence: 0.89,
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty_ledger() {
        let store = MemoryStore::default();
        assert_eq!(load(&store).await.unwrap(), Ledger::default());
    }

    #[tokio::test]
    async fn saved_ledger_loads_back() {
        let store = MemoryStore::default();
        let (ledger, _) = Ledger::default().log_food(apple(), None, datetime!(2024-05-01 8:15 +2));
        save(&store, &ledger).await.unwrap();

        let raw = store.get(keys::DAILY_CALORIES).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"2024-05-01":95}"#);
        assert_eq!(load(&store).await.unwrap(), ledger);
    }

    #[tokio::test]
    async fn corrupt_blob_reads_as_empty() {
        let store = MemoryStore::default();
        store.set(keys::DAILY_CALORIES, "{not json").await.unwrap();
        store.set(keys::DAILY_FOODS, r#"{"2024-13-45":[]}"#).await.unwrap();
        assert_eq!(load(&store).await.unwrap(), Ledger::default());
    }
}
