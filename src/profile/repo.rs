use tracing::warn;

use super::calculator::BiometricProfile;
use crate::storage::{keys, KeyValueStore};

/// Saved profile (if readable) and whether onboarding was finished.
pub async fn load(store: &dyn KeyValueStore) -> anyhow::Result<(Option<BiometricProfile>, bool)> {
    let profile = match store.get(keys::USER_PROFILE).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| warn!(error = %e, "stored profile unreadable; ignoring it"))
            .ok(),
        None => None,
    };
    let onboarding_complete = store
        .get(keys::ONBOARDING_COMPLETE)
        .await?
        .is_some_and(|v| v == "true");
    Ok((profile, onboarding_complete))
}

/// Persist the profile and mark onboarding done, in one write.
pub async fn save(store: &dyn KeyValueStore, profile: &BiometricProfile) -> anyhow::Result<()> {
    let raw = serde_json::to_string(profile)?;
    store
        .set_many(&[
            (keys::USER_PROFILE, raw),
            (keys::ONBOARDING_COMPLETE, "true".to_string()),
        ])
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ActivityLevel, Gender, WeightGoal};
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn nothing_saved_yet() {
        let store = MemoryStore::default();
        assert_eq!(load(&store).await.unwrap(), (None, false));
    }

    #[tokio::test]
    async fn save_marks_onboarding_complete() {
        let store = MemoryStore::default();
        let profile = BiometricProfile {
            gender: Gender::Male,
            age: 25,
            weight_lb: 160.0,
            height_in: 68,
            activity_level: ActivityLevel::Moderate,
            goal: WeightGoal::Maintain,
        };
        save(&store, &profile).await.unwrap();
        assert_eq!(
            store.get(keys::ONBOARDING_COMPLETE).await.unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(load(&store).await.unwrap(), (Some(profile), true));
    }

    #[tokio::test]
    async fn corrupt_profile_is_ignored() {
        let store = MemoryStore::default();
        store.set(keys::USER_PROFILE, r#"{"gender":"robot"}"#).await.unwrap();
        store.set(keys::ONBOARDING_COMPLETE, "true").await.unwrap();
        assert_eq!(load(&store).await.unwrap(), (None, true));
    }
}
