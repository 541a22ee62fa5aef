use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::analysis::{self, FoodAnalyzer};
use crate::clock::{Clock, SystemClock};
use crate::config::{AppConfig, StorageBackend};
use crate::db;
use crate::ledger::{repo as ledger_repo, DateKey, Ledger};
use crate::profile::{repo as profile_repo, BiometricProfile, DEFAULT_CALORIE_GOAL};
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};

/// Everything the single user has on record, plus the date they are looking at.
#[derive(Debug, Clone)]
pub struct Session {
    pub profile: Option<BiometricProfile>,
    pub onboarding_complete: bool,
    pub ledger: Ledger,
    pub selected_date: DateKey,
}

impl Session {
    pub fn new(today: DateKey) -> Self {
        Self {
            profile: None,
            onboarding_complete: false,
            ledger: Ledger::default(),
            selected_date: today,
        }
    }

    pub fn calorie_goal(&self) -> i64 {
        self.profile
            .as_ref()
            .map(BiometricProfile::calorie_goal)
            .unwrap_or(DEFAULT_CALORIE_GOAL)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub analyzer: Arc<dyn FoodAnalyzer>,
    pub clock: Arc<dyn Clock>,
    /// Held across persistence writes so mutations never interleave.
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn KeyValueStore> = match config.storage {
            StorageBackend::Sqlite => Arc::new(SqliteStore::new(db::connect(&config.database_url).await?)),
            StorageBackend::Memory => Arc::new(MemoryStore::default()),
        };
        let analyzer = analysis::from_config(&config.analysis)?;

        Self::from_parts(config, store, analyzer, Arc::new(SystemClock)).await
    }

    /// Restore the persisted session from `store`.
    pub async fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn KeyValueStore>,
        analyzer: Arc<dyn FoodAnalyzer>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let ledger = ledger_repo::load(store.as_ref()).await?;
        let (profile, onboarding_complete) = profile_repo::load(store.as_ref()).await?;
        let session = Session {
            profile,
            onboarding_complete,
            ledger,
            selected_date: DateKey::today(clock.as_ref()),
        };
        info!(
            analyzer = analyzer.name(),
            has_profile = session.profile.is_some(),
            logged_days = session.ledger.logged_dates().count(),
            "session restored"
        );

        Ok(Self {
            config,
            store,
            analyzer,
            clock,
            session: Arc::new(Mutex::new(session)),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::profile::{ActivityLevel, Gender, WeightGoal};

    #[tokio::test]
    async fn from_parts_restores_persisted_session() {
        let fake = AppState::fake();
        let now = fake.clock.now();
        let (ledger, entry) = Ledger::default().log_food(burrito(), None, now);
        ledger_repo::save(fake.store.as_ref(), &ledger).await.unwrap();
        let profile = BiometricProfile {
            gender: Gender::Female,
            age: 41,
            weight_lb: 150.0,
            height_in: 65,
            activity_level: ActivityLevel::Light,
            goal: WeightGoal::Lose,
        };
        profile_repo::save(fake.store.as_ref(), &profile).await.unwrap();

        let state = AppState::from_parts(
            fake.config.clone(),
            fake.store.clone(),
            fake.analyzer.clone(),
            fake.clock.clone(),
        )
        .await
        .unwrap();

        let session = state.session.lock().await;
        assert_eq!(session.profile, Some(profile));
        assert!(session.onboarding_complete);
        assert_eq!(session.selected_date.to_string(), "2024-03-15");
        assert_eq!(session.ledger.day(session.selected_date).foods, &[entry][..]);
        assert_eq!(session.calorie_goal(), profile.calorie_goal());
    }

    #[test]
    fn goal_defaults_without_profile() {
        let session = Session::new(DateKey::parse("2024-03-15").unwrap());
        assert_eq!(session.calorie_goal(), DEFAULT_CALORIE_GOAL);
    }
}
