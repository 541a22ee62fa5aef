use tracing::{debug, info};
use uuid::Uuid;

use super::dates::{change_selected_date, display_label, DateKey, Direction};
use super::dto::{LedgerDayResponse, LoggedDate};
use super::model::FoodEntry;
use super::repo;
use crate::analysis::AnalysisResult;
use crate::clock::Clock;
use crate::state::{AppState, Session};

pub(crate) fn day_view(session: &Session, key: DateKey, clock: &dyn Clock) -> LedgerDayResponse {
    let day = session.ledger.day(key);
    let calorie_goal = session.calorie_goal();
    LedgerDayResponse {
        date: key,
        label: display_label(key, clock),
        total: day.total,
        foods: day.foods.to_vec(),
        calorie_goal,
        remaining: calorie_goal.saturating_sub(i64::try_from(day.total).unwrap_or(i64::MAX)),
    }
}

pub(crate) fn logged_dates(session: &Session, clock: &dyn Clock) -> Vec<LoggedDate> {
    session
        .ledger
        .logged_dates()
        .map(|date| LoggedDate {
            date,
            label: display_label(date, clock),
            total: session.ledger.day(date).total,
        })
        .collect()
}

/// Log `analysis` under today. The session only changes once the write lands.
pub(crate) async fn add_food(
    state: &AppState,
    analysis: AnalysisResult,
    image_reference: Option<String>,
) -> anyhow::Result<FoodEntry> {
    let mut session = state.session.lock().await;
    let (next, entry) = session
        .ledger
        .clone()
        .log_food(analysis, image_reference, state.clock.now());
    repo::save(state.store.as_ref(), &next).await?;
    session.ledger = next;

    info!(food_id = %entry.id, food = %entry.nutrition.food_name, calories = entry.calories(), "food added");
    Ok(entry)
}

/// Remove one entry. Unknown ids change nothing and write nothing.
pub(crate) async fn remove_food(state: &AppState, key: DateKey, food_id: Uuid) -> anyhow::Result<()> {
    let mut session = state.session.lock().await;
    let next = session.ledger.clone().remove_food(key, food_id);
    if next == session.ledger {
        debug!(date = %key, food_id = %food_id, "nothing to remove");
        return Ok(());
    }
    repo::save(state.store.as_ref(), &next).await?;
    session.ledger = next;
    Ok(())
}

/// Step the selected date one day. Steps past today leave it unchanged.
pub(crate) async fn navigate(state: &AppState, direction: Direction) -> LedgerDayResponse {
    let clock = state.clock.as_ref();
    let mut session = state.session.lock().await;
    let today = DateKey::today(clock);
    let next = change_selected_date(session.selected_date, direction, today);
    if next == session.selected_date {
        debug!(date = %next, ?direction, "navigation refused");
    }
    session.selected_date = next;
    day_view(&session, next, clock)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::profile::{ActivityLevel, BiometricProfile, Gender, WeightGoal};
    use crate::state::testing::{burrito, BrokenStore};
    use crate::storage::keys;

    #[tokio::test]
    async fn add_then_remove_persists_each_step() {
        let state = AppState::fake();
        let entry = add_food(&state, burrito(), Some("local://photo/1".into())).await.unwrap();
        let today = DateKey::today(state.clock.as_ref());

        let stored = state.store.get(keys::DAILY_CALORIES).await.unwrap().unwrap();
        assert_eq!(stored, r#"{"2024-03-15":500}"#);
        {
            let session = state.session.lock().await;
            let view = day_view(&session, today, state.clock.as_ref());
            assert_eq!(view.total, 500);
            assert_eq!(view.foods, vec![entry.clone()]);
            assert_eq!(view.remaining, 1500);
            assert_eq!(view.label, "Today");
        }

        remove_food(&state, today, entry.id).await.unwrap();
        let stored = state.store.get(keys::DAILY_CALORIES).await.unwrap().unwrap();
        assert_eq!(stored, "{}");
        let session = state.session.lock().await;
        assert_eq!(session.ledger.day(today).total, 0);
    }

    #[tokio::test]
    async fn failed_write_leaves_session_untouched() {
        let state = AppState::fake().with_store(Arc::new(BrokenStore));
        assert!(add_food(&state, burrito(), None).await.is_err());
        let session = state.session.lock().await;
        assert!(session.ledger.logged_dates().next().is_none());
    }

    #[tokio::test]
    async fn removing_unknown_id_skips_the_write() {
        let state = AppState::fake().with_store(Arc::new(BrokenStore));
        let today = DateKey::today(state.clock.as_ref());
        remove_food(&state, today, Uuid::now_v7()).await.unwrap();
    }

    #[tokio::test]
    async fn remaining_saturates_at_extreme_goal() {
        let state = AppState::fake();
        add_food(&state, burrito(), None).await.unwrap();
        let mut session = state.session.lock().await;
        session.profile = Some(BiometricProfile {
            gender: Gender::Female,
            age: 1,
            weight_lb: 1e300,
            height_in: 60,
            activity_level: ActivityLevel::Sedentary,
            goal: WeightGoal::Gain,
        });
        let today = session.selected_date;
        let view = day_view(&session, today, state.clock.as_ref());
        assert_eq!(view.calorie_goal, i64::MAX);
        assert_eq!(view.remaining, i64::MAX - 500);

        session.profile = Some(BiometricProfile {
            age: 2000,
            weight_lb: 1.0,
            height_in: 1,
            goal: WeightGoal::Lose,
            ..session.profile.unwrap()
        });
        let view = day_view(&session, today, state.clock.as_ref());
        assert_eq!(view.calorie_goal, 1200);
    }

    #[tokio::test]
    async fn navigation_stops_at_today() {
        let state = AppState::fake();
        let view = navigate(&state, Direction::Next).await;
        assert_eq!(view.date.to_string(), "2024-03-15");

        let view = navigate(&state, Direction::Previous).await;
        assert_eq!(view.date.to_string(), "2024-03-14");
        assert_eq!(view.label, "Yesterday");
        assert_eq!(view.total, 0);
        assert!(view.foods.is_empty());

        let view = navigate(&state, Direction::Previous).await;
        assert_eq!(view.label, "Mar 13");

        navigate(&state, Direction::Next).await;
        let view = navigate(&state, Direction::Next).await;
        assert_eq!(view.label, "Today");
    }

    #[tokio::test]
    async fn logged_dates_lists_days_with_food() {
        let state = AppState::fake();
        assert!(logged_dates(&*state.session.lock().await, state.clock.as_ref()).is_empty());
        add_food(&state, burrito(), None).await.unwrap();
        add_food(&state, burrito(), None).await.unwrap();
        let dates = logged_dates(&*state.session.lock().await, state.clock.as_ref());
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].total, 1000);
        assert_eq!(dates[0].label, "Today");
    }
}
