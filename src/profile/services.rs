use tracing::info;

use super::calculator::{calorie_range, BiometricProfile};
use super::dto::ProfileResponse;
use super::repo;
use crate::state::{AppState, Session};

pub(crate) fn summary(session: &Session) -> ProfileResponse {
    let calorie_goal = session.calorie_goal();
    ProfileResponse {
        profile: session.profile,
        calorie_goal,
        range: calorie_range(calorie_goal),
        onboarding_complete: session.onboarding_complete,
    }
}

/// Replace the profile and recompute the goal. Nothing changes if the write fails.
pub(crate) async fn edit_profile(
    state: &AppState,
    profile: BiometricProfile,
) -> anyhow::Result<ProfileResponse> {
    let calorie_goal = profile.calorie_goal();
    let response = ProfileResponse {
        profile: Some(profile),
        calorie_goal,
        range: calorie_range(calorie_goal),
        onboarding_complete: true,
    };

    let mut session = state.session.lock().await;
    repo::save(state.store.as_ref(), &profile).await?;
    session.profile = Some(profile);
    session.onboarding_complete = true;

    info!(calorie_goal, goal = ?profile.goal, "profile updated");
    Ok(response)
}
