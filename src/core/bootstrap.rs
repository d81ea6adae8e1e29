use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Makes sure the configured default moderator exists, is active, holds the
/// moderator flag, and can log in with the configured password.
pub(crate) async fn ensure_moderator(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_moderator_password.is_empty() {
        tracing::warn!("FIRST_MODERATOR_PASSWORD not configured; skipping moderator creation");
        return Ok(());
    }

    let email = &admin.first_moderator_email;
    let now = primitive_now_utc();

    let Some(user) = repositories::users::find_by_email(state.db(), email).await? else {
        repositories::users::create(
            state.db(),
            repositories::users::CreateUser {
                id: &Uuid::new_v4().to_string(),
                email,
                hashed_password: security::hash_password(&admin.first_moderator_password)?,
                is_active: true,
                is_moderator: true,
                created_at: now,
                updated_at: now,
            },
        )
        .await?;

        tracing::info!("Created default moderator {email}");
        return Ok(());
    };

    let password_ok =
        security::verify_password(&admin.first_moderator_password, &user.hashed_password)
            .unwrap_or(false);

    if password_ok && user.is_moderator && user.is_active {
        tracing::info!("Default moderator already up to date");
        return Ok(());
    }

    let hashed_password = if password_ok {
        user.hashed_password
    } else {
        security::hash_password(&admin.first_moderator_password)?
    };
    repositories::users::promote_to_moderator(state.db(), &user.id, &hashed_password, now).await?;

    tracing::info!("Updated default moderator {email}");
    Ok(())
}
