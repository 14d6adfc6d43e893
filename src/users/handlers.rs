use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::UpdateUserRequest;

use crate::{
    auth::{
        claims::Claims,
        dto::PublicUser,
        extractors::{AdminUser, AuthUser},
        handlers::is_valid_email,
        password::hash_password,
        repo::User,
    },
    error::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/find/:id", get(get_user))
        .route("/users/:id", put(update_user).delete(delete_user))
}

/// Owner-or-admin rule: a user may touch their own record, admins may touch
/// any record.
fn ensure_owner_or_admin(claims: &Claims, id: Uuid) -> Result<(), ApiError> {
    if claims.sub != id && !claims.is_admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

fn trimmed(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    ensure_owner_or_admin(&claims, id)?;

    // Same normalization as registration: trimmed username, lowercased email.
    let username = trimmed(payload.username);
    if let Some(ref u) = username {
        if u.is_empty() {
            return Err(ApiError::Validation("username must not be empty".into()));
        }
    }
    let email = payload.email.map(|e| e.trim().to_lowercase());
    if let Some(ref e) = email {
        if e.is_empty() {
            return Err(ApiError::Validation("email must not be empty".into()));
        }
        if !is_valid_email(e) {
            warn!(email = %e, "email does not look like an address");
        }
    }

    // Password changes are rehashed here; the stored hash is never reused.
    let password_hash = match payload.password.as_deref() {
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        username.as_deref(),
        email.as_deref(),
        password_hash.as_deref(),
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("username or email already taken".into()),
        other => other,
    })?
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_owner_or_admin(&claims, id)?;

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("user not found".into()));
    }

    info!(user_id = %id, "user deleted");
    Ok(Json(json!({ "message": "user deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn claims(sub: Uuid, is_admin: bool) -> Claims {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        Claims {
            sub,
            is_admin,
            iat: now,
            exp: now + 300,
            iss: "test".into(),
            aud: "test".into(),
        }
    }

    #[test]
    fn owner_may_touch_own_record() {
        let id = Uuid::new_v4();
        assert!(ensure_owner_or_admin(&claims(id, false), id).is_ok());
    }

    #[test]
    fn admin_may_touch_any_record() {
        assert!(ensure_owner_or_admin(&claims(Uuid::new_v4(), true), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        let err = ensure_owner_or_admin(&claims(Uuid::new_v4(), false), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn username_is_trimmed_before_storage() {
        assert_eq!(trimmed(Some("  bob ".into())), Some("bob".to_string()));
        assert_eq!(trimmed(Some("bob".into())), Some("bob".to_string()));
        assert_eq!(trimmed(None), None);
    }
}
