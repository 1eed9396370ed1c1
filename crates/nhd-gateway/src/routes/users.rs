use super::{parse_json, AppState};
use crate::domain::error::ApiResult;
use crate::middleware::Principal;
use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use nhd_store::User;
use serde_json::{json, Value};
use tracing::info;

/// `POST /users/register` (admin). Creates or overwrites an operator profile.
pub async fn register_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let user: User = parse_json(&body)?;
    let user_id = user.user_id.clone();
    let is_admin = user.is_admin();
    state.store.create_user(user).await?;

    info!(user_id = %user_id, is_admin, registered_by = %principal.uid, "User registered");
    Ok((StatusCode::CREATED, Json(json!({ "user_id": user_id }))))
}
