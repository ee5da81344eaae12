use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::api::dto::NewUser;
use crate::api::error::{api_error, ApiError};
use crate::api::extract::ApiJson;
use crate::api::SharedState;
use crate::model::{generate_name, Id, User};

pub async fn create_user(
    State(state): State<SharedState>,
    ApiJson(new_user): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = User {
        id: new_user
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_name("user", 16)),
        name: new_user.name,
        email: new_user.email,
    };

    let created = state.users.create_user(user).await.map_err(api_error)?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<Id>,
) -> Result<Json<User>, ApiError> {
    let user = state.users.get_user(&id).await.map_err(api_error)?;
    Ok(Json(user))
}

/// Deletes the user after every before-removal hook has cleaned up.
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    state.user_removal.remove_user(&id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
