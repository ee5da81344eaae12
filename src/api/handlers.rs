use axum::{
    extract::{Path, State},
    http::{header::LINK, HeaderMap, HeaderValue, StatusCode},
    response::Json,
};
use serde::Serialize;

use crate::api::body::DocumentBody;
use crate::api::dto::{DevfileResponse, ListQuery, ListResponse};
use crate::api::error::{api_error, ApiError};
use crate::api::extract::ApiQuery;
use crate::api::SharedState;
use crate::error::DevfileError;
use crate::model::{Devfile, DevfileRecord, Id, Page, UserContext};

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Rejects access to a record the caller does not own.
pub(crate) fn ensure_owner<R: DevfileRecord>(
    record: &R,
    user: &UserContext,
) -> Result<(), ApiError> {
    if record.owner() == Some(user.user_id.as_str()) {
        return Ok(());
    }
    Err(api_error(DevfileError::Forbidden(format!(
        "User '{}' is not allowed to access devfile '{}'",
        user.user_id,
        record.id()
    ))))
}

pub(crate) fn page_params(query: &ListQuery, default_max_items: usize) -> (usize, usize) {
    (
        query.max_items.unwrap_or(default_max_items),
        query.skip_count.unwrap_or(0),
    )
}

/// Wraps a page into the list body plus its `Link` header.
pub(crate) fn paged_response<T, U>(
    page: Page<T>,
    link_header: String,
    convert: impl FnMut(T) -> U,
) -> (HeaderMap, Json<ListResponse<U>>) {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&link_header) {
        headers.insert(LINK, value);
    }
    let page = page.map(convert);
    (
        headers,
        Json(ListResponse {
            total: page.total_count,
            items: page.items,
        }),
    )
}

pub async fn create_user_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    body: DocumentBody<Devfile>,
) -> Result<(StatusCode, Json<DevfileResponse>), ApiError> {
    let devfile = body.require("Devfile").map_err(api_error)?;

    let created = state
        .user_devfiles
        .create_devfile(devfile, &user)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(DevfileResponse::from_user_devfile(created, &state.links)),
    ))
}

pub async fn get_user_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    Path(id): Path<Id>,
) -> Result<Json<DevfileResponse>, ApiError> {
    let record = state
        .user_devfiles
        .get_by_id(&id)
        .await
        .map_err(api_error)?;
    ensure_owner(&record, &user)?;

    Ok(Json(DevfileResponse::from_user_devfile(record, &state.links)))
}

pub async fn list_user_devfiles(
    State(state): State<SharedState>,
    user: UserContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<(HeaderMap, Json<ListResponse<DevfileResponse>>), ApiError> {
    let (max_items, skip_count) = page_params(&query, state.default_max_items);

    let page = state
        .user_devfiles
        .get_user_devfiles(&user.user_id, max_items, skip_count)
        .await
        .map_err(api_error)?;

    let link_header = state.links.page_header("userdevfile", &page);
    Ok(paged_response(page, link_header, |record| {
        DevfileResponse::from_user_devfile(record, &state.links)
    }))
}

pub async fn update_user_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    Path(id): Path<Id>,
    body: DocumentBody<Devfile>,
) -> Result<Json<DevfileResponse>, ApiError> {
    let devfile = body.require("Devfile").map_err(api_error)?;

    let existing = state
        .user_devfiles
        .get_by_id(&id)
        .await
        .map_err(api_error)?;
    ensure_owner(&existing, &user)?;

    let updated = state
        .user_devfiles
        .update_user_devfile(&id, devfile)
        .await
        .map_err(api_error)?;

    Ok(Json(DevfileResponse::from_user_devfile(updated, &state.links)))
}

pub async fn delete_user_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .user_devfiles
        .get_by_id(&id)
        .await
        .map_err(api_error)?;
    ensure_owner(&existing, &user)?;

    state
        .user_devfiles
        .remove_user_devfile(&id)
        .await
        .map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}
