use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};

use crate::api::body::DocumentBody;
use crate::api::dto::{DevfileResponse, ListQuery, ListResponse, WorkspaceResponse};
use crate::api::error::{api_error, ApiError};
use crate::api::extract::ApiQuery;
use crate::api::handlers::{ensure_owner, page_params, paged_response};
use crate::api::SharedState;
use crate::error::{self, DevfileError};
use crate::logic::{
    CachedFileContentProvider, CreateWorkspaceRequest, INFRASTRUCTURE_NAMESPACE_ATTRIBUTE,
};
use crate::model::{Devfile, Id, UserContext};

/// Query parameters of the workspace creation endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceParams {
    pub attributes: BTreeMap<String, String>,
    pub infrastructure_namespace: Option<String>,
    pub start_after_create: bool,
    pub namespace: Option<String>,
}

impl WorkspaceParams {
    /// `attribute` may repeat; every other parameter keeps its last value.
    pub fn parse(pairs: &[(String, String)]) -> error::Result<Self> {
        let mut params = WorkspaceParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "attribute" => {
                    let (name, value) = parse_attribute(value)?;
                    params.attributes.insert(name, value);
                }
                "infrastructure-namespace" => {
                    params.infrastructure_namespace = Some(value.clone()).filter(|v| !v.is_empty());
                }
                "start-after-create" => {
                    params.start_after_create = value.parse().map_err(|_| {
                        DevfileError::BadRequest(format!(
                            "Invalid value '{}' for 'start-after-create', expected true or false",
                            value
                        ))
                    })?;
                }
                "namespace" => params.namespace = Some(value.clone()).filter(|v| !v.is_empty()),
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn into_request(self, devfile: Devfile, user: &UserContext) -> CreateWorkspaceRequest {
        let mut attributes = self.attributes;
        if let Some(namespace) = self.infrastructure_namespace {
            attributes.insert(INFRASTRUCTURE_NAMESPACE_ATTRIBUTE.to_string(), namespace);
        }
        CreateWorkspaceRequest {
            devfile,
            namespace: self.namespace.unwrap_or_else(|| user.user_name.clone()),
            attributes,
            start_after_create: self.start_after_create,
        }
    }
}

/// Splits `name:value` at the first colon.
fn parse_attribute(raw: &str) -> error::Result<(String, String)> {
    match raw.split_once(':') {
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(DevfileError::BadRequest(format!(
            "Attribute '{}' is not valid, it should contain name and value separated \
             with colon. For example: attributeName:attributeValue",
            raw
        ))),
    }
}

pub async fn create_workspace(
    State(state): State<SharedState>,
    user: UserContext,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
    body: DocumentBody<Devfile>,
) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiError> {
    let devfile = body.require("Devfile").map_err(api_error)?;
    let params = WorkspaceParams::parse(&pairs).map_err(api_error)?;

    // Each referenced file is downloaded at most once per request.
    let content = CachedFileContentProvider::new(Arc::clone(&state.content));
    let workspace = state
        .devfiles
        .create_workspace(params.into_request(devfile, &user), &content, &user)
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(WorkspaceResponse::new(workspace, &state.links)),
    ))
}

pub async fn get_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    Path(id): Path<Id>,
) -> Result<Json<DevfileResponse>, ApiError> {
    let record = state.devfiles.get_by_id(&id).await.map_err(api_error)?;
    ensure_owner(&record, &user)?;

    Ok(Json(DevfileResponse::from_persistent_devfile(
        record,
        &state.links,
    )))
}

pub async fn list_devfiles(
    State(state): State<SharedState>,
    user: UserContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<(HeaderMap, Json<ListResponse<DevfileResponse>>), ApiError> {
    let (max_items, skip_count) = page_params(&query, state.default_max_items);

    let page = state
        .devfiles
        .get_devfiles(&user.user_id, max_items, skip_count)
        .await
        .map_err(api_error)?;

    let link_header = state.links.page_header("devfile", &page);
    Ok(paged_response(page, link_header, |record| {
        DevfileResponse::from_persistent_devfile(record, &state.links)
    }))
}

pub async fn delete_devfile(
    State(state): State<SharedState>,
    user: UserContext,
    Path(id): Path<Id>,
) -> Result<StatusCode, ApiError> {
    let record = state.devfiles.get_by_id(&id).await.map_err(api_error)?;
    ensure_owner(&record, &user)?;

    state.devfiles.remove_devfile(&id).await.map_err(api_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_attribute_split_at_first_colon() {
        let params = WorkspaceParams::parse(&pairs(&[
            ("attribute", "stackId:java"),
            ("attribute", "url:http://host:8080"),
        ]))
        .unwrap();

        assert_eq!(params.attributes["stackId"], "java");
        assert_eq!(params.attributes["url"], "http://host:8080");
    }

    #[test]
    fn test_attribute_without_colon_is_bad_request() {
        let err = WorkspaceParams::parse(&pairs(&[("attribute", "broken")])).unwrap_err();
        assert!(matches!(err, DevfileError::BadRequest(_)));
    }

    #[test]
    fn test_invalid_start_flag_is_bad_request() {
        assert!(WorkspaceParams::parse(&pairs(&[("start-after-create", "yes")])).is_err());
    }

    #[test]
    fn test_request_defaults_namespace_and_maps_infrastructure_namespace() {
        let params = WorkspaceParams::parse(&pairs(&[
            ("infrastructure-namespace", "team-ns"),
            ("start-after-create", "true"),
        ]))
        .unwrap();
        let user = UserContext::new("user123", "jdoe");

        let request = params.into_request(Devfile::default(), &user);

        assert_eq!(request.namespace, "jdoe");
        assert!(request.start_after_create);
        assert_eq!(
            request.attributes.get(INFRASTRUCTURE_NAMESPACE_ATTRIBUTE),
            Some(&"team-ns".to_string())
        );
    }
}
