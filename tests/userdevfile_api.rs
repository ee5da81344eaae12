use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use devfile_service::config::AppConfig;
use devfile_service::logic::{ContentError, FileContentProvider, LocalWorkspaceFactory};
use devfile_service::store::Stores;
use devfile_service::{build_app_state_with, create_app, User};
use serde_json::{json, Value};
use tower::ServiceExt;

const USER: &str = "user123";

/// Serves files from memory instead of the network.
struct FixedContent(HashMap<String, String>);

#[async_trait::async_trait]
impl FileContentProvider for FixedContent {
    async fn fetch_content(&self, reference: &str) -> Result<String, ContentError> {
        self.0
            .get(reference)
            .cloned()
            .ok_or_else(|| ContentError::Fetch {
                url: reference.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}

async fn setup() -> (Router, Stores) {
    let stores = Stores::in_memory();
    stores
        .users
        .create_user(User::new(USER, "jdoe"))
        .await
        .unwrap();
    stores
        .users
        .create_user(User::new("intruder", "intruder"))
        .await
        .unwrap();

    let content = FixedContent(HashMap::from([(
        "app.yaml".to_string(),
        "kind: List\nitems: []\n".to_string(),
    )]));
    let state = build_app_state_with(
        stores.clone(),
        &AppConfig::default(),
        Arc::new(content),
        Arc::new(LocalWorkspaceFactory::new()),
    );
    (create_app(state), stores)
}

fn request(method: &str, uri: &str, user: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn devfile(name: &str) -> Value {
    json!({
        "apiVersion": "1.0.0",
        "metadata": { "name": name },
        "projects": [{
            "name": "petclinic",
            "source": { "type": "git", "location": "https://github.com/spring-projects/spring-petclinic.git" }
        }],
        "components": [{ "type": "dockerimage", "alias": "maven", "image": "maven:3.6" }],
        "commands": [{
            "name": "build",
            "actions": [{ "type": "exec", "component": "maven", "command": "mvn package" }]
        }],
        "attributes": { "persistVolumes": "false" }
    })
}

#[tokio::test]
async fn test_user_devfile_lifecycle() {
    let (app, _) = setup().await;

    let (status, _, created) = send(
        &app,
        request("POST", "/userdevfile", USER, Some(devfile("devfile-name"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("usrdevfile"));
    assert_eq!(created["name"], "devfile-name");
    assert_eq!(created["links"]["self"], format!("/userdevfile/{}", id));

    let uri = format!("/userdevfile/{}", id);
    let (status, _, fetched) = send(&app, request("GET", &uri, USER, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let mut changed = created["devfile"].clone();
    changed["apiVersion"] = json!("V15.0");
    let (status, _, updated) = send(&app, request("PUT", &uri, USER, Some(changed))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["devfile"]["apiVersion"], "V15.0");

    let (_, _, fetched) = send(&app, request("GET", &uri, USER, None)).await;
    assert_eq!(fetched["devfile"]["apiVersion"], "V15.0");
    assert_eq!(fetched["id"], id.as_str());

    let (status, _, _) = send(&app, request("DELETE", &uri, USER, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send(&app, request("GET", &uri, USER, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        format!("Devfile with id '{}' doesn't exist", id)
    );
}

#[tokio::test]
async fn test_create_from_yaml() {
    let (app, _) = setup().await;
    let yaml = "apiVersion: 1.0.0\nmetadata:\n  name: yaml-devfile\ncomponents:\n  - type: dockerimage\n    alias: tools\n    image: alpine\n";

    let request = Request::builder()
        .method("POST")
        .uri("/userdevfile")
        .header("x-user-id", USER)
        .header(header::CONTENT_TYPE, "text/yaml")
        .body(Body::from(yaml))
        .unwrap();
    let (status, _, created) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["devfile"]["metadata"]["name"], "yaml-devfile");
    assert_eq!(created["devfile"]["components"][0]["alias"], "tools");
}

#[tokio::test]
async fn test_missing_body_is_bad_request() {
    let (app, _) = setup().await;

    let (status, _, body) = send(&app, request("POST", "/userdevfile", USER, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Devfile required");
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let (app, _) = setup().await;
    send(&app, request("POST", "/userdevfile", USER, Some(devfile("same")))).await;

    let (status, _, body) = send(
        &app,
        request("POST", "/userdevfile", USER, Some(devfile("same"))),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Devfile with name 'same' already exists for current user"
    );
}

#[tokio::test]
async fn test_unknown_creator_is_conflict() {
    let (app, _) = setup().await;

    let (status, _, _) = send(
        &app,
        request("POST", "/userdevfile", "ghost", Some(devfile("orphan"))),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_foreign_devfile_is_forbidden() {
    let (app, _) = setup().await;
    let (_, _, created) = send(
        &app,
        request("POST", "/userdevfile", USER, Some(devfile("private"))),
    )
    .await;
    let uri = format!("/userdevfile/{}", created["id"].as_str().unwrap());

    let (status, _, _) = send(&app, request("GET", &uri, "intruder", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(
        &app,
        request("PUT", &uri, "intruder", Some(devfile("hijacked"))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, request("DELETE", &uri, "intruder", None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, request("GET", &uri, USER, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let (app, _) = setup().await;

    let (status, _, _) = send(
        &app,
        request("PUT", "/userdevfile/usrdevfilemissing", USER, Some(devfile("x"))),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_paged_with_link_header() {
    let (app, _) = setup().await;
    for name in ["one", "two", "three"] {
        send(&app, request("POST", "/userdevfile", USER, Some(devfile(name)))).await;
    }
    send(
        &app,
        request("POST", "/userdevfile", "intruder", Some(devfile("theirs"))),
    )
    .await;

    let (status, headers, first) = send(
        &app,
        request("GET", "/userdevfile?maxItems=2&skipCount=0", USER, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["total"], 3);
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    let link = headers
        .get(header::LINK)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(link.contains("</userdevfile?skipCount=2&maxItems=2>; rel=\"next\""));

    let (_, _, second) = send(
        &app,
        request("GET", "/userdevfile?maxItems=2&skipCount=2", USER, None),
    )
    .await;
    assert_eq!(second["total"], 3);

    let mut names: Vec<String> = first["items"]
        .as_array()
        .unwrap()
        .iter()
        .chain(second["items"].as_array().unwrap())
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["one", "three", "two"]);
}

#[tokio::test]
async fn test_zero_max_items_is_bad_request() {
    let (app, _) = setup().await;

    let (status, _, _) = send(&app, request("GET", "/userdevfile?maxItems=0", USER, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_paging_values_are_answered() {
    let (app, _) = setup().await;
    for name in ["one", "two"] {
        send(&app, request("POST", "/userdevfile", USER, Some(devfile(name)))).await;
    }

    for collection in ["userdevfile", "devfile"] {
        let uri = format!("/{}?skipCount={}", collection, usize::MAX);
        let (status, headers, body) = send(&app, request("GET", &uri, USER, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["items"].as_array().unwrap().is_empty());
        assert!(headers.get(header::LINK).is_some());
    }

    let uri = format!("/userdevfile?skipCount=1&maxItems={}", usize::MAX);
    let (status, _, body) = send(&app, request("GET", &uri, USER, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_input_has_error_body() {
    let (app, _) = setup().await;

    let (status, _, body) = send(
        &app,
        request("GET", "/userdevfile?maxItems=many", USER, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let (status, _, body) = send(
        &app,
        request("GET", "/devfile?skipCount=-1", USER, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());

    let broken_json = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let (status, _, body) = send(&app, broken_json).await;
    assert!(status.is_client_error());
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_create_workspace_from_devfile() {
    let (app, _) = setup().await;
    let mut body = devfile("ws");
    body["components"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "type": "kubernetes", "alias": "app", "reference": "app.yaml" }));

    let (status, _, workspace) = send(
        &app,
        request(
            "POST",
            "/devfile?attribute=stackId:java&infrastructure-namespace=team-ns&start-after-create=true",
            USER,
            Some(body),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(workspace["status"], "RUNNING");
    assert_eq!(workspace["namespace"], USER);
    assert_eq!(workspace["attributes"]["stackId"], "java");
    assert_eq!(workspace["attributes"]["infrastructureNamespace"], "team-ns");
    let devfile_id = workspace["devfileId"].as_str().unwrap();
    assert!(devfile_id.starts_with("devfile"));
    assert_eq!(
        workspace["links"]["devfile"],
        format!("/devfile/{}", devfile_id)
    );

    let (status, _, stored) = send(
        &app,
        request("GET", &format!("/devfile/{}", devfile_id), USER, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["name"], "ws");
}

#[tokio::test]
async fn test_workspace_validation_errors_are_bad_requests() {
    let (app, _) = setup().await;

    let (status, _, _) = send(
        &app,
        request("POST", "/devfile?attribute=broken", USER, Some(devfile("ws"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unresolvable = devfile("ws");
    unresolvable["components"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "type": "kubernetes", "alias": "db", "reference": "db.yaml" }));
    let (status, _, body) = send(&app, request("POST", "/devfile", USER, Some(unresolvable))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("db.yaml"));

    let mut broken = devfile("ws");
    broken["commands"][0]["actions"][0]["component"] = json!("missing");
    let (status, _, _) = send(&app, request("POST", "/devfile", USER, Some(broken))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, list) = send(&app, request("GET", "/devfile", USER, None)).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_user_removal_cascades_to_devfiles() {
    let (app, stores) = setup().await;
    let mut ids = Vec::new();
    for name in ["a", "b", "c"] {
        let (_, _, created) =
            send(&app, request("POST", "/userdevfile", USER, Some(devfile(name)))).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    send(&app, request("POST", "/devfile", USER, Some(devfile("ws")))).await;

    let (status, _, _) = send(&app, request("DELETE", "/users/user123", USER, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for id in ids {
        assert!(stores.user_devfiles.get_by_id(&id).await.unwrap_err().is_not_found());
    }
    assert_eq!(
        stores.devfiles.get_devfiles(USER, 30, 0).await.unwrap().total_count,
        0
    );
    let (status, _, _) = send(&app, request("GET", "/users/user123", USER, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_and_health() {
    let (app, _) = setup().await;

    let (status, _, user) = send(
        &app,
        request("POST", "/users", USER, Some(json!({ "name": "new user" }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(user["id"].as_str().unwrap().starts_with("user"));

    let (status, _, health) = send(&app, request("GET", "/health", USER, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
}
