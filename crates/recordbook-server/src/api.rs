use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use recordbook_shared::{CountResponse, ListQuery, NewRecord, Record, RecordPage, RecordPatch};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::records::RecordService;

#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(records: RecordService, config: ServerConfig) -> Self {
        Self {
            records,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/records", get(list_records).post(create_record))
        .route("/records/count", get(count_records))
        .route(
            "/records/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let Some(origin) = config.cors_origin.as_deref() else {
        return cors.allow_origin(Any);
    };

    match HeaderValue::from_str(origin) {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS_ORIGIN, allowing any origin");
            cors.allow_origin(Any)
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ServerError> {
    let Json(input) = payload?;
    let record = state.records.create(input).await?;

    info!(id = record.id, "Record created via API");

    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<RecordPage>, ServerError> {
    let Query(query) = query?;
    let page = state.records.list(query).await?;
    Ok(Json(page))
}

async fn count_records(State(state): State<AppState>) -> Result<Json<CountResponse>, ServerError> {
    let total = state.records.count().await?;
    Ok(Json(CountResponse { total }))
}

async fn get_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Record>, ServerError> {
    let Path(id) = id?;
    let record = state.records.get(id).await?;
    Ok(Json(record))
}

async fn update_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<Json<Record>, ServerError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let record = state.records.update(id, patch).await?;

    info!(id, "Record updated via API");

    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(id) = id?;
    state.records.delete(id).await?;

    info!(id, "Record deleted via API");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use recordbook_store::Database;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn build_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("api.db")).unwrap();
        let state = AppState::new(RecordService::new(db), ServerConfig::default());
        (dir, build_router(state))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create(app: &Router, name: &str, email: &str, message: &str) -> (StatusCode, Value) {
        send(
            app,
            json_request(
                "POST",
                "/records",
                &json!({ "name": name, "email": email, "message": message }),
            ),
        )
        .await
    }

    fn timestamp(value: &Value) -> DateTime<Utc> {
        value.as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_dir, app) = build_app();
        let (status, json) = send(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn create_returns_201_with_generated_fields() {
        let (_dir, app) = build_app();
        let (status, json) = create(&app, "Maria Silva", "maria@example.com", "Hello").await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(json["id"].as_i64().unwrap() > 0);
        assert_eq!(json["name"], "Maria Silva");
        assert_eq!(timestamp(&json["createdAt"]), timestamp(&json["updatedAt"]));
    }

    #[tokio::test]
    async fn create_invalid_input_is_400_with_fields() {
        let (_dir, app) = build_app();
        let (status, json) = create(&app, "Ana", "not-an-email", "Hello").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");
        let mut fields: Vec<&str> = json["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["email", "name"]);
    }

    #[tokio::test]
    async fn create_with_unknown_or_missing_fields_is_400() {
        let (_dir, app) = build_app();
        let body = json!({
            "name": "Maria Silva",
            "email": "maria@example.com",
            "message": "Hello",
            "admin": true,
        });
        let (status, json) = send(&app, json_request("POST", "/records", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");

        let (status, _) = send(
            &app,
            json_request("POST", "/records", &json!({ "name": "Maria Silva" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (_dir, app) = build_app();
        let req = Request::builder()
            .method("POST")
            .uri("/records")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, json) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "bad_request");
    }

    #[tokio::test]
    async fn duplicate_email_is_409() {
        let (_dir, app) = build_app();
        create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let (status, json) = create(&app, "Maria Souza", "maria@example.com", "Again").await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["kind"], "conflict");

        let (_, json) = send(&app, empty_request("GET", "/records/count")).await;
        assert_eq!(json["total"], 1);
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_email_have_one_winner() {
        let (_dir, app) = build_app();

        let mut handles = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                create(&app, &format!("Racer {i:02}"), "race@example.com", "Go!").await.0
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                StatusCode::CONFLICT => conflicts += 1,
                other => panic!("unexpected status {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn list_paginates_fifteen_records() {
        let (_dir, app) = build_app();
        for i in 0..15 {
            create(&app, &format!("Person {i:02}"), &format!("p{i}@example.com"), "Hi!").await;
        }

        let (status, json) = send(&app, empty_request("GET", "/records?page=1&limit=10")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 10);
        assert_eq!(json["total"], 15);
        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["data"][0]["name"], "Person 14");
    }

    #[tokio::test]
    async fn list_uses_defaults() {
        let (_dir, app) = build_app();
        let (status, json) = send(&app, empty_request("GET", "/records")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], json!([]));
        assert_eq!(json["total"], 0);
        assert_eq!(json["page"], 1);
        assert_eq!(json["limit"], 10);
        assert_eq!(json["totalPages"], 0);
    }

    #[tokio::test]
    async fn list_search_matches_case_insensitively() {
        let (_dir, app) = build_app();
        create(&app, "Carlos Lima", "FOO@x.com", "Hello").await;
        create(&app, "Paula Reis", "paula@x.com", "Hello").await;

        let (status, json) = send(&app, empty_request("GET", "/records?search=foo")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["data"][0]["email"], "FOO@x.com");
    }

    #[tokio::test]
    async fn list_search_folds_accented_letters() {
        let (_dir, app) = build_app();
        create(&app, "JOÃO SOUZA", "joao@example.com", "OLÁ MUNDO").await;
        create(&app, "Maria Silva", "maria@example.com", "Bom dia").await;

        // "joão" and "olá", percent-encoded
        for uri in ["/records?search=jo%C3%A3o", "/records?search=ol%C3%A1"] {
            let (status, json) = send(&app, empty_request("GET", uri)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["total"], 1, "{uri}");
            assert_eq!(json["data"][0]["email"], "joao@example.com");
        }
    }

    #[tokio::test]
    async fn list_rejects_bad_paging() {
        let (_dir, app) = build_app();

        let (status, json) = send(&app, empty_request("GET", "/records?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");

        let (status, json) = send(&app, empty_request("GET", "/records?limit=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "bad_request");

        let (status, json) = send(
            &app,
            empty_request("GET", "/records?page=4294967295&limit=4294967295"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["fields"][0]["field"], "page");
    }

    #[tokio::test]
    async fn get_round_trips_and_missing_is_404() {
        let (_dir, app) = build_app();
        let (_, created) = create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, empty_request("GET", &format!("/records/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, json) = send(&app, empty_request("GET", "/records/9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["kind"], "not_found");

        let (status, _) = send(&app, empty_request("GET", "/records/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_supplied_fields() {
        let (_dir, app) = build_app();
        let (_, created) = create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let id = created["id"].as_i64().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let (status, updated) = send(
            &app,
            json_request("PATCH", &format!("/records/{id}"), &json!({ "name": "Maria Santos" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Maria Santos");
        assert_eq!(updated["email"], "maria@example.com");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(timestamp(&updated["updatedAt"]) > timestamp(&created["updatedAt"]));
    }

    #[tokio::test]
    async fn update_with_empty_patch_refreshes_updated_at() {
        let (_dir, app) = build_app();
        let (_, created) = create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let id = created["id"].as_i64().unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let (status, updated) =
            send(&app, json_request("PATCH", &format!("/records/{id}"), &json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], created["name"]);
        assert_eq!(updated["email"], created["email"]);
        assert_eq!(updated["message"], created["message"]);
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(timestamp(&updated["updatedAt"]) > timestamp(&created["updatedAt"]));
    }

    #[tokio::test]
    async fn patch_missing_is_404_and_duplicate_is_409() {
        let (_dir, app) = build_app();
        create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let (_, other) = create(&app, "Joao Souza", "joao@example.com", "Hello").await;
        let id = other["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            json_request("PATCH", "/records/9999", &json!({ "name": "Nobody Here" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/records/{id}"),
                &json!({ "email": "maria@example.com" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_then_get_and_delete_again_are_404() {
        let (_dir, app) = build_app();
        let (_, created) = create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        let uri = format!("/records/{}", created["id"]);

        let (status, body) = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn count_ignores_search() {
        let (_dir, app) = build_app();
        create(&app, "Maria Silva", "maria@example.com", "Hello").await;
        create(&app, "Joao Souza", "joao@example.com", "Hello").await;

        let (status, json) = send(&app, empty_request("GET", "/records/count?search=maria")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 2);
    }
}
