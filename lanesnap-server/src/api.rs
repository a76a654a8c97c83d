//! HTTP surface over the placement session
//!
//! The UI layer drives one shared [`Session`] through these routes.
//! The session is a single mutable resource, so every handler goes
//! through one async mutex; network queries are cheap enough that a
//! single exclusive writer is sufficient at expected call volumes.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use lanesnap_core::prelude::*;

pub type SharedSession = Arc<Mutex<Session>>;

pub fn router(state: SharedSession) -> Router {
    Router::new()
        .route("/network", post(load_network).get(network_stats))
        .route("/pick", post(pick))
        .route("/pending/confirm", post(confirm))
        .route("/pending/cancel", post(cancel))
        .route("/points", get(list_points).delete(clear_points))
        .route("/points/{id}", delete(delete_point))
        .route("/snapshot", get(export_snapshot).put(import_snapshot))
        .route("/facilities", get(export_facilities))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Core errors mapped onto HTTP statuses with a JSON body
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::PointNotFound(_) | Error::UnknownEdge(_) | Error::NoNearbyEdge => {
                StatusCode::NOT_FOUND
            }
            Error::Duplicate { .. } | Error::NoPendingPlacement => StatusCode::CONFLICT,
            Error::Load(_) | Error::Format(_) | Error::Xml(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct LoadNetworkRequest {
    path: PathBuf,
}

async fn load_network(
    State(state): State<SharedSession>,
    Json(request): Json<LoadNetworkRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = state.lock().await;
    session.load_network_file(&request.path)?;
    let edges = session.network().map_or(0, RoadNetwork::edge_count);
    info!("network loaded from {}", request.path.display());
    Ok(Json(json!({ "edges": edges })))
}

async fn network_stats(State(state): State<SharedSession>) -> Json<serde_json::Value> {
    let session = state.lock().await;
    match session.network() {
        Some(network) => {
            let bounds = NetworkBounds::from(network.bounds());
            Json(json!({
                "loaded": true,
                "edges": network.edge_count(),
                "bounds": bounds,
            }))
        }
        None => Json(json!({ "loaded": false })),
    }
}

#[derive(Debug, Deserialize)]
struct PickRequest {
    lat: f64,
    lon: f64,
}

async fn pick(
    State(state): State<SharedSession>,
    Json(request): Json<PickRequest>,
) -> Json<serde_json::Value> {
    let mut session = state.lock().await;
    let pick = session.on_location_picked(GeoLocation {
        lat: request.lat,
        lon: request.lon,
    });
    Json(match pick {
        Pick::Pending(snap) => json!({ "status": "pending", "snap": snap }),
        Pick::NoNetworkNearby => json!({ "status": "noNetworkNearby" }),
        Pick::OutsideWorkArea => json!({ "status": "outsideWorkArea" }),
    })
}

#[derive(Debug, Deserialize)]
struct ConfirmRequest {
    kind: PointKind,
    name: Option<String>,
}

async fn confirm(
    State(state): State<SharedSession>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Response, ApiError> {
    let mut session = state.lock().await;
    match session.confirm_pending(request.kind, request.name)? {
        Confirm::Added(point) => {
            Ok(Json(json!({ "status": "added", "point": point })).into_response())
        }
        Confirm::Duplicate { existing } => Ok((
            StatusCode::CONFLICT,
            Json(json!({ "status": "duplicate", "existing": existing })),
        )
            .into_response()),
    }
}

async fn cancel(State(state): State<SharedSession>) -> StatusCode {
    state.lock().await.cancel_pending();
    StatusCode::NO_CONTENT
}

async fn list_points(State(state): State<SharedSession>) -> Json<Vec<Point>> {
    Json(state.lock().await.list_points().to_vec())
}

async fn clear_points(State(state): State<SharedSession>) -> StatusCode {
    state.lock().await.clear_points();
    StatusCode::NO_CONTENT
}

async fn delete_point(
    State(state): State<SharedSession>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    state.lock().await.delete_point(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_snapshot(State(state): State<SharedSession>) -> Result<Response, ApiError> {
    let blob = state.lock().await.export_snapshot()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], blob).into_response())
}

async fn import_snapshot(
    State(state): State<SharedSession>,
    blob: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let points = state.lock().await.import_snapshot(&blob)?;
    Ok(Json(json!({ "points": points })))
}

async fn export_facilities(State(state): State<SharedSession>) -> Response {
    let xml = state.lock().await.export_facilities();
    ([(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    const NET: &str = r#"<net>
        <location netOffset="0.00,0.00" convBoundary="0.00,0.00,200.00,1.00"/>
        <edge id="east"><lane id="east_0" index="0" shape="0.00,0.00 200.00,0.00"/></edge>
    </net>"#;

    fn app() -> Router {
        let mut session = Session::new();
        session.load_network_xml(NET).unwrap();
        router(Arc::new(Mutex::new(session)))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn pick_then_confirm_adds_a_point() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json("/pick", r#"{"lat": 3.0, "lon": 50.0}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["snap"]["edgeId"], "east");

        let response = app
            .clone()
            .oneshot(post_json(
                "/pending/confirm",
                r#"{"kind": "containerStop", "name": "Stop A"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "added");
        assert_eq!(body["point"]["id"], 1);

        let response = app
            .oneshot(Request::builder().uri("/points").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_confirm_returns_conflict() {
        let app = app();

        app.clone()
            .oneshot(post_json("/pick", r#"{"lat": 3.0, "lon": 50.0}"#))
            .await
            .unwrap();
        app.clone()
            .oneshot(post_json("/pending/confirm", r#"{"kind": "containerStop"}"#))
            .await
            .unwrap();

        app.clone()
            .oneshot(post_json("/pick", r#"{"lat": 3.0, "lon": 52.0}"#))
            .await
            .unwrap();
        let response = app
            .oneshot(post_json("/pending/confirm", r#"{"kind": "containerStop"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["status"], "duplicate");
        assert_eq!(body["existing"], 1);
    }

    #[tokio::test]
    async fn confirm_without_pick_is_a_conflict() {
        let response = app()
            .oneshot(post_json("/pending/confirm", r#"{"kind": "containerStop"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deleting_an_unknown_point_is_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/points/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn snapshot_import_rejects_bad_blobs() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/snapshot")
                    .body(Body::from("{\"bounds\": null}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn facilities_endpoint_serves_xml() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/facilities")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );
    }

    #[tokio::test]
    async fn stats_reflect_the_loaded_network() {
        let response = app()
            .oneshot(Request::builder().uri("/network").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["loaded"], true);
        assert_eq!(body["edges"], 1);
    }
}
