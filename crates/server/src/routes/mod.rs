use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::AppState;
use shared::collision::CollisionResult;
use shared::coordinates::ElevationWall;
use shared::geometry::{BuildContext, BuiltModel, GeometryBuilder, GeometryPart, MaterialDefinition};
use shared::plinth::Plinth;
use shared::position::{validation_summary, ValidationResult, ValidationSummary};
use shared::render2d::{Drawing, Frame, Render2DDefinition};
use shared::room::{validate_room_geometry, GeometryValidation, RoomGeometry};
use shared::z_position::ZPosition;
use shared::{ComponentDefinition, DesignElement, ElementId, PlanPoint, PlannerSettings, RoomDimensions};

fn default_zoom() -> f64 {
    1.0
}

fn check_zoom(zoom: f64) -> Result<(), StatusCode> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        tracing::warn!("Rejected render request with zoom {}", zoom);
        Err(StatusCode::BAD_REQUEST)
    }
}

#[derive(Debug, Deserialize)]
pub struct PlanRenderRequest {
    pub element: DesignElement,
    pub definition: Render2DDefinition,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

#[derive(Debug, Deserialize)]
pub struct ElevationRenderRequest {
    pub element: DesignElement,
    pub definition: Render2DDefinition,
    pub wall: ElevationWall,
    pub frame: Frame,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub room: Option<RoomDimensions>,
}

#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
    pub element: DesignElement,
    #[serde(default)]
    pub existing: Vec<DesignElement>,
    #[serde(default)]
    pub original_position: Option<PlanPoint>,
}

#[derive(Debug, Deserialize)]
pub struct PositionsRequest {
    pub elements: Vec<DesignElement>,
    pub room: RoomDimensions,
}

#[derive(Debug, Serialize)]
pub struct PositionsResponse {
    pub results: BTreeMap<ElementId, ValidationResult>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Deserialize)]
pub struct GeometryRequest {
    pub parts: Vec<GeometryPart>,
    #[serde(default)]
    pub materials: Vec<MaterialDefinition>,
    #[serde(default)]
    pub context: BuildContext,
}

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "catalog_entries": state.context.catalog().len(),
    }))
}

pub async fn settings(State(state): State<AppState>) -> Json<PlannerSettings> {
    Json(state.context.settings().clone())
}

/// Default height off the floor for a catalog component
pub async fn resolve_z_position(
    State(state): State<AppState>,
    Json(component): Json<ComponentDefinition>,
) -> Json<ZPosition> {
    Json(state.context.resolve_z(&component))
}

pub async fn resolve_plinth(
    State(state): State<AppState>,
    Json(component): Json<ComponentDefinition>,
) -> Json<Plinth> {
    Json(state.context.resolve_plinth(&component))
}

/// Plan view draw commands for one element
pub async fn render_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRenderRequest>,
) -> Result<Json<Drawing>, StatusCode> {
    check_zoom(request.zoom)?;
    Ok(Json(state.context.render_plan(&request.element, &request.definition, request.zoom)))
}

/// Elevation view draw commands for one element
pub async fn render_elevation(
    State(state): State<AppState>,
    Json(request): Json<ElevationRenderRequest>,
) -> Result<Json<Drawing>, StatusCode> {
    check_zoom(request.zoom)?;
    Ok(Json(state.context.render_elevation(
        &request.element,
        &request.definition,
        request.wall,
        request.frame,
        request.zoom,
        request.room.as_ref(),
    )))
}

/// Collision check for a drop or move, with a suggested position on failure
pub async fn validate_placement(
    State(state): State<AppState>,
    Json(request): Json<PlacementRequest>,
) -> Json<CollisionResult> {
    let result = state
        .context
        .validate_placement(&request.element, &request.existing, request.original_position);
    if !result.is_valid {
        tracing::debug!("Placement of {} rejected: {:?}", request.element.id, result.reason);
    }
    Json(result)
}

pub async fn validate_positions(
    State(state): State<AppState>,
    Json(request): Json<PositionsRequest>,
) -> Json<PositionsResponse> {
    let results = state.context.validate_positions(&request.elements, request.room);
    let summary = validation_summary(&results);
    Json(PositionsResponse { results, summary })
}

/// Catalog part rows → evaluated 3D parts
pub async fn build_geometry(Json(request): Json<GeometryRequest>) -> Result<Json<BuiltModel>, StatusCode> {
    let model = tokio::task::spawn_blocking(move || {
        GeometryBuilder::new(request.parts, request.materials).build(&request.context)
    })
    .await
    .map_err(|e| {
        tracing::error!("Geometry build task failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if !model.skipped.is_empty() {
        tracing::warn!("{} geometry parts skipped", model.skipped.len());
    }
    Ok(Json(model))
}

pub async fn validate_room(Json(geometry): Json<RoomGeometry>) -> Json<GeometryValidation> {
    Json(validate_room_geometry(&geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, AppState};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use shared::fixtures::*;
    use shared::PlannerContext;
    use tower::ServiceExt;

    fn test_app() -> axum::Router {
        app(AppState::new(PlannerContext::init(PlannerSettings::default(), metadata_catalog())))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["catalog_entries"], 4);
    }

    #[tokio::test]
    async fn test_settings() {
        let (status, body) = get_json("/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["zero_z_policy"], "fall-through");
        assert_eq!(body["ceiling_height"], 240.0);
    }

    #[tokio::test]
    async fn test_resolve_z_position() {
        let body = serde_json::to_value(wall_cabinet_definition()).unwrap();
        let (status, z) = post_json("/api/resolve/z-position", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(z["z"], 140.0);
        assert_eq!(z["source"], "type-rule");
    }

    #[tokio::test]
    async fn test_resolve_plinth() {
        let body = serde_json::to_value(base_cabinet_definition()).unwrap();
        let (status, plinth) = post_json("/api/resolve/plinth", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plinth["height"], 10.0);
    }

    #[tokio::test]
    async fn test_render_plan() {
        let body = json!({
            "element": base_cabinet("b1", 30.0, 0.0),
            "definition": rectangle_render_definition("base-cabinet-60"),
            "zoom": 2.0,
        });
        let (status, drawing) = post_json("/api/render/plan", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(drawing["transform"]["translate_x"], 60.0);
        assert_eq!(drawing["commands"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_render_rejects_bad_zoom() {
        let body = json!({
            "element": base_cabinet("b1", 0.0, 0.0),
            "definition": rectangle_render_definition("base-cabinet-60"),
            "zoom": 0.0,
        });
        let (status, _) = post_json("/api/render/plan", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_render_elevation() {
        let body = json!({
            "element": base_cabinet("b1", 0.0, 0.0),
            "definition": rectangle_render_definition("base-cabinet-60"),
            "wall": "front",
            "frame": { "x": 0.0, "y": 0.0, "width": 60.0, "height": 90.0 },
        });
        let (status, drawing) = post_json("/api/render/elevation", body).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!drawing["commands"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validate_placement_suggests_position() {
        let body = json!({
            "element": base_cabinet("new", 50.0, 0.0),
            "existing": [base_cabinet("a", 0.0, 0.0)],
        });
        let (status, result) = post_json("/api/placement/validate", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["is_valid"], false);
        assert_eq!(result["colliding_ids"], json!(["a"]));
        assert_eq!(result["suggested_position"], json!({ "x": 60.0, "y": 0.0 }));
    }

    #[tokio::test]
    async fn test_validate_positions() {
        let mut floating = wall_cabinet("w", 0.0, 0.0);
        floating.z = Some(200.0);
        let body = json!({
            "elements": [base_cabinet("b", 0.0, 0.0), floating],
            "room": kitchen_room(),
        });
        let (status, response) = post_json("/api/positions/validate", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["summary"]["total"], 2);
        assert_eq!(response["summary"]["invalid"], 1);
        assert_eq!(response["results"]["w"]["valid"], false);
    }

    #[tokio::test]
    async fn test_build_geometry() {
        let body = json!({
            "parts": [
                { "part_name": "carcass", "part_type": "box",
                  "dimension_width": "width", "dimension_height": "height", "dimension_depth": "depth" },
                { "part_name": "plinth", "part_type": "box", "render_condition": "isWallCabinet",
                  "dimension_width": "width" }
            ],
            "context": { "width": 60.0, "height": 90.0, "depth": 60.0 },
        });
        let (status, model) = post_json("/api/geometry/build", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(model["parts"].as_array().unwrap().len(), 1);
        assert_eq!(model["hidden"], json!(["plinth"]));
    }

    #[tokio::test]
    async fn test_validate_room() {
        let geometry = RoomGeometry::rectangle(&kitchen_room());
        let (status, validation) = post_json("/api/rooms/validate", serde_json::to_value(geometry).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(validation["valid"], true);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let (status, _) = post_json("/api/resolve/z-position", json!({ "id": "x" })).await;
        assert!(status.is_client_error());
    }
}
