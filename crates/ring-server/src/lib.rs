use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use http::{Method, StatusCode};
use ring_ai::{
    ConceptGenerator, MAX_PROMPT_CHARS, MIN_PROMPT_CHARS, ProviderError, TextGenerator,
};
use ring_geometry::{RingScene, build_ring};
use ring_params::{DesignParams, normalize, validate_full};
use ring_store::{Concept, ConceptStore, NewConcept, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;

pub use config::Config;

const GENERATE_FAILED: &str = "Failed to generate design";
const UPDATE_FAILED: &str = "Failed to update design params";
const LIST_FAILED: &str = "Failed to list designs";
const LOAD_FAILED: &str = "Failed to load design";
const NOT_FOUND: &str = "Design not found";

/// Shared handles behind every route.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ConceptStore>,
    concepts: Arc<ConceptGenerator<Arc<dyn TextGenerator>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn ConceptStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            store,
            concepts: Arc::new(ConceptGenerator::new(generator)),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/designs", post(create_design).get(list_designs))
        .route("/api/designs/{id}", get(get_design))
        .route("/api/designs/{id}/params", patch(update_design_params))
        .route("/api/designs/{id}/scene", get(design_scene))
        .route("/api/scene", post(preview_scene))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SceneResponse {
    design_params: DesignParams,
    scene: RingScene,
}

impl SceneResponse {
    fn of(design_params: DesignParams) -> Self {
        Self {
            scene: build_ring(&design_params),
            design_params,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
    field: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field: None,
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn invalid_field(field: Option<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            ..Self::bad_request(message)
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND)
    }

    fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn store(err: StoreError, message: &str) -> Self {
        tracing::error!(error = %err, "{message}");
        Self::internal(message)
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        tracing::error!(error = %err, "concept generation failed");
        if err.is_upstream() {
            Self::new(StatusCode::BAD_GATEWAY, err.to_string())
        } else {
            Self::internal(GENERATE_FAILED)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
                field: self.field,
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn create_design(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Concept>), ApiError> {
    let request: Value = parse_json(&body)?;
    let prompt = validate_prompt(&request)?;

    let concepts = Arc::clone(&state.concepts);
    let story = prompt.clone();
    let draft = tokio::task::spawn_blocking(move || concepts.generate_concept(&story))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "concept generation task failed");
            ApiError::internal(GENERATE_FAILED)
        })??;

    let concept = state
        .store
        .create(NewConcept {
            prompt,
            symbols: draft.symbols,
            design_params: draft.design_params,
        })
        .map_err(|err| ApiError::store(err, GENERATE_FAILED))?;

    tracing::info!(id = concept.id, "design created");
    Ok((StatusCode::CREATED, Json(concept)))
}

async fn list_designs(State(state): State<AppState>) -> Result<Json<Vec<Concept>>, ApiError> {
    let concepts = state
        .store
        .list()
        .map_err(|err| ApiError::store(err, LIST_FAILED))?;
    Ok(Json(concepts))
}

async fn get_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Concept>, ApiError> {
    load_concept(&state, &id).map(Json)
}

async fn design_scene(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SceneResponse>, ApiError> {
    let concept = load_concept(&state, &id)?;
    Ok(Json(SceneResponse::of(concept.design_params)))
}

async fn update_design_params(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Concept>, ApiError> {
    let id = parse_id(&id)
        .ok_or_else(|| ApiError::invalid_field(Some("id".to_string()), "Invalid design id"))?;

    let request: Value = parse_json(&body)?;
    let design_params = validate_full(&request)
        .map_err(|err| ApiError::invalid_field(err.field, err.message))?;

    let updated = state
        .store
        .update_params(id, design_params)
        .map_err(|err| ApiError::store(err, UPDATE_FAILED))?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(id, "design params updated");
    Ok(Json(updated))
}

/// Live preview: any JSON body is normalized before the scene is built.
async fn preview_scene(body: Bytes) -> Result<Json<SceneResponse>, ApiError> {
    let request: Value = parse_json(&body)?;
    Ok(Json(SceneResponse::of(normalize(&request))))
}

/// Unparsable ids cannot exist, so lookups report them as missing.
fn load_concept(state: &AppState, id: &str) -> Result<Concept, ApiError> {
    let Some(id) = parse_id(id) else {
        return Err(ApiError::not_found());
    };

    state
        .store
        .get(id)
        .map_err(|err| ApiError::store(err, LOAD_FAILED))?
        .ok_or_else(ApiError::not_found)
}

fn parse_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn validate_prompt(request: &Value) -> Result<String, ApiError> {
    let Value::Object(fields) = request else {
        return Err(ApiError::bad_request(format!(
            "Expected object, received {}",
            json_kind(request)
        )));
    };

    let prompt_error = |message: String| ApiError::invalid_field(Some("prompt".to_string()), message);
    let prompt = match fields.get("prompt") {
        None => return Err(prompt_error("Required".to_string())),
        Some(Value::String(prompt)) => prompt,
        Some(other) => {
            return Err(prompt_error(format!(
                "Expected string, received {}",
                json_kind(other)
            )));
        }
    };

    let length = prompt.chars().count();
    if length < MIN_PROMPT_CHARS {
        return Err(prompt_error(format!(
            "String must contain at least {MIN_PROMPT_CHARS} character(s)"
        )));
    }
    if length > MAX_PROMPT_CHARS {
        return Err(prompt_error(format!(
            "String must contain at most {MAX_PROMPT_CHARS} character(s)"
        )));
    }

    Ok(prompt.clone())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body is required"));
    }

    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
}
