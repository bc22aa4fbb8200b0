use chrono::Utc;
use http::{Method, Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use super::codec::{empty_response, json_response, HttpError};
use super::AppState;
use crate::config::ModelConfig;
use crate::scoring::schema::feature_names;
use crate::scoring::{
    assess, example_application, validate_application, FeatureSchema, LoanApplication,
    ValidationError,
};

pub const SCORE_PATH: &str = "/api/v1/score";
pub const MODEL_INFO_PATH: &str = "/api/v1/model/info";
pub const MODEL_FEATURES_PATH: &str = "/api/v1/model/features";

const KNOWN_PATHS: &[&str] = &["/", "/health", SCORE_PATH, MODEL_INFO_PATH, MODEL_FEATURES_PATH];

#[derive(Debug, Serialize)]
struct ModelInfo<'a> {
    model_name: &'a str,
    version: &'a str,
    accuracy: f64,
    features: Vec<&'static str>,
    trained_on: &'a str,
}

/// Dispatch a request to its handler. Never fails: errors become JSON responses.
pub fn handle(request: &Request<Vec<u8>>, state: &AppState) -> Response<Vec<u8>> {
    let path = request.uri().path();
    let result = match (request.method(), path) {
        (&Method::OPTIONS, _) => Ok(empty_response(StatusCode::NO_CONTENT)),
        (&Method::GET, "/") => Ok(root()),
        (&Method::GET, "/health") => Ok(health()),
        (&Method::POST, SCORE_PATH) => score(request.body()),
        (&Method::GET, MODEL_INFO_PATH) => Ok(model_info(&state.model)),
        (&Method::GET, MODEL_FEATURES_PATH) => Ok(model_features()),
        (_, path) if KNOWN_PATHS.contains(&path) => Err(HttpError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        )),
        _ => Err(HttpError::new(StatusCode::NOT_FOUND, "Not Found")),
    };
    result.unwrap_or_else(HttpError::into_response)
}

fn root() -> Response<Vec<u8>> {
    json_response(
        StatusCode::OK,
        &json!({
            "message": "Credit Risk Scoring API",
            "version": env!("CARGO_PKG_VERSION"),
            "health": "/health",
            "score": SCORE_PATH,
        }),
    )
}

fn health() -> Response<Vec<u8>> {
    json_response(
        StatusCode::OK,
        &json!({ "status": "healthy", "timestamp": Utc::now().to_rfc3339() }),
    )
}

fn score(body: &[u8]) -> Result<Response<Vec<u8>>, HttpError> {
    let application: LoanApplication = serde_json::from_slice(body).map_err(|err| {
        HttpError::with_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{ "field": "body", "message": err.to_string() }]),
        )
    })?;

    let record = validate_application(&application).map_err(validation_failed)?;

    let assessment = std::panic::catch_unwind(|| assess(&record)).map_err(|_| {
        tracing::error!("scoring panicked");
        HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, "Scoring failed: internal error")
    })?;

    Ok(json_response(StatusCode::OK, &assessment))
}

fn validation_failed(errors: Vec<ValidationError>) -> HttpError {
    tracing::debug!(count = errors.len(), "application rejected");
    match serde_json::to_value(&errors) {
        Ok(detail) => HttpError::with_detail(StatusCode::UNPROCESSABLE_ENTITY, detail),
        Err(_) => HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid application"),
    }
}

fn model_info(model: &ModelConfig) -> Response<Vec<u8>> {
    json_response(
        StatusCode::OK,
        &ModelInfo {
            model_name: &model.name,
            version: &model.version,
            accuracy: model.accuracy,
            features: feature_names(),
            trained_on: &model.trained_on,
        },
    )
}

fn model_features() -> Response<Vec<u8>> {
    json_response(
        StatusCode::OK,
        &json!({
            "required_features": FeatureSchema,
            "example": example_application(),
        }),
    )
}
