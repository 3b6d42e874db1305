use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State as Extract},
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::AppError, state::State, upstream::ALERT_TYPE_VOCABULARY};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

pub async fn alerts_handler(
    Extract(state): Extract<Arc<State>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    state
        .upstream
        .fetch_alerts(&params)
        .await
        .map(Json)
        .map_err(AppError::Alerts)
}

pub async fn reference_handler(
    Extract(state): Extract<Arc<State>>,
    Path(vocabulary): Path<String>,
) -> Result<Json<Value>, AppError> {
    state
        .upstream
        .fetch_reference(&vocabulary)
        .await
        .map(Json)
        .map_err(AppError::Reference)
}

pub async fn alert_types_handler(
    Extract(state): Extract<Arc<State>>,
) -> Result<Json<Value>, AppError> {
    state
        .upstream
        .fetch_reference(ALERT_TYPE_VOCABULARY)
        .await
        .map(Json)
        .map_err(AppError::AlertTypes)
}

pub async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
