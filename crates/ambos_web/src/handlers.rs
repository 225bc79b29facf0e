use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use ambos_core::{
    AiGateway, AnalysisResult, Article, DashboardLayout, EnrichedQuery, Error, PanelPlacement,
    Platform, SourceType,
};
use ambos_intel::{AnalysisOrchestrator, QueryEnricher};
use ambos_sources::{SearchQuery, SourceKind};

use crate::AppState;

/// HTTP projection of the error taxonomy.
pub enum ApiError {
    Core(Error),
    NotFound(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what),
            ApiError::Core(e) => {
                let status = match &e {
                    Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    Error::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
                    Error::Parse(_) | Error::Upstream(_) => StatusCode::BAD_GATEWAY,
                    Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_limit() -> usize {
    25
}

fn require_gateway(state: &AppState) -> Result<Arc<dyn AiGateway>, ApiError> {
    state.gateway.clone().ok_or_else(|| {
        ApiError::Core(Error::Config(
            "no AI gateway configured (OPENROUTER_API_KEY)".to_string(),
        ))
    })
}

#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

pub async fn enrich(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnrichRequest>,
) -> Result<Json<EnrichedQuery>, ApiError> {
    let gateway = require_gateway(&state)?;
    let enricher = QueryEnricher::new(gateway);
    let enriched = enricher
        .enrich(&req.query, &req.language, req.source_type, &req.platforms)
        .await?;
    Ok(Json(enriched))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Restrict the search to named sources. A single source propagates its
    /// errors; multiple sources degrade per branch.
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub articles: Vec<Article>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let mut query = SearchQuery::new(&req.query, &req.language).with_limit(req.limit);
    if let Some(filter) = &req.filter {
        query = query.with_filter(filter.clone());
    }

    let articles = match req.sources.as_deref() {
        Some([single]) => state.manager.fetch_one(single, &query).await?,
        selector => state.manager.search(&query, selector).await,
    };

    Ok(Json(SearchResponse {
        count: articles.len(),
        articles,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub source_type: SourceType,
    /// Analyze these articles as-is; when absent, a fresh multi-source
    /// search runs first.
    #[serde(default)]
    pub articles: Option<Vec<Article>>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let gateway = require_gateway(&state)?;

    let articles = match req.articles {
        Some(articles) => articles,
        None => {
            let query = SearchQuery::new(&req.query, &req.language);
            state.manager.search(&query, req.sources.as_deref()).await
        }
    };

    let orchestrator = AnalysisOrchestrator::new(gateway);
    let result = orchestrator
        .analyze(&articles, &req.query, &req.language, req.source_type)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct SourceEntry {
    pub name: String,
    pub kind: &'static str,
    pub id: String,
}

pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<Vec<SourceEntry>> {
    let entries = state
        .manager
        .list()
        .into_iter()
        .map(|info| SourceEntry {
            name: info.name.to_string(),
            kind: match info.kind {
                SourceKind::Press => "press",
                SourceKind::Social => "social",
                SourceKind::Feed => "feed",
            },
            id: info.cli_name.to_string(),
        })
        .collect();
    Json(entries)
}

pub async fn get_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DashboardLayout>, ApiError> {
    match state.layouts.load(&id).await? {
        Some(layout) => Ok(Json(layout)),
        None => Err(ApiError::NotFound(format!("no layout saved for {id:?}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub panels: Vec<PanelPlacement>,
}

pub async fn put_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<LayoutRequest>,
) -> Result<Json<DashboardLayout>, ApiError> {
    let layout = DashboardLayout {
        panels: req.panels,
        updated_at: Utc::now(),
    };
    state.layouts.save(&id, &layout).await?;
    Ok(Json(layout))
}

pub async fn delete_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.layouts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AlertRequest {
    pub endpoint: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub delivered: bool,
    pub status: u16,
}

pub async fn trigger_alert(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AlertRequest>,
) -> Result<Json<AlertResponse>, ApiError> {
    let status = state.alerts.dispatch(&req.endpoint, &req.payload).await?;
    Ok(Json(AlertResponse {
        delivered: true,
        status: status.as_u16(),
    }))
}
