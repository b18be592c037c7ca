//! Admin HTTP interface: config key reads, admin commands, and Prometheus
//! metrics export. A thin axum layer over [`AdminState`].
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::admin::AdminState;
use crate::metrics::DnsMetrics;

#[derive(Clone)]
struct AppState {
    admin: Arc<AdminState>,
    metrics: Arc<DnsMetrics>,
}

pub struct HttpServer {
    admin: Arc<AdminState>,
    metrics: Arc<DnsMetrics>,
    bind_addr: SocketAddr,
}

impl HttpServer {
    pub fn new(admin: Arc<AdminState>, metrics: Arc<DnsMetrics>, bind_addr: SocketAddr) -> Self {
        HttpServer { admin, metrics, bind_addr }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let state = AppState { admin: self.admin, metrics: self.metrics };
        let app = Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics_text))
            .route("/config", get(get_config))
            .route("/admin/uLoad", post(u_load))
            .route("/admin/vLoad", post(v_load))
            .route("/admin/wLoad", get(w_load))
            .route("/admin/zLoad", post(z_load))
            .route("/admin/xStop", post(x_stop))
            .route("/admin/zzCustom", post(zz_custom))
            .layer(CorsLayer::permissive())
            .with_state(state);

        info!("admin HTTP interface listening on {}", self.bind_addr);
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        axum::serve(listener, app).await
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn metrics_text(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => {
            error!("failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state.admin.settings();
    Json(json!({
        "fileURLc": settings.file_url_current,
        "fileURLn": settings.file_url_new,
        "maxDomains": settings.max_domains,
        "minMemory": settings.min_memory_bytes,
        "maxDomLen": settings.max_dom_len,
        "alarmHour": settings.alarm_hour,
        "ST_ns1": settings.ns1,
        "ST_ns2": settings.ns2,
        "allowCnt": state.admin.allow_count(),
        "blockCnt": state.admin.block_count(),
        "loadProg": state.admin.progress(),
    }))
}

#[derive(Deserialize)]
struct DomainQuery {
    domain: String,
}

async fn u_load(State(state): State<AppState>, Query(q): Query<DomainQuery>) -> Response {
    match state.admin.u_load(&q.domain).await {
        Ok(added) => Json(json!({ "added": added })).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn v_load(State(state): State<AppState>, Query(q): Query<DomainQuery>) -> Response {
    match state.admin.v_load(&q.domain).await {
        Ok(removed) => Json(json!({ "removed": removed })).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn w_load(State(state): State<AppState>, Query(q): Query<DomainQuery>) -> impl IntoResponse {
    Json(json!({ "blocked": state.admin.w_load(&q.domain) }))
}

#[derive(Deserialize, Default)]
struct ZLoadQuery {
    url: Option<String>,
}

async fn z_load(State(state): State<AppState>, Query(q): Query<ZLoadQuery>) -> Response {
    let admin = state.admin.clone();
    let url = q.url.clone();
    tokio::spawn(async move {
        if let Err(e) = admin.z_load(url.as_deref()).await {
            error!("blocklist reload failed: {}", e);
        }
    });
    StatusCode::ACCEPTED.into_response()
}

async fn x_stop(State(state): State<AppState>) -> impl IntoResponse {
    state.admin.x_stop();
    StatusCode::ACCEPTED
}

async fn zz_custom(State(state): State<AppState>) -> Response {
    match state.admin.zz_custom().await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
