//! 问答论坛 API 服务
//!
//! 启动顺序：加载配置 → 初始化日志与指标 → 连接数据库并执行迁移 → 启动 HTTP 服务

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use forum_service::{routes, set_verbose_errors, state::AppState};
use forum_shared::{
    config::AppConfig,
    database::Database,
    observability::{self, metrics::MetricsHandle, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "forum-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME)?;
    config.validate()?;

    // 开发环境在错误响应中附带详细信息
    set_verbose_errors(!config.is_production());

    let guard = observability::init(&config.service_name, &config.observability)?;

    info!(
        environment = %config.environment,
        addr = %config.server_addr(),
        "Starting forum-api"
    );

    let db = Database::connect(&config.database).await?;
    sqlx::migrate!("./migrations").run(db.pool()).await?;
    info!("Database migrations applied");

    let state = AppState::from_config(db.pool().clone(), &config);
    let cors = build_cors(&config);

    let metrics_handle = guard.metrics().cloned();

    let app = Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .route(
            "/metrics",
            get(move || render_metrics(metrics_handle.clone())),
        )
        // HTTP 安全头
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(CompressionLayer::new())
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：`*` 允许任意来源，否则按逗号分隔的来源列表
///
/// 允许任意来源时浏览器不会携带 Cookie，前端需改用 Bearer Token
fn build_cors(config: &AppConfig) -> CorsLayer {
    if config.cors.allows_any() {
        if config.is_production() {
            warn!("cors.allowed_origins=\"*\" is not recommended in production");
        }
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .origins()
        .iter()
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();
    info!(origins = ?origins, "CORS configured");

    // 携带凭证时不能使用通配的方法和请求头
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true)
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("strict-transport-security"),
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("0"),
    );
    response
}

/// 监听关闭信号（Ctrl+C 或 SIGTERM）
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// 就绪探针：检查数据库连接
async fn readiness_check(db: Database) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = db.health_check().await.is_ok();
    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "service": SERVICE_NAME,
            "checks": {
                "database": if db_ok { "ok" } else { "fail" }
            }
        })),
    )
}

/// Prometheus 指标
async fn render_metrics(handle: Option<MetricsHandle>) -> Response {
    match handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
