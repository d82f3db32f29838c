use axum::Router;

use audit_application::AppState;

use crate::handlers::{admin_handlers, ingest_handlers, ops_handlers, query_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/ingest/transfers",
            axum::routing::post(ingest_handlers::ingest_transfers),
        )
        .route(
            "/v1/audit/history/:player",
            axum::routing::get(query_handlers::history),
        )
        .route(
            "/v1/audit/patterns/:player",
            axum::routing::get(query_handlers::patterns),
        )
        .route(
            "/v1/audit/suspicious",
            axum::routing::get(query_handlers::suspicious),
        )
        .route(
            "/v1/audit/summaries/:player",
            axum::routing::get(query_handlers::summaries),
        )
        .route(
            "/v1/audit/top-participants",
            axum::routing::get(query_handlers::top_participants),
        )
        .route(
            "/v1/audit/ip-correlation/:player",
            axum::routing::get(query_handlers::ip_correlation),
        )
        .route("/v1/audit/rates", axum::routing::get(query_handlers::rates))
        .route(
            "/v1/admin/watchlist",
            axum::routing::get(admin_handlers::list_watches)
                .post(admin_handlers::add_watch)
                .delete(admin_handlers::remove_watch),
        )
        .route(
            "/v1/admin/bank-bans",
            axum::routing::get(admin_handlers::list_bank_bans)
                .post(admin_handlers::add_bank_ban)
                .delete(admin_handlers::remove_bank_ban),
        )
        .route(
            "/v1/admin/bank-bans/check",
            axum::routing::get(admin_handlers::check_bank_ban),
        )
        .route(
            "/v1/admin/config",
            axum::routing::get(admin_handlers::get_monitoring_config)
                .put(admin_handlers::replace_monitoring_config),
        )
        .route(
            "/v1/admin/config/setting",
            axum::routing::post(admin_handlers::update_setting),
        )
        .route(
            "/v1/admin/tracked-items",
            axum::routing::get(admin_handlers::list_tracked_items)
                .post(admin_handlers::add_tracked_item)
                .delete(admin_handlers::remove_tracked_item),
        )
        .route(
            "/v1/ops/migrate",
            axum::routing::post(ops_handlers::run_migration),
        )
        .route(
            "/v1/ops/repair-summaries",
            axum::routing::post(ops_handlers::repair_summaries),
        )
        .route(
            "/v1/ops/cleanup",
            axum::routing::post(ops_handlers::cleanup_logs),
        )
        .route(
            "/v1/ops/webhook/check",
            axum::routing::get(ops_handlers::webhook_check),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
