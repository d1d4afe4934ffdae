//! HTTP route handlers.
//!
//! Thin mappings from CRUD verbs to repository calls: existence checks,
//! id assignment, and error conversion live here; everything else is the
//! core's job.

pub mod domains;
pub mod findings;
pub mod pkg;
pub mod prototypes;
pub mod questions;
pub mod scenario;
pub mod versions;
pub mod vignettes;
pub mod world;

use crate::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/world", get(world::aggregate))
        .route("/world/meta", get(world::get_meta).put(world::put_meta))
        .route(
            "/world/setting",
            get(world::get_setting).put(world::put_setting),
        )
        .route(
            "/world/thesis",
            get(world::get_thesis).put(world::put_thesis),
        )
        .route(
            "/world/domains",
            get(domains::list).post(domains::create),
        )
        .route(
            "/world/domains/:id",
            get(domains::get_one)
                .put(domains::replace)
                .delete(domains::remove),
        )
        .route("/world/domains/:id/items", post(domains::add_item))
        .route(
            "/world/versions",
            get(versions::list).post(versions::create),
        )
        .route("/world/versions/:version", get(versions::get_one))
        .route("/world/versions/:version/restore", post(versions::restore))
        .route(
            "/open-questions",
            get(questions::list).post(questions::create),
        )
        .route(
            "/open-questions/:id",
            get(questions::get_one)
                .put(questions::update)
                .delete(questions::remove),
        )
        .route("/vignettes", get(vignettes::list).post(vignettes::create))
        .route(
            "/vignettes/:id",
            get(vignettes::get_one)
                .put(vignettes::replace)
                .delete(vignettes::remove),
        )
        .route("/findings", get(findings::list).post(findings::create))
        .route(
            "/findings/:id",
            get(findings::get_one).patch(findings::append_reaction),
        )
        .route("/findings/:id/reflection", post(findings::reflect))
        .route("/prototypes/days", get(prototypes::days))
        .route("/prototypes/registry", get(prototypes::registry))
        .route("/pkg", get(pkg::list))
        .route("/pkg/:name", get(pkg::get_one))
        .route("/scenario/generate", post(scenario::generate))
        .route("/scenario/stream", post(scenario::stream))
        .route(
            "/scenario/conversations",
            get(scenario::list_conversations).post(scenario::start_conversation),
        )
        .route(
            "/scenario/conversations/:id",
            get(scenario::get_conversation),
        )
        .route(
            "/scenario/conversations/:id/messages",
            patch(scenario::append_message),
        )
        .route(
            "/scenario/corrections",
            get(scenario::list_corrections).post(scenario::log_correction),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
