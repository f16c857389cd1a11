//! Rutas de la API
//!
//! Un router por entidad, montados bajo `/api` en `server::build_router`.
//! `docs_routes` queda en la raíz.

pub mod bootstrap_routes;
pub mod docs_routes;
pub mod driver_routes;
pub mod driver_type_routes;
pub mod health_routes;
pub mod safety_category_routes;
pub mod safety_event_routes;
pub mod scorecard_metric_routes;
pub mod scorecard_routes;
pub mod truck_routes;

use axum::Json;
use serde_json::json;

/// Cuerpo estándar de un DELETE exitoso
pub(crate) fn deleted(resource: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": format!("{} deleted", resource)
    }))
}
