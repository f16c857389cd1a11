//! Controladores
//!
//! Cada controlador valida el request (validator), normaliza los campos de
//! texto y delega en el `FleetRepository`.

pub mod bootstrap_controller;
pub mod driver_controller;
pub mod driver_type_controller;
pub mod health_controller;
pub mod safety_category_controller;
pub mod safety_event_controller;
pub mod scorecard_controller;
pub mod scorecard_metric_controller;
pub mod truck_controller;

pub use bootstrap_controller::BootstrapController;
pub use driver_controller::DriverController;
pub use driver_type_controller::DriverTypeController;
pub use health_controller::HealthController;
pub use safety_category_controller::SafetyCategoryController;
pub use safety_event_controller::SafetyEventController;
pub use scorecard_controller::ScorecardController;
pub use scorecard_metric_controller::ScorecardMetricController;
pub use truck_controller::TruckController;

/// Quitar espacios al inicio y al final sin reasignar si no hace falta
pub(crate) fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}
