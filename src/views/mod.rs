//! View-models de las pantallas del dashboard
//!
//! No dibujan nada: guardan el estado de cada pantalla (formularios,
//! filtros, confirmaciones) y hablan con el `DbStore`. Una UI concreta
//! sólo tiene que leerlos y reenviarles los eventos del usuario.

pub mod assignment;
pub mod catalog_forms;
pub mod crud;
pub mod driver_form;
pub mod safety_log;
pub mod scorecard;
pub mod search;
pub mod truck_form;

pub use assignment::{AssignmentDialog, DriverOption, HistoryRow};
pub use catalog_forms::{DriverTypeForm, MetricForm, SafetyCategoryForm};
pub use crud::{CrudMode, CrudView, Ticket};
pub use driver_form::DriverForm;
pub use safety_log::{EventFilters, EventRow, SafetyEventForm, SafetyLogView};
pub use scorecard::GradingSession;
pub use search::Searchable;
pub use truck_form::TruckForm;

use thiserror::Error;

pub const REQUIRED_FIELDS: &str = "Please fill in all required fields.";
pub const IMAGE_TOO_LARGE: &str = "Image is too large. Please select an image under 1MB.";
pub const NOT_AN_IMAGE: &str = "Please select a PNG, JPEG, GIF, WebP or SVG image.";
pub const EMPTY_IMAGE: &str = "The selected image file is empty.";
pub const INVALID_START_DATE: &str = "Please enter a valid start date (YYYY-MM-DD).";
pub const UNIT_NUMBER_REQUIRED: &str = "Unit Number is required";
pub const INVALID_YEAR: &str = "Please enter a valid model year.";
pub const DRIVER_TYPE_REQUIRED: &str = "Please fill in the Driver Type Name.";
pub const CODE_AND_DESCRIPTION_REQUIRED: &str = "Please fill in Code and Description.";
pub const INVALID_SCORE_VALUE: &str = "Scores must be whole numbers.";
pub const DESCRIPTION_REQUIRED: &str = "Please enter a description.";
pub const DRIVER_AND_CATEGORY_REQUIRED: &str = "Please select a driver and a category.";
pub const DRIVER_REQUIRED: &str = "Please select a driver.";
pub const SCORE_OUT_OF_RANGE: &str = "Scores must be between 0 and 5.";
pub const DRIVER_UNAVAILABLE: &str = "This driver is already assigned to another unit.";

/// Error de validación de un formulario, con el mensaje para el usuario
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FormError {
    pub message: String,
}

impl FormError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Formulario de alta/edición de una entidad
pub trait EntityForm: Clone {
    type Record;
    type Request;

    /// Pregunta que se muestra antes de borrar
    const DELETE_PROMPT: &'static str;

    fn from_record(record: &Self::Record) -> Self;

    fn record_id(record: &Self::Record) -> i32;

    /// Valida los campos y arma el request para la API
    fn to_request(&self) -> Result<Self::Request, FormError>;
}

/// Campo obligatorio: no vacío después de `trim`
pub(crate) fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Entero desde un input de formulario; vacío cuenta como 0
pub(crate) fn coerce_int(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_error_displays_message() {
        let error = FormError::new(REQUIRED_FIELDS);
        assert_eq!(error.to_string(), "Please fill in all required fields.");
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int(""), Some(0));
        assert_eq!(coerce_int(" -2 "), Some(-2));
        assert_eq!(coerce_int("3.5"), None);
        assert_eq!(required("  B001 "), Some("B001".to_string()));
        assert_eq!(required("   "), None);
    }
}
