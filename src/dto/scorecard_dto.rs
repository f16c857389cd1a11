use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{ReviewMonth, ScorecardCategory};

/// Clave de una sesión de calificación: (driver, mes, categoría)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GradeKey {
    pub driver_id: i32,
    pub month: ReviewMonth,
    pub category: ScorecardCategory,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct MetricScore {
    pub sc_category_id: i32,

    #[validate(range(min = 0, max = 5, message = "sc_score must be between 0 and 5"))]
    pub sc_score: i32,
}

/// Hoja completa de calificación. Guardarla reemplaza todas las filas
/// de la terna (driver, mes, categoría).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct GradeSheet {
    pub driver_id: i32,
    pub month: ReviewMonth,
    pub category: ScorecardCategory,

    #[serde(default)]
    #[validate(length(max = 4000))]
    pub notes: String,

    #[validate]
    pub scores: Vec<MetricScore>,
}

impl GradeSheet {
    pub fn key(&self) -> GradeKey {
        GradeKey {
            driver_id: self.driver_id,
            month: self.month,
            category: self.category,
        }
    }
}
