use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Request para registrar un safety event.
// Los puntajes ya vienen copiados de la categoría vigente.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct NewSafetyEvent {
    #[validate(range(min = 1, message = "driver_id is required"))]
    pub driver_id: i32,

    pub event_date: NaiveDate,

    #[validate(range(min = 1, message = "category_id is required"))]
    pub category_id: i32,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,

    pub bonus_score: i32,

    pub p_i_score: i32,

    #[serde(default = "default_bonus_period")]
    pub bonus_period: bool,
}

fn default_bonus_period() -> bool {
    true
}

// Corrección de un safety event ya registrado.
// Solo fecha y notas: los puntajes copiados no se tocan.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SafetyEventUpdate {
    pub event_date: NaiveDate,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}
