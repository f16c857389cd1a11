//! Modelo de Driver

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Driver - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Driver {
    pub driver_id: i32,
    pub driver_code: String,
    pub first_name: String,
    pub last_name: String,
    pub start_date: Option<NaiveDate>,
    pub truck_id: Option<i32>,
    pub driver_type_id: Option<i32>,
    pub profile_pic: Option<String>,
}

impl Driver {
    /// Nombre para mostrar: "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Situación del driver según su bonus acumulado
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DriverStanding {
    Good,
    Warning,
}

/// Totales de safety events de un driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverStats {
    pub event_count: i64,
    pub total_bonus_score: i64,
    pub total_p_i_score: i64,
    pub status: DriverStanding,
}

impl DriverStats {
    /// Umbral a partir del cual el driver pasa a Warning
    pub const WARNING_THRESHOLD: i64 = 5;

    pub fn from_totals(event_count: i64, total_bonus_score: i64, total_p_i_score: i64) -> Self {
        let status = if total_bonus_score > Self::WARNING_THRESHOLD {
            DriverStanding::Warning
        } else {
            DriverStanding::Good
        };

        Self {
            event_count,
            total_bonus_score,
            total_p_i_score,
            status,
        }
    }
}
