//! Modelos de scorecard: métricas (items) y calificaciones (events)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;

/// Categoría de scorecard - mapea al ENUM scorecard_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[sqlx(type_name = "scorecard_category", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ScorecardCategory {
    Safety,
    Maintenance,
    Dispatch,
}

impl ScorecardCategory {
    pub const ALL: [ScorecardCategory; 3] = [
        ScorecardCategory::Safety,
        ScorecardCategory::Maintenance,
        ScorecardCategory::Dispatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScorecardCategory::Safety => "SAFETY",
            ScorecardCategory::Maintenance => "MAINTENANCE",
            ScorecardCategory::Dispatch => "DISPATCH",
        }
    }
}

impl fmt::Display for ScorecardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScorecardCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAFETY" => Ok(ScorecardCategory::Safety),
            "MAINTENANCE" => Ok(ScorecardCategory::Maintenance),
            "DISPATCH" => Ok(ScorecardCategory::Dispatch),
            other => Err(format!("unknown scorecard category '{}'", other)),
        }
    }
}

/// Métrica de scorecard, opcionalmente restringida a un driver type
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ScoreCardItem {
    pub sc_category_id: i32,
    pub sc_category: ScorecardCategory,
    pub sc_description: String,
    /// None = métrica global
    pub driver_type_id: Option<i32>,
}

impl ScoreCardItem {
    /// La métrica aplica si es global o si coincide con el tipo del driver
    pub fn applies_to(&self, driver_type_id: Option<i32>) -> bool {
        match self.driver_type_id {
            None => true,
            Some(scoped) => driver_type_id == Some(scoped),
        }
    }
}

/// Calificación de una métrica para un driver en un mes.
/// `event_date` siempre es el primer día del mes calificado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ScoreCardEvent {
    pub scorecard_event_id: i32,
    pub driver_id: i32,
    pub event_date: NaiveDate,
    pub sc_category_id: i32,
    pub sc_score: i32,
    pub notes: String,
}
