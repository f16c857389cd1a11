//! Modelos de SafetyCategory y SafetyEvent
//! 
//! `bonus_score` y `p_i_score` de un SafetyEvent son una copia de los valores
//! de la categoría en el momento de crear el evento. Editar la categoría
//! después no modifica eventos pasados.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Categoría de safety event con sus deltas de puntuación
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct SafetyCategory {
    pub category_id: i32,
    pub code: String,
    pub description: String,
    /// Delta de bonus: positivo es penalización, negativo es crédito
    pub scoring_system: i32,
    pub p_i_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct SafetyEvent {
    pub safety_event_id: i32,
    pub driver_id: i32,
    pub event_date: NaiveDate,
    pub category_id: i32,
    pub notes: String,
    pub bonus_score: i32,
    pub p_i_score: i32,
    pub bonus_period: bool,
}
