//! Historial de trucks (auditoría append-only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "truck_history_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TruckHistoryType {
    Assignment,
    Maintenance,
    StatusChange,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct TruckHistoryEvent {
    pub truck_history_id: i32,
    pub truck_id: i32,
    pub driver_id: Option<i32>,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub event_type: TruckHistoryType,
    pub notes: Option<String>,
}
