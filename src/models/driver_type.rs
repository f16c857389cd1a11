//! Modelo de DriverType (tabla de lookup)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct DriverType {
    pub driver_type_id: i32,
    pub driver_type: String,
}
