//! Modelo de Truck
//! 
//! Un truck está `assigned` si y solo si exactamente un driver lo referencia.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;

/// Estado del truck - mapea al ENUM truck_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "truck_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TruckStatus {
    #[default]
    Available,
    Maintenance,
    Assigned,
}

impl TruckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruckStatus::Available => "available",
            TruckStatus::Maintenance => "maintenance",
            TruckStatus::Assigned => "assigned",
        }
    }
}

impl fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truck - mapea exactamente a la tabla trucks
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Truck {
    pub truck_id: i32,
    pub unit_number: String,
    pub year: i32,
    pub status: TruckStatus,
}

impl Truck {
    pub fn is_assigned(&self) -> bool {
        self.status == TruckStatus::Assigned
    }
}
