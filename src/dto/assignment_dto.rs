use serde::{Deserialize, Serialize};

use crate::models::{Driver, Truck};

// Body de POST /drivers/:id/assign-truck
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignTruckRequest {
    pub truck_id: Option<i32>,
}

// Body de POST /trucks/:id/assign-driver
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignDriverRequest {
    pub driver_id: Option<i32>,
}

/// Resultado de una asignación: el driver actualizado, el truck destino
/// y el truck liberado (si el driver tenía otro).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub driver: Option<Driver>,
    pub truck: Option<Truck>,
    pub released_truck: Option<Truck>,
}
