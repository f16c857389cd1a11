use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Truck, TruckStatus};

// Request para crear/actualizar un truck.
// `status` None conserva el estado actual (o `available` al crear).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct TruckRequest {
    #[validate(length(min = 1, max = 32, message = "unit_number is required"))]
    pub unit_number: String,

    #[validate(range(min = 1900, max = 2100, message = "year must be between 1900 and 2100"))]
    pub year: i32,

    #[serde(default)]
    pub status: Option<TruckStatus>,
}

impl From<&Truck> for TruckRequest {
    fn from(truck: &Truck) -> Self {
        Self {
            unit_number: truck.unit_number.clone(),
            year: truck.year,
            status: Some(truck.status),
        }
    }
}
