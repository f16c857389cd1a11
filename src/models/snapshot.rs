//! Snapshot completo devuelto por `GET /bootstrap`

use serde::{Deserialize, Serialize};

use super::{
    Driver, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem, Truck,
};

/// Las siete colecciones en un solo payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub trucks: Vec<Truck>,
    #[serde(default)]
    pub driver_types: Vec<DriverType>,
    #[serde(default)]
    pub drivers: Vec<Driver>,
    #[serde(default)]
    pub safety_categories: Vec<SafetyCategory>,
    #[serde(default)]
    pub scorecard_metrics: Vec<ScoreCardItem>,
    #[serde(default)]
    pub safety_events: Vec<SafetyEvent>,
    #[serde(default)]
    pub scorecard_events: Vec<ScoreCardEvent>,
}

impl Snapshot {
    pub fn driver(&self, driver_id: i32) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.driver_id == driver_id)
    }

    pub fn truck(&self, truck_id: i32) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.truck_id == truck_id)
    }

    pub fn safety_category(&self, category_id: i32) -> Option<&SafetyCategory> {
        self.safety_categories
            .iter()
            .find(|c| c.category_id == category_id)
    }

    pub fn driver_type(&self, driver_type_id: i32) -> Option<&DriverType> {
        self.driver_types
            .iter()
            .find(|t| t.driver_type_id == driver_type_id)
    }

    pub fn metric(&self, sc_category_id: i32) -> Option<&ScoreCardItem> {
        self.scorecard_metrics
            .iter()
            .find(|m| m.sc_category_id == sc_category_id)
    }

    /// Driver que tiene asignado el truck, si existe
    pub fn driver_for_truck(&self, truck_id: i32) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.truck_id == Some(truck_id))
    }
}
