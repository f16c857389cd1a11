//! Modelos del sistema
//! 
//! Este módulo contiene los registros que mapean exactamente al schema
//! PostgreSQL. Los nombres de campos son snake_case de punta a punta
//! (almacenamiento = wire = UI) para evitar errores de mapeo.

pub mod driver;
pub mod driver_type;
pub mod review_month;
pub mod safety;
pub mod scorecard;
pub mod snapshot;
pub mod truck;
pub mod truck_history;

pub use driver::{Driver, DriverStanding, DriverStats};
pub use driver_type::DriverType;
pub use review_month::ReviewMonth;
pub use safety::{SafetyCategory, SafetyEvent};
pub use scorecard::{ScoreCardEvent, ScoreCardItem, ScorecardCategory};
pub use snapshot::Snapshot;
pub use truck::{Truck, TruckStatus};
pub use truck_history::{TruckHistoryEvent, TruckHistoryType};
