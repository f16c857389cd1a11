//! DTOs de request/response de la API

pub mod assignment_dto;
pub mod catalog_dto;
pub mod driver_dto;
pub mod health_dto;
pub mod safety_event_dto;
pub mod scorecard_dto;
pub mod truck_dto;

pub use assignment_dto::*;
pub use catalog_dto::*;
pub use driver_dto::*;
pub use health_dto::*;
pub use safety_event_dto::*;
pub use scorecard_dto::*;
pub use truck_dto::*;
