//! Cliente de la API de flota
//!
//! `FleetApi` describe cada operación que el store necesita. Hay dos
//! implementaciones: `HttpFleetApi` (reqwest contra un servidor remoto) e
//! `InProcessFleetApi` (llama a los controladores directamente).

pub mod http;
pub mod in_process;

pub use http::HttpFleetApi;
pub use in_process::InProcessFleetApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, HealthResponse,
    NewSafetyEvent, SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest,
    TruckRequest,
};
use crate::models::{
    Driver, DriverStats, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem,
    Snapshot, Truck, TruckHistoryEvent,
};
use crate::utils::errors::AppError;
use crate::views::FormError;

/// Errores vistos por el cliente
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(#[from] FormError),
}

impl ClientError {
    /// Mensaje para mostrar al usuario
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Validation(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<AppError> for ClientError {
    fn from(error: AppError) -> Self {
        ClientError::Api {
            status: error.status_code().as_u16(),
            message: error.to_error_response().message,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[async_trait]
pub trait FleetApi: Send + Sync {
    async fn health(&self) -> ClientResult<HealthResponse>;
    async fn bootstrap(&self) -> ClientResult<Snapshot>;

    async fn create_driver(&self, request: &DriverRequest) -> ClientResult<Driver>;
    async fn update_driver(&self, driver_id: i32, request: &DriverRequest) -> ClientResult<Driver>;
    async fn delete_driver(&self, driver_id: i32) -> ClientResult<()>;
    async fn driver_stats(&self, driver_id: i32) -> ClientResult<DriverStats>;
    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome>;

    async fn create_truck(&self, request: &TruckRequest) -> ClientResult<Truck>;
    async fn update_truck(&self, truck_id: i32, request: &TruckRequest) -> ClientResult<Truck>;
    async fn delete_truck(&self, truck_id: i32) -> ClientResult<()>;
    async fn truck_history(&self, truck_id: i32) -> ClientResult<Vec<TruckHistoryEvent>>;
    async fn assign_driver(
        &self,
        truck_id: i32,
        driver_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome>;

    async fn create_driver_type(&self, request: &DriverTypeRequest) -> ClientResult<DriverType>;
    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: &DriverTypeRequest,
    ) -> ClientResult<DriverType>;
    async fn delete_driver_type(&self, driver_type_id: i32) -> ClientResult<()>;

    async fn create_safety_category(
        &self,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory>;
    async fn update_safety_category(
        &self,
        category_id: i32,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory>;
    async fn delete_safety_category(&self, category_id: i32) -> ClientResult<()>;

    async fn create_scorecard_metric(
        &self,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem>;
    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem>;
    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> ClientResult<()>;

    async fn create_safety_event(&self, event: &NewSafetyEvent) -> ClientResult<SafetyEvent>;
    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: &SafetyEventUpdate,
    ) -> ClientResult<SafetyEvent>;
    async fn delete_safety_event(&self, safety_event_id: i32) -> ClientResult<()>;

    /// None si la terna todavía no tiene calificación
    async fn grade_sheet(&self, key: GradeKey) -> ClientResult<Option<GradeSheet>>;
    async fn save_grades(&self, sheet: &GradeSheet) -> ClientResult<Vec<ScoreCardEvent>>;
    async fn delete_grades(&self, key: GradeKey) -> ClientResult<u64>;
}
