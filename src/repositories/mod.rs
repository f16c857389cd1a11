//! Repositorios de datos
//!
//! `FleetRepository` describe todas las operaciones de persistencia.
//! Las operaciones que tocan varias filas (asignación, borrado de driver,
//! reemplazo de calificaciones) son atómicas en cada backend.

pub mod memory_repository;
pub mod pg_repository;

pub use memory_repository::MemoryFleetRepository;
pub use pg_repository::PgFleetRepository;

use async_trait::async_trait;

use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, MetricScore,
    NewSafetyEvent, SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest,
    TruckRequest,
};
use crate::models::{
    Driver, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem, Snapshot,
    Truck, TruckHistoryEvent, TruckHistoryType, TruckStatus,
};
use crate::utils::errors::{bad_request_error, AppError, AppResult};

#[async_trait]
pub trait FleetRepository: Send + Sync {
    /// Verificar que el backend responde
    async fn ping(&self) -> AppResult<()>;

    /// Las siete colecciones en una sola lectura
    async fn snapshot(&self) -> AppResult<Snapshot>;

    // --- Drivers ---
    async fn list_drivers(&self) -> AppResult<Vec<Driver>>;
    async fn create_driver(&self, request: DriverRequest) -> AppResult<Driver>;
    /// Si cambia `truck_id` se aplica la lógica de asignación en la misma transacción
    async fn update_driver(&self, driver_id: i32, request: DriverRequest) -> AppResult<Driver>;
    /// Borra en cascada safety events y scorecard events, y libera su truck
    async fn delete_driver(&self, driver_id: i32) -> AppResult<()>;
    async fn safety_events_for_driver(&self, driver_id: i32) -> AppResult<Vec<SafetyEvent>>;

    // --- Asignación ---
    /// Asigna el driver al truck (o lo desasigna con None)
    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> AppResult<AssignmentOutcome>;
    /// Asignación desde el lado del truck: el truck es el recurso (404 si no
    /// existe) y el driver una referencia del body (400 si no existe)
    async fn assign_driver_to_truck(
        &self,
        truck_id: i32,
        driver_id: i32,
    ) -> AppResult<AssignmentOutcome>;
    /// Libera el truck: quien lo tenga pierde la referencia, estado `available`
    async fn release_truck(&self, truck_id: i32) -> AppResult<AssignmentOutcome>;

    // --- Trucks ---
    async fn list_trucks(&self) -> AppResult<Vec<Truck>>;
    async fn create_truck(&self, request: TruckRequest) -> AppResult<Truck>;
    async fn update_truck(&self, truck_id: i32, request: TruckRequest) -> AppResult<Truck>;
    async fn delete_truck(&self, truck_id: i32) -> AppResult<()>;
    /// Historial del truck, más reciente primero
    async fn truck_history(&self, truck_id: i32) -> AppResult<Vec<TruckHistoryEvent>>;

    // --- Driver types ---
    async fn list_driver_types(&self) -> AppResult<Vec<DriverType>>;
    async fn create_driver_type(&self, request: DriverTypeRequest) -> AppResult<DriverType>;
    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: DriverTypeRequest,
    ) -> AppResult<DriverType>;
    async fn delete_driver_type(&self, driver_type_id: i32) -> AppResult<()>;

    // --- Safety categories ---
    async fn list_safety_categories(&self) -> AppResult<Vec<SafetyCategory>>;
    async fn create_safety_category(
        &self,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory>;
    async fn update_safety_category(
        &self,
        category_id: i32,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory>;
    async fn delete_safety_category(&self, category_id: i32) -> AppResult<()>;

    // --- Scorecard metrics ---
    async fn list_scorecard_metrics(&self) -> AppResult<Vec<ScoreCardItem>>;
    async fn create_scorecard_metric(
        &self,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem>;
    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem>;
    /// Borra también las calificaciones de esa métrica
    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> AppResult<()>;

    // --- Safety events ---
    async fn list_safety_events(&self) -> AppResult<Vec<SafetyEvent>>;
    async fn create_safety_event(&self, event: NewSafetyEvent) -> AppResult<SafetyEvent>;
    /// Corrige fecha y notas; los puntajes del snapshot quedan intactos
    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: SafetyEventUpdate,
    ) -> AppResult<SafetyEvent>;
    async fn delete_safety_event(&self, safety_event_id: i32) -> AppResult<()>;

    // --- Scorecard events ---
    async fn list_scorecard_events(&self) -> AppResult<Vec<ScoreCardEvent>>;
    /// Hoja guardada para la terna, None si no hay calificación
    async fn grade_sheet(&self, key: GradeKey) -> AppResult<Option<GradeSheet>>;
    /// Reemplaza todas las filas de la terna por las de la hoja
    async fn replace_grades(&self, sheet: GradeSheet) -> AppResult<Vec<ScoreCardEvent>>;
    /// Borra todas las filas de la terna; devuelve cuántas se borraron
    async fn delete_grades(&self, key: GradeKey) -> AppResult<u64>;
}

/// Nota de historial para una asignación
/// Una métrica con calificaciones no puede cambiar de categoría: sus filas
/// quedarían agrupadas en la hoja de la categoría nueva.
pub(crate) fn graded_metric_moved_error(sc_category_id: i32) -> AppError {
    AppError::Conflict(format!(
        "Scorecard metric with id '{}' already has grades; its category cannot change",
        sc_category_id
    ))
}

pub(crate) fn assignment_note(driver_id: i32) -> String {
    format!("Assigned driver ID {}", driver_id)
}

/// Nota de historial al liberar un truck
pub(crate) const UNASSIGNED_NOTE: &str = "Unassigned driver";

/// Estado resultante de un update de truck.
///
/// `assigned` se reserva a la lógica de asignación: no se puede pedir sin
/// driver, y un truck con driver no puede pasar a otro estado.
pub(crate) fn resolve_truck_status(
    current: TruckStatus,
    requested: Option<TruckStatus>,
    has_holder: bool,
) -> AppResult<TruckStatus> {
    match (requested, has_holder) {
        (None, true) => Ok(TruckStatus::Assigned),
        (None, false) if current == TruckStatus::Assigned => Ok(TruckStatus::Available),
        (None, false) => Ok(current),
        (Some(TruckStatus::Assigned), false) => Err(bad_request_error(
            "a truck can only be marked assigned by assigning a driver",
        )),
        (Some(TruckStatus::Assigned), true) => Ok(TruckStatus::Assigned),
        (Some(_), true) => Err(AppError::Conflict(
            "truck is assigned to a driver; unassign it first".to_string(),
        )),
        (Some(status), false) => Ok(status),
    }
}

/// Tipo y nota de historial para un cambio manual de estado
pub(crate) fn status_change_entry(from: TruckStatus, to: TruckStatus) -> (TruckHistoryType, String) {
    let event_type = if to == TruckStatus::Maintenance {
        TruckHistoryType::Maintenance
    } else {
        TruckHistoryType::StatusChange
    };
    (event_type, format!("Status changed from {} to {}", from, to))
}

/// Arma la hoja de calificación a partir de las filas guardadas.
/// Las notas se toman de la primera fila.
pub(crate) fn sheet_from_rows(key: GradeKey, rows: Vec<ScoreCardEvent>) -> Option<GradeSheet> {
    let notes = rows.first()?.notes.clone();
    Some(GradeSheet {
        driver_id: key.driver_id,
        month: key.month,
        category: key.category,
        notes,
        scores: rows
            .iter()
            .map(|row| MetricScore {
                sc_category_id: row.sc_category_id,
                sc_score: row.sc_score,
            })
            .collect(),
    })
}
