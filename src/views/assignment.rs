//! Modal de asignación de driver a truck e historial del truck

use chrono::{DateTime, Utc};

use crate::client::{ClientResult, FleetApi};
use crate::dto::AssignmentOutcome;
use crate::models::{Snapshot, TruckHistoryEvent, TruckHistoryType};
use crate::store::DbStore;

use super::{FormError, DRIVER_UNAVAILABLE};

/// Un driver en la lista del modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOption {
    pub driver_id: i32,
    /// "First Last (CODE)"
    pub label: String,
    /// Tiene asignado el truck del modal
    pub current: bool,
    /// Tiene asignado otro truck; no se puede elegir
    pub disabled: bool,
    /// Unit number del otro truck, si lo hay
    pub other_unit: Option<String>,
}

/// Todos los drivers, marcando los que ya manejan otro truck
pub fn driver_options(snapshot: &Snapshot, truck_id: i32) -> Vec<DriverOption> {
    snapshot
        .drivers
        .iter()
        .map(|driver| {
            let other_truck = driver.truck_id.filter(|id| *id != truck_id);
            DriverOption {
                driver_id: driver.driver_id,
                label: format!("{} ({})", driver.full_name(), driver.driver_code),
                current: driver.truck_id == Some(truck_id),
                disabled: other_truck.is_some(),
                other_unit: other_truck
                    .and_then(|id| snapshot.truck(id))
                    .map(|t| t.unit_number.clone()),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDialog {
    truck_id: i32,
    options: Vec<DriverOption>,
}

impl AssignmentDialog {
    pub fn open(snapshot: &Snapshot, truck_id: i32) -> Self {
        Self {
            truck_id,
            options: driver_options(snapshot, truck_id),
        }
    }

    pub fn truck_id(&self) -> i32 {
        self.truck_id
    }

    pub fn options(&self) -> &[DriverOption] {
        &self.options
    }

    /// Asigna el driver elegido, o libera el truck con None
    pub async fn choose<A: FleetApi>(
        &self,
        driver_id: Option<i32>,
        store: &mut DbStore<A>,
    ) -> ClientResult<AssignmentOutcome> {
        if let Some(id) = driver_id {
            if self.options.iter().any(|o| o.driver_id == id && o.disabled) {
                return Err(FormError::new(DRIVER_UNAVAILABLE).into());
            }
        }
        store.assign_driver(self.truck_id, driver_id).await
    }
}

/// Fila del historial con el driver resuelto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub date: DateTime<Utc>,
    pub event_type: TruckHistoryType,
    pub driver_name: Option<String>,
    pub notes: String,
}

pub fn history_rows(snapshot: &Snapshot, mut events: Vec<TruckHistoryEvent>) -> Vec<HistoryRow> {
    events.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.truck_history_id.cmp(&a.truck_history_id))
    });
    events
        .into_iter()
        .map(|event| HistoryRow {
            date: event.date,
            event_type: event.event_type,
            driver_name: event
                .driver_id
                .map(|id| snapshot.driver(id).map(|d| d.full_name()).unwrap_or_else(|| "Unknown".to_string())),
            notes: event.notes.unwrap_or_default(),
        })
        .collect()
}

/// Historial de solo lectura, más reciente primero
pub async fn load_history<A: FleetApi>(
    store: &DbStore<A>,
    truck_id: i32,
) -> ClientResult<Vec<HistoryRow>> {
    let events = store.truck_history(truck_id).await?;
    Ok(history_rows(store.state(), events))
}
