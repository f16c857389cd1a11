//! Registro de safety events: formulario, filtros y borrado confirmado

use chrono::{Months, NaiveDate};

use crate::client::{ClientError, ClientResult, FleetApi};
use crate::dto::{NewSafetyEvent, SafetyEventUpdate};
use crate::models::{SafetyEvent, Snapshot};
use crate::store::DbStore;

use super::{FormError, DRIVER_AND_CATEGORY_REQUIRED};

pub const SAVE_FAILED: &str = "Failed to save safety event.";
pub const DELETE_FAILED: &str = "Failed to delete event.";

/// Ventana por defecto del filtro de fechas
const DEFAULT_WINDOW_MONTHS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyEventForm {
    pub driver_id: Option<i32>,
    pub category_id: Option<i32>,
    pub event_date: NaiveDate,
    pub notes: String,
}

impl SafetyEventForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            driver_id: None,
            category_id: None,
            event_date: today,
            notes: String::new(),
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    /// Arma el evento copiando los puntajes vigentes de la categoría
    pub fn build_event(&self, snapshot: &Snapshot) -> Result<NewSafetyEvent, FormError> {
        let category = self.category_id.and_then(|id| snapshot.safety_category(id));
        let (Some(driver_id), Some(category)) = (self.driver_id, category) else {
            return Err(FormError::new(DRIVER_AND_CATEGORY_REQUIRED));
        };

        Ok(NewSafetyEvent {
            driver_id,
            event_date: self.event_date,
            category_id: category.category_id,
            notes: self.notes.trim().to_string(),
            bonus_score: category.scoring_system,
            p_i_score: category.p_i_score,
            bonus_period: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilters {
    pub driver_id: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EventFilters {
    /// Últimos tres meses hasta hoy, todos los drivers
    pub fn defaults(today: NaiveDate) -> Self {
        Self {
            driver_id: None,
            start_date: Some(
                today
                    .checked_sub_months(Months::new(DEFAULT_WINDOW_MONTHS))
                    .unwrap_or(NaiveDate::MIN),
            ),
            end_date: Some(today),
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::defaults(today);
    }

    pub fn accepts(&self, event: &SafetyEvent) -> bool {
        self.start_date.map_or(true, |start| event.event_date >= start)
            && self.end_date.map_or(true, |end| event.event_date <= end)
            && self.driver_id.map_or(true, |id| event.driver_id == id)
    }

    /// Eventos que pasan los filtros, más recientes primero
    pub fn apply<'a>(&self, events: &'a [SafetyEvent]) -> Vec<&'a SafetyEvent> {
        let mut visible: Vec<&SafetyEvent> = events.iter().filter(|e| self.accepts(e)).collect();
        visible.sort_by(|a, b| {
            b.event_date
                .cmp(&a.event_date)
                .then(b.safety_event_id.cmp(&a.safety_event_id))
        });
        visible
    }
}

/// Fila de la tabla del log, con nombres resueltos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub safety_event_id: i32,
    pub event_date: NaiveDate,
    pub driver_name: String,
    pub category_code: String,
    pub notes: String,
    pub bonus_score: i32,
    pub p_i_score: i32,
}

pub fn rows(snapshot: &Snapshot, filters: &EventFilters) -> Vec<EventRow> {
    filters
        .apply(&snapshot.safety_events)
        .into_iter()
        .map(|event| EventRow {
            safety_event_id: event.safety_event_id,
            event_date: event.event_date,
            driver_name: snapshot
                .driver(event.driver_id)
                .map(|d| d.full_name())
                .unwrap_or_else(|| "Unknown".to_string()),
            category_code: snapshot
                .safety_category(event.category_id)
                .map(|c| c.code.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            notes: event.notes.clone(),
            bonus_score: event.bonus_score,
            p_i_score: event.p_i_score,
        })
        .collect()
}

pub struct SafetyLogView {
    pub form: SafetyEventForm,
    pub filters: EventFilters,
    pending_delete: Option<i32>,
}

impl SafetyLogView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            form: SafetyEventForm::new(today),
            filters: EventFilters::defaults(today),
            pending_delete: None,
        }
    }

    pub fn rows(&self, snapshot: &Snapshot) -> Vec<EventRow> {
        rows(snapshot, &self.filters)
    }

    /// Registra el evento. El formulario sólo se limpia si la API lo acepta.
    pub async fn submit<A: FleetApi>(
        &mut self,
        store: &mut DbStore<A>,
        today: NaiveDate,
    ) -> ClientResult<SafetyEvent> {
        let event = self.form.build_event(store.state())?;
        match store.create_safety_event(&event).await {
            Ok(saved) => {
                self.form.reset(today);
                Ok(saved)
            }
            Err(e) => {
                log::warn!("⚠️ No se pudo registrar el safety event: {}", e);
                Err(ClientError::Validation(FormError::new(SAVE_FAILED)))
            }
        }
    }

    pub fn request_delete(&mut self, safety_event_id: i32) {
        self.pending_delete = Some(safety_event_id);
    }

    pub fn pending_delete(&self) -> Option<i32> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Borra el evento pendiente; Ok(false) si no había ninguno
    pub async fn confirm_delete<A: FleetApi>(&mut self, store: &mut DbStore<A>) -> ClientResult<bool> {
        let Some(safety_event_id) = self.pending_delete else {
            return Ok(false);
        };
        match store.delete_safety_event(safety_event_id).await {
            Ok(()) => {
                self.pending_delete = None;
                Ok(true)
            }
            Err(e) => {
                log::warn!("⚠️ No se pudo borrar el safety event {}: {}", safety_event_id, e);
                Err(ClientError::Validation(FormError::new(DELETE_FAILED)))
            }
        }
    }
}

/// Corrige fecha y notas de un evento ya registrado.
/// Los puntajes copiados de la categoría no se editan.
pub async fn correct_event<A: FleetApi>(
    store: &mut DbStore<A>,
    safety_event_id: i32,
    event_date: NaiveDate,
    notes: &str,
) -> ClientResult<SafetyEvent> {
    let update = SafetyEventUpdate {
        event_date,
        notes: notes.trim().to_string(),
    };
    store
        .update_safety_event(safety_event_id, &update)
        .await
        .map_err(|e| {
            log::warn!("⚠️ No se pudo corregir el safety event {}: {}", safety_event_id, e);
            ClientError::Validation(FormError::new(SAVE_FAILED))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Driver, SafetyCategory};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: i32, driver_id: i32, category_id: i32, event_date: NaiveDate) -> SafetyEvent {
        SafetyEvent {
            safety_event_id: id,
            driver_id,
            event_date,
            category_id,
            notes: String::new(),
            bonus_score: 1,
            p_i_score: 0,
            bonus_period: true,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            drivers: vec![Driver {
                driver_id: 5,
                driver_code: "D5".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Lopez".to_string(),
                start_date: None,
                truck_id: None,
                driver_type_id: None,
                profile_pic: None,
            }],
            safety_categories: vec![SafetyCategory {
                category_id: 1,
                code: "B001".to_string(),
                description: "Hard braking".to_string(),
                scoring_system: 3,
                p_i_score: 1,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_event_snapshots_category_scores() {
        let snapshot = snapshot();
        let mut form = SafetyEventForm::new(date(2025, 6, 10));
        form.driver_id = Some(5);
        assert_eq!(
            form.build_event(&snapshot).unwrap_err().message,
            DRIVER_AND_CATEGORY_REQUIRED
        );

        form.category_id = Some(1);
        let event = form.build_event(&snapshot).unwrap();
        assert_eq!(event.bonus_score, 3);
        assert_eq!(event.p_i_score, 1);
        assert!(event.bonus_period);
        assert_eq!(event.event_date, date(2025, 6, 10));

        form.category_id = Some(42);
        assert!(form.build_event(&snapshot).is_err());
    }

    #[test]
    fn test_default_filters_cover_three_months() {
        let filters = EventFilters::defaults(date(2025, 5, 31));
        assert_eq!(filters.start_date, Some(date(2025, 2, 28)));
        assert_eq!(filters.end_date, Some(date(2025, 5, 31)));
        assert_eq!(filters.driver_id, None);
    }

    #[test]
    fn test_filters_sort_newest_first() {
        let events = vec![
            event(1, 5, 1, date(2025, 4, 1)),
            event(2, 6, 1, date(2025, 5, 20)),
            event(3, 5, 1, date(2025, 5, 20)),
            event(4, 5, 1, date(2024, 12, 1)),
        ];
        let mut filters = EventFilters::defaults(date(2025, 6, 1));
        let ids: Vec<i32> = filters.apply(&events).iter().map(|e| e.safety_event_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);

        filters.driver_id = Some(5);
        filters.start_date = None;
        let ids: Vec<i32> = filters.apply(&events).iter().map(|e| e.safety_event_id).collect();
        assert_eq!(ids, vec![3, 1, 4]);

        filters.reset(date(2025, 6, 1));
        assert_eq!(filters, EventFilters::defaults(date(2025, 6, 1)));
    }

    #[test]
    fn test_rows_fall_back_for_missing_references() {
        let mut snapshot = snapshot();
        snapshot.safety_events = vec![event(1, 5, 1, date(2025, 6, 1)), event(2, 99, 7, date(2025, 6, 2))];
        let rows = rows(&snapshot, &EventFilters::defaults(date(2025, 6, 10)));
        assert_eq!(rows[0].driver_name, "Unknown");
        assert_eq!(rows[0].category_code, "N/A");
        assert_eq!(rows[1].driver_name, "Ana Lopez");
        assert_eq!(rows[1].category_code, "B001");
    }
}
