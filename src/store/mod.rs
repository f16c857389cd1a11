//! Store del cliente
//!
//! `DbStore` guarda una copia completa de las siete colecciones, media cada
//! escritura contra la API y notifica a los suscriptores después de cada
//! cambio. Nunca modifica el estado local antes de que la API confirme.
//!
//! Las operaciones con efectos en varias entidades (asignaciones, borrado de
//! drivers, trucks, driver types y métricas) vuelven a pedir el snapshot
//! completo; el resto reemplaza sólo el registro devuelto por el servidor.

use std::collections::HashSet;

use crate::client::{ClientResult, FleetApi};
use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, NewSafetyEvent,
    SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest, TruckRequest,
};
use crate::models::{
    Driver, DriverStats, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem,
    Snapshot, Truck, TruckHistoryEvent,
};
use crate::repositories::sheet_from_rows;

pub type Listener = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Handle para cancelar una suscripción
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct DbStore<A> {
    api: A,
    state: Snapshot,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    revision: u64,
}

impl<A: FleetApi> DbStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Snapshot::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &Snapshot {
        &self.state
    }

    /// Número de notificaciones emitidas
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Devuelve false si la suscripción ya no existía
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        self.revision += 1;
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }

    /// Reemplaza todo el estado con un snapshot nuevo
    pub async fn init(&mut self) -> ClientResult<()> {
        let snapshot = self.api.bootstrap().await?;
        log::debug!(
            "🔄 Store actualizado: {} drivers, {} trucks",
            snapshot.drivers.len(),
            snapshot.trucks.len()
        );
        self.state = snapshot;
        self.notify();
        Ok(())
    }

    // --- Drivers ---

    /// Crea (`None`) o actualiza un driver. Si cambia su truck se re-sincroniza todo.
    pub async fn save_driver(
        &mut self,
        driver_id: Option<i32>,
        request: &DriverRequest,
    ) -> ClientResult<Driver> {
        let previous_truck = driver_id
            .and_then(|id| self.state.driver(id))
            .and_then(|d| d.truck_id);

        let driver = match driver_id {
            Some(id) => self.api.update_driver(id, request).await?,
            None => self.api.create_driver(request).await?,
        };

        if driver.truck_id != previous_truck {
            self.init().await?;
        } else {
            upsert(&mut self.state.drivers, driver.clone(), |d| {
                d.driver_id == driver.driver_id
            });
            self.notify();
        }
        Ok(driver)
    }

    /// Borra el driver; sus eventos caen en cascada y su truck queda libre
    pub async fn delete_driver(&mut self, driver_id: i32) -> ClientResult<()> {
        self.api.delete_driver(driver_id).await?;
        self.init().await
    }

    pub async fn driver_stats(&self, driver_id: i32) -> ClientResult<DriverStats> {
        self.api.driver_stats(driver_id).await
    }

    // --- Asignación ---

    pub async fn assign_truck(
        &mut self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        let outcome = self.api.assign_truck(driver_id, truck_id).await?;
        self.init().await?;
        Ok(outcome)
    }

    pub async fn assign_driver(
        &mut self,
        truck_id: i32,
        driver_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        let outcome = self.api.assign_driver(truck_id, driver_id).await?;
        self.init().await?;
        Ok(outcome)
    }

    // --- Trucks ---

    pub async fn save_truck(
        &mut self,
        truck_id: Option<i32>,
        request: &TruckRequest,
    ) -> ClientResult<Truck> {
        let truck = match truck_id {
            Some(id) => self.api.update_truck(id, request).await?,
            None => self.api.create_truck(request).await?,
        };
        upsert(&mut self.state.trucks, truck.clone(), |t| {
            t.truck_id == truck.truck_id
        });
        self.notify();
        Ok(truck)
    }

    pub async fn delete_truck(&mut self, truck_id: i32) -> ClientResult<()> {
        self.api.delete_truck(truck_id).await?;
        self.init().await
    }

    /// El historial no se guarda en el store
    pub async fn truck_history(&self, truck_id: i32) -> ClientResult<Vec<TruckHistoryEvent>> {
        self.api.truck_history(truck_id).await
    }

    // --- Driver types ---

    pub async fn save_driver_type(
        &mut self,
        driver_type_id: Option<i32>,
        request: &DriverTypeRequest,
    ) -> ClientResult<DriverType> {
        let driver_type = match driver_type_id {
            Some(id) => self.api.update_driver_type(id, request).await?,
            None => self.api.create_driver_type(request).await?,
        };
        upsert(&mut self.state.driver_types, driver_type.clone(), |t| {
            t.driver_type_id == driver_type.driver_type_id
        });
        self.notify();
        Ok(driver_type)
    }

    pub async fn delete_driver_type(&mut self, driver_type_id: i32) -> ClientResult<()> {
        self.api.delete_driver_type(driver_type_id).await?;
        self.init().await
    }

    // --- Safety categories ---

    pub async fn save_safety_category(
        &mut self,
        category_id: Option<i32>,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory> {
        let category = match category_id {
            Some(id) => self.api.update_safety_category(id, request).await?,
            None => self.api.create_safety_category(request).await?,
        };
        upsert(&mut self.state.safety_categories, category.clone(), |c| {
            c.category_id == category.category_id
        });
        self.notify();
        Ok(category)
    }

    /// Los eventos de la categoría quedan huérfanos
    pub async fn delete_safety_category(&mut self, category_id: i32) -> ClientResult<()> {
        self.api.delete_safety_category(category_id).await?;
        self.state
            .safety_categories
            .retain(|c| c.category_id != category_id);
        self.notify();
        Ok(())
    }

    // --- Scorecard metrics ---

    pub async fn save_scorecard_metric(
        &mut self,
        sc_category_id: Option<i32>,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem> {
        let metric = match sc_category_id {
            Some(id) => self.api.update_scorecard_metric(id, request).await?,
            None => self.api.create_scorecard_metric(request).await?,
        };
        upsert(&mut self.state.scorecard_metrics, metric.clone(), |m| {
            m.sc_category_id == metric.sc_category_id
        });
        self.notify();
        Ok(metric)
    }

    pub async fn delete_scorecard_metric(&mut self, sc_category_id: i32) -> ClientResult<()> {
        self.api.delete_scorecard_metric(sc_category_id).await?;
        self.init().await
    }

    // --- Safety events ---

    pub async fn create_safety_event(&mut self, event: &NewSafetyEvent) -> ClientResult<SafetyEvent> {
        let saved = self.api.create_safety_event(event).await?;
        self.state.safety_events.push(saved.clone());
        self.notify();
        Ok(saved)
    }

    pub async fn update_safety_event(
        &mut self,
        safety_event_id: i32,
        update: &SafetyEventUpdate,
    ) -> ClientResult<SafetyEvent> {
        let saved = self.api.update_safety_event(safety_event_id, update).await?;
        upsert(&mut self.state.safety_events, saved.clone(), |e| {
            e.safety_event_id == safety_event_id
        });
        self.notify();
        Ok(saved)
    }

    pub async fn delete_safety_event(&mut self, safety_event_id: i32) -> ClientResult<()> {
        self.api.delete_safety_event(safety_event_id).await?;
        self.state
            .safety_events
            .retain(|e| e.safety_event_id != safety_event_id);
        self.notify();
        Ok(())
    }

    // --- Scorecard ---

    /// Hoja guardada para la terna según el estado local
    pub fn grade_sheet(&self, key: GradeKey) -> Option<GradeSheet> {
        let mut rows = grade_rows(&self.state, &key);
        rows.sort_by_key(|e| (e.sc_category_id, e.scorecard_event_id));
        sheet_from_rows(key, rows)
    }

    /// Guarda la hoja y reemplaza localmente las filas de la terna
    pub async fn save_grades(&mut self, sheet: &GradeSheet) -> ClientResult<Vec<ScoreCardEvent>> {
        let saved = self.api.save_grades(sheet).await?;
        remove_grade_rows(&mut self.state, &sheet.key());
        self.state.scorecard_events.extend(saved.iter().cloned());
        self.notify();
        Ok(saved)
    }

    pub async fn delete_grades(&mut self, key: GradeKey) -> ClientResult<u64> {
        let removed = self.api.delete_grades(key).await?;
        remove_grade_rows(&mut self.state, &key);
        self.notify();
        Ok(removed)
    }
}

fn upsert<T, F>(items: &mut Vec<T>, item: T, same: F)
where
    F: Fn(&T) -> bool,
{
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

fn metric_ids(state: &Snapshot, key: &GradeKey) -> HashSet<i32> {
    state
        .scorecard_metrics
        .iter()
        .filter(|m| m.sc_category == key.category)
        .map(|m| m.sc_category_id)
        .collect()
}

fn grade_rows(state: &Snapshot, key: &GradeKey) -> Vec<ScoreCardEvent> {
    let ids = metric_ids(state, key);
    state
        .scorecard_events
        .iter()
        .filter(|e| {
            e.driver_id == key.driver_id
                && key.month.contains(e.event_date)
                && ids.contains(&e.sc_category_id)
        })
        .cloned()
        .collect()
}

fn remove_grade_rows(state: &mut Snapshot, key: &GradeKey) {
    let ids = metric_ids(state, key);
    state.scorecard_events.retain(|e| {
        !(e.driver_id == key.driver_id
            && key.month.contains(e.event_date)
            && ids.contains(&e.sc_category_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InProcessFleetApi;
    use crate::repositories::MemoryFleetRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn store() -> DbStore<InProcessFleetApi> {
        DbStore::new(InProcessFleetApi::new(Arc::new(MemoryFleetRepository::new())))
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_until_unsubscribed() {
        let mut store = store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.init().await.unwrap();
        store.init().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.init().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.revision(), 3);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_state_untouched() {
        let mut store = store();
        store.init().await.unwrap();
        let revision = store.revision();

        let request = DriverRequest {
            driver_code: "D1".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            truck_id: Some(99),
            ..Default::default()
        };
        let err = store.save_driver(None, &request).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(store.state().drivers.is_empty());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_upsert_replaces_or_appends() {
        let mut items = vec![(1, "a"), (2, "b")];
        upsert(&mut items, (2, "B"), |i| i.0 == 2);
        upsert(&mut items, (3, "c"), |i| i.0 == 3);
        assert_eq!(items, vec![(1, "a"), (2, "B"), (3, "c")]);
    }
}
