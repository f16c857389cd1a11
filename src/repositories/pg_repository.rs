//! Backend PostgreSQL de `FleetRepository`
//!
//! Las operaciones de varias filas corren dentro de una transacción
//! (`pool.begin()`); las cascadas simples las resuelven las FKs del schema.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::{assignment_note, graded_metric_moved_error, FleetRepository, UNASSIGNED_NOTE};
use crate::dto::{
    AssignmentOutcome, DriverRequest, DriverTypeRequest, GradeKey, GradeSheet, NewSafetyEvent,
    SafetyCategoryRequest, SafetyEventUpdate, ScorecardMetricRequest, TruckRequest,
};
use crate::models::{
    Driver, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem, Snapshot,
    Truck, TruckHistoryEvent, TruckHistoryType, TruckStatus,
};
use crate::utils::errors::{
    bad_request_error, not_found_error, unknown_reference_error, AppResult,
};

const SELECT_TRUCKS: &str = "SELECT * FROM trucks ORDER BY truck_id";
const SELECT_DRIVER_TYPES: &str = "SELECT * FROM driver_type ORDER BY driver_type_id";
const SELECT_DRIVERS: &str = "SELECT * FROM drivers ORDER BY driver_id";
const SELECT_SAFETY_CATEGORIES: &str = "SELECT * FROM safety_categories ORDER BY category_id";
const SELECT_SCORECARD_METRICS: &str = "SELECT * FROM scorecard_metrics ORDER BY sc_category_id";
const SELECT_SAFETY_EVENTS: &str = "SELECT * FROM safety_events ORDER BY safety_event_id";
const SELECT_SCORECARD_EVENTS: &str = "SELECT * FROM scorecard_events ORDER BY scorecard_event_id";

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_driver(conn: &mut PgConnection, driver_id: i32) -> AppResult<Option<Driver>> {
    let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE driver_id = $1 FOR UPDATE")
        .bind(driver_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(driver)
}

async fn lock_truck(conn: &mut PgConnection, truck_id: i32) -> AppResult<Option<Truck>> {
    let truck = sqlx::query_as::<_, Truck>("SELECT * FROM trucks WHERE truck_id = $1 FOR UPDATE")
        .bind(truck_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(truck)
}

async fn fetch_truck(conn: &mut PgConnection, truck_id: i32) -> AppResult<Option<Truck>> {
    let truck = sqlx::query_as::<_, Truck>("SELECT * FROM trucks WHERE truck_id = $1")
        .bind(truck_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(truck)
}

async fn set_truck_status(
    conn: &mut PgConnection,
    truck_id: i32,
    status: TruckStatus,
) -> AppResult<Truck> {
    let truck = sqlx::query_as::<_, Truck>(
        "UPDATE trucks SET status = $2 WHERE truck_id = $1 RETURNING *",
    )
    .bind(truck_id)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;
    Ok(truck)
}

async fn log_history(
    conn: &mut PgConnection,
    truck_id: i32,
    driver_id: Option<i32>,
    event_type: TruckHistoryType,
    notes: &str,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO truck_history (truck_id, driver_id, type, notes)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(truck_id)
    .bind(driver_id)
    .bind(event_type)
    .bind(notes)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn check_driver_refs(conn: &mut PgConnection, request: &DriverRequest) -> AppResult<()> {
    if let Some(truck_id) = request.truck_id {
        if lock_truck(&mut *conn, truck_id).await?.is_none() {
            return Err(unknown_reference_error("Truck", truck_id));
        }
    }
    if let Some(driver_type_id) = request.driver_type_id {
        check_driver_type(&mut *conn, driver_type_id).await?;
    }
    Ok(())
}

async fn check_driver_type(conn: &mut PgConnection, driver_type_id: i32) -> AppResult<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM driver_type WHERE driver_type_id = $1)")
            .bind(driver_type_id)
            .fetch_one(&mut *conn)
            .await?;
    if !exists {
        return Err(unknown_reference_error("Driver type", driver_type_id));
    }
    Ok(())
}

/// Lógica de asignación sobre un driver ya bloqueado y un destino validado
async fn apply_assignment(
    conn: &mut PgConnection,
    driver: Driver,
    target: Option<i32>,
) -> AppResult<AssignmentOutcome> {
    let driver_id = driver.driver_id;

    if driver.truck_id == target {
        let truck = match target {
            Some(truck_id) => Some(set_truck_status(&mut *conn, truck_id, TruckStatus::Assigned).await?),
            None => None,
        };
        return Ok(AssignmentOutcome {
            driver: Some(driver),
            truck,
            released_truck: None,
        });
    }

    let released_truck = match driver.truck_id {
        Some(old_truck_id) => {
            let released = set_truck_status(&mut *conn, old_truck_id, TruckStatus::Available).await?;
            log_history(
                &mut *conn,
                old_truck_id,
                None,
                TruckHistoryType::StatusChange,
                UNASSIGNED_NOTE,
            )
            .await?;
            Some(released)
        }
        None => None,
    };

    let (driver, truck) = match target {
        Some(truck_id) => {
            sqlx::query("UPDATE drivers SET truck_id = NULL WHERE truck_id = $1 AND driver_id <> $2")
                .bind(truck_id)
                .bind(driver_id)
                .execute(&mut *conn)
                .await?;
            let driver = sqlx::query_as::<_, Driver>(
                "UPDATE drivers SET truck_id = $2 WHERE driver_id = $1 RETURNING *",
            )
            .bind(driver_id)
            .bind(truck_id)
            .fetch_one(&mut *conn)
            .await?;
            let truck = set_truck_status(&mut *conn, truck_id, TruckStatus::Assigned).await?;
            log_history(
                &mut *conn,
                truck_id,
                Some(driver_id),
                TruckHistoryType::Assignment,
                &assignment_note(driver_id),
            )
            .await?;
            (driver, Some(truck))
        }
        None => {
            let driver = sqlx::query_as::<_, Driver>(
                "UPDATE drivers SET truck_id = NULL WHERE driver_id = $1 RETURNING *",
            )
            .bind(driver_id)
            .fetch_one(&mut *conn)
            .await?;
            (driver, None)
        }
    };

    Ok(AssignmentOutcome {
        driver: Some(driver),
        truck,
        released_truck,
    })
}

const GRADE_ROWS_FILTER: &str = r#"
    FROM scorecard_events se
    JOIN scorecard_metrics m ON m.sc_category_id = se.sc_category_id
    WHERE se.driver_id = $1
      AND se.event_date >= $2
      AND se.event_date < $3
      AND m.sc_category = $4
"#;

async fn remove_grade_rows(conn: &mut PgConnection, key: &GradeKey) -> AppResult<u64> {
    let sql = format!(
        "DELETE FROM scorecard_events WHERE scorecard_event_id IN (SELECT se.scorecard_event_id {})",
        GRADE_ROWS_FILTER
    );
    let result = sqlx::query(&sql)
        .bind(key.driver_id)
        .bind(key.month.first_day())
        .bind(key.month.next_first_day())
        .bind(key.category)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl FleetRepository for PgFleetRepository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn snapshot(&self) -> AppResult<Snapshot> {
        // Las siete lecturas ven el mismo estado
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let trucks = sqlx::query_as::<_, Truck>(SELECT_TRUCKS).fetch_all(&mut *tx).await?;
        let driver_types = sqlx::query_as::<_, DriverType>(SELECT_DRIVER_TYPES)
            .fetch_all(&mut *tx)
            .await?;
        let drivers = sqlx::query_as::<_, Driver>(SELECT_DRIVERS).fetch_all(&mut *tx).await?;
        let safety_categories = sqlx::query_as::<_, SafetyCategory>(SELECT_SAFETY_CATEGORIES)
            .fetch_all(&mut *tx)
            .await?;
        let scorecard_metrics = sqlx::query_as::<_, ScoreCardItem>(SELECT_SCORECARD_METRICS)
            .fetch_all(&mut *tx)
            .await?;
        let safety_events = sqlx::query_as::<_, SafetyEvent>(SELECT_SAFETY_EVENTS)
            .fetch_all(&mut *tx)
            .await?;
        let scorecard_events = sqlx::query_as::<_, ScoreCardEvent>(SELECT_SCORECARD_EVENTS)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Snapshot {
            trucks,
            driver_types,
            drivers,
            safety_categories,
            scorecard_metrics,
            safety_events,
            scorecard_events,
        })
    }

    // --- Drivers ---

    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(SELECT_DRIVERS)
            .fetch_all(&self.pool)
            .await?;
        Ok(drivers)
    }

    async fn create_driver(&self, request: DriverRequest) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;
        check_driver_refs(&mut tx, &request).await?;

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (driver_code, first_name, last_name, start_date, driver_type_id, profile_pic)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.driver_code)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.start_date)
        .bind(request.driver_type_id)
        .bind(&request.profile_pic)
        .fetch_one(&mut *tx)
        .await?;

        let driver = match request.truck_id {
            Some(truck_id) => apply_assignment(&mut tx, driver, Some(truck_id))
                .await?
                .driver
                .ok_or_else(|| bad_request_error("driver could not be assigned"))?,
            None => driver,
        };

        tx.commit().await?;
        Ok(driver)
    }

    async fn update_driver(&self, driver_id: i32, request: DriverRequest) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;
        let current = lock_driver(&mut tx, driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;
        check_driver_refs(&mut tx, &request).await?;

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET driver_code = $2, first_name = $3, last_name = $4,
                start_date = $5, driver_type_id = $6, profile_pic = $7
            WHERE driver_id = $1
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(&request.driver_code)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.start_date)
        .bind(request.driver_type_id)
        .bind(&request.profile_pic)
        .fetch_one(&mut *tx)
        .await?;

        let driver = if current.truck_id != request.truck_id {
            apply_assignment(&mut tx, driver, request.truck_id)
                .await?
                .driver
                .ok_or_else(|| not_found_error("Driver", driver_id))?
        } else {
            driver
        };

        tx.commit().await?;
        Ok(driver)
    }

    async fn delete_driver(&self, driver_id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let driver = lock_driver(&mut tx, driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;

        if let Some(truck_id) = driver.truck_id {
            set_truck_status(&mut tx, truck_id, TruckStatus::Available).await?;
            log_history(
                &mut tx,
                truck_id,
                None,
                TruckHistoryType::StatusChange,
                UNASSIGNED_NOTE,
            )
            .await?;
        }

        // safety_events y scorecard_events caen por ON DELETE CASCADE
        sqlx::query("DELETE FROM drivers WHERE driver_id = $1")
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn safety_events_for_driver(&self, driver_id: i32) -> AppResult<Vec<SafetyEvent>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM drivers WHERE driver_id = $1)")
                .bind(driver_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(not_found_error("Driver", driver_id));
        }

        let events = sqlx::query_as::<_, SafetyEvent>(
            "SELECT * FROM safety_events WHERE driver_id = $1 ORDER BY event_date DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    // --- Asignación ---

    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> AppResult<AssignmentOutcome> {
        let mut tx = self.pool.begin().await?;
        let driver = lock_driver(&mut tx, driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", driver_id))?;
        if let Some(truck_id) = truck_id {
            if lock_truck(&mut tx, truck_id).await?.is_none() {
                return Err(unknown_reference_error("Truck", truck_id));
            }
        }

        let outcome = apply_assignment(&mut tx, driver, truck_id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn assign_driver_to_truck(
        &self,
        truck_id: i32,
        driver_id: i32,
    ) -> AppResult<AssignmentOutcome> {
        let mut tx = self.pool.begin().await?;
        if lock_truck(&mut tx, truck_id).await?.is_none() {
            return Err(not_found_error("Truck", truck_id));
        }
        let driver = lock_driver(&mut tx, driver_id)
            .await?
            .ok_or_else(|| unknown_reference_error("Driver", driver_id))?;

        let outcome = apply_assignment(&mut tx, driver, Some(truck_id)).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn release_truck(&self, truck_id: i32) -> AppResult<AssignmentOutcome> {
        let mut tx = self.pool.begin().await?;
        if lock_truck(&mut tx, truck_id).await?.is_none() {
            return Err(not_found_error("Truck", truck_id));
        }

        sqlx::query("UPDATE drivers SET truck_id = NULL WHERE truck_id = $1")
            .bind(truck_id)
            .execute(&mut *tx)
            .await?;
        let truck = set_truck_status(&mut tx, truck_id, TruckStatus::Available).await?;
        log_history(
            &mut tx,
            truck_id,
            None,
            TruckHistoryType::StatusChange,
            UNASSIGNED_NOTE,
        )
        .await?;

        tx.commit().await?;
        Ok(AssignmentOutcome {
            driver: None,
            truck: Some(truck),
            released_truck: None,
        })
    }

    // --- Trucks ---

    async fn list_trucks(&self) -> AppResult<Vec<Truck>> {
        let trucks = sqlx::query_as::<_, Truck>(SELECT_TRUCKS)
            .fetch_all(&self.pool)
            .await?;
        Ok(trucks)
    }

    async fn create_truck(&self, request: TruckRequest) -> AppResult<Truck> {
        if request.status == Some(TruckStatus::Assigned) {
            return Err(bad_request_error(
                "a new truck cannot start as assigned; assign a driver instead",
            ));
        }

        let truck = sqlx::query_as::<_, Truck>(
            r#"
            INSERT INTO trucks (unit_number, year, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.unit_number)
        .bind(request.year)
        .bind(request.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;
        Ok(truck)
    }

    async fn update_truck(&self, truck_id: i32, request: TruckRequest) -> AppResult<Truck> {
        let mut tx = self.pool.begin().await?;
        let current = lock_truck(&mut tx, truck_id)
            .await?
            .ok_or_else(|| not_found_error("Truck", truck_id))?;
        let has_holder: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM drivers WHERE truck_id = $1)")
                .bind(truck_id)
                .fetch_one(&mut *tx)
                .await?;
        let status = super::resolve_truck_status(current.status, request.status, has_holder)?;

        let truck = sqlx::query_as::<_, Truck>(
            r#"
            UPDATE trucks SET unit_number = $2, year = $3, status = $4
            WHERE truck_id = $1
            RETURNING *
            "#,
        )
        .bind(truck_id)
        .bind(&request.unit_number)
        .bind(request.year)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        if status != current.status {
            let (event_type, notes) = super::status_change_entry(current.status, status);
            log_history(&mut tx, truck_id, None, event_type, &notes).await?;
        }

        tx.commit().await?;
        Ok(truck)
    }

    async fn delete_truck(&self, truck_id: i32) -> AppResult<()> {
        // drivers.truck_id pasa a NULL y el historial cae en cascada
        let result = sqlx::query("DELETE FROM trucks WHERE truck_id = $1")
            .bind(truck_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Truck", truck_id));
        }
        Ok(())
    }

    async fn truck_history(&self, truck_id: i32) -> AppResult<Vec<TruckHistoryEvent>> {
        let mut conn = self.pool.acquire().await?;
        if fetch_truck(&mut conn, truck_id).await?.is_none() {
            return Err(not_found_error("Truck", truck_id));
        }

        let history = sqlx::query_as::<_, TruckHistoryEvent>(
            "SELECT * FROM truck_history WHERE truck_id = $1 ORDER BY date DESC, truck_history_id DESC",
        )
        .bind(truck_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(history)
    }

    // --- Driver types ---

    async fn list_driver_types(&self) -> AppResult<Vec<DriverType>> {
        let types = sqlx::query_as::<_, DriverType>(SELECT_DRIVER_TYPES)
            .fetch_all(&self.pool)
            .await?;
        Ok(types)
    }

    async fn create_driver_type(&self, request: DriverTypeRequest) -> AppResult<DriverType> {
        let driver_type = sqlx::query_as::<_, DriverType>(
            "INSERT INTO driver_type (driver_type) VALUES ($1) RETURNING *",
        )
        .bind(&request.driver_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(driver_type)
    }

    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: DriverTypeRequest,
    ) -> AppResult<DriverType> {
        sqlx::query_as::<_, DriverType>(
            "UPDATE driver_type SET driver_type = $2 WHERE driver_type_id = $1 RETURNING *",
        )
        .bind(driver_type_id)
        .bind(&request.driver_type)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Driver type", driver_type_id))
    }

    async fn delete_driver_type(&self, driver_type_id: i32) -> AppResult<()> {
        // drivers.driver_type_id pasa a NULL; las métricas conservan la referencia
        let result = sqlx::query("DELETE FROM driver_type WHERE driver_type_id = $1")
            .bind(driver_type_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Driver type", driver_type_id));
        }
        Ok(())
    }

    // --- Safety categories ---

    async fn list_safety_categories(&self) -> AppResult<Vec<SafetyCategory>> {
        let categories = sqlx::query_as::<_, SafetyCategory>(SELECT_SAFETY_CATEGORIES)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn create_safety_category(
        &self,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory> {
        let category = sqlx::query_as::<_, SafetyCategory>(
            r#"
            INSERT INTO safety_categories (code, description, scoring_system, p_i_score)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.code)
        .bind(&request.description)
        .bind(request.scoring_system)
        .bind(request.p_i_score)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_safety_category(
        &self,
        category_id: i32,
        request: SafetyCategoryRequest,
    ) -> AppResult<SafetyCategory> {
        sqlx::query_as::<_, SafetyCategory>(
            r#"
            UPDATE safety_categories
            SET code = $2, description = $3, scoring_system = $4, p_i_score = $5
            WHERE category_id = $1
            RETURNING *
            "#,
        )
        .bind(category_id)
        .bind(&request.code)
        .bind(&request.description)
        .bind(request.scoring_system)
        .bind(request.p_i_score)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Safety category", category_id))
    }

    async fn delete_safety_category(&self, category_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM safety_categories WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Safety category", category_id));
        }
        Ok(())
    }

    // --- Scorecard metrics ---

    async fn list_scorecard_metrics(&self) -> AppResult<Vec<ScoreCardItem>> {
        let metrics = sqlx::query_as::<_, ScoreCardItem>(SELECT_SCORECARD_METRICS)
        .fetch_all(&self.pool)
        .await?;
        Ok(metrics)
    }

    async fn create_scorecard_metric(
        &self,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem> {
        let mut conn = self.pool.acquire().await?;
        if let Some(driver_type_id) = request.driver_type_id {
            check_driver_type(&mut conn, driver_type_id).await?;
        }

        let metric = sqlx::query_as::<_, ScoreCardItem>(
            r#"
            INSERT INTO scorecard_metrics (sc_category, sc_description, driver_type_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(request.sc_category)
        .bind(&request.sc_description)
        .bind(request.driver_type_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(metric)
    }

    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: ScorecardMetricRequest,
    ) -> AppResult<ScoreCardItem> {
        let mut tx = self.pool.begin().await?;
        if let Some(driver_type_id) = request.driver_type_id {
            check_driver_type(&mut tx, driver_type_id).await?;
        }

        let current = sqlx::query_as::<_, ScoreCardItem>(
            "SELECT * FROM scorecard_metrics WHERE sc_category_id = $1 FOR UPDATE",
        )
        .bind(sc_category_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Scorecard metric", sc_category_id))?;
        if current.sc_category != request.sc_category {
            let graded: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM scorecard_events WHERE sc_category_id = $1)",
            )
            .bind(sc_category_id)
            .fetch_one(&mut *tx)
            .await?;
            if graded {
                return Err(graded_metric_moved_error(sc_category_id));
            }
        }

        let metric = sqlx::query_as::<_, ScoreCardItem>(
            r#"
            UPDATE scorecard_metrics
            SET sc_category = $2, sc_description = $3, driver_type_id = $4
            WHERE sc_category_id = $1
            RETURNING *
            "#,
        )
        .bind(sc_category_id)
        .bind(request.sc_category)
        .bind(&request.sc_description)
        .bind(request.driver_type_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(metric)
    }

    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> AppResult<()> {
        // Las calificaciones de la métrica caen por ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM scorecard_metrics WHERE sc_category_id = $1")
            .bind(sc_category_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Scorecard metric", sc_category_id));
        }
        Ok(())
    }

    // --- Safety events ---

    async fn list_safety_events(&self) -> AppResult<Vec<SafetyEvent>> {
        let events = sqlx::query_as::<_, SafetyEvent>(SELECT_SAFETY_EVENTS)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn create_safety_event(&self, event: NewSafetyEvent) -> AppResult<SafetyEvent> {
        let mut conn = self.pool.acquire().await?;
        let (driver_exists, category_exists): (bool, bool) = sqlx::query_as(
            r#"
            SELECT EXISTS(SELECT 1 FROM drivers WHERE driver_id = $1),
                   EXISTS(SELECT 1 FROM safety_categories WHERE category_id = $2)
            "#,
        )
        .bind(event.driver_id)
        .bind(event.category_id)
        .fetch_one(&mut *conn)
        .await?;
        if !driver_exists {
            return Err(unknown_reference_error("Driver", event.driver_id));
        }
        if !category_exists {
            return Err(unknown_reference_error("Safety category", event.category_id));
        }

        let saved = sqlx::query_as::<_, SafetyEvent>(
            r#"
            INSERT INTO safety_events (driver_id, event_date, category_id, notes, bonus_score, p_i_score, bonus_period)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(event.driver_id)
        .bind(event.event_date)
        .bind(event.category_id)
        .bind(&event.notes)
        .bind(event.bonus_score)
        .bind(event.p_i_score)
        .bind(event.bonus_period)
        .fetch_one(&mut *conn)
        .await?;
        Ok(saved)
    }

    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: SafetyEventUpdate,
    ) -> AppResult<SafetyEvent> {
        sqlx::query_as::<_, SafetyEvent>(
            r#"
            UPDATE safety_events SET event_date = $2, notes = $3
            WHERE safety_event_id = $1
            RETURNING *
            "#,
        )
        .bind(safety_event_id)
        .bind(update.event_date)
        .bind(&update.notes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Safety event", safety_event_id))
    }

    async fn delete_safety_event(&self, safety_event_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM safety_events WHERE safety_event_id = $1")
            .bind(safety_event_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Safety event", safety_event_id));
        }
        Ok(())
    }

    // --- Scorecard events ---

    async fn list_scorecard_events(&self) -> AppResult<Vec<ScoreCardEvent>> {
        let events = sqlx::query_as::<_, ScoreCardEvent>(SELECT_SCORECARD_EVENTS)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn grade_sheet(&self, key: GradeKey) -> AppResult<Option<GradeSheet>> {
        let sql = format!(
            "SELECT se.* {} ORDER BY se.sc_category_id, se.scorecard_event_id",
            GRADE_ROWS_FILTER
        );
        let rows = sqlx::query_as::<_, ScoreCardEvent>(&sql)
            .bind(key.driver_id)
            .bind(key.month.first_day())
            .bind(key.month.next_first_day())
            .bind(key.category)
            .fetch_all(&self.pool)
            .await?;
        Ok(super::sheet_from_rows(key, rows))
    }

    async fn replace_grades(&self, sheet: GradeSheet) -> AppResult<Vec<ScoreCardEvent>> {
        let mut tx = self.pool.begin().await?;
        if lock_driver(&mut tx, sheet.driver_id).await?.is_none() {
            return Err(unknown_reference_error("Driver", sheet.driver_id));
        }

        let metric_ids: Vec<i32> = sheet.scores.iter().map(|s| s.sc_category_id).collect();
        let metrics = sqlx::query_as::<_, ScoreCardItem>(
            "SELECT * FROM scorecard_metrics WHERE sc_category_id = ANY($1)",
        )
        .bind(&metric_ids)
        .fetch_all(&mut *tx)
        .await?;
        for id in &metric_ids {
            let metric = metrics
                .iter()
                .find(|m| m.sc_category_id == *id)
                .ok_or_else(|| unknown_reference_error("Scorecard metric", *id))?;
            if metric.sc_category != sheet.category {
                return Err(bad_request_error(&format!(
                    "scorecard metric {} belongs to {}, not {}",
                    id, metric.sc_category, sheet.category
                )));
            }
        }

        remove_grade_rows(&mut tx, &sheet.key()).await?;

        let mut saved = Vec::with_capacity(sheet.scores.len());
        for score in &sheet.scores {
            let row = sqlx::query_as::<_, ScoreCardEvent>(
                r#"
                INSERT INTO scorecard_events (driver_id, event_date, sc_category_id, sc_score, notes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(sheet.driver_id)
            .bind(sheet.month.first_day())
            .bind(score.sc_category_id)
            .bind(score.sc_score)
            .bind(&sheet.notes)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete_grades(&self, key: GradeKey) -> AppResult<u64> {
        let mut conn = self.pool.acquire().await?;
        remove_grade_rows(&mut conn, &key).await
    }
}
