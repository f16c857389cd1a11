//! Formulario de truck

use chrono::{Datelike, NaiveDate};

use crate::client::{ClientResult, FleetApi};
use crate::dto::TruckRequest;
use crate::models::{Truck, TruckStatus};
use crate::store::DbStore;

use super::crud::CrudView;
use super::{required, EntityForm, FormError, INVALID_YEAR, UNIT_NUMBER_REQUIRED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruckForm {
    pub unit_number: String,
    /// Texto del input; se convierte al guardar
    pub year: String,
    pub status: TruckStatus,
}

impl TruckForm {
    /// Truck nuevo: año en curso, disponible
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            unit_number: String::new(),
            year: today.year().to_string(),
            status: TruckStatus::Available,
        }
    }

    /// `assigned` sólo se ofrece si el truck ya lo está; se cambia asignando un driver
    pub fn status_options(&self) -> Vec<TruckStatus> {
        let mut options = vec![TruckStatus::Available, TruckStatus::Maintenance];
        if self.status == TruckStatus::Assigned {
            options.push(TruckStatus::Assigned);
        }
        options
    }
}

impl EntityForm for TruckForm {
    type Record = Truck;
    type Request = TruckRequest;

    const DELETE_PROMPT: &'static str = "Permanently remove this unit from the fleet database?";

    fn from_record(truck: &Truck) -> Self {
        Self {
            unit_number: truck.unit_number.clone(),
            year: truck.year.to_string(),
            status: truck.status,
        }
    }

    fn record_id(truck: &Truck) -> i32 {
        truck.truck_id
    }

    fn to_request(&self) -> Result<TruckRequest, FormError> {
        let unit_number =
            required(&self.unit_number).ok_or_else(|| FormError::new(UNIT_NUMBER_REQUIRED))?;
        let year = self
            .year
            .trim()
            .parse()
            .map_err(|_| FormError::new(INVALID_YEAR))?;

        Ok(TruckRequest {
            unit_number,
            year,
            status: Some(self.status),
        })
    }
}

pub async fn submit<A: FleetApi>(
    view: &mut CrudView<TruckForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Truck> {
    view.save_with(move |truck_id, request| async move {
        store.save_truck(truck_id, &request).await
    })
    .await
}

pub async fn delete<A: FleetApi>(
    view: &mut CrudView<TruckForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Option<()>> {
    view.delete_with(move |truck_id| async move { store.delete_truck(truck_id).await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_uses_current_year() {
        let form = TruckForm::blank(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert_eq!(form.year, "2025");
        assert_eq!(form.status, TruckStatus::Available);
        assert_eq!(
            form.status_options(),
            vec![TruckStatus::Available, TruckStatus::Maintenance]
        );
    }

    #[test]
    fn test_to_request_coerces_year() {
        let mut form = TruckForm {
            unit_number: "  ".to_string(),
            year: "2019".to_string(),
            status: TruckStatus::Maintenance,
        };
        assert_eq!(form.to_request().unwrap_err().message, UNIT_NUMBER_REQUIRED);

        form.unit_number = "T-77".to_string();
        let request = form.to_request().unwrap();
        assert_eq!(request.year, 2019);
        assert_eq!(request.status, Some(TruckStatus::Maintenance));

        form.year = "twenty".to_string();
        assert_eq!(form.to_request().unwrap_err().message, INVALID_YEAR);
    }
}
