//! Formulario de driver: datos personales, tipo, truck y foto de perfil

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;

use crate::client::{ClientResult, FleetApi};
use crate::dto::DriverRequest;
use crate::models::{Driver, Snapshot, Truck, TruckStatus};
use crate::store::DbStore;
use crate::utils::validation::{is_allowed_profile_pic_mime, validate_date, MAX_PROFILE_PIC_BYTES};

use super::crud::CrudView;
use super::{
    required, EntityForm, FormError, EMPTY_IMAGE, IMAGE_TOO_LARGE, INVALID_START_DATE, NOT_AN_IMAGE,
    REQUIRED_FIELDS,
};

/// Tipo asignado por defecto a un driver nuevo
pub const DEFAULT_DRIVER_TYPE_ID: i32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverForm {
    pub driver_code: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD` o vacío
    pub start_date: String,
    pub driver_type_id: Option<i32>,
    pub truck_id: Option<i32>,
    pub profile_pic: Option<String>,
    /// Filtro del selector de trucks
    pub truck_search: String,
    /// Truck que tenía el driver al abrir el formulario
    original_truck_id: Option<i32>,
}

impl DriverForm {
    /// Formulario vacío: empieza hoy y con el tipo por defecto si existe
    pub fn blank(snapshot: &Snapshot, today: NaiveDate) -> Self {
        Self {
            start_date: today.format("%Y-%m-%d").to_string(),
            driver_type_id: snapshot
                .driver_type(DEFAULT_DRIVER_TYPE_ID)
                .map(|t| t.driver_type_id),
            ..Default::default()
        }
    }

    /// Carga la foto desde los bytes del archivo elegido.
    /// Solo acepta los mismos tipos que valida el servidor.
    pub fn set_profile_picture(&mut self, bytes: &[u8], mime_type: &str) -> Result<(), FormError> {
        if bytes.is_empty() {
            return Err(FormError::new(EMPTY_IMAGE));
        }
        if bytes.len() > MAX_PROFILE_PIC_BYTES {
            return Err(FormError::new(IMAGE_TOO_LARGE));
        }
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !is_allowed_profile_pic_mime(&mime_type) {
            return Err(FormError::new(NOT_AN_IMAGE));
        }
        self.profile_pic = Some(format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)));
        Ok(())
    }

    pub fn clear_profile_picture(&mut self) {
        self.profile_pic = None;
    }

    /// Trucks elegibles: los no asignados más el propio truck del driver,
    /// filtrados por unit number
    pub fn truck_options<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a Truck> {
        let needle = self.truck_search.trim().to_lowercase();
        snapshot
            .trucks
            .iter()
            .filter(|t| {
                t.status != TruckStatus::Assigned || Some(t.truck_id) == self.original_truck_id
            })
            .filter(|t| t.unit_number.to_lowercase().contains(&needle))
            .collect()
    }

    /// Etiqueta del selector: "Unit 104 (2021) - available"
    pub fn truck_label(truck: &Truck) -> String {
        format!("Unit {} ({}) - {}", truck.unit_number, truck.year, truck.status)
    }
}

impl EntityForm for DriverForm {
    type Record = Driver;
    type Request = DriverRequest;

    const DELETE_PROMPT: &'static str = "Permanently delete this driver? All safety events and scorecards linked to this driver will also be removed.";

    fn from_record(driver: &Driver) -> Self {
        Self {
            driver_code: driver.driver_code.clone(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            start_date: driver
                .start_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            driver_type_id: driver.driver_type_id,
            truck_id: driver.truck_id,
            profile_pic: driver.profile_pic.clone(),
            truck_search: String::new(),
            original_truck_id: driver.truck_id,
        }
    }

    fn record_id(driver: &Driver) -> i32 {
        driver.driver_id
    }

    fn to_request(&self) -> Result<DriverRequest, FormError> {
        let (Some(first_name), Some(last_name), Some(driver_code)) = (
            required(&self.first_name),
            required(&self.last_name),
            required(&self.driver_code),
        ) else {
            return Err(FormError::new(REQUIRED_FIELDS));
        };

        let start_date = match self.start_date.trim() {
            "" => None,
            raw => Some(validate_date(raw).map_err(|_| FormError::new(INVALID_START_DATE))?),
        };

        Ok(DriverRequest {
            driver_code,
            first_name,
            last_name,
            start_date,
            truck_id: self.truck_id,
            driver_type_id: self.driver_type_id,
            profile_pic: self.profile_pic.clone(),
        })
    }
}

/// Guarda el formulario abierto contra el store
pub async fn submit<A: FleetApi>(
    view: &mut CrudView<DriverForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Driver> {
    view.save_with(move |driver_id, request| async move {
        store.save_driver(driver_id, &request).await
    })
    .await
}

/// Ejecuta el borrado confirmado
pub async fn delete<A: FleetApi>(
    view: &mut CrudView<DriverForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Option<()>> {
    view.delete_with(move |driver_id| async move { store.delete_driver(driver_id).await })
        .await
}
