use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Driver;
use crate::utils::validation::{deserialize_optional_date, validate_profile_pic};

// Request para crear/actualizar un driver
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct DriverRequest {
    #[validate(length(min = 1, max = 32, message = "driver_code is required"))]
    pub driver_code: String,

    #[validate(length(min = 1, max = 100, message = "first_name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "last_name is required"))]
    pub last_name: String,

    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub truck_id: Option<i32>,

    #[serde(default)]
    pub driver_type_id: Option<i32>,

    #[serde(default)]
    #[validate(custom = "validate_profile_pic")]
    pub profile_pic: Option<String>,
}

impl From<&Driver> for DriverRequest {
    fn from(driver: &Driver) -> Self {
        Self {
            driver_code: driver.driver_code.clone(),
            first_name: driver.first_name.clone(),
            last_name: driver.last_name.clone(),
            start_date: driver.start_date,
            truck_id: driver.truck_id,
            driver_type_id: driver.driver_type_id,
            profile_pic: driver.profile_pic.clone(),
        }
    }
}
