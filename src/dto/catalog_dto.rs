//! Requests de las tablas de configuración: driver types,
//! safety categories y scorecard metrics.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{DriverType, SafetyCategory, ScoreCardItem, ScorecardCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct DriverTypeRequest {
    #[validate(length(min = 1, max = 100, message = "driver_type is required"))]
    pub driver_type: String,
}

impl From<&DriverType> for DriverTypeRequest {
    fn from(driver_type: &DriverType) -> Self {
        Self {
            driver_type: driver_type.driver_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct SafetyCategoryRequest {
    #[validate(length(min = 1, max = 32, message = "code is required"))]
    pub code: String,

    #[validate(length(min = 1, max = 255, message = "description is required"))]
    pub description: String,

    #[serde(default)]
    pub scoring_system: i32,

    #[serde(default)]
    pub p_i_score: i32,
}

impl From<&SafetyCategory> for SafetyCategoryRequest {
    fn from(category: &SafetyCategory) -> Self {
        Self {
            code: category.code.clone(),
            description: category.description.clone(),
            scoring_system: category.scoring_system,
            p_i_score: category.p_i_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct ScorecardMetricRequest {
    pub sc_category: ScorecardCategory,

    #[validate(length(min = 1, max = 255, message = "sc_description is required"))]
    pub sc_description: String,

    #[serde(default)]
    pub driver_type_id: Option<i32>,
}

impl From<&ScoreCardItem> for ScorecardMetricRequest {
    fn from(item: &ScoreCardItem) -> Self {
        Self {
            sc_category: item.sc_category,
            sc_description: item.sc_description.clone(),
            driver_type_id: item.driver_type_id,
        }
    }
}
