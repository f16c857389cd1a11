//! Formularios de las tablas de configuración: driver types,
//! safety categories y métricas de scorecard

use crate::client::{ClientResult, FleetApi};
use crate::dto::{DriverTypeRequest, SafetyCategoryRequest, ScorecardMetricRequest};
use crate::models::{DriverType, SafetyCategory, ScoreCardItem, ScorecardCategory};
use crate::store::DbStore;

use super::crud::CrudView;
use super::{
    coerce_int, required, EntityForm, FormError, CODE_AND_DESCRIPTION_REQUIRED,
    DESCRIPTION_REQUIRED, DRIVER_TYPE_REQUIRED, INVALID_SCORE_VALUE,
};

// --- Driver types ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverTypeForm {
    pub driver_type: String,
}

impl EntityForm for DriverTypeForm {
    type Record = DriverType;
    type Request = DriverTypeRequest;

    const DELETE_PROMPT: &'static str = "Delete this driver type? Note: Drivers currently assigned to this type will lose their classification until updated.";

    fn from_record(driver_type: &DriverType) -> Self {
        Self {
            driver_type: driver_type.driver_type.clone(),
        }
    }

    fn record_id(driver_type: &DriverType) -> i32 {
        driver_type.driver_type_id
    }

    fn to_request(&self) -> Result<DriverTypeRequest, FormError> {
        let driver_type =
            required(&self.driver_type).ok_or_else(|| FormError::new(DRIVER_TYPE_REQUIRED))?;
        Ok(DriverTypeRequest { driver_type })
    }
}

pub async fn submit_driver_type<A: FleetApi>(
    view: &mut CrudView<DriverTypeForm>,
    store: &mut DbStore<A>,
) -> ClientResult<DriverType> {
    view.save_with(move |id, request| async move { store.save_driver_type(id, &request).await })
        .await
}

pub async fn delete_driver_type<A: FleetApi>(
    view: &mut CrudView<DriverTypeForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Option<()>> {
    view.delete_with(move |id| async move { store.delete_driver_type(id).await })
        .await
}

// --- Safety categories ---

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyCategoryForm {
    pub code: String,
    pub description: String,
    pub scoring_system: String,
    pub p_i_score: String,
}

impl EntityForm for SafetyCategoryForm {
    type Record = SafetyCategory;
    type Request = SafetyCategoryRequest;

    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this safety category? Logged events using this category will still exist, but new events cannot use it.";

    fn from_record(category: &SafetyCategory) -> Self {
        Self {
            code: category.code.clone(),
            description: category.description.clone(),
            scoring_system: category.scoring_system.to_string(),
            p_i_score: category.p_i_score.to_string(),
        }
    }

    fn record_id(category: &SafetyCategory) -> i32 {
        category.category_id
    }

    fn to_request(&self) -> Result<SafetyCategoryRequest, FormError> {
        let (Some(code), Some(description)) = (required(&self.code), required(&self.description))
        else {
            return Err(FormError::new(CODE_AND_DESCRIPTION_REQUIRED));
        };
        let (Some(scoring_system), Some(p_i_score)) =
            (coerce_int(&self.scoring_system), coerce_int(&self.p_i_score))
        else {
            return Err(FormError::new(INVALID_SCORE_VALUE));
        };

        Ok(SafetyCategoryRequest {
            code,
            description,
            scoring_system,
            p_i_score,
        })
    }
}

pub async fn submit_safety_category<A: FleetApi>(
    view: &mut CrudView<SafetyCategoryForm>,
    store: &mut DbStore<A>,
) -> ClientResult<SafetyCategory> {
    view.save_with(move |id, request| async move {
        store.save_safety_category(id, &request).await
    })
    .await
}

pub async fn delete_safety_category<A: FleetApi>(
    view: &mut CrudView<SafetyCategoryForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Option<()>> {
    view.delete_with(move |id| async move { store.delete_safety_category(id).await })
        .await
}

// --- Scorecard metrics ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricForm {
    pub sc_category: ScorecardCategory,
    pub sc_description: String,
    /// None = métrica global
    pub driver_type_id: Option<i32>,
}

impl MetricForm {
    /// Métrica nueva en la pestaña activa
    pub fn blank(category: ScorecardCategory) -> Self {
        Self {
            sc_category: category,
            sc_description: String::new(),
            driver_type_id: None,
        }
    }
}

impl EntityForm for MetricForm {
    type Record = ScoreCardItem;
    type Request = ScorecardMetricRequest;

    const DELETE_PROMPT: &'static str = "This will remove this metric from future monthly scorecards. Historical entries will remain saved but this criteria will no longer appear for new grades.";

    fn from_record(item: &ScoreCardItem) -> Self {
        Self {
            sc_category: item.sc_category,
            sc_description: item.sc_description.clone(),
            driver_type_id: item.driver_type_id,
        }
    }

    fn record_id(item: &ScoreCardItem) -> i32 {
        item.sc_category_id
    }

    fn to_request(&self) -> Result<ScorecardMetricRequest, FormError> {
        let sc_description =
            required(&self.sc_description).ok_or_else(|| FormError::new(DESCRIPTION_REQUIRED))?;
        Ok(ScorecardMetricRequest {
            sc_category: self.sc_category,
            sc_description,
            driver_type_id: self.driver_type_id,
        })
    }
}

/// Métricas agrupadas por categoría, en el orden de las pestañas
pub fn metrics_by_category(
    metrics: &[ScoreCardItem],
) -> Vec<(ScorecardCategory, Vec<&ScoreCardItem>)> {
    ScorecardCategory::ALL
        .iter()
        .map(|category| {
            (
                *category,
                metrics
                    .iter()
                    .filter(|m| m.sc_category == *category)
                    .collect(),
            )
        })
        .collect()
}

pub async fn submit_metric<A: FleetApi>(
    view: &mut CrudView<MetricForm>,
    store: &mut DbStore<A>,
) -> ClientResult<ScoreCardItem> {
    view.save_with(move |id, request| async move {
        store.save_scorecard_metric(id, &request).await
    })
    .await
}

pub async fn delete_metric<A: FleetApi>(
    view: &mut CrudView<MetricForm>,
    store: &mut DbStore<A>,
) -> ClientResult<Option<()>> {
    view.delete_with(move |id| async move { store.delete_scorecard_metric(id).await })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::views::crud::CrudMode;

    #[test]
    fn test_catalog_required_fields() {
        assert_eq!(
            DriverTypeForm::default().to_request().unwrap_err().message,
            DRIVER_TYPE_REQUIRED
        );

        let form = SafetyCategoryForm {
            code: "B001".to_string(),
            ..Default::default()
        };
        assert_eq!(
            form.to_request().unwrap_err().message,
            CODE_AND_DESCRIPTION_REQUIRED
        );

        assert_eq!(
            MetricForm::blank(ScorecardCategory::Dispatch)
                .to_request()
                .unwrap_err()
                .message,
            DESCRIPTION_REQUIRED
        );
    }

    #[test]
    fn test_category_scores_are_coerced() {
        let mut form = SafetyCategoryForm {
            code: "B001".to_string(),
            description: "Hard braking".to_string(),
            scoring_system: " 3 ".to_string(),
            p_i_score: String::new(),
        };
        let request = form.to_request().unwrap();
        assert_eq!(request.scoring_system, 3);
        assert_eq!(request.p_i_score, 0);

        form.p_i_score = "one".to_string();
        assert_eq!(form.to_request().unwrap_err().message, INVALID_SCORE_VALUE);
    }

    #[test]
    fn test_crud_view_transitions() {
        let mut view: CrudView<DriverTypeForm> = CrudView::new();
        assert!(view.is_browsing());

        view.open_create(DriverTypeForm::default());
        assert!(view.begin_save().is_err());
        assert_eq!(view.error(), Some(DRIVER_TYPE_REQUIRED));

        view.form_mut().unwrap().driver_type = "Owner Operator".to_string();
        let (ticket, record_id, request) = view.begin_save().unwrap();
        assert_eq!(record_id, None);
        assert_eq!(request.driver_type, "Owner Operator");
        assert!(view.form_mut().is_none());

        let failed: ClientResult<()> = Err(ClientError::Api {
            status: 500,
            message: "database unavailable".to_string(),
        });
        assert!(view.finish_save(ticket, &failed));
        assert_eq!(view.error(), Some("database unavailable"));

        let (ticket, _, _) = view.begin_save().unwrap();
        assert!(view.finish_save(ticket, &Ok(())));
        assert!(view.is_browsing());
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut view: CrudView<DriverTypeForm> = CrudView::new();
        let record = DriverType {
            driver_type_id: 4,
            driver_type: "Team".to_string(),
        };
        view.open_edit(&record);
        let (stale, record_id, _) = view.begin_save().unwrap();
        assert_eq!(record_id, Some(4));

        view.cancel();
        view.open_edit(&record);
        assert!(!view.finish_save(stale, &Ok(())));
        assert!(matches!(view.mode(), CrudMode::Editing { .. }));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut view: CrudView<DriverTypeForm> = CrudView::new();
        assert!(view.confirm_delete().is_none());

        view.request_delete(4);
        assert_eq!(view.delete_prompt(), Some(DriverTypeForm::DELETE_PROMPT));
        let (ticket, record_id) = view.confirm_delete().unwrap();
        assert_eq!(record_id, 4);
        assert!(view.confirm_delete().is_none());
        assert!(view.finish_delete(ticket, &Ok(())));
        assert!(view.is_browsing());
    }

    #[test]
    fn test_metrics_grouped_by_tab() {
        let metrics = vec![
            ScoreCardItem {
                sc_category_id: 1,
                sc_category: ScorecardCategory::Dispatch,
                sc_description: "On time".to_string(),
                driver_type_id: None,
            },
            ScoreCardItem {
                sc_category_id: 2,
                sc_category: ScorecardCategory::Safety,
                sc_description: "Pre-trip".to_string(),
                driver_type_id: Some(2),
            },
        ];
        let groups = metrics_by_category(&metrics);
        assert_eq!(groups[0].0, ScorecardCategory::Safety);
        assert_eq!(groups[0].1.len(), 1);
        assert!(groups[1].1.is_empty());
        assert_eq!(groups[2].1[0].sc_category_id, 1);
    }
}
