//! Completitud de scorecards por (driver, mes, categoría)

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::dto::GradeKey;
use crate::models::{ReviewMonth, ScoreCardItem, ScorecardCategory, Snapshot};

/// Puntaje máximo de una métrica
pub const MAX_METRIC_SCORE: i32 = 5;

/// Métricas de la categoría que aplican al tipo de driver
pub fn applicable_metrics(
    metrics: &[ScoreCardItem],
    driver_type_id: Option<i32>,
    category: ScorecardCategory,
) -> Vec<&ScoreCardItem> {
    metrics
        .iter()
        .filter(|m| m.sc_category == category && m.applies_to(driver_type_id))
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CompletionStatus {
    /// No hay driver seleccionado
    NotSelected,
    /// Ninguna métrica aplica al tipo de driver
    NotApplicable,
    /// Todavía no hay calificaciones
    Pending,
    Percent(u32),
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStatus::NotSelected => f.write_str("---"),
            CompletionStatus::NotApplicable => f.write_str("N/A"),
            CompletionStatus::Pending => f.write_str("Pending"),
            CompletionStatus::Percent(p) => write!(f, "{}%", p),
        }
    }
}

/// Puntos obtenidos sobre (métricas × 5), redondeado
pub fn completion(snapshot: &Snapshot, key: Option<GradeKey>) -> CompletionStatus {
    let Some(key) = key else {
        return CompletionStatus::NotSelected;
    };
    let driver_type_id = snapshot
        .driver(key.driver_id)
        .and_then(|d| d.driver_type_id);
    let metrics = applicable_metrics(&snapshot.scorecard_metrics, driver_type_id, key.category);
    if metrics.is_empty() {
        return CompletionStatus::NotApplicable;
    }

    let ids: HashSet<i32> = metrics.iter().map(|m| m.sc_category_id).collect();
    let scores: Vec<i32> = snapshot
        .scorecard_events
        .iter()
        .filter(|e| {
            e.driver_id == key.driver_id
                && key.month.contains(e.event_date)
                && ids.contains(&e.sc_category_id)
        })
        .map(|e| e.sc_score)
        .collect();
    if scores.is_empty() {
        return CompletionStatus::Pending;
    }

    let earned: i32 = scores.iter().sum();
    let possible = metrics.len() as f64 * f64::from(MAX_METRIC_SCORE);
    CompletionStatus::Percent((f64::from(earned) / possible * 100.0).round() as u32)
}

/// Estado de las tres categorías para un driver y un mes
pub fn category_overview(
    snapshot: &Snapshot,
    driver_id: Option<i32>,
    month: ReviewMonth,
) -> Vec<(ScorecardCategory, CompletionStatus)> {
    ScorecardCategory::ALL
        .iter()
        .map(|category| {
            let key = driver_id.map(|driver_id| GradeKey {
                driver_id,
                month,
                category: *category,
            });
            (*category, completion(snapshot, key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Driver, ScoreCardEvent};
    use chrono::NaiveDate;

    fn metric(id: i32, category: ScorecardCategory, driver_type_id: Option<i32>) -> ScoreCardItem {
        ScoreCardItem {
            sc_category_id: id,
            sc_category: category,
            sc_description: format!("Metric {}", id),
            driver_type_id,
        }
    }

    fn grade(id: i32, metric_id: i32, score: i32) -> ScoreCardEvent {
        ScoreCardEvent {
            scorecard_event_id: id,
            driver_id: 7,
            event_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            sc_category_id: metric_id,
            sc_score: score,
            notes: String::new(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            drivers: vec![Driver {
                driver_id: 7,
                driver_code: "D7".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Lopez".to_string(),
                start_date: None,
                truck_id: None,
                driver_type_id: Some(1),
                profile_pic: None,
            }],
            scorecard_metrics: vec![
                metric(1, ScorecardCategory::Safety, None),
                metric(2, ScorecardCategory::Safety, Some(1)),
                metric(3, ScorecardCategory::Safety, Some(2)),
                metric(4, ScorecardCategory::Dispatch, Some(2)),
            ],
            ..Default::default()
        }
    }

    fn key(category: ScorecardCategory) -> Option<GradeKey> {
        Some(GradeKey {
            driver_id: 7,
            month: "2025-03".parse().unwrap(),
            category,
        })
    }

    #[test]
    fn test_applicable_metrics_respect_driver_type() {
        let snap = snapshot();
        let ids: Vec<i32> =
            applicable_metrics(&snap.scorecard_metrics, Some(1), ScorecardCategory::Safety)
                .iter()
                .map(|m| m.sc_category_id)
                .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_completion_states() {
        let mut snap = snapshot();
        assert_eq!(completion(&snap, None).to_string(), "---");
        assert_eq!(
            completion(&snap, key(ScorecardCategory::Dispatch)).to_string(),
            "N/A"
        );
        assert_eq!(
            completion(&snap, key(ScorecardCategory::Safety)).to_string(),
            "Pending"
        );

        snap.scorecard_events = vec![grade(1, 1, 3), grade(2, 2, 0)];
        assert_eq!(
            completion(&snap, key(ScorecardCategory::Safety)),
            CompletionStatus::Percent(30)
        );
    }

    #[test]
    fn test_category_overview_without_driver() {
        let overview = category_overview(&snapshot(), None, "2025-03".parse().unwrap());
        assert_eq!(overview.len(), 3);
        assert!(overview
            .iter()
            .all(|(_, status)| *status == CompletionStatus::NotSelected));
    }
}
