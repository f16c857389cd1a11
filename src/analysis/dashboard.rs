//! Estadísticas del dashboard: promedio de bonus, perfil de riesgo,
//! tendencia semanal de violaciones y actividad reciente.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::models::{DriverStats, SafetyCategory, SafetyEvent, Snapshot, Truck, TruckStatus};

/// Días hacia atrás que considera la tendencia de violaciones
pub const TREND_WINDOW_DAYS: i64 = 90;
/// Semanas graficadas en la tendencia
pub const TREND_WEEKS: usize = 12;
/// Categorías graficadas en la tendencia
pub const TREND_TOP_CATEGORIES: usize = 5;
/// Eventos mostrados en la actividad reciente
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Promedio de `bonus_score`; 0 sin eventos
pub fn average_bonus_score(events: &[SafetyEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let total: i64 = events.iter().map(|e| i64::from(e.bonus_score)).sum();
    total as f64 / events.len() as f64
}

/// Formato de una decimal para mostrar
pub fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", value)
}

/// Totales de safety events de un driver
pub fn driver_stats(driver_id: i32, events: &[SafetyEvent]) -> DriverStats {
    let (count, bonus, p_i) = events
        .iter()
        .filter(|e| e.driver_id == driver_id)
        .fold((0i64, 0i64, 0i64), |(c, b, p), e| {
            (c + 1, b + i64::from(e.bonus_score), p + i64::from(e.p_i_score))
        });
    DriverStats::from_totals(count, bonus, p_i)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    /// Low ≤ 5, Medium 6..=10, High > 10
    pub fn for_total(total_bonus: i64) -> Self {
        if total_bonus > 10 {
            RiskLevel::High
        } else if total_bonus > 5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk (0-5)",
            RiskLevel::Medium => "Med Risk (6-10)",
            RiskLevel::High => "High Risk (>10)",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RiskBucket {
    pub level: RiskLevel,
    pub count: usize,
    /// Porcentaje del total de drivers, redondeado
    pub percent: u32,
}

/// Distribución de drivers por nivel de riesgo
pub fn risk_distribution(snapshot: &Snapshot) -> Vec<RiskBucket> {
    let mut totals: HashMap<i32, i64> = HashMap::new();
    for event in &snapshot.safety_events {
        *totals.entry(event.driver_id).or_default() += i64::from(event.bonus_score);
    }

    let mut counts = [0usize; 3];
    for driver in &snapshot.drivers {
        let total = totals.get(&driver.driver_id).copied().unwrap_or(0);
        let index = match RiskLevel::for_total(total) {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        };
        counts[index] += 1;
    }

    let denominator = snapshot.drivers.len().max(1) as f64;
    RiskLevel::ALL
        .iter()
        .zip(counts)
        .map(|(level, count)| RiskBucket {
            level: *level,
            count,
            percent: (count as f64 / denominator * 100.0).round() as u32,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TrendSeries {
    pub category_id: i32,
    /// Código de la categoría, o `CAT-{id}` si ya no existe
    pub code: String,
    /// Un conteo por semana, la más reciente al final
    pub counts: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViolationTrend {
    pub week_starts: Vec<NaiveDate>,
    /// Etiquetas `M/D` del lunes de cada semana
    pub week_labels: Vec<String>,
    pub series: Vec<TrendSeries>,
}

/// Lunes de la semana que contiene `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Tendencia semanal de las 5 categorías más frecuentes de los últimos 90 días
pub fn violation_trend(
    events: &[SafetyEvent],
    categories: &[SafetyCategory],
    today: NaiveDate,
) -> ViolationTrend {
    let window_start = today - Duration::days(TREND_WINDOW_DAYS);
    let recent: Vec<&SafetyEvent> = events
        .iter()
        .filter(|e| e.event_date >= window_start)
        .collect();

    let mut frequency: HashMap<i32, usize> = HashMap::new();
    for event in &recent {
        *frequency.entry(event.category_id).or_default() += 1;
    }
    let mut ranked: Vec<(i32, usize)> = frequency.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TREND_TOP_CATEGORIES);

    let current_week = week_start(today);
    let week_starts: Vec<NaiveDate> = (0..TREND_WEEKS)
        .rev()
        .map(|weeks_back| current_week - Duration::weeks(weeks_back as i64))
        .collect();
    let week_labels = week_starts
        .iter()
        .map(|d| format!("{}/{}", d.month(), d.day()))
        .collect();

    let series = ranked
        .into_iter()
        .map(|(category_id, _)| {
            let code = categories
                .iter()
                .find(|c| c.category_id == category_id)
                .map(|c| c.code.clone())
                .unwrap_or_else(|| format!("CAT-{}", category_id));
            let counts = week_starts
                .iter()
                .map(|start| {
                    let end = *start + Duration::days(7);
                    recent
                        .iter()
                        .filter(|e| {
                            e.category_id == category_id
                                && e.event_date >= *start
                                && e.event_date < end
                        })
                        .count() as u32
                })
                .collect();
            TrendSeries {
                category_id,
                code,
                counts,
            }
        })
        .collect();

    ViolationTrend {
        week_starts,
        week_labels,
        series,
    }
}

/// Los `limit` eventos más recientes por fecha
pub fn recent_activity(events: &[SafetyEvent], limit: usize) -> Vec<&SafetyEvent> {
    let mut sorted: Vec<&SafetyEvent> = events.iter().collect();
    sorted.sort_by(|a, b| {
        b.event_date
            .cmp(&a.event_date)
            .then(b.safety_event_id.cmp(&a.safety_event_id))
    });
    sorted.truncate(limit);
    sorted
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FleetUtilisation {
    pub assigned: usize,
    pub total: usize,
    pub percent: u32,
}

pub fn fleet_utilisation(trucks: &[Truck]) -> FleetUtilisation {
    let assigned = trucks
        .iter()
        .filter(|t| t.status == TruckStatus::Assigned)
        .count();
    let total = trucks.len();
    let percent = if total == 0 {
        0
    } else {
        (assigned as f64 / total as f64 * 100.0).round() as u32
    };
    FleetUtilisation {
        assigned,
        total,
        percent,
    }
}

/// Fila de la actividad reciente con los nombres ya resueltos
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub event: SafetyEvent,
    pub driver_name: String,
    pub category_code: String,
}

/// Todo lo que muestra el dashboard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub active_drivers: usize,
    pub total_events: usize,
    pub average_bonus_score: f64,
    pub fleet: FleetUtilisation,
    pub risk: Vec<RiskBucket>,
    pub trend: ViolationTrend,
    pub recent: Vec<ActivityEntry>,
}

impl DashboardSummary {
    pub fn compute(snapshot: &Snapshot, today: NaiveDate) -> Self {
        let recent = recent_activity(&snapshot.safety_events, RECENT_ACTIVITY_LIMIT)
            .into_iter()
            .map(|event| ActivityEntry {
                driver_name: snapshot
                    .driver(event.driver_id)
                    .map(|d| d.full_name())
                    .unwrap_or_else(|| "Unknown".to_string()),
                category_code: snapshot
                    .safety_category(event.category_id)
                    .map(|c| c.code.clone())
                    .unwrap_or_else(|| "N/A".to_string()),
                event: event.clone(),
            })
            .collect();

        Self {
            active_drivers: snapshot.drivers.len(),
            total_events: snapshot.safety_events.len(),
            average_bonus_score: average_bonus_score(&snapshot.safety_events),
            fleet: fleet_utilisation(&snapshot.trucks),
            risk: risk_distribution(snapshot),
            trend: violation_trend(
                &snapshot.safety_events,
                &snapshot.safety_categories,
                today,
            ),
            recent,
        }
    }

    /// Promedio de bonus con una decimal
    pub fn average_bonus_display(&self) -> String {
        format_one_decimal(self.average_bonus_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Driver;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: i32, driver_id: i32, category_id: i32, on: NaiveDate, bonus: i32) -> SafetyEvent {
        SafetyEvent {
            safety_event_id: id,
            driver_id,
            event_date: on,
            category_id,
            notes: String::new(),
            bonus_score: bonus,
            p_i_score: 0,
            bonus_period: true,
        }
    }

    fn driver(id: i32) -> Driver {
        Driver {
            driver_id: id,
            driver_code: format!("D{}", id),
            first_name: "Test".to_string(),
            last_name: format!("Driver{}", id),
            start_date: None,
            truck_id: None,
            driver_type_id: None,
            profile_pic: None,
        }
    }

    fn category(id: i32, code: &str) -> SafetyCategory {
        SafetyCategory {
            category_id: id,
            code: code.to_string(),
            description: code.to_string(),
            scoring_system: 1,
            p_i_score: 0,
        }
    }

    #[test]
    fn test_average_bonus_score() {
        assert_eq!(average_bonus_score(&[]), 0.0);
        let events = vec![
            event(1, 1, 1, date(2025, 6, 1), 3),
            event(2, 1, 1, date(2025, 6, 2), 4),
        ];
        assert_eq!(format_one_decimal(average_bonus_score(&events)), "3.5");
    }

    #[test]
    fn test_risk_distribution_buckets_and_rounding() {
        let snapshot = Snapshot {
            drivers: vec![driver(1), driver(2), driver(3)],
            safety_events: vec![
                event(1, 2, 1, date(2025, 6, 1), 6),
                event(2, 3, 1, date(2025, 6, 1), 11),
            ],
            ..Default::default()
        };
        let buckets = risk_distribution(&snapshot);
        let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1]);
        let total: u32 = buckets.iter().map(|b| b.percent).sum();
        assert!((99..=101).contains(&total));
    }

    #[test]
    fn test_risk_distribution_without_drivers() {
        let buckets = risk_distribution(&Snapshot::default());
        assert!(buckets.iter().all(|b| b.count == 0 && b.percent == 0));
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2025-06-15 es domingo
        assert_eq!(week_start(date(2025, 6, 15)), date(2025, 6, 9));
        assert_eq!(week_start(date(2025, 6, 9)), date(2025, 6, 9));
    }

    #[test]
    fn test_trend_top_five_and_fallback_code() {
        let today = date(2025, 6, 11);
        let mut events = Vec::new();
        let mut id = 0;
        for (category_id, n) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6)] {
            for _ in 0..n {
                id += 1;
                events.push(event(id, 1, category_id, today, 1));
            }
        }
        // Fuera de la ventana de 90 días
        events.push(event(100, 1, 1, date(2025, 1, 1), 1));

        let categories: Vec<SafetyCategory> =
            (2..=5).map(|i| category(i, &format!("C{}", i))).collect();
        let trend = violation_trend(&events, &categories, today);

        let ids: Vec<i32> = trend.series.iter().map(|s| s.category_id).collect();
        assert_eq!(ids, vec![6, 5, 4, 3, 2]);
        assert_eq!(trend.series[0].code, "CAT-6");
        assert_eq!(trend.series[1].code, "C5");
        assert_eq!(trend.series[0].counts.last(), Some(&6));
    }

    #[test]
    fn test_trend_labels_are_month_day_of_mondays() {
        let trend = violation_trend(&[], &[], date(2025, 6, 11));
        assert_eq!(trend.week_labels.len(), TREND_WEEKS);
        assert_eq!(trend.week_labels.last().map(String::as_str), Some("6/9"));
        assert_eq!(trend.week_labels.first().map(String::as_str), Some("3/24"));
        assert!(trend.series.is_empty());
    }

    #[test]
    fn test_recent_activity_newest_first() {
        let events: Vec<SafetyEvent> = (1..=7)
            .map(|i| event(i, 1, 1, date(2025, 6, i as u32), 1))
            .collect();
        let recent = recent_activity(&events, RECENT_ACTIVITY_LIMIT);
        let ids: Vec<i32> = recent.iter().map(|e| e.safety_event_id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_summary_uses_fallback_names() {
        let snapshot = Snapshot {
            safety_events: vec![event(1, 42, 9, date(2025, 6, 1), 3)],
            ..Default::default()
        };
        let summary = DashboardSummary::compute(&snapshot, date(2025, 6, 11));
        assert_eq!(summary.recent[0].driver_name, "Unknown");
        assert_eq!(summary.recent[0].category_code, "N/A");
        assert_eq!(summary.average_bonus_display(), "3.0");
        assert_eq!(summary.fleet.percent, 0);
    }
}
