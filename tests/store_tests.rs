use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use driver_safety::analysis::dashboard::{
    average_bonus_score, format_one_decimal, risk_distribution, violation_trend, DashboardSummary,
};
use driver_safety::client::{FleetApi, InProcessFleetApi};
use driver_safety::dto::{
    DriverRequest, GradeKey, GradeSheet, MetricScore, SafetyCategoryRequest,
    ScorecardMetricRequest, TruckRequest,
};
use driver_safety::models::{ScorecardCategory, TruckStatus};
use driver_safety::repositories::MemoryFleetRepository;
use driver_safety::store::DbStore;
use driver_safety::views::crud::CrudView;
use driver_safety::views::search::filter;
use driver_safety::views::{assignment, driver_form, DriverForm, EntityForm, SafetyLogView};

type Store = DbStore<InProcessFleetApi>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn create_test_store() -> Store {
    let mut store = DbStore::new(InProcessFleetApi::new(Arc::new(MemoryFleetRepository::new())));
    store.init().await.unwrap();
    store
}

async fn add_driver(store: &mut Store, first: &str, last: &str) -> i32 {
    let request = DriverRequest {
        driver_code: format!("{}{}", &first[..1], &last[..1]),
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..Default::default()
    };
    store.save_driver(None, &request).await.unwrap().driver_id
}

async fn add_truck(store: &mut Store, unit: &str) -> i32 {
    let request = TruckRequest {
        unit_number: unit.to_string(),
        year: 2022,
        status: None,
    };
    store.save_truck(None, &request).await.unwrap().truck_id
}

fn truck_status(store: &Store, truck_id: i32) -> TruckStatus {
    store.state().truck(truck_id).unwrap().status
}

#[tokio::test]
async fn test_assign_to_another_truck_frees_the_first() {
    let mut store = create_test_store().await;
    let driver_id = add_driver(&mut store, "John", "Smith").await;
    let truck_a = add_truck(&mut store, "101").await;
    let truck_b = add_truck(&mut store, "102").await;

    store.assign_truck(driver_id, Some(truck_a)).await.unwrap();
    assert_eq!(truck_status(&store, truck_a), TruckStatus::Assigned);

    store.assign_truck(driver_id, Some(truck_b)).await.unwrap();
    assert_eq!(store.state().driver(driver_id).unwrap().truck_id, Some(truck_b));
    assert_eq!(truck_status(&store, truck_a), TruckStatus::Available);
    assert_eq!(truck_status(&store, truck_b), TruckStatus::Assigned);

    store.assign_truck(driver_id, None).await.unwrap();
    assert_eq!(store.state().driver(driver_id).unwrap().truck_id, None);
    assert_eq!(truck_status(&store, truck_a), TruckStatus::Available);
    assert_eq!(truck_status(&store, truck_b), TruckStatus::Available);
}

#[tokio::test]
async fn test_assignment_dialog_blocks_drivers_on_other_units() {
    let mut store = create_test_store().await;
    let ana = add_driver(&mut store, "Ana", "Lopez").await;
    let ben = add_driver(&mut store, "Ben", "Ortiz").await;
    let truck_a = add_truck(&mut store, "101").await;
    let truck_b = add_truck(&mut store, "102").await;
    store.assign_truck(ben, Some(truck_b)).await.unwrap();

    let dialog = assignment::AssignmentDialog::open(store.state(), truck_a);
    let ben_option = dialog.options().iter().find(|o| o.driver_id == ben).unwrap();
    assert!(ben_option.disabled);
    assert_eq!(ben_option.other_unit.as_deref(), Some("102"));

    assert!(dialog.choose(Some(ben), &mut store).await.is_err());
    assert_eq!(truck_status(&store, truck_a), TruckStatus::Available);

    dialog.choose(Some(ana), &mut store).await.unwrap();
    assert_eq!(store.state().driver_for_truck(truck_a).unwrap().driver_id, ana);

    let history = assignment::load_history(&store, truck_a).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].driver_name.as_deref(), Some("Ana Lopez"));

    dialog.choose(None, &mut store).await.unwrap();
    assert_eq!(truck_status(&store, truck_a), TruckStatus::Available);
    assert_eq!(store.state().driver(ana).unwrap().truck_id, None);
}

#[tokio::test]
async fn test_delete_driver_removes_events_and_frees_truck() {
    let mut store = create_test_store().await;
    let driver_id = add_driver(&mut store, "John", "Smith").await;
    let other_id = add_driver(&mut store, "Mary", "Jones").await;
    let truck_id = add_truck(&mut store, "101").await;
    store.assign_truck(driver_id, Some(truck_id)).await.unwrap();

    let category = store
        .save_safety_category(
            None,
            &SafetyCategoryRequest {
                code: "S01".to_string(),
                description: "Speeding".to_string(),
                scoring_system: 2,
                p_i_score: 0,
            },
        )
        .await
        .unwrap();
    let metric = store
        .save_scorecard_metric(
            None,
            &ScorecardMetricRequest {
                sc_category: ScorecardCategory::Safety,
                sc_description: "Seat belt".to_string(),
                driver_type_id: None,
            },
        )
        .await
        .unwrap();

    let mut log = SafetyLogView::new(date(2025, 6, 10));
    for driver in [driver_id, other_id] {
        log.form.driver_id = Some(driver);
        log.form.category_id = Some(category.category_id);
        log.submit(&mut store, date(2025, 6, 10)).await.unwrap();
    }
    for driver in [driver_id, other_id] {
        store
            .save_grades(&GradeSheet {
                driver_id: driver,
                month: "2025-05".parse().unwrap(),
                category: ScorecardCategory::Safety,
                notes: String::new(),
                scores: vec![MetricScore {
                    sc_category_id: metric.sc_category_id,
                    sc_score: 4,
                }],
            })
            .await
            .unwrap();
    }

    let mut view: CrudView<DriverForm> = CrudView::new();
    view.request_delete(driver_id);
    assert!(view.delete_prompt().unwrap().contains("will also be removed"));
    driver_form::delete(&mut view, &mut store).await.unwrap();
    assert!(view.is_browsing());

    let state = store.state();
    assert!(state.driver(driver_id).is_none());
    assert!(state.safety_events.iter().all(|e| e.driver_id == other_id));
    assert_eq!(state.safety_events.len(), 1);
    assert!(state.scorecard_events.iter().all(|e| e.driver_id == other_id));
    assert_eq!(state.scorecard_events.len(), 1);
    assert_eq!(truck_status(&store, truck_id), TruckStatus::Available);
}

#[tokio::test]
async fn test_grade_round_trip_and_full_replace() {
    let mut store = create_test_store().await;
    let mut driver_id = 0;
    for n in 1..=7 {
        driver_id = add_driver(&mut store, "Driver", &format!("Number{}", n)).await;
    }
    assert_eq!(driver_id, 7);

    let mut metric_ids = Vec::new();
    for description in ["Pre-trip inspection", "Seat belt", "Following distance"] {
        let metric = store
            .save_scorecard_metric(
                None,
                &ScorecardMetricRequest {
                    sc_category: ScorecardCategory::Safety,
                    sc_description: description.to_string(),
                    driver_type_id: None,
                },
            )
            .await
            .unwrap();
        metric_ids.push(metric.sc_category_id);
    }
    assert_eq!(&metric_ids[..2], &[1, 2]);

    let key = GradeKey {
        driver_id: 7,
        month: "2025-03".parse().unwrap(),
        category: ScorecardCategory::Safety,
    };
    let sheet = GradeSheet {
        driver_id: 7,
        month: key.month,
        category: key.category,
        notes: "Great month.\nKeep it up!".to_string(),
        scores: vec![
            MetricScore {
                sc_category_id: 1,
                sc_score: 3,
            },
            MetricScore {
                sc_category_id: 2,
                sc_score: 0,
            },
        ],
    };
    store.save_grades(&sheet).await.unwrap();

    let reopened = store.grade_sheet(key).unwrap();
    assert_eq!(reopened.scores, sheet.scores);
    assert_eq!(reopened.notes, "Great month.\nKeep it up!");
    assert_eq!(store.api().grade_sheet(key).await.unwrap(), Some(reopened.clone()));

    let replacement = GradeSheet {
        notes: "Revised".to_string(),
        scores: vec![MetricScore {
            sc_category_id: metric_ids[2],
            sc_score: 5,
        }],
        ..sheet.clone()
    };
    store.save_grades(&replacement).await.unwrap();

    let reopened = store.grade_sheet(key).unwrap();
    assert_eq!(reopened.scores, replacement.scores);
    assert_eq!(reopened.notes, "Revised");
    assert_eq!(store.state().scorecard_events.len(), 1);

    store.init().await.unwrap();
    assert_eq!(store.grade_sheet(key).unwrap().scores, replacement.scores);
}

#[tokio::test]
async fn test_b001_event_snapshots_category_scores() {
    let mut store = create_test_store().await;
    let mut driver_id = 0;
    for n in 1..=5 {
        driver_id = add_driver(&mut store, "Driver", &format!("Number{}", n)).await;
    }
    assert_eq!(driver_id, 5);

    let category = store
        .save_safety_category(
            None,
            &SafetyCategoryRequest {
                code: "B001".to_string(),
                description: "Hard braking".to_string(),
                scoring_system: 3,
                p_i_score: 1,
            },
        )
        .await
        .unwrap();

    let mut log = SafetyLogView::new(date(2025, 6, 10));
    log.form.driver_id = Some(5);
    log.form.category_id = Some(category.category_id);
    log.form.event_date = date(2025, 6, 10);
    let event = log.submit(&mut store, date(2025, 6, 10)).await.unwrap();
    assert_eq!(event.bonus_score, 3);
    assert_eq!(event.p_i_score, 1);
    assert!(event.bonus_period);
    assert_eq!(log.form.driver_id, None);

    // Editing the category later does not rewrite the logged event
    store
        .save_safety_category(
            Some(category.category_id),
            &SafetyCategoryRequest {
                scoring_system: 10,
                ..SafetyCategoryRequest::from(&category)
            },
        )
        .await
        .unwrap();
    let stored = &store.state().safety_events[0];
    assert_eq!(stored.bonus_score, 3);

    let events = &store.state().safety_events;
    assert_eq!(average_bonus_score(events), 3.0);
    assert_eq!(format_one_decimal(average_bonus_score(events)), "3.0");

    let summary = DashboardSummary::compute(store.state(), date(2025, 6, 12));
    assert_eq!(summary.average_bonus_display(), "3.0");
    assert_eq!(summary.recent[0].category_code, "B001");

    let rows = log.rows(store.state());
    assert_eq!(rows.len(), 1);
    log.request_delete(rows[0].safety_event_id);
    assert!(log.confirm_delete(&mut store).await.unwrap());
    assert!(store.state().safety_events.is_empty());
}

#[tokio::test]
async fn test_roster_search_matches_substring() {
    let mut store = create_test_store().await;
    add_driver(&mut store, "John", "Smith").await;
    add_driver(&mut store, "Al", "Smithson").await;
    add_driver(&mut store, "Mary", "Jones").await;

    let view: CrudView<DriverForm> = {
        let mut view = CrudView::new();
        view.set_query("smi");
        view
    };
    let names: Vec<String> = view
        .visible(&store.state().drivers)
        .iter()
        .map(|d| d.full_name())
        .collect();
    assert_eq!(names, vec!["John Smith", "Al Smithson"]);
    assert!(filter(&store.state().drivers, "smi")
        .iter()
        .all(|d| d.last_name != "Jones"));
    assert_eq!(store.state().drivers.len(), 3);
}

#[tokio::test]
async fn test_trend_is_always_twelve_weeks() {
    let mut store = create_test_store().await;
    let driver_id = add_driver(&mut store, "Ana", "Lopez").await;
    let category = store
        .save_safety_category(
            None,
            &SafetyCategoryRequest {
                code: "B001".to_string(),
                description: "Hard braking".to_string(),
                scoring_system: 1,
                p_i_score: 0,
            },
        )
        .await
        .unwrap();

    let mut log = SafetyLogView::new(date(2025, 6, 30));
    for event_date in [date(2025, 4, 15), date(2025, 5, 13), date(2025, 5, 14)] {
        log.form.driver_id = Some(driver_id);
        log.form.category_id = Some(category.category_id);
        log.form.event_date = event_date;
        log.submit(&mut store, date(2025, 6, 30)).await.unwrap();
    }

    let trend = violation_trend(
        &store.state().safety_events,
        &store.state().safety_categories,
        date(2025, 6, 30),
    );
    assert_eq!(trend.week_starts.len(), 12);
    assert_eq!(trend.week_starts[0], date(2025, 4, 14));
    assert_eq!(trend.series.len(), 1);

    let series = &trend.series[0];
    assert_eq!(series.code, "B001");
    assert_eq!(series.counts.len(), 12);
    assert_eq!(series.counts[0], 1);
    assert_eq!(series.counts[4], 2);
    let others: u32 = series
        .counts
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 0 && *i != 4)
        .map(|(_, c)| *c)
        .sum();
    assert_eq!(others, 0);
}

#[tokio::test]
async fn test_risk_buckets_sum_to_100() {
    let mut store = create_test_store().await;
    let category = store
        .save_safety_category(
            None,
            &SafetyCategoryRequest {
                code: "S01".to_string(),
                description: "Speeding".to_string(),
                scoring_system: 4,
                p_i_score: 0,
            },
        )
        .await
        .unwrap();

    let mut log = SafetyLogView::new(date(2025, 6, 10));
    for (n, events) in [0usize, 2, 3].into_iter().enumerate() {
        let driver_id = add_driver(&mut store, "Driver", &format!("Number{}", n)).await;
        for _ in 0..events {
            log.form.driver_id = Some(driver_id);
            log.form.category_id = Some(category.category_id);
            log.submit(&mut store, date(2025, 6, 10)).await.unwrap();
        }
    }

    let buckets = risk_distribution(store.state());
    let counts: Vec<usize> = buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1, 1, 1]);
    let total: u32 = buckets.iter().map(|b| b.percent).sum();
    assert!((99..=101).contains(&total));
}

#[tokio::test]
async fn test_failed_request_leaves_store_untouched() {
    let mut store = create_test_store().await;
    let driver_id = add_driver(&mut store, "John", "Smith").await;
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let before = store.state().clone();

    assert!(store.assign_truck(driver_id, Some(999)).await.is_err());
    assert!(store.delete_truck(999).await.is_err());

    let mut view: CrudView<DriverForm> = CrudView::new();
    view.open_edit(store.state().driver(driver_id).unwrap());
    view.form_mut().unwrap().first_name.clear();
    let err = driver_form::submit(&mut view, &mut store).await.unwrap_err();
    assert_eq!(err.user_message(), "Please fill in all required fields.");
    assert_eq!(view.error(), Some("Please fill in all required fields."));

    assert_eq!(store.state(), &before);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    view.form_mut().unwrap().first_name = "Johnny".to_string();
    let saved = driver_form::submit(&mut view, &mut store).await.unwrap();
    assert_eq!(saved.full_name(), "Johnny Smith");
    assert!(view.is_browsing());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(DriverForm::from_record(&saved).first_name, "Johnny");
}

#[tokio::test]
async fn test_profile_picture_accepted_by_form_is_accepted_by_server() {
    let mut store = create_test_store().await;
    let mut form = DriverForm::blank(store.state(), date(2025, 6, 10));
    form.driver_code = "AL05".to_string();
    form.first_name = "Ana".to_string();
    form.last_name = "Lopez".to_string();

    assert!(form.set_profile_picture(&[1, 2, 3, 4], "image/bmp").is_err());
    assert!(form.set_profile_picture(&[], "image/png").is_err());
    form.set_profile_picture(&[1, 2, 3, 4], "image/webp").unwrap();

    let mut view: CrudView<DriverForm> = CrudView::new();
    view.open_create(form);
    let driver = driver_form::submit(&mut view, &mut store).await.unwrap();
    assert!(driver
        .profile_pic
        .as_deref()
        .unwrap()
        .starts_with("data:image/webp;base64,"));
    assert!(view.is_browsing());
}
