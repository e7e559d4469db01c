//! End-to-end flow through the public API: ingest, validate, mine, accept, export.

use alloc_prep::ingest::{map_rows, RawRow};
use alloc_prep::{
    mine_recommendations, validate, Client, EntityType, PrepError, RuleType, Session, Severity,
    Task, Worker,
};

fn make_row(cells: &[(&str, &str)]) -> RawRow {
    cells
        .iter()
        .map(|(h, c)| (h.to_string(), c.to_string()))
        .collect()
}

fn make_clients(pairs: usize, total: usize) -> Vec<Client> {
    (0..total)
        .map(|i| Client {
            client_id: format!("C{}", i + 1),
            client_name: format!("Client {}", i + 1),
            priority_level: 3,
            requested_task_ids: if i < pairs { "T1,T2" } else { "T3" }.to_string(),
            ..Client::default()
        })
        .collect()
}

fn make_worker(id: &str, skills: &str, slots: &str, max_load: i64) -> Worker {
    Worker {
        worker_id: id.to_string(),
        worker_name: id.to_string(),
        skills: skills.to_string(),
        available_slots: slots.to_string(),
        max_load_per_phase: max_load,
        worker_group: "backend".to_string(),
        ..Worker::default()
    }
}

fn make_task(id: &str, skills: &str) -> Task {
    Task {
        task_id: id.to_string(),
        task_name: format!("Task {}", id),
        required_skills: skills.to_string(),
        preferred_phases: "[1]".to_string(),
        ..Task::default()
    }
}

#[test]
fn test_priority_out_of_range_is_single_error() {
    for priority in [0, 6, -3, 42] {
        let clients = vec![Client {
            client_id: "C1".to_string(),
            client_name: "Acme".to_string(),
            priority_level: priority,
            ..Client::default()
        }];
        let findings = validate(&clients, &[], &[]);
        let priority_findings: Vec<_> = findings
            .iter()
            .filter(|f| f.field == "PriorityLevel")
            .collect();
        assert_eq!(priority_findings.len(), 1, "priority {}", priority);
        assert_eq!(priority_findings[0].severity, Severity::Error);
    }
}

#[test]
fn test_worker_slot_findings() {
    let workers = vec![
        make_worker("W1", "go", "[1,", 1),
        make_worker("W2", "go", "[1,-2]", 1),
        make_worker("W3", "go", "[1,2]", 3),
    ];
    let findings = validate(&[], &workers, &[]);
    let slot_severity = |row: i64, field: &str| {
        findings
            .iter()
            .find(|f| f.row_index == row && f.field == field)
            .map(|f| f.severity)
    };
    assert_eq!(slot_severity(0, "AvailableSlots"), Some(Severity::Error));
    assert_eq!(slot_severity(1, "AvailableSlots"), Some(Severity::Error));
    assert_eq!(slot_severity(2, "MaxLoadPerPhase"), Some(Severity::Warning));
}

#[test]
fn test_duplicate_client_reported_once() {
    let mut clients = make_clients(0, 3);
    clients[2].client_id = "C1".to_string();
    let findings = validate(&clients, &[], &[make_task("T3", "")]);
    let duplicates: Vec<_> = findings.iter().filter(|f| f.field == "ClientID").collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].row_index, -1);
    assert!(duplicates[0].message.contains("C1"));
}

#[test]
fn test_co_run_threshold_over_ten_clients() {
    let tasks = vec![make_task("T1", ""), make_task("T2", ""), make_task("T3", "")];

    let recs = mine_recommendations(&make_clients(3, 10), &[], &tasks);
    let co_run: Vec<_> = recs.iter().filter(|r| r.rule_type() == RuleType::CoRun).collect();
    assert_eq!(co_run.len(), 1);
    assert!((co_run[0].confidence - 0.3).abs() < 1e-9);

    let recs = mine_recommendations(&make_clients(2, 10), &[], &tasks);
    assert!(recs.iter().all(|r| r.rule_type() != RuleType::CoRun));
}

#[test]
fn test_uncovered_skill_warned_and_recommended() {
    let workers = vec![make_worker("W1", "python", "[1,2]", 1)];
    let tasks = vec![make_task("T1", "rust")];

    let findings = validate(&[], &workers, &tasks);
    let coverage: Vec<_> = findings
        .iter()
        .filter(|f| f.entity_type == EntityType::Tasks && f.field == "RequiredSkills")
        .collect();
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage[0].severity, Severity::Warning);

    let recs = mine_recommendations(&[], &workers, &tasks);
    let skill = recs
        .iter()
        .find(|r| r.rule_type() == RuleType::PatternMatch)
        .unwrap();
    assert!(skill
        .data_context
        .patterns
        .iter()
        .any(|p| p.starts_with("Critical skills") && p.contains("rust")));
}

#[test]
fn test_full_session_round_trip() {
    let rows = vec![
        make_row(&[("task_id", "T1"), ("task_name", "Build"), ("required_skills", "python")]),
        make_row(&[("task_id", "T2"), ("task_name", "Ship"), ("required_skills", "python")]),
        make_row(&[("task_id", "T3"), ("task_name", "Test"), ("required_skills", "python")]),
    ];
    let tasks: Vec<Task> = map_rows(&rows).unwrap();

    let mut session = Session::new();
    session.set_clients(make_clients(4, 10));
    session.set_workers(vec![
        make_worker("W1", "python", "[1,2,3]", 1),
        make_worker("W2", "python", "[1,2,3]", 1),
    ]);
    session.set_tasks(tasks);

    let report = session.run_validation();
    assert!(report.is_allocation_ready(), "{:?}", report.findings);

    let pending = session.refresh_recommendations().to_vec();
    let rec = pending
        .iter()
        .find(|r| r.rule_type() == RuleType::CoRun)
        .unwrap()
        .clone();

    let rule = session.accept_recommendation(&rec.id).unwrap().clone();
    assert_eq!(rule.rule_type(), rec.rule_type());
    assert_eq!(rule.parameters, rec.suggested_rule.parameters);
    assert!(session.recommendations().iter().all(|r| r.id != rec.id));
    assert_eq!(session.recommendations().len(), pending.len() - 1);
    assert!(matches!(
        session.accept_recommendation(&rec.id),
        Err(PrepError::RecommendationNotFound(_))
    ));

    session.toggle_rule(&rule.id).unwrap();
    let exported: serde_json::Value =
        serde_json::from_str(&session.export_rules().unwrap()).unwrap();
    assert_eq!(exported["metadata"]["totalRules"], 1);
    assert_eq!(exported["metadata"]["enabledRules"], 0);
    assert_eq!(exported["rules"].as_array().map(Vec::len), Some(0));
}
