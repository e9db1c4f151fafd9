//! End-to-end flows through the EditEngine facade: submit, list, undo,
//! export, and the failure modes that cross component boundaries.

use chrono::{Duration, Utc};
use renta_core::{SubmitError, UndoError};
use renta_engine::{DriftKind, EditEngine};
use renta_storage::{DirectoryStore, FailurePoint};
use renta_test_utils::{fixture_store, make_edit};
use std::sync::Arc;

fn engine_over_fixture() -> (EditEngine, Arc<renta_test_utils::MockStorage>, Vec<renta_core::AgentIdentity>) {
    let (store, agents) = fixture_store();
    let store = Arc::new(store);
    let engine = EditEngine::new(store.clone());
    (engine, store, agents)
}

#[test]
fn noop_edits_are_dropped_and_leave_no_history() {
    let (engine, store, agents) = engine_over_fixture();
    let john = &agents[0];

    let noop = make_edit(john, &john.name, &john.phone);
    let result = engine.submit_batch(&[noop], "admin@renta", Utc::now());
    assert!(matches!(result, Err(SubmitError::EmptyBatch)));
    assert_eq!(store.history_count(), 0);
}

#[test]
fn in_batch_duplicates_reject_both_agents_and_persist_nothing() {
    let (engine, store, agents) = engine_over_fixture();
    let edits = vec![
        make_edit(&agents[0], "Sam", "0711 000 111"),
        make_edit(&agents[1], "sam", "0711 000 222"),
    ];

    let err = engine.submit_batch(&edits, "admin@renta", Utc::now());
    let rejections = match err {
        Err(SubmitError::Rejected { rejections }) => rejections,
        other => panic!("expected rejection, got {:?}", other),
    };
    assert_eq!(rejections.len(), 2);

    // Nothing was touched in any of the five collections.
    assert_eq!(store.history_count(), 0);
    for agent in &agents {
        let live = store.agent_get(agent.agent_id).unwrap().unwrap();
        assert_eq!(&live, agent);
        assert_eq!(store.tenant_query_by_agent_phone(&agent.phone).unwrap().len(), 2);
        assert_eq!(store.earning_query_by_agent_phone(&agent.phone).unwrap().len(), 2);
        assert_eq!(store.activity_query_by_agent_phone(&agent.phone).unwrap().len(), 2);
    }
}

#[test]
fn persisted_conflict_blocks_the_clean_edit_too() {
    let (engine, store, agents) = engine_over_fixture();
    // Edit A collides with Jane's phone; edit B is clean.
    let edits = vec![
        make_edit(&agents[0], "Johnny", &agents[1].phone),
        make_edit(&agents[2], "Kimani", "0722 123 456"),
    ];

    let err = engine.submit_batch(&edits, "admin@renta", Utc::now());
    let rejections = match err {
        Err(SubmitError::Rejected { rejections }) => rejections,
        other => panic!("expected rejection, got {:?}", other),
    };
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].agent_id, agents[0].agent_id);
    assert!(rejections[0].reasons[0].contains("Jane"));

    // The clean edit was not applied either.
    let kim = store.agent_get(agents[2].agent_id).unwrap().unwrap();
    assert_eq!(kim.name, "Kim");
    assert_eq!(store.history_count(), 0);
}

#[test]
fn rename_propagates_to_every_copy_with_phone_unchanged() {
    let (engine, store, agents) = engine_over_fixture();
    let john = &agents[0];

    let receipt = engine
        .submit_batch(
            &[make_edit(john, "JOHNNY", &john.phone)],
            "admin@renta",
            Utc::now(),
        )
        .unwrap();
    assert_eq!(receipt.applied_count, 1);

    let live = store.agent_get(john.agent_id).unwrap().unwrap();
    assert_eq!(live.name, "JOHNNY");
    assert_eq!(live.phone, john.phone);

    let tenants = store.tenant_query_by_agent_phone(&john.phone).unwrap();
    assert_eq!(tenants.len(), 2);
    for tenant in tenants {
        assert_eq!(tenant.agent_name, "JOHNNY");
        assert_eq!(tenant.agent_phone, john.phone);
    }
    for earning in store.earning_query_by_agent_phone(&john.phone).unwrap() {
        assert_eq!(earning.agent_name, "JOHNNY");
    }
    for activity in store.activity_query_by_agent_phone(&john.phone).unwrap() {
        assert_eq!(activity.agent_name, "JOHNNY");
    }
}

#[test]
fn partial_propagation_keeps_history_and_is_discoverable_as_drift() {
    let (engine, store, agents) = engine_over_fixture();
    let john = &agents[0];

    // Fail after the history row and agent profile are written.
    store.inject_failure(FailurePoint::TenantRetag);
    let err = engine.submit_batch(
        &[make_edit(john, "Johnny", "0712 888 999")],
        "admin@renta",
        Utc::now(),
    );
    let batch_id = match err {
        Err(SubmitError::PropagationFailed {
            batch_id,
            applied,
            total,
            ..
        }) => {
            assert_eq!(applied, 0);
            assert_eq!(total, 1);
            batch_id
        }
        other => panic!("expected propagation failure, got {:?}", other),
    };

    // The intent survived: the history row is readable.
    let records = store.history_list_batch(batch_id).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].new_name, "Johnny");

    // Copies still hold the old phone, which no live agent carries now.
    let report = engine.drift_report(Utc::now()).unwrap();
    assert!(!report.is_clean());
    assert!(report
        .entries
        .iter()
        .any(|e| e.kind == DriftKind::Orphaned && e.agent_phone == john.phone));

    let snapshot = engine.metrics();
    assert_eq!(snapshot.propagation_failures, 1);
    assert_eq!(snapshot.batches_submitted, 0);
}

#[test]
fn undo_reverts_copies_by_current_phone_value() {
    let (engine, store, agents) = engine_over_fixture();
    let john = &agents[0];
    let now = Utc::now();

    let receipt = engine
        .submit_batch(
            &[make_edit(john, "Johnny", "0712 888 999")],
            "admin@renta",
            now,
        )
        .unwrap();

    // Copies now carry the new phone; no stored link except that value.
    assert!(store.tenant_query_by_agent_phone(&john.phone).unwrap().is_empty());

    let undone = engine.undo_batch(receipt.batch_id, now + Duration::hours(1)).unwrap();
    assert_eq!(undone.reverted_count, 1);

    let live = store.agent_get(john.agent_id).unwrap().unwrap();
    assert_eq!(live.name, john.name);
    assert_eq!(live.phone, john.phone);
    let tenants = store.tenant_query_by_agent_phone(&john.phone).unwrap();
    assert_eq!(tenants.len(), 2);
    for tenant in tenants {
        assert_eq!(tenant.agent_name, john.name);
    }
}

#[test]
fn round_trip_restores_pre_edit_state_and_empties_the_undo_list() {
    let (engine, store, agents) = engine_over_fixture();
    let now = Utc::now();

    let before_agents: Vec<_> = agents
        .iter()
        .map(|a| store.agent_get(a.agent_id).unwrap().unwrap())
        .collect();

    let edits = vec![
        make_edit(&agents[0], "Johnny", "0712 000 001"),
        make_edit(&agents[1], "Janet", "0712 000 002"),
    ];
    let receipt = engine.submit_batch(&edits, "admin@renta", now).unwrap();
    assert_eq!(receipt.applied_count, 2);

    let listed = engine.list_undoable_batches(now).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].agent_count, 2);
    assert!(!listed[0].expired);
    assert_eq!(listed[0].hours_remaining, 24);

    engine.undo_batch(receipt.batch_id, now + Duration::hours(2)).unwrap();

    for before in &before_agents {
        let live = store.agent_get(before.agent_id).unwrap().unwrap();
        assert_eq!(&live, before);
        assert_eq!(store.tenant_query_by_agent_phone(&before.phone).unwrap().len(), 2);
        assert_eq!(store.earning_query_by_agent_phone(&before.phone).unwrap().len(), 2);
        assert_eq!(store.activity_query_by_agent_phone(&before.phone).unwrap().len(), 2);
    }
    assert!(engine
        .list_undoable_batches(now + Duration::hours(2))
        .unwrap()
        .is_empty());

    // The forensic trail survives the undo and serializes for reporting.
    let history = engine.export_history().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r.undone_at.is_some()));
    let exported = serde_json::to_string(&history).unwrap();
    assert!(exported.contains("Johnny"));
    assert!(exported.contains(&agents[0].name));
}

#[test]
fn expired_batches_drop_off_the_list_and_reject_undo() {
    let (engine, _, agents) = engine_over_fixture();
    let submitted_at = Utc::now() - Duration::hours(25);

    let receipt = engine
        .submit_batch(
            &[make_edit(&agents[0], "Johnny", "0712 000 001")],
            "admin@renta",
            submitted_at,
        )
        .unwrap();

    let now = Utc::now();
    assert!(engine.list_undoable_batches(now).unwrap().is_empty());
    assert!(matches!(
        engine.undo_batch(receipt.batch_id, now),
        Err(UndoError::WindowExpired { .. })
    ));
    // The rejection is derived, not stored: the history row is untouched.
    let history = engine.export_history().unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].undone_at.is_none());
}

#[test]
fn configured_window_drives_expiry_classification() {
    let (store, agents) = fixture_store();
    let engine = EditEngine::with_config(
        Arc::new(store),
        renta_core::EngineConfig {
            undo_window_hours: 1,
            conflict_retry: 1,
        },
    );
    let now = Utc::now();

    let receipt = engine
        .submit_batch(
            &[make_edit(&agents[0], "Johnny", "0712 000 001")],
            "admin@renta",
            now - Duration::minutes(90),
        )
        .unwrap();

    // 90 minutes old is inside the default 24h window but outside this
    // engine's 1h window.
    assert!(engine.list_undoable_batches(now).unwrap().is_empty());
    assert!(matches!(
        engine.undo_batch(receipt.batch_id, now),
        Err(UndoError::WindowExpired { .. })
    ));
}

#[test]
fn metrics_counters_track_the_flows() {
    let (engine, _, agents) = engine_over_fixture();
    let now = Utc::now();

    let receipt = engine
        .submit_batch(
            &[make_edit(&agents[0], "Johnny", "0712 000 001")],
            "admin@renta",
            now,
        )
        .unwrap();
    let _ = engine.submit_batch(
        &[make_edit(&agents[1], "", "0712 000 002")],
        "admin@renta",
        now,
    );
    engine.undo_batch(receipt.batch_id, now).unwrap();
    let _ = engine.undo_batch(receipt.batch_id, now);

    let snapshot = engine.metrics();
    assert_eq!(snapshot.batches_submitted, 1);
    assert_eq!(snapshot.batches_rejected, 1);
    assert_eq!(snapshot.edits_applied, 1);
    assert_eq!(snapshot.undos_completed, 1);
    assert_eq!(snapshot.undos_rejected, 1);
}
