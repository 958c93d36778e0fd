use std::sync::Arc;

use super::common::*;
use crate::workforce::domain::EmployeeProfile;
use crate::workforce::predictions::{BatchError, BatchStatus, Endpoint, PredictionBatch};

#[tokio::test]
async fn calls_run_in_fixed_order() {
    let predictions = Arc::new(FakePredictions::default());
    let batch = PredictionBatch::new(predictions.clone());

    let result = batch
        .run(&EmployeeProfile::default())
        .await
        .expect("batch succeeds");

    assert_eq!(result.performance.rating, 4);
    assert_eq!(
        predictions.calls(),
        vec![Endpoint::Attrition, Endpoint::Performance, Endpoint::Retention]
    );
    assert_eq!(batch.status(), BatchStatus::Idle);
}

#[tokio::test]
async fn first_failure_aborts_remaining_calls() {
    let predictions = Arc::new(FakePredictions::failing_on(Endpoint::Performance));
    let batch = PredictionBatch::new(predictions.clone());

    match batch.run(&EmployeeProfile::default()).await {
        Err(BatchError::Service(err)) => {
            assert_eq!(err.upstream_status(), Some(503));
            assert_eq!(
                err.to_string(),
                "performance service returned 503 Service Unavailable"
            );
        }
        other => panic!("expected service failure, got {other:?}"),
    }
    assert_eq!(
        predictions.calls(),
        vec![Endpoint::Attrition, Endpoint::Performance]
    );
    assert_eq!(batch.status(), BatchStatus::Idle);
}

#[tokio::test]
async fn invalid_profile_never_reaches_the_network() {
    let predictions = Arc::new(FakePredictions::default());
    let batch = PredictionBatch::new(predictions.clone());
    let profile = EmployeeProfile {
        monthly_income: 0,
        ..EmployeeProfile::default()
    };

    match batch.run(&profile).await {
        Err(BatchError::Validation(err)) => {
            assert_eq!(err.messages, vec!["Monthly Income must be greater than 0."])
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(predictions.calls().is_empty());
}

#[tokio::test]
async fn second_submission_while_pending_is_rejected() {
    let gate = Arc::new(Gate::default());
    let predictions = Arc::new(FakePredictions::gated(gate.clone()));
    let batch = Arc::new(PredictionBatch::new(predictions.clone()));

    let running = {
        let batch = batch.clone();
        tokio::spawn(async move { batch.run(&EmployeeProfile::default()).await })
    };
    gate.entered.notified().await;
    assert_eq!(batch.status(), BatchStatus::Pending);

    let upload = upload();
    assert!(matches!(
        batch.run_bulk(&upload).await,
        Err(BatchError::Busy)
    ));

    gate.release.notify_one();
    for _ in 0..2 {
        gate.entered.notified().await;
        gate.release.notify_one();
    }
    let first = running.await.expect("task joins");
    assert!(first.is_ok());
    assert_eq!(batch.status(), BatchStatus::Idle);
}

#[tokio::test]
async fn bulk_calls_run_in_fixed_order() {
    let predictions = Arc::new(FakePredictions::default());
    let batch = PredictionBatch::new(predictions.clone());

    let bulk = batch.run_bulk(&upload()).await.expect("bulk succeeds");

    assert_eq!(bulk.len(), 3);
    assert!(bulk.profiles.is_empty());
    assert_eq!(
        predictions.calls(),
        vec![
            Endpoint::AttritionBulk,
            Endpoint::PerformanceBulk,
            Endpoint::RetentionBulk
        ]
    );
}
