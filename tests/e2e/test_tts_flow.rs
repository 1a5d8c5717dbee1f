use crate::helpers::{failed, fast_policy, running, success, ApiCall, MockCamb};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use voiceclip_bot::domain::tts::{TtsService, TtsServiceApi};
use voiceclip_bot::error::AppError;
use voiceclip_bot::infrastructure::camb::TtsRequest;

fn request() -> TtsRequest {
    TtsRequest {
        text: "Hello world".to_string(),
        voice_id: 7,
        language: 2,
        gender: 1,
        age: 25,
    }
}

async fn drain(mut stream: voiceclip_bot::infrastructure::camb::AudioStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

#[tokio::test]
async fn test_success_after_k_checks_makes_exactly_k_status_calls_in_order() {
    let camb = Arc::new(MockCamb::with_statuses(vec![
        running(),
        running(),
        success("r1"),
    ]));
    let service = TtsService::new(camb.clone(), fast_policy(10));

    let task_id = service.submit(&request()).await.unwrap();
    assert_eq!(task_id, "t1");

    let stream = service.await_result(&task_id).await.unwrap();
    let audio = drain(stream).await;
    assert_eq!(audio, camb.audio);

    // One submission, exactly three status checks, one result fetch,
    // strictly in that order.
    assert_eq!(
        camb.recorded_calls(),
        vec![
            ApiCall::CreateTts(request()),
            ApiCall::GetStatus("t1".to_string()),
            ApiCall::GetStatus("t1".to_string()),
            ApiCall::GetStatus("t1".to_string()),
            ApiCall::GetResult("r1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_immediate_success_polls_once() {
    let camb = Arc::new(MockCamb::with_statuses(vec![success("r9")]));
    let service = TtsService::new(camb.clone(), fast_policy(10));

    let stream = service.await_result("t1").await.unwrap();
    drain(stream).await;

    assert_eq!(camb.status_call_count(), 1);
}

#[tokio::test]
async fn test_never_succeeding_task_times_out_at_the_attempt_bound() {
    // The scripted sequence is empty, so every status check reports RUNNING.
    let camb = Arc::new(MockCamb::default());
    let service = TtsService::new(camb.clone(), fast_policy(5));

    let err = service.await_result("t1").await.err().unwrap();
    assert!(matches!(err, AppError::TaskTimeout { attempts: 5 }));
    assert_eq!(camb.status_call_count(), 5);

    // The result must never have been fetched.
    assert!(!camb
        .recorded_calls()
        .iter()
        .any(|c| matches!(c, ApiCall::GetResult(_))));
}

#[tokio::test]
async fn test_terminal_failure_status_fails_fast() {
    let camb = Arc::new(MockCamb::with_statuses(vec![running(), failed()]));
    let service = TtsService::new(camb.clone(), fast_policy(50));

    let err = service.await_result("t1").await.err().unwrap();
    assert!(matches!(err, AppError::TaskFailed { .. }));

    // Failed on the second check; the attempt budget was not burned.
    assert_eq!(camb.status_call_count(), 2);
}

#[tokio::test]
async fn test_success_without_run_id_is_an_error() {
    let status = serde_json::from_str(r#"{"status": "SUCCESS"}"#).unwrap();
    let camb = Arc::new(MockCamb::with_statuses(vec![status]));
    let service = TtsService::new(camb.clone(), fast_policy(10));

    let err = service.await_result("t1").await.err().unwrap();
    assert!(matches!(err, AppError::Internal(_)));
}

#[tokio::test]
async fn test_submission_failure_propagates_without_status_calls() {
    let camb = Arc::new(MockCamb {
        fail_submit: true,
        ..MockCamb::default()
    });
    let service = TtsService::new(camb.clone(), fast_policy(10));

    let err = service.submit(&request()).await.unwrap_err();
    assert!(matches!(err, AppError::RemoteService { status: 402, .. }));
    assert_eq!(camb.status_call_count(), 0);
}
