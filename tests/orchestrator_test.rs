//! End-to-end tests for the operation orchestrator
//!
//! These tests drive `OperationOrchestrator` with a real `DacClient` against a
//! mockito server and verify that:
//! - Completed and Failed statuses end the run with the right outcome
//! - Dry runs never reach the service
//! - Transport failures abort without further polling
//! - Non-blocking imports return after submission while exports keep polling
//! - Shutdown signals stop polling

use mockito::{Matcher, Mock, Server, ServerGuard};
use sqlport::adapters::dac::models::{request_body, DAC_NAMESPACE};
use sqlport::adapters::dac::DacClient;
use sqlport::config::{secret_string, ServiceConfig};
use sqlport::core::operation::{
    OperationMode, OperationOrchestrator, PollSettings, ProgressCallback, ProgressEvent,
};
use sqlport::domain::{
    AbortCause, BlobTarget, ConnectionInfo, ImportSettings, OperationKind, OperationRequest,
    OperationResult, PollError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

const BLOB_URI: &str = "https://blob/db.bacpac";

fn settings(max_retries: usize) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        max_retries,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_multiplier: 2.0,
    }
}

fn orchestrator(
    server: &ServerGuard,
    settings: PollSettings,
    shutdown: watch::Receiver<bool>,
) -> OperationOrchestrator {
    let client = Arc::new(
        DacClient::new(&ServiceConfig {
            endpoint: format!("{}/DACWebService.svc", server.url()),
            timeout_seconds: 5,
            ..Default::default()
        })
        .unwrap(),
    );
    OperationOrchestrator::new(client.clone(), client, settings, shutdown)
}

fn connection() -> ConnectionInfo {
    ConnectionInfo::new(
        "srv.database.windows.net",
        "db",
        "admin",
        secret_string("pw".to_string()),
    )
}

fn export_request() -> OperationRequest {
    OperationRequest::export(
        connection(),
        BlobTarget::new(secret_string("key".to_string()), "https://blob/{0}.bacpac"),
    )
}

fn import_request() -> OperationRequest {
    OperationRequest::import(
        connection(),
        BlobTarget::new(secret_string("key".to_string()), BLOB_URI),
        ImportSettings::default(),
    )
}

fn status_body(status: &str, error: Option<&str>) -> String {
    let error = error
        .map(|message| format!("<ErrorMessage>{message}</ErrorMessage>"))
        .unwrap_or_default();
    format!(
        r#"<ArrayOfStatusInfo xmlns="{DAC_NAMESPACE}"><StatusInfo><BlobUri>{BLOB_URI}</BlobUri><DatabaseName>db</DatabaseName>{error}<Status>{status}</Status></StatusInfo></ArrayOfStatusInfo>"#
    )
}

async fn mock_submit(server: &mut ServerGuard, endpoint: &str, id: &str) -> Mock {
    server
        .mock("POST", format!("/DACWebService.svc/{endpoint}").as_str())
        .with_status(200)
        .with_body(format!(
            r#"<guid xmlns="http://schemas.microsoft.com/2003/10/Serialization/">{id}</guid>"#
        ))
        .create_async()
        .await
}

async fn mock_status(
    server: &mut ServerGuard,
    status: &str,
    error: Option<&str>,
    hits: usize,
) -> Mock {
    server
        .mock("GET", "/DACWebService.svc/Status")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(status_body(status, error))
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_export_in_progress_then_completed() {
    let mut server = Server::new_async().await;
    let submit = mock_submit(&mut server, "Export", "req-1").await;
    let in_progress = mock_status(&mut server, "InProgress", None, 1).await;
    let completed = mock_status(&mut server, "Completed", None, 1).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&export_request(), OperationMode::Blocking)
        .await;

    assert_eq!(result, OperationResult::Success(Some(BLOB_URI.to_string())));
    submit.assert_async().await;
    in_progress.assert_async().await;
    completed.assert_async().await;
}

#[tokio::test]
async fn test_export_failed_reports_error_message() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    let failed = mock_status(&mut server, "Failed", Some("quota exceeded"), 1).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&export_request(), OperationMode::Blocking)
        .await;

    assert_eq!(result, OperationResult::Failure("quota exceeded".to_string()));
    failed.assert_async().await;
}

#[tokio::test]
async fn test_dry_run_export_never_contacts_service() {
    let mut server = Server::new_async().await;
    let post = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let get = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let request = export_request();

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .with_dry_run(true)
        .run(&request, OperationMode::Blocking)
        .await;

    assert_eq!(result, OperationResult::Preview(request_body(&request)));
    post.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_transport_failure_on_second_poll_aborts() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    let in_progress = mock_status(&mut server, "InProgress", None, 1).await;
    let unavailable = server
        .mock("GET", "/DACWebService.svc/Status")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let completed = mock_status(&mut server, "Completed", None, 0).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&export_request(), OperationMode::Blocking)
        .await;

    assert!(matches!(
        result,
        OperationResult::Aborted(AbortCause::Poll(PollError::Transport(_)))
    ));
    in_progress.assert_async().await;
    unavailable.assert_async().await;
    completed.assert_async().await;
}

#[tokio::test]
async fn test_transport_failure_retried_when_configured() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    let unavailable = server
        .mock("GET", "/DACWebService.svc/Status")
        .match_query(Matcher::Any)
        .with_status(503)
        .expect(1)
        .create_async()
        .await;
    let completed = mock_status(&mut server, "Completed", None, 1).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(2), rx)
        .run(&export_request(), OperationMode::Blocking)
        .await;

    assert_eq!(result, OperationResult::Success(Some(BLOB_URI.to_string())));
    unavailable.assert_async().await;
    completed.assert_async().await;
}

#[tokio::test]
async fn test_rejected_submission_never_polls() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/DACWebService.svc/Export")
        .with_status(400)
        .with_body("Invalid credentials")
        .create_async()
        .await;
    let status = mock_status(&mut server, "Completed", None, 0).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&export_request(), OperationMode::Blocking)
        .await;

    match result {
        OperationResult::Aborted(AbortCause::Submission(err)) => {
            assert!(err.to_string().contains("400"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    status.assert_async().await;
}

#[tokio::test]
async fn test_non_blocking_import_returns_after_submission() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Import", "imp-1").await;
    let status = mock_status(&mut server, "Completed", None, 0).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&import_request(), OperationMode::NonBlocking)
        .await;

    match result {
        OperationResult::Submitted(handle) => {
            assert_eq!(handle.as_str(), "imp-1");
            assert_eq!(handle.kind(), OperationKind::Import);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    status.assert_async().await;
}

#[tokio::test]
async fn test_non_blocking_export_still_polls() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    let status = mock_status(&mut server, "Completed", None, 1).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&export_request(), OperationMode::NonBlocking)
        .await;

    assert!(matches!(result, OperationResult::Success(Some(_))));
    status.assert_async().await;
}

#[tokio::test]
async fn test_blocking_import_completes_with_database_name() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Import", "imp-1").await;
    mock_status(&mut server, "Running, Progress = 50%", None, 1).await;
    mock_status(&mut server, "Completed", None, 1).await;

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .run(&import_request(), OperationMode::Blocking)
        .await;

    assert_eq!(result, OperationResult::Success(Some("db".to_string())));
}

#[tokio::test]
async fn test_shutdown_stops_polling() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    let in_progress = mock_status(&mut server, "InProgress", None, 1).await;

    let (tx, rx) = watch::channel(false);
    let slow = PollSettings {
        interval: Duration::from_secs(60),
        ..settings(0)
    };

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(true);
    });

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator(&server, slow, rx).run(&export_request(), OperationMode::Blocking),
    )
    .await
    .expect("run should stop once shutdown is signalled");

    assert_eq!(result, OperationResult::Aborted(AbortCause::Cancelled));
    in_progress.assert_async().await;
}

#[tokio::test]
async fn test_progress_events_deduplicate_status() {
    let mut server = Server::new_async().await;
    mock_submit(&mut server, "Export", "req-1").await;
    mock_status(&mut server, "Pending", None, 2).await;
    mock_status(&mut server, "Running, Progress = 40%", None, 2).await;
    mock_status(&mut server, "Completed", None, 1).await;

    let events = Arc::new(Mutex::new(Vec::<ProgressEvent>::new()));
    let sink = events.clone();
    let callback: ProgressCallback =
        Box::new(move |event: ProgressEvent| sink.lock().unwrap().push(event));

    let (_tx, rx) = watch::channel(false);
    let result = orchestrator(&server, settings(0), rx)
        .with_progress(callback)
        .run(&export_request(), OperationMode::Blocking)
        .await;
    assert!(result.is_ok());

    let statuses: Vec<String> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::StatusChanged { status, .. } => Some(status.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec!["Pending", "Running, Progress = 40%", "Completed"]
    );
}
