//! Attempt loop integration tests
//!
//! Exercises the public API end to end:
//! - Policies loaded from YAML feeding the attempt loop
//! - `io::Error` operations with timeouts surfacing as `TimedOut`
//! - Tracing observer output under a test subscriber

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use attempt_core::retry::{
    attempt_with_retry, AttemptConfig, AttemptExecutorBuilder, Hook, StatsObserver,
    TracingObserver,
};
use attempt_core::{PolicyLoader, TimeoutSettings};
use camino::Utf8PathBuf;
use serial_test::serial;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("attempt_core=trace")
        .with_test_writer()
        .try_init();
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_policy_file_drives_attempt_loop() {
    init_tracing();

    let temp = TempDir::new().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("attempt.yaml")).unwrap();
    std::fs::write(
        &path,
        r#"
total-number-of-attempts: 4
attempt-timeout:
  millis: 250
"#,
    )
    .unwrap();

    let policy = PolicyLoader::new().with_file(path).load().unwrap();
    assert_eq!(policy.total_number_of_attempts, 4);

    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let config = AttemptConfig::from_policy(&policy, move || {
        let calls = calls_clone.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
            Ok::<(), io::Error>(())
        }
    });

    let err = attempt_with_retry(config).await.unwrap_err();

    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(err.into_source().kind(), io::ErrorKind::TimedOut);
}

#[tokio::test]
async fn test_tracing_observer_full_run() {
    init_tracing();

    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let result = AttemptExecutorBuilder::new()
        .with_total_attempts(3)
        .with_timeout(TimeoutSettings::from_seconds(5.0))
        .with_observer(TracingObserver::new("integration"))
        .build()
        .execute(move || {
            let calls = calls_clone.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
}

#[tokio::test]
async fn test_hook_failure_is_reported_not_retried() {
    init_tracing();

    let observer = Arc::new(StatsObserver::new());
    let calls = Arc::new(AtomicU32::new(0));
    let calls_clone = calls.clone();

    let err = AttemptExecutorBuilder::new()
        .with_total_attempts(3)
        .with_pre_attempt(Hook::sync(|| {
            Err(io::Error::new(io::ErrorKind::NotConnected, "pool not ready"))
        }))
        .with_observer(observer.clone())
        .build()
        .execute(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, io::Error>(()) }
        })
        .await
        .unwrap_err();

    assert!(err.is_hook_failure());
    assert_eq!(err.to_string(), "pre-attempt hook failed on attempt 1: pool not ready");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(observer.attempt_starts(), 0);
    assert_eq!(observer.hook_failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_error_source_chain() {
    let config = AttemptConfig::new(|| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err::<(), _>(io::Error::other("backend down"))
    })
    .with_total_attempts(2);

    let err = attempt_with_retry(config).await.unwrap_err();

    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "backend down");
    assert!(err.to_string().contains("retry exhausted after 2 attempts"));
}
