use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use engine::store::{RecurringPatch, RecurringStore, ScheduleAdvance, StoreError};
use engine::{Account, Engine, MemoryStore, Recurring, RecurringKind};
use startup::{Notifier, RunState, StartupError, StartupSettings, Supervisor};

const TENANT: &str = "tenant-1";
const USER: &str = "alice";

/// Fails `find_due` for the first `fail_until` calls, then delegates.
struct FlakyRecurringStore {
    inner: Arc<MemoryStore>,
    fail_until: usize,
    calls: AtomicUsize,
}

impl FlakyRecurringStore {
    fn new(inner: Arc<MemoryStore>, fail_until: usize) -> Self {
        Self {
            inner,
            fail_until,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecurringStore for FlakyRecurringStore {
    async fn find_due(
        &self,
        tenant_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Recurring>, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_until {
            return Err(StoreError::Backend("database briefly unavailable".into()));
        }
        self.inner.find_due(tenant_id, as_of).await
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<Recurring>, StoreError> {
        self.inner.find_by_id(id, tenant_id).await
    }

    async fn advance_schedule(&self, updates: &[ScheduleAdvance]) -> Result<(), StoreError> {
        self.inner.advance_schedule(updates).await
    }

    async fn increment_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.inner.increment_failed_attempts(ids).await
    }

    async fn reset_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.inner.reset_failed_attempts(ids).await
    }

    async fn set_auto_apply_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        tenant_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.inner.set_auto_apply_enabled(id, enabled, tenant_id).await
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RecurringPatch,
        tenant_id: &str,
    ) -> Result<Option<Recurring>, StoreError> {
        self.inner.update(id, patch, tenant_id).await
    }
}

/// Never answers `find_due`; forces the per-attempt deadline to fire.
struct HangingRecurringStore;

#[async_trait]
impl RecurringStore for HangingRecurringStore {
    async fn find_due(
        &self,
        _tenant_id: &str,
        _as_of: DateTime<Utc>,
    ) -> Result<Vec<Recurring>, StoreError> {
        tokio::time::sleep(Duration::from_secs(600)).await;
        Ok(Vec::new())
    }

    async fn find_by_id(
        &self,
        _id: Uuid,
        _tenant_id: &str,
    ) -> Result<Option<Recurring>, StoreError> {
        Ok(None)
    }

    async fn advance_schedule(&self, _updates: &[ScheduleAdvance]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn increment_failed_attempts(&self, _ids: &[Uuid]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn reset_failed_attempts(&self, _ids: &[Uuid]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn set_auto_apply_enabled(
        &self,
        _id: Uuid,
        _enabled: bool,
        _tenant_id: Option<&str>,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn update(
        &self,
        _id: Uuid,
        _patch: RecurringPatch,
        _tenant_id: &str,
    ) -> Result<Option<Recurring>, StoreError> {
        Ok(None)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<(&'static str, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_success(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("success", message.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("error", message.to_string()));
    }

    fn show_info(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(("info", message.to_string()));
    }
}

fn fast_settings() -> StartupSettings {
    StartupSettings {
        delay_ms: 0,
        retry_delay_ms: 5,
        ..StartupSettings::default()
    }
}

fn engine_over(recurring: Arc<dyn RecurringStore>, mem: Arc<MemoryStore>) -> Engine {
    Engine::builder()
        .recurring_store(recurring)
        .transaction_store(mem.clone())
        .account_store(mem)
        .build()
        .unwrap()
}

fn supervisor_with(
    engine: Engine,
    settings: StartupSettings,
) -> (Supervisor, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let supervisor = Supervisor::new(engine, notifier.clone(), settings, TENANT, USER);
    (supervisor, notifier)
}

#[tokio::test]
async fn retries_transient_failures_until_success() {
    let mem = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyRecurringStore::new(mem.clone(), 2));
    let engine = engine_over(flaky.clone(), mem);

    let settings = StartupSettings {
        max_retries: 2,
        ..fast_settings()
    };
    let (supervisor, _) = supervisor_with(engine, settings);

    let result = supervisor
        .initialize_on_startup()
        .await
        .unwrap()
        .expect("enabled check must produce a result");

    assert!(result.success);
    assert_eq!(result.retry_count, 2);
    assert_eq!(flaky.calls(), 3);
    assert_eq!(supervisor.state(), RunState::Succeeded);
}

#[tokio::test]
async fn disabled_check_never_touches_the_engine() {
    let mem = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyRecurringStore::new(mem.clone(), 0));
    let engine = engine_over(flaky.clone(), mem);

    let settings = StartupSettings {
        enabled: false,
        ..fast_settings()
    };
    let (supervisor, notifier) = supervisor_with(engine, settings);

    let result = supervisor.initialize_on_startup().await.unwrap();

    assert!(result.is_none());
    assert_eq!(flaky.calls(), 0);
    assert!(notifier.messages().is_empty());
    assert_eq!(supervisor.state(), RunState::Idle);
}

#[tokio::test]
async fn exhaustion_resolves_quietly_and_notifies_once() {
    let mem = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyRecurringStore::new(mem.clone(), usize::MAX));
    let engine = engine_over(flaky.clone(), mem);

    let settings = StartupSettings {
        max_retries: 1,
        ..fast_settings()
    };
    let (supervisor, notifier) = supervisor_with(engine, settings);

    let result = supervisor
        .initialize_on_startup()
        .await
        .unwrap()
        .expect("exhaustion with skip_on_error still yields a result");

    assert!(!result.success);
    assert_eq!(flaky.calls(), 2);
    assert!(
        result
            .error
            .as_deref()
            .unwrap()
            .contains("database briefly unavailable")
    );

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "error");
    assert!(messages[0].1.contains("2 attempt(s)"));
    assert_eq!(supervisor.state(), RunState::Exhausted);
}

#[tokio::test]
async fn exhaustion_stays_silent_when_error_notifications_are_off() {
    let mem = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyRecurringStore::new(mem.clone(), usize::MAX));
    let engine = engine_over(flaky, mem);

    let settings = StartupSettings {
        max_retries: 0,
        notify_on_error: false,
        ..fast_settings()
    };
    let (supervisor, notifier) = supervisor_with(engine, settings);

    let result = supervisor.initialize_on_startup().await.unwrap().unwrap();

    assert!(!result.success);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn exhaustion_escalates_without_skip_on_error() {
    let mem = Arc::new(MemoryStore::new());
    let flaky = Arc::new(FlakyRecurringStore::new(mem.clone(), usize::MAX));
    let engine = engine_over(flaky, mem);

    let settings = StartupSettings {
        max_retries: 1,
        skip_on_error: false,
        ..fast_settings()
    };
    let (supervisor, _) = supervisor_with(engine, settings);

    let err = supervisor.initialize_on_startup().await.unwrap_err();

    match err {
        StartupError::ExhaustedRetries {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 2);
            assert!(last_error.contains("database briefly unavailable"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn manual_trigger_fails_fast_while_a_run_is_scheduled() {
    let mem = Arc::new(MemoryStore::new());
    let engine = engine_over(mem.clone(), mem);

    let settings = StartupSettings {
        delay_ms: 200,
        ..fast_settings()
    };
    let (supervisor, _) = supervisor_with(engine, settings);
    let supervisor = Arc::new(supervisor);

    let background = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.initialize_on_startup().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = supervisor.trigger_manual_check().await.unwrap_err();
    assert!(matches!(err, StartupError::AlreadyRunning));

    let delayed = background.await.unwrap().unwrap().unwrap();
    assert!(delayed.success);
}

#[tokio::test]
async fn concurrent_initialize_reuses_the_last_result() {
    let mem = Arc::new(MemoryStore::new());
    let engine = engine_over(mem.clone(), mem);

    let settings = StartupSettings {
        delay_ms: 200,
        ..fast_settings()
    };
    let (supervisor, _) = supervisor_with(engine, settings);
    let supervisor = Arc::new(supervisor);

    let first = supervisor.trigger_manual_check().await.unwrap();
    assert!(first.success);

    let background = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.initialize_on_startup().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let reused = supervisor
        .initialize_on_startup()
        .await
        .unwrap()
        .expect("a stored result exists from the manual run");
    assert!(reused.success);
    assert_eq!(reused.timestamp, first.timestamp);

    background.await.unwrap().unwrap();
}

#[tokio::test]
async fn hung_engine_call_hits_the_attempt_deadline() {
    let mem = Arc::new(MemoryStore::new());
    let engine = engine_over(Arc::new(HangingRecurringStore), mem);

    let settings = StartupSettings {
        max_retries: 0,
        timeout_ms: 50,
        ..fast_settings()
    };
    let (supervisor, _) = supervisor_with(engine, settings);

    let result = supervisor.initialize_on_startup().await.unwrap().unwrap();

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("timed out after 50ms"));
}

#[tokio::test]
async fn successful_run_summarizes_what_was_applied() {
    let mem = Arc::new(MemoryStore::new());
    let account = Account::new(TENANT, "Checking", 10_000);
    let source = account.id;
    mem.insert_account(account);
    mem.insert_recurring(
        Recurring::new(
            TENANT,
            "Salary",
            RecurringKind::Standard,
            1,
            Utc::now() - chrono::Duration::days(1),
        )
        .source_account(source)
        .amount(500_000),
    );
    mem.insert_recurring(
        Recurring::new(
            TENANT,
            "Club fee",
            RecurringKind::Standard,
            1,
            Utc::now() - chrono::Duration::days(1),
        )
        .source_account(source)
        .amount(2_000)
        .auto_apply(false),
    );

    let engine = engine_over(mem.clone(), mem);
    let (supervisor, notifier) = supervisor_with(engine, fast_settings());

    let result = supervisor.initialize_on_startup().await.unwrap().unwrap();

    assert!(result.success);
    let summary = result.result.unwrap();
    assert_eq!(summary.applied_count, 1);
    assert_eq!(summary.pending_count, 1);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].0, "success");
    assert!(messages[0].1.contains("Applied 1"));
    assert_eq!(messages[1].0, "info");
    assert!(messages[1].1.contains("manual review"));
}
