//! Test doubles for the relay's collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use roast_relay::{
    app_state::AppState,
    models::job::{Job, JobUpdate},
    models::roast::Notification,
    services::{
        generation::{CreatedJob, GenerationError, GenerationService, RemoteStatus},
        notifier::{Notifier, NotifyError},
        relay::{RelayConfig, RelayService},
        signature::HmacVerifier,
        store::{JobStore, MemoryJobStore, StoreError},
    },
};

use crate::fixtures::{completed_webhook, WEBHOOK_SECRET};

/// How the fake answers `create_job`.
#[derive(Clone)]
pub enum CreateBehavior {
    Accept { job_id: String, status: String },
    Reject(String),
    ServerError,
    Hang,
}

/// How the fake answers `get_job_status`.
#[derive(Clone)]
pub enum StatusBehavior {
    Report(RemoteStatus),
    Unavailable,
    Hang,
}

/// Scripted generation service that counts the calls it receives.
pub struct FakeGenerationService {
    create: Mutex<CreateBehavior>,
    status: Mutex<StatusBehavior>,
    pub create_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl FakeGenerationService {
    pub fn accepting(job_id: &str, status: &str) -> Self {
        Self::new(CreateBehavior::Accept {
            job_id: job_id.to_string(),
            status: status.to_string(),
        })
    }

    pub fn new(create: CreateBehavior) -> Self {
        Self {
            create: Mutex::new(create),
            status: Mutex::new(StatusBehavior::Unavailable),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_status(&self, behavior: StatusBehavior) {
        *self.status.lock().unwrap() = behavior;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

async fn hang() {
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

#[async_trait]
impl GenerationService for FakeGenerationService {
    async fn create_job(&self, _text: &str, _image_url: &str) -> Result<CreatedJob, GenerationError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.create.lock().unwrap().clone();
        match behavior {
            CreateBehavior::Accept { job_id, status } => Ok(CreatedJob {
                job_id,
                status: status.into(),
            }),
            CreateBehavior::Reject(detail) => Err(GenerationError::Rejected { status: 400, detail }),
            CreateBehavior::ServerError => Err(GenerationError::Upstream {
                status: 500,
                detail: "internal error".to_string(),
            }),
            CreateBehavior::Hang => {
                hang().await;
                Err(GenerationError::Timeout)
            }
        }
    }

    async fn get_job_status(&self, _job_id: &str) -> Result<RemoteStatus, GenerationError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.status.lock().unwrap().clone();
        match behavior {
            StatusBehavior::Report(status) => Ok(status),
            StatusBehavior::Unavailable => Err(GenerationError::Upstream {
                status: 503,
                detail: "unavailable".to_string(),
            }),
            StatusBehavior::Hang => {
                hang().await;
                Err(GenerationError::Timeout)
            }
        }
    }
}

/// Generation service whose completion webhook reaches the relay before
/// `create_job` has returned. Status polling always fails.
#[derive(Default)]
pub struct WebhookFirstService {
    pub relay: OnceLock<Arc<RelayService>>,
}

#[async_trait]
impl GenerationService for WebhookFirstService {
    async fn create_job(&self, _text: &str, _image_url: &str) -> Result<CreatedJob, GenerationError> {
        let relay = self.relay.get().expect("relay wired before submit");
        relay
            .handle_webhook(&completed_webhook("j1", "http://x/v.mp4"))
            .await
            .expect("webhook accepted");
        Ok(CreatedJob {
            job_id: "j1".to_string(),
            status: "queued".into(),
        })
    }

    async fn get_job_status(&self, _job_id: &str) -> Result<RemoteStatus, GenerationError> {
        Err(GenerationError::Upstream {
            status: 503,
            detail: "unavailable".to_string(),
        })
    }
}

/// Records every notification; optionally fails each delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, Notification)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), notification.clone()));
        if self.fail {
            Err(NotifyError::Rejected(503))
        } else {
            Ok(())
        }
    }
}

/// Store whose writes always fail; reads are delegated.
#[derive(Default)]
pub struct BrokenWriteStore {
    pub inner: MemoryJobStore,
}

#[async_trait]
impl JobStore for BrokenWriteStore {
    async fn upsert_job(&self, _job: &Job) -> Result<Job, StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    async fn apply_update(&self, _update: &JobUpdate) -> Result<Job, StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        self.inner.get_job(job_id).await
    }

    async fn list_jobs_by_user(&self, user_id: &str) -> Result<Vec<Job>, StoreError> {
        self.inner.list_jobs_by_user(user_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }
}

pub fn fast_config() -> RelayConfig {
    RelayConfig {
        create_timeout: Duration::from_millis(100),
        status_timeout: Duration::from_millis(100),
        notify_timeout: Duration::from_millis(100),
    }
}

/// Relay wired to in-memory collaborators that tests can inspect.
pub struct Harness {
    pub relay: Arc<RelayService>,
    pub store: Arc<MemoryJobStore>,
    pub generation: Arc<FakeGenerationService>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(generation: FakeGenerationService) -> Self {
        Self::with_notifier(generation, RecordingNotifier::default())
    }

    pub fn with_notifier(generation: FakeGenerationService, notifier: RecordingNotifier) -> Self {
        let store = Arc::new(MemoryJobStore::new());
        let generation = Arc::new(generation);
        let notifier = Arc::new(notifier);
        let relay = RelayService::new(
            fast_config(),
            generation.clone(),
            store.clone(),
            notifier.clone(),
        );

        Self {
            relay: Arc::new(relay),
            store,
            generation,
            notifier,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            relay: self.relay.clone(),
            verifier: Arc::new(HmacVerifier::new(WEBHOOK_SECRET)),
        }
    }

    /// Seed a cached job directly.
    pub async fn seed(&self, job: Job) {
        self.store.upsert_job(&job).await.unwrap();
    }
}
