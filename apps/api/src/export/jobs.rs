//! Background export jobs.
//!
//! Each job runs on its own tokio task and owns its snapshot, so the session stays
//! editable while it runs. A session has at most one in-flight job: starting another
//! aborts the previous one and forgets the session's older finished jobs. Finished
//! jobs are dropped once they pass the retention window. Cancelling never touches
//! the document.

use std::collections::HashMap;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::export::{ExportArtifact, ExportBridge, ExportError, ExportFormat, PreparedExport};

#[derive(Debug, Clone)]
enum JobStatus {
    Running,
    Completed(ExportArtifact),
    /// `ExportError::Cancelled` is reported with its own status.
    Failed(ExportError),
}

impl JobStatus {
    fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed(_) => "completed",
            JobStatus::Failed(ExportError::Cancelled) => "cancelled",
            JobStatus::Failed(_) => "failed",
        }
    }
}

/// Job status as returned to clients. Completed jobs carry the file; failed jobs
/// carry the error kind and message.
#[derive(Debug, Clone, Serialize)]
pub struct ExportJobView {
    pub job_id: Uuid,
    pub session_id: Uuid,
    pub format: ExportFormat,
    pub revision: u64,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

struct JobEntry {
    session_id: Uuid,
    format: ExportFormat,
    revision: u64,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    status: JobStatus,
    handle: Option<JoinHandle<()>>,
}

impl JobEntry {
    fn view(&self, job_id: Uuid) -> ExportJobView {
        let mut view = ExportJobView {
            job_id,
            session_id: self.session_id,
            format: self.format,
            revision: self.revision,
            status: self.status.as_str(),
            created_at: self.created_at,
            filename: None,
            content_type: None,
            size: None,
            file_base64: None,
            kind: None,
            message: None,
        };
        match &self.status {
            JobStatus::Completed(artifact) => {
                view.filename = Some(artifact.filename.clone());
                view.content_type = Some(artifact.content_type.clone());
                view.size = Some(artifact.bytes.len());
                view.file_base64 = Some(STANDARD.encode(&artifact.bytes));
            }
            JobStatus::Failed(error) => {
                view.kind = Some(error.kind());
                view.message = Some(error.to_string());
            }
            JobStatus::Running => {}
        }
        view
    }

    fn is_running(&self) -> bool {
        matches!(self.status, JobStatus::Running)
    }

    fn finish(&mut self, status: JobStatus) {
        self.handle = None;
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Aborts the task if it is still running. Returns whether anything was cancelled.
    fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.finish(JobStatus::Failed(ExportError::Cancelled));
        true
    }
}

#[derive(Default)]
struct JobTable {
    jobs: HashMap<Uuid, JobEntry>,
    /// Latest job per session.
    latest: HashMap<Uuid, Uuid>,
}

#[derive(Clone, Default)]
pub struct ExportJobs {
    inner: Arc<Mutex<JobTable>>,
}

impl ExportJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a job for an already validated export, cancelling the session's
    /// previous job if it is still running.
    pub async fn start(
        &self,
        session_id: Uuid,
        bridge: Arc<ExportBridge>,
        prepared: PreparedExport,
    ) -> ExportJobView {
        let job_id = Uuid::new_v4();
        let format = prepared.format;
        let revision = prepared.snapshot.revision;

        let mut table = self.inner.lock().await;
        let before = table.jobs.len();
        table
            .jobs
            .retain(|_, entry| entry.session_id != session_id || entry.is_running());
        let pruned = before - table.jobs.len();
        if pruned > 0 {
            debug!(%session_id, pruned, "dropped finished export jobs");
        }
        if let Some(previous) = table.latest.get(&session_id).copied() {
            if let Some(entry) = table.jobs.get_mut(&previous) {
                if entry.cancel() {
                    info!(%session_id, job_id = %previous, "superseded export job cancelled");
                }
            }
        }

        // The task cannot record its result before this lock is released, so the
        // entry below is always in place first.
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let result = bridge.export_document(prepared).await;
            let mut table = inner.lock().await;
            let Some(entry) = table.jobs.get_mut(&job_id) else {
                return;
            };
            if !entry.is_running() {
                return;
            }
            entry.finish(match result {
                Ok(artifact) => {
                    info!(%job_id, %format, revision, "export job completed");
                    JobStatus::Completed(artifact)
                }
                Err(error) => {
                    warn!(%job_id, %format, kind = error.kind(), "export job failed: {error}");
                    JobStatus::Failed(error)
                }
            });
        });

        let entry = JobEntry {
            session_id,
            format,
            revision,
            created_at: Utc::now(),
            finished_at: None,
            status: JobStatus::Running,
            handle: Some(handle),
        };
        let view = entry.view(job_id);
        table.jobs.insert(job_id, entry);
        table.latest.insert(session_id, job_id);
        info!(%session_id, %job_id, %format, revision, "export job started");
        view
    }

    pub async fn get(&self, job_id: Uuid) -> Option<ExportJobView> {
        let table = self.inner.lock().await;
        table.jobs.get(&job_id).map(|entry| entry.view(job_id))
    }

    /// Cancels a job. Finished jobs are left as they are.
    pub async fn cancel(&self, job_id: Uuid) -> Option<ExportJobView> {
        let mut table = self.inner.lock().await;
        let entry = table.jobs.get_mut(&job_id)?;
        if entry.cancel() {
            info!(%job_id, "export job cancelled");
        }
        Some(entry.view(job_id))
    }

    /// Forgets jobs that finished before `cutoff`, artifacts included. Running jobs
    /// are never touched. Returns how many were dropped.
    pub async fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut table = self.inner.lock().await;
        let before = table.jobs.len();
        table
            .jobs
            .retain(|_, entry| entry.finished_at.map_or(true, |done| done >= cutoff));
        let JobTable { jobs, latest } = &mut *table;
        latest.retain(|_, job_id| jobs.contains_key(job_id));
        before - jobs.len()
    }

    /// Cancels and forgets every job belonging to a session.
    pub async fn remove_session(&self, session_id: Uuid) {
        let mut table = self.inner.lock().await;
        table.latest.remove(&session_id);
        table.jobs.retain(|_, entry| {
            if entry.session_id != session_id {
                return true;
            }
            entry.cancel();
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::PersonalField;
    use crate::document::CVDocument;
    use crate::export::tests::{snapshot, StubBackend};
    use crate::render::dates::DateLocale;
    use std::time::Duration;

    fn bridge(backend: StubBackend) -> Arc<ExportBridge> {
        Arc::new(ExportBridge::new(
            Some(Arc::new(backend)),
            1 << 20,
            DateLocale::En,
        ))
    }

    fn slow_backend() -> StubBackend {
        let mut backend = StubBackend::ok(b"%PDF");
        backend.delay = Some(Duration::from_secs(30));
        backend
    }

    fn pdf(bridge: &ExportBridge) -> PreparedExport {
        let doc = CVDocument::default().set_personal_field(PersonalField::FullName, "John Doe");
        bridge.prepare(snapshot(doc), ExportFormat::Pdf, None).unwrap()
    }

    async fn wait_until_done(jobs: &ExportJobs, job_id: Uuid) -> ExportJobView {
        for _ in 0..200 {
            let view = jobs.get(job_id).await.unwrap();
            if view.status != "running" {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("export job {job_id} never finished");
    }

    #[tokio::test]
    async fn test_job_completes_with_artifact() {
        let jobs = ExportJobs::new();
        let bridge = bridge(StubBackend::ok(b"%PDF"));
        let prepared = pdf(&bridge);
        let started = jobs.start(Uuid::new_v4(), bridge, prepared).await;
        assert_eq!(started.status, "running");
        assert_eq!(started.revision, 3);

        let done = wait_until_done(&jobs, started.job_id).await;
        assert_eq!(done.status, "completed");
        assert_eq!(done.filename.as_deref(), Some("John_Doe_CV.pdf"));
        let expected = STANDARD.encode(b"%PDF");
        assert_eq!(done.file_base64.as_deref(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_failed_job_reports_kind() {
        let jobs = ExportJobs::new();
        let bridge = bridge(StubBackend::failing(ExportError::Transport(
            "timeout".into(),
        )));
        let doc = CVDocument::default();
        let prepared = bridge
            .prepare(snapshot(doc), ExportFormat::Docx, None)
            .unwrap();
        let started = jobs.start(Uuid::new_v4(), bridge, prepared).await;

        let done = wait_until_done(&jobs, started.job_id).await;
        assert_eq!(done.status, "failed");
        assert_eq!(done.kind, Some("transport"));
        assert!(done.file_base64.is_none());
    }

    #[tokio::test]
    async fn test_new_export_cancels_previous_for_same_session() {
        let jobs = ExportJobs::new();
        let bridge = bridge(slow_backend());
        let session = Uuid::new_v4();

        let first = jobs.start(session, bridge.clone(), pdf(&bridge)).await;
        let second = jobs.start(session, bridge.clone(), pdf(&bridge)).await;

        let first = jobs.get(first.job_id).await.unwrap();
        assert_eq!(first.status, "cancelled");
        assert_eq!(first.kind, Some("cancelled"));
        assert_eq!(jobs.get(second.job_id).await.unwrap().status, "running");
    }

    #[tokio::test]
    async fn test_new_export_drops_older_finished_jobs_of_session() {
        let jobs = ExportJobs::new();
        let bridge = bridge(slow_backend());
        let session = Uuid::new_v4();

        let first = jobs.start(session, bridge.clone(), pdf(&bridge)).await;
        let second = jobs.start(session, bridge.clone(), pdf(&bridge)).await;
        let third = jobs.start(session, bridge.clone(), pdf(&bridge)).await;

        assert!(jobs.get(first.job_id).await.is_none());
        assert_eq!(jobs.get(second.job_id).await.unwrap().status, "cancelled");
        assert_eq!(jobs.get(third.job_id).await.unwrap().status, "running");
    }

    #[tokio::test]
    async fn test_other_sessions_are_not_cancelled() {
        let jobs = ExportJobs::new();
        let bridge = bridge(slow_backend());

        let a = jobs.start(Uuid::new_v4(), bridge.clone(), pdf(&bridge)).await;
        jobs.start(Uuid::new_v4(), bridge.clone(), pdf(&bridge)).await;

        assert_eq!(jobs.get(a.job_id).await.unwrap().status, "running");
    }

    #[tokio::test]
    async fn test_explicit_cancel() {
        let jobs = ExportJobs::new();
        let bridge = bridge(slow_backend());
        let prepared = pdf(&bridge);
        let started = jobs.start(Uuid::new_v4(), bridge, prepared).await;

        let cancelled = jobs.cancel(started.job_id).await.unwrap();
        assert_eq!(cancelled.status, "cancelled");
        assert!(jobs.cancel(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_after_completion_keeps_result() {
        let jobs = ExportJobs::new();
        let bridge = bridge(StubBackend::ok(b"%PDF"));
        let prepared = pdf(&bridge);
        let started = jobs.start(Uuid::new_v4(), bridge, prepared).await;
        wait_until_done(&jobs, started.job_id).await;

        let view = jobs.cancel(started.job_id).await.unwrap();
        assert_eq!(view.status, "completed");
    }

    #[tokio::test]
    async fn test_finished_jobs_expire_running_jobs_stay() {
        let jobs = ExportJobs::new();
        let fast = bridge(StubBackend::ok(b"%PDF"));
        let slow = bridge(slow_backend());

        let done = jobs.start(Uuid::new_v4(), fast.clone(), pdf(&fast)).await;
        wait_until_done(&jobs, done.job_id).await;
        let running = jobs.start(Uuid::new_v4(), slow.clone(), pdf(&slow)).await;

        let past = Utc::now() - chrono::Duration::minutes(5);
        assert_eq!(jobs.evict_finished_before(past).await, 0);
        assert!(jobs.get(done.job_id).await.is_some());

        let future = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(jobs.evict_finished_before(future).await, 1);
        assert!(jobs.get(done.job_id).await.is_none());
        assert_eq!(jobs.get(running.job_id).await.unwrap().status, "running");
    }

    #[tokio::test]
    async fn test_remove_session_forgets_jobs() {
        let jobs = ExportJobs::new();
        let bridge = bridge(slow_backend());
        let session = Uuid::new_v4();
        let prepared = pdf(&bridge);
        let started = jobs.start(session, bridge, prepared).await;

        jobs.remove_session(session).await;
        assert!(jobs.get(started.job_id).await.is_none());
    }
}
