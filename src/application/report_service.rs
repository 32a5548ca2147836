// Report service - fetch, render and export reports with supersede-aware requests
use crate::application::document_assembler::{DocumentAssembler, ReportDocument};
use crate::application::errors::{ApiError, Banner};
use crate::application::export::{
    export_filename, load_logo, DocumentWriter, ExportError, ExportedReport, LogoLoader,
};
use crate::application::repositories::ReportRepository;
use crate::application::section_renderer::render_sections;
use crate::application::session_context::SessionContext;
use crate::domain::report::{
    InvalidDateRange, ReportEvent, ReportKind, ReportPayload, ReportPhase, ReportQuery,
    ReportSection,
};
use crate::domain::session::{Session, SessionError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::task::AbortHandle;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    InvalidQuery(#[from] InvalidDateRange),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("superseded by a newer request")]
    Superseded,
    #[error("report cannot be exported while {0:?}")]
    PhaseConflict(ReportPhase),
    #[error(transparent)]
    Fetch(#[from] ApiError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub organization: String,
    pub logo_timeout: Duration,
}

/// Screen view of a report
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub kind: ReportKind,
    pub title: &'static str,
    pub phase: ReportPhase,
    pub sections: Vec<ReportSection>,
    /// Set when the fetch failed and previous (or empty) content is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
}

struct InFlight {
    generation: u64,
    abort: AbortHandle,
}

/// Last successful payload per kind, tied to the session that fetched it
struct Rendered {
    owner: Session,
    query: ReportQuery,
    payload: ReportPayload,
}

pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    session: Arc<SessionContext>,
    writer: Arc<dyn DocumentWriter>,
    logo_loader: Option<Arc<dyn LogoLoader>>,
    assembler: DocumentAssembler,
    settings: ReportSettings,
    generation: AtomicU64,
    in_flight: Mutex<HashMap<ReportKind, InFlight>>,
    rendered: Mutex<HashMap<ReportKind, Rendered>>,
    phases: Mutex<HashMap<ReportKind, ReportPhase>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ReportService {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        session: Arc<SessionContext>,
        writer: Arc<dyn DocumentWriter>,
        logo_loader: Option<Arc<dyn LogoLoader>>,
        assembler: DocumentAssembler,
        settings: ReportSettings,
    ) -> Self {
        Self {
            repository,
            session,
            writer,
            logo_loader,
            assembler,
            settings,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(HashMap::new()),
            rendered: Mutex::new(HashMap::new()),
            phases: Mutex::new(HashMap::new()),
        }
    }

    pub fn phase(&self, kind: ReportKind) -> ReportPhase {
        lock(&self.phases).get(&kind).copied().unwrap_or(ReportPhase::Idle)
    }

    /// Apply `event` to the kind's phase; returns whether the transition was allowed
    fn record(&self, kind: ReportKind, event: ReportEvent) -> bool {
        let mut phases = lock(&self.phases);
        let current = phases.get(&kind).copied().unwrap_or(ReportPhase::Idle);
        match current.apply(event) {
            Some(next) => {
                tracing::debug!(report = %kind, from = ?current, to = ?next, "report phase");
                phases.insert(kind, next);
                true
            }
            None => {
                tracing::debug!(report = %kind, phase = ?current, event = ?event, "ignored report event");
                false
            }
        }
    }

    /// Rendered payload for `kind` if the current session fetched it
    fn rendered_for(&self, kind: ReportKind, session: &Session) -> Option<(ReportQuery, ReportPayload)> {
        lock(&self.rendered)
            .get(&kind)
            .filter(|r| &r.owner == session)
            .map(|r| (r.query.clone(), r.payload.clone()))
    }

    /// Fetch `query`, aborting any in-flight fetch of the same report kind.
    ///
    /// Only the newest request for a kind may update the rendered payload; an
    /// older one resolves to `ReportError::Superseded`.
    pub async fn fetch(&self, query: &ReportQuery) -> Result<ReportPayload, ReportError> {
        query.validate()?;
        let session = self.session.require()?;
        let kind = query.kind;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let repository = self.repository.clone();
        let task_query = query.clone();
        let task = tokio::spawn(async move { repository.fetch_report(&task_query).await });

        let previous = lock(&self.in_flight).insert(
            kind,
            InFlight {
                generation,
                abort: task.abort_handle(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(report = %kind, superseded = previous.generation, by = generation, "aborting stale fetch");
            previous.abort.abort();
        }
        self.record(kind, ReportEvent::FetchStarted);
        tracing::debug!(report = %kind, generation, params = ?query.query_pairs(), "fetching report");

        let outcome = task.await;

        let is_current = {
            let mut in_flight = lock(&self.in_flight);
            match in_flight.get(&kind) {
                Some(entry) if entry.generation == generation => {
                    in_flight.remove(&kind);
                    true
                }
                _ => false,
            }
        };

        match outcome {
            Err(join_error) if join_error.is_cancelled() => Err(ReportError::Superseded),
            Err(join_error) => {
                tracing::error!(report = %kind, error = %join_error, "report fetch task failed");
                if is_current {
                    self.record(kind, ReportEvent::FetchFailed);
                }
                Err(ApiError::Network(join_error.to_string()).into())
            }
            Ok(_) if !is_current => Err(ReportError::Superseded),
            Ok(Ok(payload)) => {
                lock(&self.rendered).insert(
                    kind,
                    Rendered {
                        owner: session,
                        query: query.clone(),
                        payload: payload.clone(),
                    },
                );
                self.record(kind, ReportEvent::FetchSucceeded);
                Ok(payload)
            }
            Ok(Err(e)) => {
                tracing::error!(report = %kind, error = %e, "report fetch failed");
                self.record(kind, ReportEvent::FetchFailed);
                Err(e.into())
            }
        }
    }

    /// Screen view. A failed fetch keeps the last rendered payload (or an
    /// empty one) and reports the failure alongside it as a banner.
    pub async fn view(&self, query: &ReportQuery) -> Result<ReportView, ReportError> {
        let kind = query.kind;
        let (payload, banner) = match self.fetch(query).await {
            Ok(payload) => (payload, None),
            Err(ReportError::Fetch(e)) if !matches!(e, ApiError::Session(_)) => {
                let session = self.session.require()?;
                let stale = self
                    .rendered_for(kind, &session)
                    .map(|(_, payload)| payload)
                    .unwrap_or_else(|| ReportPayload::empty(kind));
                (stale, Some(Banner::from(&e)))
            }
            Err(other) => return Err(other),
        };

        Ok(ReportView {
            kind,
            title: kind.title(),
            phase: self.phase(kind),
            sections: render_sections(&payload),
            banner,
        })
    }

    /// Export `query` as a document download. Reuses the rendered payload when
    /// the same session fetched the same query and the report is in a phase
    /// that can export; otherwise fetches first.
    pub async fn export(&self, query: &ReportQuery) -> Result<ExportedReport, ReportError> {
        query.validate()?;
        let session = self.session.require()?;
        let kind = query.kind;

        let exportable = self.phase(kind).apply(ReportEvent::ExportStarted).is_some();
        let cached = self
            .rendered_for(kind, &session)
            .filter(|(rendered, _)| exportable && rendered == query)
            .map(|(_, payload)| payload);
        let payload = match cached {
            Some(payload) => payload,
            None => self.fetch(query).await?,
        };

        if !self.record(kind, ReportEvent::ExportStarted) {
            let phase = self.phase(kind);
            tracing::warn!(report = %kind, phase = ?phase, "export rejected");
            return Err(ReportError::PhaseConflict(phase));
        }

        match self.render_document(query, &payload).await {
            Ok(exported) => {
                self.record(kind, ReportEvent::ExportSucceeded);
                tracing::info!(
                    report = %kind,
                    filename = %exported.filename,
                    bytes = exported.bytes.len(),
                    "report exported"
                );
                Ok(exported)
            }
            Err(e) => {
                self.record(kind, ReportEvent::ExportFailed);
                tracing::error!(report = %kind, error = %e, "report export failed");
                Err(e.into())
            }
        }
    }

    async fn render_document(
        &self,
        query: &ReportQuery,
        payload: &ReportPayload,
    ) -> Result<ExportedReport, ExportError> {
        let logo = load_logo(self.logo_loader.as_deref(), self.settings.logo_timeout).await;
        let sections = render_sections(payload);
        let now = chrono::Local::now();

        let document = self.assembler.assemble(ReportDocument {
            title: query.kind.title(),
            organization: &self.settings.organization,
            query,
            sections: &sections,
            logo,
            generated_at: now.naive_local(),
        });
        tracing::debug!(report = %query.kind, pages = document.page_count(), "document assembled");

        let writer = self.writer.clone();
        let bytes = tokio::task::spawn_blocking(move || writer.write(&document))
            .await
            .map_err(|e| ExportError::Task(e.to_string()))??;

        Ok(ExportedReport {
            filename: export_filename(query.kind, now.date_naive(), self.writer.extension()),
            content_type: self.writer.content_type(),
            bytes,
        })
    }
}
