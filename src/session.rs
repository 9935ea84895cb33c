//! Annotation session
//!
//! One session owns one document view: the immutable document, the label set,
//! the authoritative annotation set and the current rendering. Every confirmed
//! mutation is followed by a full re-render from the original text.
//!
//! Create and delete are split in two phases so a host can keep the session
//! responsive while a request is in flight:
//!
//! ```text
//! begin_create ──> backend.create ──> finish_create
//! begin_delete ──> backend.delete ──> finish_delete
//! ```
//!
//! `begin_*` validates and registers the request as pending, `finish_*`
//! applies the store's answer. A second request for a span or id that is
//! already pending is refused. [`AnnotationSession::create_annotation_from_selection`]
//! and [`AnnotationSession::delete_annotation`] run both phases back to back.
//!
//! [`PendingCreate`] and [`PendingDelete`] hold their in-flight entry until
//! they are dropped, so a request abandoned by the host (a cancelled future,
//! a timeout, an explicit `cancel_*`) frees its span or id again.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;

use crate::annotations::{Annotation, AnnotationId, AnnotationSet, Label, LabelId, UserId};
use crate::config::Config;
use crate::document::Document;
use crate::error::{RemoteError, Rejection, Result, SessionError};
use crate::notice::{NoticeBoard, NoticeLevel};
use crate::position::{
    self, OverlapPolicy, RawSelection, ResolvedSelection, SelectionRules, TextIndex,
};
use crate::render::{self, render_markup, style_segment, MarkupConfig, Segment, SegmentStyle};
use crate::store::{AnnotationBackend, CreateAnnotationRequest, Created};
use crate::view::{
    self, Activation, AnnotationListEntry, DocumentStats, LabelGroup, LabelSidebarEntry, Line,
};

const MAX_NOTICE_TTL_SECS: u64 = 24 * 60 * 60;

/// Tunables for a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub rules: SelectionRules,
    /// Characters of context stored on each side of a new annotation
    pub context_chars: usize,
    pub notice_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            rules: SelectionRules::default(),
            context_chars: 100,
            notice_ttl: Duration::seconds(5),
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            rules: config.selection.rules(),
            context_chars: config.selection.context_chars,
            notice_ttl: Duration::seconds(config.notices.ttl_secs.min(MAX_NOTICE_TTL_SECS) as i64),
        }
    }
}

/// The user looking at the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
    pub name: Option<String>,
}

impl Viewer {
    pub fn new(user_id: UserId, name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            name: Some(name.to_string()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether the viewer wrote this annotation
    pub fn is_author(&self, annotation: &Annotation) -> bool {
        self.user_id.is_some() && self.user_id == annotation.user_id
    }
}

impl From<&Config> for Viewer {
    fn from(config: &Config) -> Self {
        Self {
            user_id: config.viewer.user_id,
            name: config.viewer.name.clone(),
        }
    }
}

/// Spans and ids with a request in flight
#[derive(Debug, Default)]
struct InFlight {
    creates: HashSet<(usize, usize)>,
    deletes: HashSet<AnnotationId>,
}

impl InFlight {
    fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.deletes.is_empty()
    }
}

/// A validated creation waiting for the store
#[derive(Debug)]
pub struct PendingCreate {
    span: (usize, usize),
    request: CreateAnnotationRequest,
    in_flight: Arc<Mutex<InFlight>>,
}

impl PendingCreate {
    pub fn request(&self) -> &CreateAnnotationRequest {
        &self.request
    }

    pub fn span(&self) -> (usize, usize) {
        self.span
    }
}

impl Drop for PendingCreate {
    fn drop(&mut self) {
        self.in_flight.lock().creates.remove(&self.span);
    }
}

/// A deletion waiting for the store
#[derive(Debug)]
pub struct PendingDelete {
    id: AnnotationId,
    in_flight: Arc<Mutex<InFlight>>,
}

impl PendingDelete {
    pub fn id(&self) -> AnnotationId {
        self.id
    }
}

impl Drop for PendingDelete {
    fn drop(&mut self) {
        self.in_flight.lock().deletes.remove(&self.id);
    }
}

/// Annotation state and rendering for one document
pub struct AnnotationSession {
    document: Document,
    labels: Vec<Label>,
    annotations: AnnotationSet,
    backend: Arc<dyn AnnotationBackend>,
    viewer: Viewer,
    settings: SessionSettings,
    segments: Vec<Segment>,
    index: TextIndex,
    generation: u64,
    in_flight: Arc<Mutex<InFlight>>,
    notices: NoticeBoard,
}

impl AnnotationSession {
    pub fn new(document: Document, backend: Arc<dyn AnnotationBackend>, settings: SessionSettings) -> Self {
        let mut session = Self {
            document,
            labels: Vec::new(),
            annotations: AnnotationSet::new(),
            backend,
            viewer: Viewer::anonymous(),
            notices: NoticeBoard::new(settings.notice_ttl),
            settings,
            segments: Vec::new(),
            index: TextIndex::default(),
            generation: 0,
            in_flight: Arc::new(Mutex::new(InFlight::default())),
        };
        session.render();
        session
    }

    /// Set the viewer
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    /// Set the label set
    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    /// Seed the annotation set with already-stored annotations.
    ///
    /// Annotations for another document or with offsets outside the content
    /// are dropped.
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        let doc_id = self.document.id();
        let doc_len = self.document.char_len();
        let accepted = annotations.into_iter().filter(|a| {
            if a.document_id != doc_id {
                tracing::warn!(
                    "Skipping annotation {} for document {} (session document {})",
                    a.id,
                    a.document_id,
                    doc_id
                );
                false
            } else if !a.is_within(doc_len) {
                tracing::warn!(
                    "Skipping annotation {} with span {}..{} outside document of {} characters",
                    a.id,
                    a.start_position,
                    a.end_position,
                    doc_len
                );
                false
            } else {
                true
            }
        });
        self.annotations = AnnotationSet::from_annotations(accepted.collect());
        self.render();
        self
    }

    /// Fetch labels and annotations from the store and build a session
    pub async fn load(
        document: Document,
        backend: Arc<dyn AnnotationBackend>,
        viewer: Viewer,
        settings: SessionSettings,
    ) -> std::result::Result<Self, RemoteError> {
        let doc_id = document.id();
        let (labels, annotations) =
            tokio::try_join!(backend.labels(), backend.annotations(doc_id))?;

        tracing::info!(
            "Loaded document {} with {} annotations and {} labels",
            doc_id,
            annotations.len(),
            labels.len()
        );

        let mut session = Self::new(document, backend, settings)
            .with_viewer(viewer)
            .with_annotations(annotations);
        session.refresh_labels(labels);
        Ok(session)
    }

    // ---- rendering ----

    /// Rebuild the segmentation and the position index from the original text.
    ///
    /// Node references handed out before this call stop resolving.
    pub fn render(&mut self) {
        self.generation += 1;
        self.segments = render::segment(self.document.char_len(), self.annotations.as_slice());
        self.index = TextIndex::from_segments(self.generation, &self.segments);

        tracing::debug!(
            "Rendered {} segments for {} annotations (generation {})",
            self.segments.len(),
            self.annotations.len(),
            self.generation
        );
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Position index of the current rendering
    pub fn text_index(&self) -> &TextIndex {
        &self.index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Style of every current segment, in order
    pub fn styled_segments(&self) -> Vec<SegmentStyle> {
        self.segments
            .iter()
            .map(|s| style_segment(s, &self.annotations, &self.labels))
            .collect()
    }

    /// The current rendering as HTML
    pub fn markup(&self, config: &MarkupConfig) -> String {
        render_markup(&self.document, &self.segments, &self.styled_segments(), config)
    }

    /// What to show when a highlighted run is activated
    pub fn activate(&self, ids: &[AnnotationId]) -> Option<Activation> {
        view::activate(ids, &self.annotations, &self.labels, &self.viewer)
    }

    // ---- selection ----

    /// Validate a selection against the current rendering without side effects
    pub fn resolve_selection(&self, raw: &RawSelection) -> std::result::Result<ResolvedSelection, Rejection> {
        position::resolve_selection(
            &self.index,
            &self.document,
            &self.annotations,
            &self.settings.rules,
            raw,
        )
    }

    // ---- create ----

    /// Validate a selection and register it as a pending creation
    pub fn begin_create(&mut self, label_id: LabelId, raw: &RawSelection) -> Result<PendingCreate> {
        let resolved = match self.resolve_selection(raw) {
            Ok(resolved) => resolved,
            Err(rejection) => return Err(self.reject(rejection)),
        };
        self.prepare_create(label_id, resolved.start, resolved.end, &resolved.text)
            .map_err(|rejection| self.reject(rejection))
    }

    /// Register a span given by offsets as a pending creation.
    ///
    /// `text` must be the document text between `start` and `end`; the same
    /// overlap and length rules as for selections apply.
    pub fn begin_create_span(
        &mut self,
        label_id: LabelId,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<PendingCreate> {
        let checked = match self.document.slice(start, end) {
            Some(_) if start == end => Err(Rejection::InvalidSpan { start, end }),
            Some(actual) if actual != text => Err(Rejection::TextMismatch),
            Some(_) => self.settings.rules.check_span(&self.annotations, start, end, text),
            None => Err(Rejection::InvalidSpan { start, end }),
        };
        if let Err(rejection) = checked {
            return Err(self.reject(rejection));
        }
        self.prepare_create(label_id, start, end, text)
            .map_err(|rejection| self.reject(rejection))
    }

    fn prepare_create(
        &mut self,
        label_id: LabelId,
        start: usize,
        end: usize,
        text: &str,
    ) -> std::result::Result<PendingCreate, Rejection> {
        if !self.labels.iter().any(|l| l.id == label_id) {
            return Err(Rejection::UnknownLabel(label_id));
        }
        {
            let mut in_flight = self.in_flight.lock();
            if in_flight.creates.contains(&(start, end)) {
                return Err(Rejection::AlreadyPending);
            }
            if self.settings.rules.overlap == OverlapPolicy::Reject
                && in_flight.creates.iter().any(|&(s, e)| s < end && e > start)
            {
                tracing::debug!("Span {}..{} touches a pending annotation", start, end);
                return Err(Rejection::TouchesAnnotation);
            }
            in_flight.creates.insert((start, end));
        }

        let context = self.document.context(start, end, self.settings.context_chars);
        let request = CreateAnnotationRequest {
            document_id: self.document.id(),
            text_selection: text.to_string(),
            start_position: start,
            end_position: end,
            label_id,
            context_before: context.before.to_string(),
            context_after: context.after.to_string(),
        };

        tracing::debug!("Creating annotation {}..{} with label {}", start, end, label_id);
        Ok(PendingCreate {
            span: (start, end),
            request,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Apply the store's answer to a pending creation
    pub fn finish_create(
        &mut self,
        pending: PendingCreate,
        outcome: std::result::Result<Created, RemoteError>,
    ) -> Result<AnnotationId> {
        let created = match outcome {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(
                    "Failed to create annotation {}..{}: {}",
                    pending.span.0,
                    pending.span.1,
                    e
                );
                self.notices
                    .push(NoticeLevel::Error, format!("Error creating annotation: {}", e));
                return Err(e.into());
            }
        };

        let mut annotation = created.annotation;
        annotation.document_id = self.document.id();
        if !self.echo_matches(&annotation) {
            tracing::warn!(
                "Store echoed span {}..{} for annotation {}, keeping requested {}..{}",
                annotation.start_position,
                annotation.end_position,
                annotation.id,
                pending.request.start_position,
                pending.request.end_position
            );
            annotation.start_position = pending.request.start_position;
            annotation.end_position = pending.request.end_position;
            annotation.text_selection = pending.request.text_selection.clone();
        }
        drop(pending);

        if annotation.label_name.is_none() {
            if let Some(label) = self.labels.iter().find(|l| l.id == annotation.label_id) {
                annotation.apply_label(label);
            }
        }
        if annotation.user_id.is_none() {
            annotation.user_id = self.viewer.user_id;
            annotation.user_name = annotation.user_name.or_else(|| self.viewer.name.clone());
        }

        let id = annotation.id;
        tracing::info!(
            "Created annotation {} at {}..{}",
            id,
            annotation.start_position,
            annotation.end_position
        );
        self.annotations.insert(annotation);
        self.render();

        let message = if created.message.is_empty() {
            "Annotation created successfully".to_string()
        } else {
            created.message
        };
        self.notices.push(NoticeLevel::Success, message);
        Ok(id)
    }

    /// Abandon a creation without waiting for the store
    pub fn cancel_create(&mut self, pending: PendingCreate) {
        tracing::debug!(
            "Cancelled creation of {}..{}",
            pending.span.0,
            pending.span.1
        );
    }

    fn echo_matches(&self, annotation: &Annotation) -> bool {
        annotation.is_within(self.document.char_len())
            && self
                .document
                .slice(annotation.start_position, annotation.end_position)
                == Some(annotation.text_selection.as_str())
    }

    /// Resolve a selection, send it to the store and merge the result
    pub async fn create_annotation_from_selection(
        &mut self,
        label_id: LabelId,
        raw: &RawSelection,
    ) -> Result<AnnotationId> {
        let pending = self.begin_create(label_id, raw)?;
        let outcome = self.backend.create(pending.request()).await;
        self.finish_create(pending, outcome)
    }

    /// Create an annotation over explicit offsets
    pub async fn create_annotation(
        &mut self,
        label_id: LabelId,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<AnnotationId> {
        let pending = self.begin_create_span(label_id, start, end, text)?;
        let outcome = self.backend.create(pending.request()).await;
        self.finish_create(pending, outcome)
    }

    // ---- delete ----

    /// Register a deletion as pending
    pub fn begin_delete(&mut self, id: AnnotationId) -> Result<PendingDelete> {
        if !self.annotations.contains(id) {
            let err = RemoteError::UnknownAnnotation(id);
            tracing::warn!("Refusing to delete unknown annotation {}", id);
            self.notices.push(NoticeLevel::Error, err.to_string());
            return Err(err.into());
        }
        if !self.in_flight.lock().deletes.insert(id) {
            return Err(self.reject(Rejection::AlreadyPending));
        }
        Ok(PendingDelete {
            id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Apply the store's answer to a pending deletion
    pub fn finish_delete(
        &mut self,
        pending: PendingDelete,
        outcome: std::result::Result<String, RemoteError>,
    ) -> Result<Annotation> {
        let id = pending.id;
        drop(pending);

        let message = match outcome {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to delete annotation {}: {}", id, e);
                self.notices
                    .push(NoticeLevel::Error, format!("Error deleting annotation: {}", e));
                return Err(e.into());
            }
        };

        let removed = self
            .annotations
            .remove(id)
            .ok_or(RemoteError::UnknownAnnotation(id))?;
        tracing::info!("Deleted annotation {}", id);
        self.render();

        let message = if message.is_empty() {
            "Annotation deleted successfully".to_string()
        } else {
            message
        };
        self.notices.push(NoticeLevel::Success, message);
        Ok(removed)
    }

    /// Abandon a deletion without waiting for the store
    pub fn cancel_delete(&mut self, pending: PendingDelete) {
        tracing::debug!("Cancelled deletion of annotation {}", pending.id);
    }

    /// Delete an annotation through the store
    pub async fn delete_annotation(&mut self, id: AnnotationId) -> Result<Annotation> {
        let pending = self.begin_delete(id)?;
        let outcome = self.backend.delete(id).await;
        self.finish_delete(pending, outcome)
    }

    /// Whether any create or delete is waiting for the store
    pub fn has_pending(&self) -> bool {
        !self.in_flight.lock().is_empty()
    }

    // ---- labels ----

    /// Replace the label set and re-derive the label fields of every
    /// annotation whose label still exists. Annotations whose label is gone
    /// keep their stale fields.
    pub fn refresh_labels(&mut self, labels: Vec<Label>) {
        self.labels = labels;

        let mut stale = 0;
        for annotation in self.annotations.iter_mut() {
            match self.labels.iter().find(|l| l.id == annotation.label_id) {
                Some(label) => annotation.apply_label(label),
                None => stale += 1,
            }

            if annotation.user_name.is_none() {
                if let Some(user_id) = annotation.user_id {
                    annotation.user_name = Some(if self.viewer.user_id == Some(user_id) {
                        self.viewer
                            .name
                            .clone()
                            .unwrap_or_else(|| format!("User {}", user_id))
                    } else {
                        format!("User {}", user_id)
                    });
                }
            }
        }
        if stale > 0 {
            tracing::warn!("{} annotations reference labels that no longer exist", stale);
        }

        self.render();
    }

    /// Fetch the label set from the store and apply it
    pub async fn reload_labels(&mut self) -> Result<()> {
        match self.backend.labels().await {
            Ok(labels) => {
                tracing::info!("Reloaded {} labels", labels.len());
                self.refresh_labels(labels);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to reload labels: {}", e);
                self.notices
                    .push(NoticeLevel::Error, format!("Error loading labels: {}", e));
                Err(e.into())
            }
        }
    }

    // ---- aggregates ----

    pub fn count_by_label(&self) -> BTreeMap<LabelId, usize> {
        self.annotations.count_by_label()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn annotation_list(&self) -> Vec<AnnotationListEntry> {
        view::annotation_list(&self.annotations, &self.labels, &self.viewer)
    }

    pub fn label_sidebar(&self) -> Vec<LabelSidebarEntry> {
        view::label_sidebar(&self.labels, &self.annotations)
    }

    pub fn label_picker(&self) -> Vec<LabelGroup> {
        view::label_picker(&self.labels)
    }

    pub fn stats(&self) -> DocumentStats {
        view::document_stats(&self.document, &self.annotations)
    }

    /// Line-number gutter for the document
    pub fn lines(&self) -> Vec<Line> {
        view::line_starts(&self.document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Store client, for running requests outside the session borrow
    pub fn backend(&self) -> Arc<dyn AnnotationBackend> {
        Arc::clone(&self.backend)
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    fn reject(&mut self, rejection: Rejection) -> SessionError {
        if rejection.is_silent() {
            tracing::debug!("Selection discarded: {}", rejection);
        } else {
            tracing::warn!("Selection rejected: {}", rejection);
            self.notices.push(NoticeLevel::Warning, rejection.to_string());
        }
        rejection.into()
    }
}
