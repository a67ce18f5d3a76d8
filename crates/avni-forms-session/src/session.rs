//! Form editing session
//!
//! A [`FormSession`] owns one form while it is being designed. It loads the
//! form and the lookups the designer needs, applies edits, validates, and
//! saves through a [`FormsBackend`].
//!
//! ```text
//! Loading -> Ready -> (Editing <-> Validating) -> Saving -> Ready | Error
//! ```

use crate::normalize::normalize;
use crate::persist::{server_error_message, to_wire};
use crate::{
    BackendError, EncounterTypeSummary, FormsBackend, IdentifierSource, SessionError,
    SubjectTypeSummary,
};
use avni_forms_editor::{FormEdit, OriginalShapes, ValidationReport, Validator};
use avni_forms_model::FormDefinition;
use avni_forms_rules::{DeclarativeRuleCompiler, RuleCompiler};
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const INITIAL_DATA_FAILED: &str = "Failed to load initial data";
pub const FORM_LOAD_FAILED: &str = "Failed to load form data";

/// Organisation whose forms are shared templates other organisations may
/// not change
const TEMPLATE_ORGANISATION_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Editing,
    Validating,
    Saving,
    /// Message for the user
    Error(String),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Editing => write!(f, "editing"),
            Self::Validating => write!(f, "validating"),
            Self::Saving => write!(f, "saving"),
            Self::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Whether the session holds edits the server has not seen.
/// Clones share the flag, so a navigation guard can keep one.
#[derive(Debug, Clone, Default)]
pub struct UnsavedChanges(Arc<AtomicBool>);

impl UnsavedChanges {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, unsaved: bool) {
        self.0.store(unsaved, Ordering::SeqCst);
    }
}

/// Ends a session from outside. Network results that arrive afterwards
/// are discarded.
#[derive(Debug, Clone)]
pub struct TeardownHandle(Arc<AtomicBool>);

impl TeardownHandle {
    pub fn teardown(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        !self.0.load(Ordering::SeqCst)
    }
}

pub struct FormSession {
    backend: Arc<dyn FormsBackend>,
    compiler: Arc<dyn RuleCompiler>,
    form_uuid: String,
    state: SessionState,
    loaded: bool,
    form: FormDefinition,
    name: String,
    timed: bool,
    read_only: bool,
    originals: OriginalShapes,
    report: Option<ValidationReport>,
    /// Non-fatal problem shown next to the form
    message: Option<String>,
    identifier_sources: Vec<IdentifierSource>,
    group_subject_types: Vec<SubjectTypeSummary>,
    encounter_types: Vec<EncounterTypeSummary>,
    unsaved: UnsavedChanges,
    alive: Arc<AtomicBool>,
}

impl FormSession {
    pub fn new(backend: Arc<dyn FormsBackend>, form_uuid: impl Into<String>) -> Self {
        Self {
            backend,
            compiler: Arc::new(DeclarativeRuleCompiler::new()),
            form_uuid: form_uuid.into(),
            state: SessionState::Loading,
            loaded: false,
            form: FormDefinition::default(),
            name: String::new(),
            timed: false,
            read_only: false,
            originals: OriginalShapes::new(),
            report: None,
            message: None,
            identifier_sources: Vec::new(),
            group_subject_types: Vec::new(),
            encounter_types: Vec::new(),
            unsaved: UnsavedChanges::default(),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn RuleCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn form_uuid(&self) -> &str {
        &self.form_uuid
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timed(&self) -> bool {
        self.timed
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn originals(&self) -> &OriginalShapes {
        &self.originals
    }

    /// Report of the last failed validation
    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn identifier_sources(&self) -> &[IdentifierSource] {
        &self.identifier_sources
    }

    pub fn group_subject_types(&self) -> &[SubjectTypeSummary] {
        &self.group_subject_types
    }

    pub fn encounter_types(&self) -> &[EncounterTypeSummary] {
        &self.encounter_types
    }

    pub fn unsaved_changes(&self) -> UnsavedChanges {
        self.unsaved.clone()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle(Arc::clone(&self.alive))
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            debug!("Session for form {} closed; discarding response", self.form_uuid);
            Err(SessionError::Closed)
        }
    }

    /// Load the lookups and the form. A failure to load the lookups is
    /// reported through [`message`](Self::message) and does not stop the
    /// form from loading.
    pub async fn load(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Loading;
        info!("Loading form {}", self.form_uuid);

        let (sources, modules) = futures::join!(
            self.backend.identifier_sources(),
            self.backend.operational_modules()
        );
        self.ensure_alive()?;

        match sources {
            Ok(sources) => self.identifier_sources = sources,
            Err(err) => self.initial_data_failed(&err),
        }
        match modules {
            Ok(modules) => {
                self.group_subject_types = modules.group_subject_types();
                self.encounter_types = modules.encounter_types;
            }
            Err(err) => self.initial_data_failed(&err),
        }

        self.load_form().await
    }

    fn initial_data_failed(&mut self, err: &BackendError) {
        warn!("Loading lookups for form {} failed: {}", self.form_uuid, err);
        self.message = Some(INITIAL_DATA_FAILED.to_string());
    }

    async fn load_form(&mut self) -> Result<(), SessionError> {
        let fetched = self.backend.fetch_form(&self.form_uuid).await;
        self.ensure_alive()?;

        let parsed = fetched
            .map_err(SessionError::from)
            .and_then(|body| Ok(serde_json::from_value::<FormDefinition>(body)?));
        let mut form = match parsed {
            Ok(form) => form,
            Err(err) => {
                warn!("Loading form {} failed: {}", self.form_uuid, err);
                self.state = SessionState::Error(FORM_LOAD_FAILED.to_string());
                return Err(err);
            }
        };

        if normalize(&mut form, &mut self.originals) {
            debug!("Form {} had no group; added one", self.form_uuid);
        }
        self.name = form.name.clone();
        self.timed = form.timed;
        self.read_only = form.organisation_id == Some(TEMPLATE_ORGANISATION_ID);
        self.form = form;
        self.loaded = true;
        self.report = None;
        self.state = SessionState::Ready;
        info!(
            "Loaded form {} with {} group(s)",
            self.form_uuid,
            self.form.live_groups().count()
        );
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        if !self.loaded {
            return Err(SessionError::NotLoaded);
        }
        if self.read_only {
            return Err(SessionError::ReadOnly);
        }
        Ok(())
    }

    fn mark_edited(&mut self) {
        self.unsaved.set(true);
        self.state = SessionState::Editing;
    }

    pub fn apply(&mut self, edit: FormEdit) -> Result<(), SessionError> {
        self.edit(|form| edit.apply(form))
    }

    /// Run `change` on a draft of the form and keep the result
    pub fn edit<F>(&mut self, change: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut FormDefinition),
    {
        self.ensure_editable()?;
        let mut draft = self.form.clone();
        change(&mut draft);
        self.form = draft;
        self.mark_edited();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.name = name.into();
        self.mark_edited();
        Ok(())
    }

    pub fn set_timed(&mut self, timed: bool) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.timed = timed;
        self.mark_edited();
        Ok(())
    }

    /// Validate the form in place, attaching errors to the tree
    pub fn validate(&mut self) -> ValidationReport {
        let previous = std::mem::replace(&mut self.state, SessionState::Validating);
        self.form.name = self.name.clone();
        self.form.timed = self.timed;
        let report = Validator::new(self.compiler.as_ref(), &self.originals).validate(&mut self.form);
        self.state = match previous {
            SessionState::Ready if report.is_valid() => SessionState::Ready,
            SessionState::Error(message) if report.is_valid() => SessionState::Error(message),
            _ => SessionState::Editing,
        };
        report
    }

    /// Validate, then send the form to the server and reload it. A form
    /// with errors is not sent; the report stays on the session. A server
    /// failure leaves the edits in place so saving can be retried.
    pub async fn save(&mut self) -> Result<(), SessionError> {
        self.ensure_editable()?;

        let report = self.validate();
        if !report.is_valid() {
            debug!(
                "Form {} not saved: {} diagnostic(s)",
                self.form_uuid,
                report.diagnostics.len()
            );
            self.report = Some(report.clone());
            return Err(SessionError::Invalid(Box::new(report)));
        }
        self.report = None;

        let body = to_wire(&self.form, &self.name, self.timed)?;
        self.state = SessionState::Saving;
        info!("Saving form {}", self.form_uuid);

        let saved = self.backend.save_form(&body).await;
        self.ensure_alive()?;

        if let Err(err) = saved {
            let detail = match &err {
                BackendError::Server { body, .. } => server_error_message(body),
                other => other.to_string(),
            };
            warn!("Saving form {} failed: {}", self.form_uuid, err);
            self.state = SessionState::Error(format!("Server error received: {}", detail));
            return Err(err.into());
        }

        info!("Saved form {}", self.form_uuid);
        self.unsaved.set(false);
        self.load_form().await
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("form_uuid", &self.form_uuid)
            .field("state", &self.state)
            .field("loaded", &self.loaded)
            .field("unsaved", &self.unsaved.is_set())
            .finish_non_exhaustive()
    }
}
