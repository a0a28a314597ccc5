//! The orchestrator: owns the record store, the statistics and the view mode, and keeps the
//! local copy in step with the API after every change.

use std::fmt;

use crate::categories::CategoryDirectory;
use crate::client::{ApiError, ExpenseApi, ExpenseUpdate, Statistics};
use crate::filter::{FilterCriteria, FilteredView};
use crate::form::{ExpenseForm, ValidationError};
use crate::store::RecordStore;
use crate::types::{ExpenseId, Status};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Viewing,
    /// Creating a new expense or editing an existing one.
    Editing(ExpenseForm),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Load,
    Create,
    Update,
    ChangeStatus,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Load => "load expenses",
            Action::Create => "create expense",
            Action::Update => "update expense",
            Action::ChangeStatus => "change expense status",
            Action::Delete => "delete expense",
        };
        write!(f, "{s}")
    }
}

/// Confirmation shown after a successful change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created(ExpenseId),
    Updated(ExpenseId),
    StatusChanged(ExpenseId, Status),
    Deleted(ExpenseId),
}

impl Notice {
    pub fn id(&self) -> ExpenseId {
        match *self {
            Notice::Created(id)
            | Notice::Updated(id)
            | Notice::StatusChanged(id, _)
            | Notice::Deleted(id) => id,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Created(id) => write!(f, "Expense {id} created"),
            Notice::Updated(id) => write!(f, "Expense {id} updated"),
            Notice::StatusChanged(id, s) => write!(f, "Expense {id} marked {s}"),
            Notice::Deleted(id) => write!(f, "Expense {id} deleted"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Transport and HTTP failures are reported the same way.
    #[error("Failed to {action}")]
    Request {
        action: Action,
        #[source]
        source: ApiError,
    },
    #[error("expense {0} not found")]
    NotFound(ExpenseId),
    #[error("a form is already open")]
    FormAlreadyOpen,
    #[error("no form is open")]
    NoFormOpen,
}

/// Monotonic tags for fetches; a response older than the last applied one is dropped.
///
/// The blocking client answers in issue order, so nothing is dropped on that path. The
/// sequence matters once responses are applied out of band through
/// [`Session::issue_statistics_ticket`] and [`Session::apply_statistics`], e.g. by a
/// background refresher or an async client.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSequence {
    issued: u64,
    applied: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket <= self.applied {
            return false;
        }
        self.applied = ticket;
        true
    }
}

pub struct Session<A> {
    api: A,
    store: RecordStore,
    statistics: Statistics,
    categories: CategoryDirectory,
    mode: ViewMode,
    loading: bool,
    stats_seq: RequestSequence,
}

impl<A: ExpenseApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: RecordStore::new(),
            statistics: Statistics::default(),
            categories: CategoryDirectory::fallback(),
            mode: ViewMode::Viewing,
            loading: true,
            stats_seq: RequestSequence::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Initial fetch of expenses, statistics and categories. Clears the loading flag whether or
    /// not the expense fetch succeeded.
    pub fn load(&mut self) -> Result<(), SessionError> {
        let expenses = self.reload_expenses();
        self.refresh_statistics();
        self.load_categories();
        self.loading = false;
        expenses
    }

    pub fn reload_expenses(&mut self) -> Result<(), SessionError> {
        match self.api.list_expenses() {
            Ok(records) => {
                self.store.replace_all(records);
                Ok(())
            }
            Err(source) => Err(self.failed(Action::Load, source)),
        }
    }

    pub fn load_categories(&mut self) {
        self.categories = CategoryDirectory::load(&self.api);
    }

    /// Re-reads statistics from the API. Failures keep the previous figures.
    pub fn refresh_statistics(&mut self) {
        let ticket = self.stats_seq.issue();
        match self.api.statistics() {
            Ok(stats) => {
                self.apply_statistics(ticket, stats);
            }
            Err(err) => tracing::warn!(error = %err, "could not refresh statistics"),
        }
    }

    /// Installs `stats` unless a newer ticket was already applied.
    pub fn apply_statistics(&mut self, ticket: u64, stats: Statistics) -> bool {
        if !self.stats_seq.accept(ticket) {
            tracing::debug!(ticket, "dropping stale statistics");
            return false;
        }
        self.statistics = stats;
        true
    }

    pub fn issue_statistics_ticket(&mut self) -> u64 {
        self.stats_seq.issue()
    }

    pub fn begin_create(&mut self) -> Result<&mut ExpenseForm, SessionError> {
        self.open_form(ExpenseForm::new())
    }

    pub fn begin_edit(&mut self, id: ExpenseId) -> Result<&mut ExpenseForm, SessionError> {
        let form = match self.store.get(id) {
            Some(e) => ExpenseForm::edit(e),
            None => return Err(SessionError::NotFound(id)),
        };
        self.open_form(form)
    }

    fn open_form(&mut self, form: ExpenseForm) -> Result<&mut ExpenseForm, SessionError> {
        if matches!(self.mode, ViewMode::Editing(_)) {
            return Err(SessionError::FormAlreadyOpen);
        }
        self.mode = ViewMode::Editing(form);
        self.form_mut().ok_or(SessionError::NoFormOpen)
    }

    pub fn form(&self) -> Option<&ExpenseForm> {
        match &self.mode {
            ViewMode::Editing(f) => Some(f),
            ViewMode::Viewing => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ExpenseForm> {
        match &mut self.mode {
            ViewMode::Editing(f) => Some(f),
            ViewMode::Viewing => None,
        }
    }

    pub fn cancel(&mut self) {
        self.mode = ViewMode::Viewing;
    }

    /// Validates the open form and sends it. On any failure the form stays open with its input.
    pub fn submit(&mut self) -> Result<Notice, SessionError> {
        let submission = self.form().ok_or(SessionError::NoFormOpen)?.validate()?;

        let notice = match submission.target {
            None => match self.api.create_expense(&submission.draft) {
                Ok(created) => {
                    let id = created.id;
                    self.store.append(created);
                    Notice::Created(id)
                }
                Err(source) => return Err(self.failed(Action::Create, source)),
            },
            Some(id) => {
                let update = ExpenseUpdate::Full(submission.draft);
                match self.api.update_expense(id, &update) {
                    Ok(updated) => {
                        if !self.store.replace(updated) {
                            tracing::debug!(%id, "updated expense no longer in local store");
                        }
                        Notice::Updated(id)
                    }
                    Err(source) => return Err(self.failed(Action::Update, source)),
                }
            }
        };

        self.mode = ViewMode::Viewing;
        self.after_mutation();
        Ok(notice)
    }

    /// Inline status change. The view mode is left alone.
    pub fn change_status(
        &mut self,
        id: ExpenseId,
        status: Status,
    ) -> Result<Notice, SessionError> {
        if self.store.get(id).is_none() {
            return Err(SessionError::NotFound(id));
        }
        let update = ExpenseUpdate::Status { status };
        match self.api.update_expense(id, &update) {
            Ok(updated) => {
                self.store.replace(updated);
                self.after_mutation();
                Ok(Notice::StatusChanged(id, status))
            }
            Err(source) => Err(self.failed(Action::ChangeStatus, source)),
        }
    }

    pub fn delete(&mut self, id: ExpenseId) -> Result<Notice, SessionError> {
        if self.store.get(id).is_none() {
            return Err(SessionError::NotFound(id));
        }
        match self.api.delete_expense(id) {
            Ok(()) => {
                self.store.remove(id);
                self.after_mutation();
                Ok(Notice::Deleted(id))
            }
            Err(source) => Err(self.failed(Action::Delete, source)),
        }
    }

    // Statistics always come from the API, never from the local store.
    fn after_mutation(&mut self) {
        self.refresh_statistics();
    }

    // The caller prints the error; this only leaves a trace for -v.
    fn failed(&self, action: Action, source: ApiError) -> SessionError {
        tracing::debug!(%action, error = %source, "request failed");
        SessionError::Request { action, source }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn categories(&self) -> &CategoryDirectory {
        &self.categories
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self, criteria: &FilterCriteria) -> FilteredView<'_> {
        criteria.view(self.store.records())
    }
}
