//! Keeps the cached expense list and total in step with the remote store.
//!
//! The cache is never patched locally. Every successful create or delete is
//! followed by a full reload, and a failed mutation leaves the cache exactly as
//! it was.

use std::{fmt, sync::Arc};

use crate::{
    Error,
    alert::{Alert, Notices},
    api::ExpenseApi,
    expense::{ExpenseID, ExpenseRecord, NewExpense},
    session::Session,
};

/// What happened when a flow was asked to talk to the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote store accepted the request and the cache was refreshed.
    Done,
    /// The request failed. An error notice was raised and the cache is unchanged.
    Failed,
    /// The session has no user ID yet, so nothing was sent.
    Waiting,
    /// The user declined to confirm, so nothing was sent.
    Cancelled,
}

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    /// Show `prompt` and return whether the user agreed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Raises a busy flag for as long as it is alive.
///
/// The flag is lowered on drop, so it also clears when a request future is
/// dropped before it completes.
pub(crate) struct BusyFlag<'a>(&'a mut bool);

impl<'a> BusyFlag<'a> {
    pub(crate) fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// The cached expense list and total for the logged in user.
///
/// Creating and deleting take `&mut self`, so one controller never has two
/// mutations in flight at once.
pub struct ExpenseSync {
    api: Arc<dyn ExpenseApi>,
    notices: Notices,
    records: Vec<ExpenseRecord>,
    total: Option<f64>,
    records_stale: bool,
    total_stale: bool,
    is_loading: bool,
    is_submitting: bool,
}

impl ExpenseSync {
    const LOAD_FAILED: &'static str = "Failed to load expenses";
    const CREATE_FAILED: &'static str = "Failed to add expense";
    const DELETE_FAILED: &'static str = "Failed to delete expense";
    /// The question asked before an expense is deleted.
    pub const DELETE_PROMPT: &'static str = "Are you sure you want to delete this expense?";

    /// Create a controller with an empty cache.
    pub fn new(api: Arc<dyn ExpenseApi>, notices: Notices) -> Self {
        Self {
            api,
            notices,
            records: Vec::new(),
            total: None,
            records_stale: false,
            total_stale: false,
            is_loading: false,
            is_submitting: false,
        }
    }

    /// The cached expenses, in the order the remote store listed them.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// The total computed by the remote store, if it has been loaded.
    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// The number of cached expenses.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether the last attempt to reload the list failed.
    pub fn records_stale(&self) -> bool {
        self.records_stale
    }

    /// Whether the last attempt to reload the total failed.
    pub fn total_stale(&self) -> bool {
        self.total_stale
    }

    /// Whether a reload is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a create or delete is in progress.
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Drop the cached list and total.
    pub fn clear(&mut self) {
        self.records.clear();
        self.total = None;
        self.records_stale = false;
        self.total_stale = false;
    }

    /// Fetch the expense list and the total at the same time.
    ///
    /// Each is replaced by its own result. A part that fails to load keeps its
    /// previous value and is flagged as stale.
    pub async fn load_all(&mut self, session: &Session) -> SyncOutcome {
        let Some(user_id) = session.user_id() else {
            return SyncOutcome::Waiting;
        };

        let (records, total) = {
            let _loading = BusyFlag::raise(&mut self.is_loading);
            tokio::join!(
                self.api.get_expenses(&session.credential, user_id),
                self.api.get_total(&session.credential, user_id),
            )
        };

        let mut first_error = None;

        match records {
            Ok(records) => {
                tracing::debug!("Loaded {} expenses", records.len());
                self.records = records;
                self.records_stale = false;
            }
            Err(error) => {
                self.records_stale = true;
                first_error.get_or_insert(error);
            }
        }

        match total {
            Ok(total) => {
                self.total = Some(total);
                self.total_stale = false;
            }
            Err(error) => {
                self.total_stale = true;
                first_error.get_or_insert(error);
            }
        }

        match first_error {
            Some(error) => {
                self.notices.push(error.into_alert(Self::LOAD_FAILED));
                SyncOutcome::Failed
            }
            None => SyncOutcome::Done,
        }
    }

    /// Create `expense` in the remote store, then reload.
    ///
    /// Returns [SyncOutcome::Done] once the remote store accepted the expense,
    /// even if the reload that follows fails.
    pub async fn create(&mut self, session: &Session, expense: NewExpense) -> SyncOutcome {
        let Some(user_id) = session.user_id() else {
            return SyncOutcome::Waiting;
        };

        let expense =
            match NewExpense::new(&expense.expense_name, expense.expense_amount, expense.category)
            {
                Ok(expense) => expense,
                Err(error) => {
                    self.notices.push(error.into_alert(Self::CREATE_FAILED));
                    return SyncOutcome::Failed;
                }
            };

        let created = {
            let _submitting = BusyFlag::raise(&mut self.is_submitting);
            self.api
                .create_expense(&session.credential, user_id, &expense)
                .await
        };

        if let Err(error) = created {
            return self.fail(error, Self::CREATE_FAILED);
        }

        tracing::info!("Created expense {:?}", expense.expense_name);
        self.notices
            .push(Alert::success("Expense added successfully!", ""));
        self.load_all(session).await;

        SyncOutcome::Done
    }

    /// Delete the expense `id` from the remote store once `confirm` agrees, then
    /// reload.
    pub async fn delete(
        &mut self,
        session: &Session,
        id: ExpenseID,
        mut confirm: impl Confirm,
    ) -> SyncOutcome {
        if session.user_id().is_none() {
            return SyncOutcome::Waiting;
        }

        if !confirm.confirm(Self::DELETE_PROMPT) {
            tracing::debug!("Deletion of expense {id} cancelled");
            return SyncOutcome::Cancelled;
        }

        let deleted = {
            let _submitting = BusyFlag::raise(&mut self.is_submitting);
            self.api.delete_expense(&session.credential, id).await
        };

        if let Err(error) = deleted {
            return self.fail(error, Self::DELETE_FAILED);
        }

        tracing::info!("Deleted expense {id}");
        self.notices
            .push(Alert::success("Expense deleted successfully!", ""));
        self.load_all(session).await;

        SyncOutcome::Done
    }

    fn fail(&self, error: Error, fallback: &str) -> SyncOutcome {
        self.notices.push(error.into_alert(fallback));
        SyncOutcome::Failed
    }
}

impl fmt::Debug for ExpenseSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpenseSync")
            .field("records", &self.records)
            .field("total", &self.total)
            .field("records_stale", &self.records_stale)
            .field("total_stale", &self.total_stale)
            .field("is_loading", &self.is_loading)
            .field("is_submitting", &self.is_submitting)
            .finish_non_exhaustive()
    }
}
