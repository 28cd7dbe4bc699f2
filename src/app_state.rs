//! Implements a struct that holds the state of the client for one process.

use std::sync::Arc;

use crate::{
    account::{self, ProfileForm},
    alert::{Alert, Notices},
    analytics::Analytics,
    api::ExpenseApi,
    expense::{ExpenseID, NewExpense},
    expense_sync::{Confirm, ExpenseSync, SyncOutcome},
    log_in,
    navigation::View,
    register_user::{self, SignUpForm},
    session::SessionStore,
    storage::Storage,
};

/// The error shown when a logged in user tries to sign up.
pub const ALREADY_LOGGED_IN: &str = "You are already logged in. Log out to create a new account.";

/// The state of the client.
///
/// Owns the session and the cached data derived from it. There is one per
/// process, created at start-up and passed to whatever needs it.
pub struct AppState<S> {
    session_store: SessionStore<S>,
    api: Arc<dyn ExpenseApi>,
    notices: Notices,
    expenses: ExpenseSync,
    analytics: Analytics,
}

impl<S: Storage> AppState<S> {
    /// Create the state for a client that persists its session in `storage`
    /// and talks to the remote store through `api`.
    pub fn new(storage: S, api: Arc<dyn ExpenseApi>) -> Self {
        let notices = Notices::new();

        Self {
            session_store: SessionStore::new(storage),
            expenses: ExpenseSync::new(Arc::clone(&api), notices.clone()),
            analytics: Analytics::new(Arc::clone(&api), notices.clone()),
            api,
            notices,
        }
    }

    /// Restore the persisted session without loading anything.
    ///
    /// Returns whether a session is active.
    pub fn restore(&mut self) -> bool {
        self.session_store.restore()
    }

    /// Restore the persisted session and, if there is one, load the user's
    /// expenses and analytics.
    ///
    /// Returns whether a session is active.
    pub async fn start(&mut self) -> bool {
        if !self.restore() {
            return false;
        }

        self.load_everything().await;
        true
    }

    async fn load_everything(&mut self) {
        let Some(session) = self.session_store.session() else {
            return;
        };

        tokio::join!(
            self.expenses.load_all(session),
            self.analytics.refresh(session)
        );
    }

    /// Log in and load the user's data.
    pub async fn log_in(&mut self, email: &str, password: &str) -> SyncOutcome {
        let outcome = log_in::log_in(
            self.api.as_ref(),
            &mut self.session_store,
            &self.notices,
            email,
            password,
        )
        .await;

        if outcome == SyncOutcome::Done {
            self.load_everything().await;
        }

        outcome
    }

    /// Register a new user.
    ///
    /// The sign-up view is closed to a logged in user, so nothing is sent
    /// while a session is active.
    pub async fn sign_up(&mut self, form: &SignUpForm) -> SyncOutcome {
        if self.navigate(View::SignUp) != View::SignUp {
            self.notices.push(Alert::error_simple(ALREADY_LOGGED_IN));
            return SyncOutcome::Failed;
        }

        register_user::register_user(
            self.api.as_ref(),
            &mut self.session_store,
            &self.notices,
            form,
        )
        .await
    }

    /// Reload the expense list and total.
    pub async fn load_expenses(&mut self) -> SyncOutcome {
        match self.session_store.session() {
            Some(session) => self.expenses.load_all(session).await,
            None => SyncOutcome::Waiting,
        }
    }

    /// Reload both analytics series.
    pub async fn load_analytics(&mut self) -> SyncOutcome {
        match self.session_store.session() {
            Some(session) => self.analytics.refresh(session).await,
            None => SyncOutcome::Waiting,
        }
    }

    /// Create an expense and reload the list.
    pub async fn add_expense(&mut self, expense: NewExpense) -> SyncOutcome {
        match self.session_store.session() {
            Some(session) => self.expenses.create(session, expense).await,
            None => SyncOutcome::Waiting,
        }
    }

    /// Delete an expense once `confirm` agrees and reload the list.
    pub async fn delete_expense(&mut self, id: ExpenseID, confirm: impl Confirm) -> SyncOutcome {
        match self.session_store.session() {
            Some(session) => self.expenses.delete(session, id, confirm).await,
            None => SyncOutcome::Waiting,
        }
    }

    /// Update the user's profile.
    pub async fn update_profile(&mut self, form: &ProfileForm) -> SyncOutcome {
        account::update_profile(
            self.api.as_ref(),
            &mut self.session_store,
            &self.notices,
            form,
        )
        .await
    }

    /// Delete the user's account once `confirm` agrees, then log out.
    pub async fn delete_account(&mut self, confirm: impl Confirm) -> SyncOutcome {
        let outcome = account::delete_account(
            self.api.as_ref(),
            &mut self.session_store,
            &self.notices,
            confirm,
        )
        .await;

        if outcome == SyncOutcome::Done {
            self.clear_caches();
        }

        outcome
    }

    /// End the session and drop everything cached for it.
    pub fn log_out(&mut self) {
        self.session_store.logout();
        self.clear_caches();
    }

    fn clear_caches(&mut self) {
        self.expenses.clear();
        self.analytics.clear();
    }

    /// Navigate to `view`, or to wherever the route gate redirects it.
    pub fn navigate(&mut self, view: View) -> View {
        self.session_store.navigate(view)
    }

    /// The session store.
    pub fn session_store(&self) -> &SessionStore<S> {
        &self.session_store
    }

    /// The cached expenses.
    pub fn expenses(&self) -> &ExpenseSync {
        &self.expenses
    }

    /// The cached analytics series.
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    /// The queue of notices raised by every flow.
    pub fn notices(&self) -> &Notices {
        &self.notices
    }
}
