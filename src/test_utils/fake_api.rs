//! An in-memory stand-in for the remote data store.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{
    Error,
    analytics::Summary,
    api::{ExpenseApi, LogInRequest, LogInResponse, ProfileUpdate, SignUpRequest},
    expense::{Category, ExpenseID, ExpenseRecord, NewExpense},
    session::Credential,
    user::UserID,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeUser {
    pub id: i64,
    pub user_name: String,
    pub email: String,
    pub mobile_number: String,
    pub password: String,
    pub monthly_limit: u32,
}

#[derive(Debug, Default)]
struct FakeState {
    expenses: Vec<ExpenseRecord>,
    next_expense_id: ExpenseID,
    users: Vec<FakeUser>,
    category_summary: Summary,
    monthly_report: Summary,
    failure: Option<Error>,
    stalled: bool,
    calls: usize,
    credentials: Vec<Credential>,
}

/// Records every call and serves them from memory.
///
/// Clones share the same state, so a test can keep a handle after giving one
/// to the code under test.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn insert_expense(&self, name: &str, amount: f64, category: Category) -> ExpenseID {
        let mut state = self.lock();
        state.next_expense_id += 1;
        let id = state.next_expense_id;
        state.expenses.push(ExpenseRecord {
            id,
            name: name.to_owned(),
            amount,
            category,
            created_at: None,
        });
        id
    }

    pub(crate) fn insert_user(&self, id: i64, user_name: &str, email: &str, password: &str) {
        self.lock().users.push(FakeUser {
            id,
            user_name: user_name.to_owned(),
            email: email.to_owned(),
            mobile_number: "0211234567".to_owned(),
            password: password.to_owned(),
            monthly_limit: 10_000,
        });
    }

    pub(crate) fn users(&self) -> Vec<FakeUser> {
        self.lock().users.clone()
    }

    pub(crate) fn set_category_summary<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, f64)>,
    ) {
        self.lock().category_summary = entries.into_iter().collect();
    }

    pub(crate) fn set_monthly_report<K: Into<String>>(
        &self,
        entries: impl IntoIterator<Item = (K, f64)>,
    ) {
        self.lock().monthly_report = entries.into_iter().collect();
    }

    /// Make every following call fail with `error`.
    pub(crate) fn fail_with(&self, error: Error) {
        self.lock().failure = Some(error);
    }

    /// Make every following data call hang until the caller gives up on it.
    pub(crate) fn stall(&self) {
        self.lock().stalled = true;
    }

    /// Undo [FakeApi::fail_with].
    pub(crate) fn recover(&self) {
        self.lock().failure = None;
    }

    pub(crate) fn call_count(&self) -> usize {
        self.lock().calls
    }

    /// The credentials attached to authenticated calls, oldest first.
    pub(crate) fn credentials(&self) -> Vec<Credential> {
        self.lock().credentials.clone()
    }

    async fn wait_if_stalled(&self) {
        let stalled = self.lock().stalled;

        if stalled {
            std::future::pending::<()>().await;
        }
    }

    fn begin(&self, credential: Option<&Credential>) -> Result<MutexGuard<'_, FakeState>, Error> {
        let mut state = self.lock();
        state.calls += 1;

        if let Some(credential) = credential {
            state.credentials.push(credential.clone());
        }

        match &state.failure {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

fn user_not_found() -> Error {
    Error::Remote {
        status: 404,
        message: Some("User not found".to_owned()),
    }
}

#[async_trait]
impl ExpenseApi for FakeApi {
    async fn log_in(&self, request: &LogInRequest) -> Result<LogInResponse, Error> {
        let state = self.begin(None)?;

        state
            .users
            .iter()
            .find(|user| user.email == request.email && user.password == request.password)
            .map(|user| LogInResponse {
                id: UserID::from(user.id),
                user_name: user.user_name.clone(),
                email: user.email.clone(),
                token: None,
            })
            .ok_or_else(|| Error::InvalidCredentials(Some("Invalid email or password".to_owned())))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), Error> {
        let mut state = self.begin(None)?;

        if let Some(user) = state
            .users
            .iter()
            .find(|user| user.email == request.email || user.user_name == request.user_name)
        {
            return Err(Error::Remote {
                status: 500,
                message: Some(format!(
                    "Duplicate entry '{}' for key 'users.email'",
                    user.email
                )),
            });
        }

        let id = state.users.iter().map(|user| user.id).max().unwrap_or(0) + 1;
        state.users.push(FakeUser {
            id,
            user_name: request.user_name.clone(),
            email: request.email.clone(),
            mobile_number: request.mobile_number.clone(),
            password: request.password.clone(),
            monthly_limit: request.monthly_limit,
        });

        Ok(())
    }

    async fn get_expenses(
        &self,
        credential: &Credential,
        _user_id: &UserID,
    ) -> Result<Vec<ExpenseRecord>, Error> {
        self.wait_if_stalled().await;
        Ok(self.begin(Some(credential))?.expenses.clone())
    }

    async fn get_total(&self, credential: &Credential, _user_id: &UserID) -> Result<f64, Error> {
        self.wait_if_stalled().await;
        Ok(self
            .begin(Some(credential))?
            .expenses
            .iter()
            .map(|expense| expense.amount)
            .sum())
    }

    async fn create_expense(
        &self,
        credential: &Credential,
        _user_id: &UserID,
        expense: &NewExpense,
    ) -> Result<(), Error> {
        self.wait_if_stalled().await;
        let mut state = self.begin(Some(credential))?;
        state.next_expense_id += 1;
        let id = state.next_expense_id;
        state.expenses.push(ExpenseRecord {
            id,
            name: expense.expense_name.clone(),
            amount: expense.expense_amount,
            category: expense.category,
            created_at: None,
        });

        Ok(())
    }

    async fn delete_expense(&self, credential: &Credential, id: ExpenseID) -> Result<(), Error> {
        self.wait_if_stalled().await;
        let mut state = self.begin(Some(credential))?;
        let count_before = state.expenses.len();
        state.expenses.retain(|expense| expense.id != id);

        if state.expenses.len() == count_before {
            return Err(Error::Remote {
                status: 404,
                message: Some("Expense not found".to_owned()),
            });
        }

        Ok(())
    }

    async fn get_category_summary(
        &self,
        credential: &Credential,
        _user_id: &UserID,
    ) -> Result<Summary, Error> {
        self.wait_if_stalled().await;
        Ok(self.begin(Some(credential))?.category_summary.clone())
    }

    async fn get_monthly_report(
        &self,
        credential: &Credential,
        _user_id: &UserID,
    ) -> Result<Summary, Error> {
        self.wait_if_stalled().await;
        Ok(self.begin(Some(credential))?.monthly_report.clone())
    }

    async fn update_user(
        &self,
        credential: &Credential,
        user_id: &UserID,
        update: &ProfileUpdate,
    ) -> Result<(), Error> {
        let mut state = self.begin(Some(credential))?;
        let user = state
            .users
            .iter_mut()
            .find(|user| user.id.to_string() == user_id.as_str())
            .ok_or_else(user_not_found)?;

        user.user_name = update.user_name.clone();
        user.email = update.email.clone();
        user.mobile_number = update.mobile_number.clone();
        user.monthly_limit = update.monthly_limit;

        Ok(())
    }

    async fn delete_user(&self, credential: &Credential, user_id: &UserID) -> Result<(), Error> {
        let mut state = self.begin(Some(credential))?;
        let count_before = state.users.len();
        state
            .users
            .retain(|user| user.id.to_string() != user_id.as_str());

        if state.users.len() == count_before {
            return Err(user_not_found());
        }

        Ok(())
    }
}
