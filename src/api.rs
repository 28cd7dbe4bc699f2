//! The interface to the remote data store.
//!
//! [ExpenseApi] is the narrow seam between the client logic and the transport.
//! [crate::HttpExpenseApi] implements it over HTTP; tests use an in-memory fake.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    analytics::Summary,
    expense::{ExpenseID, ExpenseRecord, NewExpense},
    session::{AUTHENTICATED_MARKER, Credential},
    user::{Profile, UserID},
};

/// The request body for authenticating a user.
#[derive(Clone, Serialize)]
pub struct LogInRequest {
    /// The user's email address.
    pub email: String,
    /// The user's password in plain text.
    pub password: String,
}

impl Debug for LogInRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogInRequest")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// The response body for a successful authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInResponse {
    /// The user's ID in the remote store.
    pub id: UserID,
    /// The user's display name.
    pub user_name: String,
    /// The user's email address.
    pub email: String,
    /// A token to attach to later requests, if the remote store issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LogInResponse {
    /// Split the response into the credential and profile of a new session.
    ///
    /// When the remote store did not issue a token, the credential is
    /// [AUTHENTICATED_MARKER].
    pub fn into_session_parts(self) -> (Credential, Profile) {
        let credential = match self.token {
            Some(token) if !token.is_empty() => Credential::new(token),
            _ => Credential::new(AUTHENTICATED_MARKER),
        };

        let profile = Profile {
            id: Some(self.id),
            username: Some(self.user_name),
            email: Some(self.email),
        };

        (credential, profile)
    }
}

/// The request body for registering a new user.
///
/// Build one with [crate::SignUpForm::validate].
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[allow(missing_docs)]
    pub user_name: String,
    #[allow(missing_docs)]
    pub email: String,
    /// Seven to fifteen digits.
    pub mobile_number: String,
    /// The password in plain text.
    pub password: String,
    /// The most the user wants to spend in a month.
    pub monthly_limit: u32,
}

impl Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("mobile_number", &self.mobile_number)
            .field("password", &"********")
            .field("monthly_limit", &self.monthly_limit)
            .finish()
    }
}

/// The request body for updating a user's profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[allow(missing_docs)]
    pub user_name: String,
    #[allow(missing_docs)]
    pub email: String,
    /// Seven to fifteen digits.
    pub mobile_number: String,
    /// The most the user wants to spend in a month.
    pub monthly_limit: u32,
}

/// The calls the client makes to the remote data store.
///
/// Every call except [ExpenseApi::log_in] and [ExpenseApi::sign_up] is
/// authenticated with the session's credential.
#[async_trait]
pub trait ExpenseApi: Send + Sync {
    /// Check an email and password.
    ///
    /// # Errors
    /// Returns [Error::InvalidCredentials] if the remote store rejects them.
    async fn log_in(&self, request: &LogInRequest) -> Result<LogInResponse, Error>;

    /// Register a new user.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), Error>;

    /// Get every expense of the user, in the order the remote store lists them.
    async fn get_expenses(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Vec<ExpenseRecord>, Error>;

    /// Get the sum of the user's expenses.
    async fn get_total(&self, credential: &Credential, user_id: &UserID) -> Result<f64, Error>;

    /// Create an expense for the user.
    async fn create_expense(
        &self,
        credential: &Credential,
        user_id: &UserID,
        expense: &NewExpense,
    ) -> Result<(), Error>;

    /// Delete an expense.
    async fn delete_expense(&self, credential: &Credential, id: ExpenseID) -> Result<(), Error>;

    /// Get the user's expense totals keyed by category.
    async fn get_category_summary(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Summary, Error>;

    /// Get the user's expense totals keyed by month.
    async fn get_monthly_report(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Summary, Error>;

    /// Update the user's profile.
    async fn update_user(
        &self,
        credential: &Credential,
        user_id: &UserID,
        update: &ProfileUpdate,
    ) -> Result<(), Error>;

    /// Delete the user's account.
    async fn delete_user(&self, credential: &Credential, user_id: &UserID) -> Result<(), Error>;
}
