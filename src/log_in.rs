//! Logging a user in with their email and password.
//!
//! The remote store checks the credentials; [crate::SessionStore] takes over
//! once it has accepted them.

use crate::{
    Error,
    alert::{Alert, Notices},
    api::{ExpenseApi, LogInRequest},
    expense_sync::SyncOutcome,
    session::SessionStore,
    storage::Storage,
};

/// The error shown when the remote store rejects a log-in without saying why.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";

/// Ask the remote store to authenticate `email` and `password`, and start a
/// session for the user if it does.
///
/// A rejected log-in leaves the session store untouched.
pub async fn log_in<S: Storage>(
    api: &dyn ExpenseApi,
    session_store: &mut SessionStore<S>,
    notices: &Notices,
    email: &str,
    password: &str,
) -> SyncOutcome {
    let email = email.trim();

    if email.is_empty() || password.is_empty() {
        notices.push(
            Error::Validation("Enter your email and password".to_owned())
                .into_alert(INVALID_CREDENTIALS),
        );
        return SyncOutcome::Failed;
    }

    let request = LogInRequest {
        email: email.to_owned(),
        password: password.to_owned(),
    };

    let response = match api.log_in(&request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::debug!("Log-in for {email} failed: {error}");
            notices.push(error.into_alert(INVALID_CREDENTIALS));
            return SyncOutcome::Failed;
        }
    };

    let (credential, profile) = response.into_session_parts();
    tracing::info!("Logged in as user {:?}", profile.id);

    if let Err(error) = session_store.login(credential, Some(profile)) {
        // The session is active for this run even though it was not saved.
        notices.push(Alert::error(
            "Could not save your session",
            format!("You will need to log in again next time: {error}"),
        ));
    }

    notices.push(Alert::success("Welcome back!", ""));
    SyncOutcome::Done
}
