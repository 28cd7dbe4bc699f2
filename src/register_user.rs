//! Creating a new account with the remote store.

use email_address::EmailAddress;

use crate::{
    Error,
    alert::{Alert, Notices},
    api::{ExpenseApi, SignUpRequest},
    expense_sync::SyncOutcome,
    navigation::View,
    session::SessionStore,
    storage::Storage,
};

/// The shortest user name the remote store accepts.
pub const USER_NAME_MIN_LENGTH: usize = 3;
/// The longest user name the remote store accepts.
pub const USER_NAME_MAX_LENGTH: usize = 30;
/// The longest email address the remote store accepts.
pub const EMAIL_MAX_LENGTH: usize = 255;
/// The shortest password the remote store accepts.
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// The longest password the remote store accepts.
pub const PASSWORD_MAX_LENGTH: usize = 100;
/// The largest monthly spending limit a user can set.
pub const MONTHLY_LIMIT_MAX: u32 = 100_000_000;
/// The monthly spending limit used when the user leaves it blank.
pub const DEFAULT_MONTHLY_LIMIT: u32 = 10_000;

/// The sign-up details as typed by the user.
#[derive(Clone, Default)]
pub struct SignUpForm {
    /// The display name for the new user.
    pub user_name: String,
    /// The email address the user will log in with.
    pub email: String,
    /// The user's mobile number, digits only.
    pub mobile_number: String,
    /// The password the user will log in with.
    pub password: String,
    /// The monthly spending limit, blank for [DEFAULT_MONTHLY_LIMIT].
    pub monthly_limit: String,
}

impl std::fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpForm")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("mobile_number", &self.mobile_number)
            .field("password", &"********")
            .field("monthly_limit", &self.monthly_limit)
            .finish()
    }
}

impl SignUpForm {
    /// Check the form and build the request to send.
    ///
    /// Text fields other than the password are trimmed.
    ///
    /// # Errors
    /// Returns [Error::Validation] describing the first field that is invalid,
    /// checked in the order the fields appear on the form.
    pub fn validate(&self) -> Result<SignUpRequest, Error> {
        Ok(SignUpRequest {
            user_name: validate_user_name(&self.user_name)?,
            email: validate_email(&self.email)?,
            mobile_number: validate_mobile_number(&self.mobile_number)?,
            password: validate_password(&self.password)?,
            monthly_limit: validate_monthly_limit(&self.monthly_limit)?,
        })
    }
}

pub(crate) fn validate_user_name(user_name: &str) -> Result<String, Error> {
    let user_name = user_name.trim();
    let length = user_name.chars().count();

    if length < USER_NAME_MIN_LENGTH {
        return Err(Error::Validation(format!(
            "Username must be at least {USER_NAME_MIN_LENGTH} characters"
        )));
    }

    if length > USER_NAME_MAX_LENGTH {
        return Err(Error::Validation(format!(
            "Username must be at most {USER_NAME_MAX_LENGTH} characters"
        )));
    }

    Ok(user_name.to_owned())
}

pub(crate) fn validate_email(email: &str) -> Result<String, Error> {
    let email = email.trim();

    if !EmailAddress::is_valid(email) {
        return Err(Error::Validation("Enter a valid email address".to_owned()));
    }

    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(Error::Validation(format!(
            "Email must be at most {EMAIL_MAX_LENGTH} characters"
        )));
    }

    Ok(email.to_owned())
}

pub(crate) fn validate_mobile_number(mobile_number: &str) -> Result<String, Error> {
    let mobile_number = mobile_number.trim();

    if !(7..=15).contains(&mobile_number.len())
        || !mobile_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::Validation(
            "Mobile number must be 7-15 digits".to_owned(),
        ));
    }

    Ok(mobile_number.to_owned())
}

fn validate_password(password: &str) -> Result<String, Error> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(Error::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(Error::Validation(format!(
            "Password must be at most {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(password.to_owned())
}

pub(crate) fn validate_monthly_limit(monthly_limit: &str) -> Result<u32, Error> {
    let monthly_limit = monthly_limit.trim();

    if monthly_limit.is_empty() {
        return Ok(DEFAULT_MONTHLY_LIMIT);
    }

    monthly_limit
        .parse::<u32>()
        .ok()
        .filter(|limit| (1..=MONTHLY_LIMIT_MAX).contains(limit))
        .ok_or_else(|| {
            Error::Validation(format!(
                "Monthly limit must be a whole number from 1 to {MONTHLY_LIMIT_MAX}"
            ))
        })
}

/// Register a new user with the details in `form`.
///
/// On success the user is sent to the log-in view to sign in with their new
/// account. Nothing is sent if the form is invalid.
pub async fn register_user<S: Storage>(
    api: &dyn ExpenseApi,
    session_store: &mut SessionStore<S>,
    notices: &Notices,
    form: &SignUpForm,
) -> SyncOutcome {
    let request = match form.validate() {
        Ok(request) => request,
        Err(error) => {
            notices.push(error.into_alert("Please check your input and try again."));
            return SyncOutcome::Failed;
        }
    };

    match api.sign_up(&request).await {
        Ok(()) => {
            tracing::info!("Registered new user {:?}", request.user_name);
            notices.push(Alert::success(
                "Account created successfully! Please sign in.",
                "",
            ));
            session_store.navigate(View::LogIn);
            SyncOutcome::Done
        }
        Err(error) if is_duplicate_user(&error) => {
            notices.push(Alert::error_simple(
                "User already exists. Try a different username or email.",
            ));
            SyncOutcome::Failed
        }
        Err(error) => {
            notices.push(error.into_alert("Failed to create account. Please try again."));
            SyncOutcome::Failed
        }
    }
}

/// The remote store reports a unique constraint violation as a server error.
fn is_duplicate_user(error: &Error) -> bool {
    match error {
        Error::Remote {
            status: 500,
            message: Some(message),
        } => message.to_lowercase().contains("duplicate entry"),
        _ => false,
    }
}
