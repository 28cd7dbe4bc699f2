//! Managing the logged in user's account: updating the profile and deleting
//! the account.

use crate::{
    Error,
    alert::{Alert, Notices},
    api::{ExpenseApi, ProfileUpdate},
    expense_sync::{Confirm, SyncOutcome},
    register_user::{
        validate_email, validate_mobile_number, validate_monthly_limit, validate_user_name,
    },
    session::SessionStore,
    storage::Storage,
    user::Profile,
};

/// The question asked before an account is deleted.
pub const DELETE_ACCOUNT_PROMPT: &str =
    "Are you sure you want to delete your account? This cannot be undone.";

/// The profile details as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    #[allow(missing_docs)]
    pub user_name: String,
    #[allow(missing_docs)]
    pub email: String,
    /// Digits only.
    pub mobile_number: String,
    /// Blank for the default limit.
    pub monthly_limit: String,
}

impl ProfileForm {
    /// Check the form with the same rules as sign-up.
    ///
    /// # Errors
    /// Returns [Error::Validation] describing the first invalid field.
    pub fn validate(&self) -> Result<ProfileUpdate, Error> {
        Ok(ProfileUpdate {
            user_name: validate_user_name(&self.user_name)?,
            email: validate_email(&self.email)?,
            mobile_number: validate_mobile_number(&self.mobile_number)?,
            monthly_limit: validate_monthly_limit(&self.monthly_limit)?,
        })
    }
}

/// Send the profile in `form` to the remote store, then save it locally.
pub async fn update_profile<S: Storage>(
    api: &dyn ExpenseApi,
    session_store: &mut SessionStore<S>,
    notices: &Notices,
    form: &ProfileForm,
) -> SyncOutcome {
    let Some(session) = session_store.session() else {
        return SyncOutcome::Waiting;
    };
    let Some(user_id) = session.user_id().cloned() else {
        return SyncOutcome::Waiting;
    };

    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => {
            notices.push(error.into_alert("Please check your input and try again."));
            return SyncOutcome::Failed;
        }
    };

    if let Err(error) = api
        .update_user(&session.credential, &user_id, &update)
        .await
    {
        notices.push(error.into_alert("Failed to update profile"));
        return SyncOutcome::Failed;
    }

    let profile = Profile {
        id: Some(user_id),
        username: Some(update.user_name),
        email: Some(update.email),
    };

    if let Err(error) = session_store.update_profile(profile) {
        tracing::error!("Could not save the updated profile: {error}");
        notices.push(Alert::error(
            "Profile updated, but it could not be saved on this device",
            error.to_string(),
        ));
        return SyncOutcome::Done;
    }

    notices.push(Alert::success("Profile updated successfully!", ""));
    SyncOutcome::Done
}

/// Delete the logged in user's account once `confirm` agrees, then log out.
pub async fn delete_account<S: Storage>(
    api: &dyn ExpenseApi,
    session_store: &mut SessionStore<S>,
    notices: &Notices,
    mut confirm: impl Confirm,
) -> SyncOutcome {
    let Some(session) = session_store.session() else {
        return SyncOutcome::Waiting;
    };
    let Some(user_id) = session.user_id() else {
        return SyncOutcome::Waiting;
    };

    if !confirm.confirm(DELETE_ACCOUNT_PROMPT) {
        return SyncOutcome::Cancelled;
    }

    if let Err(error) = api.delete_user(&session.credential, user_id).await {
        notices.push(error.into_alert("Failed to delete account"));
        return SyncOutcome::Failed;
    }

    tracing::info!("Deleted account of user {user_id}");
    session_store.logout();
    notices.push(Alert::success("Your account has been deleted", ""));

    SyncOutcome::Done
}
