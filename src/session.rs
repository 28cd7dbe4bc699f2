//! The session store: the single authority for who is logged in.
//!
//! A [SessionStore] owns the active [Session] (if any), persists it through a
//! [Storage] so that it survives restarts, and gates navigation so that
//! protected views are only shown to a logged in user.
//!
//! The store has two states, unauthenticated and authenticated. It becomes
//! authenticated through [SessionStore::restore] finding a persisted
//! credential or through [SessionStore::login], and only becomes
//! unauthenticated again through [SessionStore::logout]. A restored credential
//! is trusted as is: it is not checked against the remote store and there is
//! no expiry detection.

use std::fmt::Debug;

use crate::{
    Error,
    navigation::{Navigation, View},
    storage::{Storage, TOKEN_KEY, USER_DATA_KEY},
    user::{Profile, UserID},
};

/// The credential used when the remote store authenticates a user without
/// issuing a token.
pub const AUTHENTICATED_MARKER: &str = "authenticated";

/// An opaque token proving the user's identity.
///
/// The value is never printed by [Debug].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw credential.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw credential, for attaching to requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(********)")
    }
}

/// The authenticated identity held by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The credential attached to every authenticated request.
    pub credential: Credential,
    /// Whatever profile fields are known for the user.
    pub profile: Profile,
}

impl Session {
    /// The ID of the logged in user, if it is known and not blank.
    ///
    /// Every request for the user's data needs this ID.
    pub fn user_id(&self) -> Option<&UserID> {
        self.profile.user_id()
    }
}

/// Owns the current session, its persistence, and navigation.
#[derive(Debug)]
pub struct SessionStore<S> {
    storage: S,
    session: Option<Session>,
    navigation: Navigation,
}

impl<S: Storage> SessionStore<S> {
    /// Create an unauthenticated store that persists through `storage`.
    ///
    /// Call [SessionStore::restore] to pick up a previously persisted session.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            session: None,
            navigation: Navigation::default(),
        }
    }

    /// Activate the session persisted in storage, if there is one.
    ///
    /// A missing or empty credential leaves the store unauthenticated. A
    /// profile that cannot be parsed is logged and ignored, the session is
    /// still restored with an empty profile. Storage that cannot be read is
    /// treated as holding nothing.
    ///
    /// Returns whether a session is active afterwards.
    pub fn restore(&mut self) -> bool {
        let credential = match self.storage.get(TOKEN_KEY) {
            Ok(Some(credential)) if !credential.is_empty() => credential,
            Ok(_) => {
                tracing::debug!("No persisted credential, staying logged out.");
                return self.is_authenticated();
            }
            Err(error) => {
                tracing::warn!("Could not read the persisted credential: {error}");
                return self.is_authenticated();
            }
        };

        let profile = self.read_profile();
        tracing::info!(
            "Restored session for user {:?}",
            profile.user_id().map(UserID::as_str)
        );

        self.session = Some(Session {
            credential: Credential::new(credential),
            profile,
        });

        true
    }

    fn read_profile(&self) -> Profile {
        let raw_profile = match self.storage.get(USER_DATA_KEY) {
            Ok(Some(raw_profile)) => raw_profile,
            Ok(None) => return Profile::default(),
            Err(error) => {
                tracing::warn!("Could not read the persisted profile: {error}");
                return Profile::default();
            }
        };

        match parse_profile(&raw_profile) {
            Ok(profile) => profile,
            Err(error) => {
                tracing::warn!("Ignoring persisted profile: {error}");
                Profile::default()
            }
        }
    }

    /// Persist `credential` and `profile`, activate the session and navigate
    /// to the dashboard.
    ///
    /// This does not validate the credential, call it only after the remote
    /// store has authenticated the user. When `profile` is `None` any profile
    /// persisted by an earlier session is removed so that it cannot be
    /// restored alongside the new credential.
    ///
    /// # Errors
    /// Returns [Error::Storage] if the session could not be persisted. The
    /// session is active and the dashboard is shown even in that case, it will
    /// just not survive a restart.
    pub fn login(&mut self, credential: Credential, profile: Option<Profile>) -> Result<(), Error> {
        let persisted = self.persist(&credential, profile.as_ref());

        self.session = Some(Session {
            credential,
            profile: profile.unwrap_or_default(),
        });
        self.navigation.go_to(View::Dashboard);

        if let Err(error) = &persisted {
            tracing::error!("Could not persist the session: {error}");
        }

        persisted
    }

    fn persist(&self, credential: &Credential, profile: Option<&Profile>) -> Result<(), Error> {
        self.storage.set(TOKEN_KEY, credential.as_str())?;

        match profile {
            Some(profile) => self.storage.set(USER_DATA_KEY, &serialize_profile(profile)?),
            None => self.storage.remove(USER_DATA_KEY),
        }
    }

    /// Replace the profile of the active session and persist it.
    ///
    /// The credential and the current view are left unchanged.
    ///
    /// # Errors
    /// Returns [Error::NotAuthenticated] if no session is active, or
    /// [Error::Storage] if the profile could not be persisted. In the latter
    /// case the in-memory profile is still replaced.
    pub fn update_profile(&mut self, profile: Profile) -> Result<(), Error> {
        let session = self.session.as_mut().ok_or(Error::NotAuthenticated)?;
        let serialized = serialize_profile(&profile)?;
        session.profile = profile;

        self.storage.set(USER_DATA_KEY, &serialized)
    }

    /// Clear the persisted session, deactivate it, and navigate to the log-in
    /// view.
    ///
    /// Calling this without an active session is harmless. Storage failures
    /// are logged rather than returned: the in-memory session is always
    /// cleared.
    pub fn logout(&mut self) {
        for key in [TOKEN_KEY, USER_DATA_KEY] {
            if let Err(error) = self.storage.remove(key) {
                tracing::error!("Could not remove {key} from session storage: {error}");
            }
        }

        if self.session.take().is_some() {
            tracing::info!("Logged out.");
        }

        self.navigation.go_to(View::LogIn);
    }

    /// Whether a session is active.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The active session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The ID of the logged in user, if there is one and it is known.
    pub fn user_id(&self) -> Option<&UserID> {
        self.session.as_ref().and_then(Session::user_id)
    }

    /// Navigate to `requested`, or to wherever the route gate redirects it.
    ///
    /// Returns the view that is shown.
    pub fn navigate(&mut self, requested: View) -> View {
        let view = requested.gate(self.is_authenticated());

        if view != requested {
            tracing::debug!("Redirecting {requested} to {view}");
        }

        self.navigation.go_to(view);
        view
    }

    /// The view currently shown.
    pub fn current_view(&self) -> View {
        self.navigation.current()
    }

    /// The navigation history.
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// The storage the session is persisted to.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

fn parse_profile(raw_profile: &str) -> Result<Profile, Error> {
    serde_json::from_str(raw_profile).map_err(|error| Error::CorruptProfile(error.to_string()))
}

fn serialize_profile(profile: &Profile) -> Result<String, Error> {
    serde_json::to_string(profile).map_err(|error| Error::Storage(error.to_string()))
}
