//! The views of the application and the rules for which ones a user may see.

use std::fmt::Display;

/// A screen of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The unauthenticated entry view.
    LogIn,
    /// The registration form.
    SignUp,
    /// The landing view for logged in users.
    Dashboard,
    /// Charts of expenses by category and month.
    Analytics,
    /// The user's profile and account settings.
    Settings,
}

impl View {
    /// The route for the view.
    pub fn path(self) -> &'static str {
        match self {
            View::LogIn => "/login",
            View::SignUp => "/signup",
            View::Dashboard => "/dashboard",
            View::Analytics => "/analytics",
            View::Settings => "/settings",
        }
    }

    /// Whether the view may only be shown to a logged in user.
    pub fn is_protected(self) -> bool {
        matches!(self, View::Dashboard | View::Analytics | View::Settings)
    }

    /// The view to show when `self` is requested.
    ///
    /// Protected views redirect to [View::LogIn] when nobody is logged in, and
    /// the log-in and sign-up views redirect to [View::Dashboard] when someone
    /// is.
    pub fn gate(self, is_authenticated: bool) -> View {
        match (self.is_protected(), is_authenticated) {
            (true, false) => View::LogIn,
            (false, true) => View::Dashboard,
            _ => self,
        }
    }
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Tracks the current view and every view that has been navigated to.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    current: View,
    history: Vec<View>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            current: View::LogIn,
            history: Vec::new(),
        }
    }
}

impl Navigation {
    /// The most views kept in the history.
    pub const HISTORY_LIMIT: usize = 32;

    /// The view currently shown.
    pub fn current(&self) -> View {
        self.current
    }

    /// The most recent views navigated to, oldest first.
    pub fn history(&self) -> &[View] {
        &self.history
    }

    /// Show `view`, bypassing the route gate.
    pub(crate) fn go_to(&mut self, view: View) {
        tracing::debug!("Navigating to {view}");
        self.current = view;

        if self.history.len() == Self::HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(view);
    }
}
