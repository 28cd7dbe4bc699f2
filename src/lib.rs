//! Expense Tracker is a client for tracking personal expenses against a
//! remote expense store.
//!
//! This library keeps the login session on disk, caches the user's expenses
//! and analytics, and talks to the remote store over HTTP. The
//! `expense-tracker` binary is a command line front end for it.

#![warn(missing_docs)]

mod account;
mod alert;
mod analytics;
mod api;
mod app_state;
pub mod charts;
mod config;
pub mod currency;
pub mod endpoints;
mod error;
mod expense;
mod expense_sync;
mod http_client;
mod log_in;
mod logging;
mod navigation;
mod register_user;
mod session;
mod storage;
mod user;

#[cfg(test)]
mod test_utils;

pub use account::{DELETE_ACCOUNT_PROMPT, ProfileForm, delete_account, update_profile};
pub use alert::{Alert, AlertType, Notices};
pub use analytics::{Analytics, SeriesPoint, Summary};
pub use api::{ExpenseApi, LogInRequest, LogInResponse, ProfileUpdate, SignUpRequest};
pub use app_state::{ALREADY_LOGGED_IN, AppState};
pub use config::{ClientConfig, ConfigArgs, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use error::Error;
pub use expense::{Category, ExpenseID, ExpenseRecord, ExpenseTotal, NewExpense, parse_amount};
pub use expense_sync::{Confirm, ExpenseSync, SyncOutcome};
pub use http_client::HttpExpenseApi;
pub use log_in::{INVALID_CREDENTIALS, log_in};
pub use navigation::{Navigation, View};
pub use register_user::{DEFAULT_MONTHLY_LIMIT, SignUpForm, register_user};
pub use session::{AUTHENTICATED_MARKER, Credential, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage, TOKEN_KEY, USER_DATA_KEY};
pub use user::{Profile, UserID};
