//! Client configuration from command line arguments and the environment.

use std::{path::PathBuf, time::Duration};

use directories::ProjectDirs;
use reqwest::Url;

use crate::Error;

/// The API address used when none is given.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// How long a request may take, in seconds, when no timeout is given.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything the client needs to know before it can start.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// The address of the remote store, e.g. "https://expenses.example.com/api".
    pub base_url: Url,
    /// The directory for the persisted session and the debug log.
    pub data_dir: PathBuf,
    /// How long a request may take before it is abandoned.
    pub request_timeout: Duration,
}

/// The command line arguments that configure the client.
///
/// Each argument falls back to an environment variable.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// The address of the expense tracker API.
    #[arg(long, env = "EXPENSE_TRACKER_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// The directory to keep the session and logs in [default: the platform data directory].
    #[arg(long, env = "EXPENSE_TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// How many seconds a request may take.
    #[arg(long, env = "EXPENSE_TRACKER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ConfigArgs {
    /// Check the arguments and fill in the defaults.
    ///
    /// # Errors
    /// Returns [Error::Config] if:
    /// - the API address is not an absolute http or https URL,
    /// - the timeout is zero,
    /// - no data directory was given and the platform has none.
    pub fn into_config(self) -> Result<ClientConfig, Error> {
        let base_url = parse_base_url(&self.api_url)?;

        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "the request timeout must be at least one second".to_owned(),
            ));
        }

        let data_dir = match self.data_dir {
            Some(data_dir) => data_dir,
            None => default_data_dir()?,
        };

        Ok(ClientConfig {
            base_url,
            data_dir,
            request_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

fn parse_base_url(raw_url: &str) -> Result<Url, Error> {
    let url = Url::parse(raw_url.trim())
        .map_err(|error| Error::Config(format!("\"{raw_url}\" is not a valid URL: {error}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!(
            "the API address must use http or https, not {scheme}"
        ))),
    }
}

fn default_data_dir() -> Result<PathBuf, Error> {
    ProjectDirs::from("", "", "expense-tracker")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            Error::Config(
                "could not find a data directory, set EXPENSE_TRACKER_DATA_DIR".to_owned(),
            )
        })
}
