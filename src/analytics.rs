//! Spending summaries reshaped into ordered, chart-ready series.
//!
//! The remote store sends each summary as a JSON object mapping a label (a
//! category or a month) to an amount. The series keep the labels in exactly
//! the order the server sent them: nothing here sorts or re-keys them.

use std::{fmt, sync::Arc};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};

use crate::{
    Error,
    alert::Notices,
    api::ExpenseApi,
    expense_sync::{BusyFlag, SyncOutcome},
    session::Session,
};

/// One labelled amount in a chart series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// The category or month.
    pub key: String,
    /// The total spent.
    pub value: f64,
}

/// A mapping from label to amount that remembers the order of its entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary(Vec<(String, f64)>);

impl Summary {
    /// The number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reshape the summary into a series, keeping the entry order.
    pub fn into_series(self) -> Vec<SeriesPoint> {
        self.0
            .into_iter()
            .map(|(key, value)| SeriesPoint { key, value })
            .collect()
    }

    fn insert(&mut self, key: String, value: f64) {
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Summary {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut summary = Summary::default();

        for (key, value) in iter {
            summary.insert(key.into(), value);
        }

        summary
    }
}

impl<'de> Deserialize<'de> for Summary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(SummaryVisitor)
    }
}

struct SummaryVisitor;

impl<'de> Visitor<'de> for SummaryVisitor {
    type Value = Summary;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an object mapping labels to amounts")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut summary = Summary(Vec::with_capacity(access.size_hint().unwrap_or(0)));

        while let Some((key, value)) = access.next_entry::<String, f64>()? {
            summary.insert(key, value);
        }

        Ok(summary)
    }
}

/// Holds the category and monthly series shown on the analytics view.
///
/// Both series are replaced wholesale on every load. When a load fails both
/// are cleared, so the view shows that there is no data rather than a mix of
/// old and new figures.
pub struct Analytics {
    api: Arc<dyn ExpenseApi>,
    notices: Notices,
    categories: Vec<SeriesPoint>,
    months: Vec<SeriesPoint>,
    is_loading: bool,
}

impl Analytics {
    const LOAD_FAILED: &'static str = "Failed to load analytics data";

    /// Create a controller with empty series.
    pub fn new(api: Arc<dyn ExpenseApi>, notices: Notices) -> Self {
        Self {
            api,
            notices,
            categories: Vec::new(),
            months: Vec::new(),
            is_loading: false,
        }
    }

    /// Expense totals by category, in the order the server sent them.
    pub fn categories(&self) -> &[SeriesPoint] {
        &self.categories
    }

    /// Expense totals by month, in the order the server sent them.
    pub fn months(&self) -> &[SeriesPoint] {
        &self.months
    }

    /// Whether a load is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Drop both series.
    pub fn clear(&mut self) {
        self.categories.clear();
        self.months.clear();
    }

    /// Fetch the category summary and replace the category series.
    pub async fn load_category_summary(&mut self, session: &Session) -> SyncOutcome {
        let Some(user_id) = session.user_id() else {
            return SyncOutcome::Waiting;
        };

        let result = {
            let _loading = BusyFlag::raise(&mut self.is_loading);
            self.api
                .get_category_summary(&session.credential, user_id)
                .await
        };

        match result {
            Ok(summary) => {
                self.categories = summary.into_series();
                SyncOutcome::Done
            }
            Err(error) => self.fail(error),
        }
    }

    /// Fetch the monthly report and replace the monthly series.
    pub async fn load_monthly_report(&mut self, session: &Session) -> SyncOutcome {
        let Some(user_id) = session.user_id() else {
            return SyncOutcome::Waiting;
        };

        let result = {
            let _loading = BusyFlag::raise(&mut self.is_loading);
            self.api
                .get_monthly_report(&session.credential, user_id)
                .await
        };

        match result {
            Ok(summary) => {
                self.months = summary.into_series();
                SyncOutcome::Done
            }
            Err(error) => self.fail(error),
        }
    }

    /// Fetch both summaries at once and replace both series.
    ///
    /// If either fetch fails, both series are cleared and a single error
    /// notice is raised.
    pub async fn refresh(&mut self, session: &Session) -> SyncOutcome {
        let Some(user_id) = session.user_id() else {
            return SyncOutcome::Waiting;
        };

        let (categories, months) = {
            let _loading = BusyFlag::raise(&mut self.is_loading);
            tokio::join!(
                self.api.get_category_summary(&session.credential, user_id),
                self.api.get_monthly_report(&session.credential, user_id),
            )
        };

        match (categories, months) {
            (Ok(categories), Ok(months)) => {
                tracing::debug!(
                    "Loaded {} categories and {} months",
                    categories.len(),
                    months.len()
                );
                self.categories = categories.into_series();
                self.months = months.into_series();
                SyncOutcome::Done
            }
            (Err(error), _) | (_, Err(error)) => self.fail(error),
        }
    }

    fn fail(&mut self, error: Error) -> SyncOutcome {
        self.clear();
        self.notices.push(error.into_alert(Self::LOAD_FAILED));
        SyncOutcome::Failed
    }
}

impl fmt::Debug for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analytics")
            .field("categories", &self.categories)
            .field("months", &self.months)
            .field("is_loading", &self.is_loading)
            .finish_non_exhaustive()
    }
}
