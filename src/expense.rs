//! The expense domain model.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use time::{PrimitiveDateTime, format_description::well_known::Iso8601};

use crate::Error;

/// Alias for the integer type the remote store uses for expense IDs.
pub type ExpenseID = i64;

/// The fixed set of categories an expense can belong to.
///
/// Category names from the remote store are matched ignoring case, and a name
/// outside the set deserializes as [Category::Other].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// Groceries, restaurants and takeaways.
    Food,
    /// Fuel, fares and parking.
    Transportation,
    /// Going out, subscriptions and hobbies.
    Entertainment,
    /// Power, water, internet and phone bills.
    Utilities,
    /// Clothes, household goods and gifts.
    Shopping,
    /// Doctors, prescriptions and insurance.
    Healthcare,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transportation,
        Category::Entertainment,
        Category::Utilities,
        Category::Shopping,
        Category::Healthcare,
        Category::Other,
    ];

    /// The name of the category as sent to the remote store.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Healthcare => "Healthcare",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
                Error::Validation(format!(
                    "\"{name}\" is not a category, choose one of {}",
                    names.join(", ")
                ))
            })
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;

        Ok(name.parse().unwrap_or_else(|_| {
            tracing::warn!("Treating unknown category {name:?} as {}", Category::Other);
            Category::Other
        }))
    }
}

/// One tracked expense, as cached from the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// The ID of the expense in the remote store.
    #[serde(alias = "expenseId")]
    pub id: ExpenseID,
    /// What the money was spent on.
    #[serde(alias = "expenseName")]
    pub name: String,
    /// How much was spent.
    #[serde(alias = "expenseAmount")]
    pub amount: f64,
    /// The category the expense belongs to.
    pub category: Category,
    /// When the expense was recorded, if the remote store says.
    #[serde(
        default,
        alias = "createdAt",
        alias = "date",
        deserialize_with = "deserialize_created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<PrimitiveDateTime>,
}

/// Parse an ISO 8601 date time, treating anything unparseable as missing.
///
/// A bad timestamp on one record should not stop the whole list from loading.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<PrimitiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    Ok(raw.and_then(|raw| match PrimitiveDateTime::parse(&raw, &Iso8601::DEFAULT) {
        Ok(date_time) => Some(date_time),
        Err(error) => {
            tracing::warn!("Ignoring unparseable expense timestamp {raw:?}: {error}");
            None
        }
    }))
}

/// The request body for creating an expense.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// What the money was spent on.
    pub expense_name: String,
    /// How much was spent.
    pub expense_amount: f64,
    /// The category the expense belongs to.
    pub category: Category,
}

impl NewExpense {
    /// Create a new expense, checking that the fields can be sent as is.
    ///
    /// # Errors
    /// Returns [Error::Validation] if:
    /// - `name` is empty or only whitespace,
    /// - `amount` is not a finite number,
    /// - `amount` is negative.
    pub fn new(name: &str, amount: f64, category: Category) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            return Err(Error::Validation("Expense name cannot be empty".to_owned()));
        }

        if !amount.is_finite() {
            return Err(Error::Validation("Amount must be a number".to_owned()));
        }

        if amount < 0.0 {
            return Err(Error::Validation("Amount cannot be negative".to_owned()));
        }

        Ok(Self {
            expense_name: name.to_owned(),
            expense_amount: amount,
            category,
        })
    }
}

/// Parse an amount typed by the user, e.g. "12.50" or "$1,200".
///
/// # Errors
/// Returns [Error::Validation] if `raw_amount` is not a number.
pub fn parse_amount(raw_amount: &str) -> Result<f64, Error> {
    let cleaned: String = raw_amount
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::Validation(format!("\"{raw_amount}\" is not a valid amount")))
}

/// The sum of a user's expenses as computed by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotal {
    /// The sum of every expense amount.
    pub total_expenses: f64,
}

#[cfg(test)]
mod expense_tests {
    use time::macros::datetime;

    use crate::{
        Error,
        expense::{Category, ExpenseRecord, NewExpense, parse_amount},
    };

    #[test]
    fn record_deserializes_from_remote_field_names() {
        let record: ExpenseRecord = serde_json::from_str(
            r#"{
                "expenseId": 3,
                "expenseName": "Groceries",
                "expenseAmount": 85.5,
                "category": "Food",
                "createdAt": "2025-01-05T10:30:00"
            }"#,
        )
        .unwrap();

        assert_eq!(record.id, 3);
        assert_eq!(record.name, "Groceries");
        assert_eq!(record.amount, 85.5);
        assert_eq!(record.category, Category::Food);
        assert_eq!(record.created_at, Some(datetime!(2025-01-05 10:30:00)));
    }

    #[test]
    fn record_with_bad_timestamp_still_deserializes() {
        let record: ExpenseRecord = serde_json::from_str(
            r#"{"id": 1, "name": "Bus", "amount": 3, "category": "Transportation", "createdAt": "yesterday"}"#,
        )
        .unwrap();

        assert_eq!(record.created_at, None);
    }

    #[test]
    fn record_without_timestamp_deserializes() {
        let record: ExpenseRecord = serde_json::from_str(
            r#"{"id": 1, "name": "Bus", "amount": 3, "category": "Transportation"}"#,
        )
        .unwrap();

        assert_eq!(record.created_at, None);
    }

    #[test]
    fn new_expense_serializes_with_remote_field_names() {
        let expense = NewExpense::new("Movie", 25.0, Category::Entertainment).unwrap();

        let json = serde_json::to_value(&expense).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "expenseName": "Movie",
                "expenseAmount": 25.0,
                "category": "Entertainment"
            })
        );
    }

    #[test]
    fn new_expense_rejects_nan() {
        let result = NewExpense::new("Movie", f64::NAN, Category::Entertainment);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_expense_rejects_negative_amount() {
        let result = NewExpense::new("Refund", -5.0, Category::Other);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_expense_rejects_blank_name() {
        let result = NewExpense::new("   ", 5.0, Category::Other);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_expense_allows_zero() {
        assert!(NewExpense::new("Free sample", 0.0, Category::Food).is_ok());
    }

    #[test]
    fn parse_amount_accepts_currency_formatting() {
        assert_eq!(parse_amount("12.50"), Ok(12.5));
        assert_eq!(parse_amount(" $1,200 "), Ok(1200.0));
    }

    #[test]
    fn parse_amount_rejects_text() {
        assert!(matches!(parse_amount("twelve"), Err(Error::Validation(_))));
        assert!(matches!(parse_amount("inf"), Err(Error::Validation(_))));
    }

    #[test]
    fn unknown_category_deserializes_as_other() {
        let category: Category = serde_json::from_str("\"Rent\"").unwrap();

        assert_eq!(category, Category::Other);
        assert_eq!(
            serde_json::from_str::<Category>("\"HEALTHCARE\"").unwrap(),
            Category::Healthcare
        );
    }

    #[test]
    fn category_parses_ignoring_case() {
        assert_eq!("food".parse::<Category>(), Ok(Category::Food));
        assert_eq!(" UTILITIES ".parse::<Category>(), Ok(Category::Utilities));
        assert!("Rent".parse::<Category>().is_err());
    }
}
