//! The remote store's endpoint paths.
//!
//! For endpoints that take a parameter, e.g., '/User/updateUser/{user_id}', use [format_endpoint].

use std::fmt::Display;

/// The route for authenticating a user with their email and password.
pub const LOG_IN: &str = "/auth/login";
/// The route for registering a new user.
pub const SIGN_UP: &str = "/auth/signup";
/// The route for listing every expense of a user.
pub const EXPENSES: &str = "/expenses/getAllExpenses/userId/{user_id}";
/// The route for the sum of a user's expenses.
pub const TOTAL_EXPENSES: &str = "/expenses/totalExpenses/userId/{user_id}";
/// The route for creating an expense for a user.
pub const POST_EXPENSE: &str = "/expenses/addExpense/userId/{user_id}";
/// The route for deleting a single expense.
pub const DELETE_EXPENSE: &str = "/expenses/deleteExpense/{expense_id}";
/// The route for a user's expense totals grouped by category.
pub const CATEGORY_SUMMARY: &str = "/expenses/categorySummary/userId/{user_id}";
/// The route for a user's expense totals grouped by month.
pub const MONTHLY_REPORT: &str = "/expenses/monthlyReport/userId/{user_id}";
/// The route for updating a user's profile.
pub const PUT_USER: &str = "/User/updateUser/{user_id}";
/// The route for deleting a user's account.
pub const DELETE_USER: &str = "/User/deleteUser/{user_id}";

/// Fill the `{...}` placeholder in `endpoint_path` with `id`.
///
/// Paths hold at most one placeholder. A path without one is returned as is.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
