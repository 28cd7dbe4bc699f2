//! The remote store client, speaking JSON over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    Error,
    analytics::Summary,
    api::{ExpenseApi, LogInRequest, LogInResponse, ProfileUpdate, SignUpRequest},
    endpoints::{self, format_endpoint},
    expense::{ExpenseID, ExpenseRecord, ExpenseTotal, NewExpense},
    logging::{log_request, log_response},
    session::Credential,
    user::UserID,
};

/// The shape of the error bodies sent by the remote store.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The total endpoint has answered with both a bare number and an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TotalBody {
    Object(ExpenseTotal),
    Number(f64),
}

/// An [ExpenseApi] that sends requests to a remote store over HTTP.
///
/// Authenticated requests carry the credential as a bearer token.
#[derive(Debug, Clone)]
pub struct HttpExpenseApi {
    client: Client,
    base_url: String,
}

impl HttpExpenseApi {
    /// Create a client for the remote store at `base_url`.
    ///
    /// Requests that take longer than `request_timeout` fail with
    /// [Error::Transport].
    ///
    /// # Errors
    /// Returns [Error::Transport] if the HTTP client could not be built.
    pub fn new(base_url: &Url, request_timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| Error::Transport(format!("could not create HTTP client: {error}")))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        body: Option<String>,
    ) -> Result<String, Error> {
        let url = self.url(path);
        let mut request = self.client.request(method.clone(), &url);

        if let Some(credential) = credential {
            request = request.bearer_auth(credential.as_str());
        }

        log_request(&method, &url, body.as_deref().unwrap_or_default());

        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        log_response(&method, &url, status, &text);

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(text)
    }

    /// Get a summary, treating an empty, `null` or 204 response as no data yet.
    async fn get_summary(&self, path: &str, credential: &Credential) -> Result<Summary, Error> {
        let text = self.send(Method::GET, path, Some(credential), None).await?;

        if text.trim().is_empty() {
            return Ok(Summary::default());
        }

        decode::<Option<Summary>>(&text).map(Option::unwrap_or_default)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, credential: &Credential) -> Result<T, Error> {
        let text = self.send(Method::GET, path, Some(credential), None).await?;
        decode(&text)
    }
}

fn encode<T: Serialize>(body: &T) -> Result<String, Error> {
    serde_json::to_string(body)
        .map_err(|error| Error::Transport(format!("could not encode the request: {error}")))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(text)
        .map_err(|error| Error::Transport(format!("could not decode the response: {error}")))
}

/// Get the `message` field of an error body, if it has one.
fn error_message(text: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}

fn is_rejected_login(status: u16) -> bool {
    matches!(status, 400 | 401 | 403 | 404)
}

#[async_trait]
impl ExpenseApi for HttpExpenseApi {
    async fn log_in(&self, request: &LogInRequest) -> Result<LogInResponse, Error> {
        let body = encode(request)?;

        match self.send(Method::POST, endpoints::LOG_IN, None, Some(body)).await {
            Ok(text) => decode(&text),
            Err(Error::Remote { status, message }) if is_rejected_login(status) => {
                Err(Error::InvalidCredentials(message))
            }
            Err(error) => Err(error),
        }
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), Error> {
        let body = encode(request)?;
        self.send(Method::POST, endpoints::SIGN_UP, None, Some(body))
            .await
            .map(|_| ())
    }

    async fn get_expenses(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Vec<ExpenseRecord>, Error> {
        self.get(&format_endpoint(endpoints::EXPENSES, user_id), credential)
            .await
    }

    async fn get_total(&self, credential: &Credential, user_id: &UserID) -> Result<f64, Error> {
        let total: TotalBody = self
            .get(&format_endpoint(endpoints::TOTAL_EXPENSES, user_id), credential)
            .await?;

        Ok(match total {
            TotalBody::Object(total) => total.total_expenses,
            TotalBody::Number(total) => total,
        })
    }

    async fn create_expense(
        &self,
        credential: &Credential,
        user_id: &UserID,
        expense: &NewExpense,
    ) -> Result<(), Error> {
        let body = encode(expense)?;
        self.send(
            Method::POST,
            &format_endpoint(endpoints::POST_EXPENSE, user_id),
            Some(credential),
            Some(body),
        )
        .await
        .map(|_| ())
    }

    async fn delete_expense(&self, credential: &Credential, id: ExpenseID) -> Result<(), Error> {
        self.send(
            Method::DELETE,
            &format_endpoint(endpoints::DELETE_EXPENSE, id),
            Some(credential),
            None,
        )
        .await
        .map(|_| ())
    }

    async fn get_category_summary(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Summary, Error> {
        self.get_summary(&format_endpoint(endpoints::CATEGORY_SUMMARY, user_id), credential)
            .await
    }

    async fn get_monthly_report(
        &self,
        credential: &Credential,
        user_id: &UserID,
    ) -> Result<Summary, Error> {
        self.get_summary(&format_endpoint(endpoints::MONTHLY_REPORT, user_id), credential)
            .await
    }

    async fn update_user(
        &self,
        credential: &Credential,
        user_id: &UserID,
        update: &ProfileUpdate,
    ) -> Result<(), Error> {
        let body = encode(update)?;
        self.send(
            Method::PUT,
            &format_endpoint(endpoints::PUT_USER, user_id),
            Some(credential),
            Some(body),
        )
        .await
        .map(|_| ())
    }

    async fn delete_user(&self, credential: &Credential, user_id: &UserID) -> Result<(), Error> {
        self.send(
            Method::DELETE,
            &format_endpoint(endpoints::DELETE_USER, user_id),
            Some(credential),
            None,
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod http_client_tests {
    use std::{sync::Arc, time::Duration};

    use reqwest::Url;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    use crate::{
        Error,
        alert::Notices,
        analytics::{Analytics, SeriesPoint},
        api::{ExpenseApi, LogInRequest},
        expense_sync::SyncOutcome,
        expense::{Category, NewExpense},
        http_client::HttpExpenseApi,
        session::{Credential, Session},
        user::{Profile, UserID},
    };

    fn api_for(server: &MockServer) -> HttpExpenseApi {
        let base_url = Url::parse(&server.uri()).unwrap();
        HttpExpenseApi::new(&base_url, Duration::from_secs(5)).unwrap()
    }

    fn credential() -> Credential {
        Credential::new("token")
    }

    #[tokio::test]
    async fn get_expenses_sends_bearer_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/getAllExpenses/userId/7"))
            .and(header("Authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"expenseId": 1, "expenseName": "Lunch", "expenseAmount": 12.5, "category": "Food"},
                {"expenseId": 2, "expenseName": "Bus", "expenseAmount": 3, "category": "Transportation"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let expenses = api_for(&server)
            .get_expenses(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        let ids: Vec<_> = expenses.iter().map(|expense| expense.id).collect();
        assert_eq!(ids, [1, 2]);
        assert_eq!(expenses[1].category, Category::Transportation);
    }

    #[tokio::test]
    async fn get_total_reads_total_expenses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/totalExpenses/userId/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"totalExpenses": 340.5})))
            .mount(&server)
            .await;

        let total = api_for(&server)
            .get_total(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        assert_eq!(total, 340.5);
    }

    #[tokio::test]
    async fn get_total_accepts_bare_number() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/totalExpenses/userId/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(12.5)))
            .mount(&server)
            .await;

        let total = api_for(&server)
            .get_total(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        assert_eq!(total, 12.5);
    }

    #[tokio::test]
    async fn create_expense_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/expenses/addExpense/userId/7"))
            .and(body_json(json!({
                "expenseName": "Movie",
                "expenseAmount": 25.0,
                "category": "Entertainment"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        let expense = NewExpense::new("Movie", 25.0, Category::Entertainment).unwrap();

        let result = api_for(&server)
            .create_expense(&credential(), &UserID::new("7"), &expense)
            .await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn delete_expense_uses_expense_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/expenses/deleteExpense/42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let result = api_for(&server).delete_expense(&credential(), 42).await;

        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/expenses/deleteExpense/42"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Expense not found"})),
            )
            .mount(&server)
            .await;

        let result = api_for(&server).delete_expense(&credential(), 42).await;

        assert_eq!(
            result,
            Err(Error::Remote {
                status: 404,
                message: Some("Expense not found".to_owned())
            })
        );
    }

    #[tokio::test]
    async fn error_status_without_json_has_no_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/getAllExpenses/userId/7"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let result = api_for(&server)
            .get_expenses(&credential(), &UserID::new("7"))
            .await;

        assert_eq!(
            result,
            Err(Error::Remote {
                status: 502,
                message: None
            })
        );
    }

    #[tokio::test]
    async fn rejected_log_in_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Wrong password"})),
            )
            .mount(&server)
            .await;
        let request = LogInRequest {
            email: "jo@example.com".to_owned(),
            password: "hunter2".to_owned(),
        };

        let result = api_for(&server).log_in(&request).await;

        assert_eq!(
            result,
            Err(Error::InvalidCredentials(Some("Wrong password".to_owned())))
        );
    }

    #[tokio::test]
    async fn log_in_parses_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "jo@example.com", "password": "hunter2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "userName": "jo",
                "email": "jo@example.com"
            })))
            .mount(&server)
            .await;
        let request = LogInRequest {
            email: "jo@example.com".to_owned(),
            password: "hunter2".to_owned(),
        };

        let response = api_for(&server).log_in(&request).await.unwrap();

        assert_eq!(response.id, UserID::new("7"));
        assert_eq!(response.user_name, "jo");
        assert_eq!(response.token, None);
    }

    #[tokio::test]
    async fn category_summary_keeps_response_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/categorySummary/userId/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "application/json")
                    .set_body_string(r#"{"Utilities": 120, "Food": 150.5, "Entertainment": 25}"#),
            )
            .mount(&server)
            .await;

        let summary = api_for(&server)
            .get_category_summary(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        let keys: Vec<_> = summary
            .into_series()
            .into_iter()
            .map(|SeriesPoint { key, .. }| key)
            .collect();
        assert_eq!(keys, ["Utilities", "Food", "Entertainment"]);
    }

    #[tokio::test]
    async fn null_summary_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/categorySummary/userId/7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let summary = api_for(&server)
            .get_category_summary(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn no_content_summary_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/monthlyReport/userId/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let summary = api_for(&server)
            .get_monthly_report(&credential(), &UserID::new("7"))
            .await
            .unwrap();

        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn absent_summaries_load_without_notice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/categorySummary/userId/7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/expenses/monthlyReport/userId/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        let notices = Notices::new();
        let mut analytics = Analytics::new(Arc::new(api_for(&server)), notices.clone());
        let session = Session {
            credential: credential(),
            profile: Profile {
                id: Some(UserID::new("7")),
                ..Default::default()
            },
        };

        let outcome = analytics.refresh(&session).await;

        assert_eq!(outcome, SyncOutcome::Done);
        assert!(notices.is_empty());
        assert!(analytics.categories().is_empty());
        assert!(analytics.months().is_empty());
    }

    #[tokio::test]
    async fn malformed_summary_is_still_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/categorySummary/userId/7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2]"))
            .mount(&server)
            .await;

        let result = api_for(&server)
            .get_category_summary(&credential(), &UserID::new("7"))
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/expenses/monthlyReport/userId/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let base_url = Url::parse(&server.uri()).unwrap();
        let api = HttpExpenseApi::new(&base_url, Duration::from_millis(50)).unwrap();

        let result = api
            .get_monthly_report(&credential(), &UserID::new("7"))
            .await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn base_url_path_prefix_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/User/deleteUser/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        let base_url = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        let api = HttpExpenseApi::new(&base_url, Duration::from_secs(5)).unwrap();

        let result = api.delete_user(&credential(), &UserID::new("7")).await;

        assert_eq!(result, Ok(()));
    }
}
