//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::models::{CreateAccountRequest, StartSimulationRequest, TransferRequest};
use crate::types::Endpoint;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

/// Status and decoded body of a completed request.
///
/// Any HTTP status is a completed request; only transport failures are errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body, the raw text as a JSON string if it is not JSON,
    /// or `Null` when empty
    pub body: JsonValue,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The banking API as seen by the load generator
#[async_trait::async_trait]
pub trait BankApi: Send + Sync {
    /// `POST /simulation` with the epoch the remote clock starts from
    async fn start_simulation(&self, epoch_start_time: u64) -> Result<ApiResponse, HttpError>;

    /// `POST /accounts` with the initial balance
    async fn create_account(&self, salary_cents: u64) -> Result<ApiResponse, HttpError>;

    /// `POST /transfers`
    async fn make_transfer(&self, transfer: &TransferRequest) -> Result<ApiResponse, HttpError>;

    /// `GET /report`
    async fn fetch_report(&self) -> Result<ApiResponse, HttpError>;
}

/// reqwest-backed [`BankApi`]. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct BankClient {
    client: Client,
    base_url: String,
}

impl BankClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self, HttpError> {
        let parsed = url::Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                base_url
            )));
        }

        debug!(
            "Creating BankClient for {} with timeout: {}s",
            base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint; keeps any path prefix of the base URL
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn send<B>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<ApiResponse, HttpError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint_url(endpoint);
        let mut request = self
            .client
            .request(reqwest::Method::from(endpoint.method()), &url);

        if let Some(body) = body {
            request = request.json(body);
        }

        trace!("Sending {} {}", endpoint.method(), url);
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&text).unwrap_or(JsonValue::String(text))
        };

        debug!(endpoint = endpoint.label(), status, "HTTP response received");
        Ok(ApiResponse { status, body })
    }
}

#[async_trait::async_trait]
impl BankApi for BankClient {
    async fn start_simulation(&self, epoch_start_time: u64) -> Result<ApiResponse, HttpError> {
        let body = StartSimulationRequest { epoch_start_time };
        self.send(Endpoint::StartSimulation, Some(&body)).await
    }

    async fn create_account(&self, salary_cents: u64) -> Result<ApiResponse, HttpError> {
        let body = CreateAccountRequest { salary_cents };
        self.send(Endpoint::CreateAccount, Some(&body)).await
    }

    async fn make_transfer(&self, transfer: &TransferRequest) -> Result<ApiResponse, HttpError> {
        self.send(Endpoint::MakeTransfer, Some(transfer)).await
    }

    async fn fetch_report(&self) -> Result<ApiResponse, HttpError> {
        self.send::<()>(Endpoint::FetchReport, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, Report};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(2),
            ..HttpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_simulation_posts_epoch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/simulation"))
            .and(body_json(json!({ "epochStartTime": 1700000000u64 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BankClient::new(&mock_server.uri(), &test_config()).unwrap();
        let response = client.start_simulation(1_700_000_000).await.unwrap();

        assert_eq!(response.status, 204);
        assert!(response.is_success());
        assert_eq!(response.body, JsonValue::Null);
    }

    #[tokio::test]
    async fn test_create_account_parses_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts"))
            .and(body_json(json!({ "salaryCents": 500000 })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "accountId": "100000000042" })),
            )
            .mount(&mock_server)
            .await;

        let client = BankClient::new(&mock_server.uri(), &test_config()).unwrap();
        let response = client.create_account(500_000).await.unwrap();

        assert_eq!(
            AccountId::from_response(&response),
            AccountId::new(100_000_000_042)
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(500).set_body_string("ledger unavailable"))
            .mount(&mock_server)
            .await;

        let client = BankClient::new(&mock_server.uri(), &test_config()).unwrap();
        let response = client.create_account(500_000).await.unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
        assert_eq!(response.body, json!("ledger unavailable"));
        assert_eq!(AccountId::from_response(&response), None);
    }

    #[tokio::test]
    async fn test_make_transfer_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/transfers"))
            .and(body_json(json!({
                "from": "100000000001",
                "to": "42",
                "amountCents": 1,
                "reference": 9876543210u64
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "transferId": "0123456789ABCDEF0123456789ABCDEF" })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BankClient::new(&mock_server.uri(), &test_config()).unwrap();
        let transfer = TransferRequest {
            from: AccountId::new(100_000_000_001).unwrap(),
            to: AccountId::new(42).unwrap(),
            amount_cents: 1,
            reference: 9_876_543_210,
        };

        let response = client.make_transfer(&transfer).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_fetch_report_with_path_prefix() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/report"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "transactionalAccounts": 2,
                "loanAccounts": 0,
                "bankBalance": 0,
                "totalMoney": 1000000
            })))
            .mount(&mock_server)
            .await;

        let base = format!("{}/api/", mock_server.uri());
        let client = BankClient::new(&base, &test_config()).unwrap();
        assert_eq!(client.endpoint_url(Endpoint::FetchReport), format!("{}/api/report", mock_server.uri()));

        let response = client.fetch_report().await.unwrap();
        let report: Report = serde_json::from_value(response.body).unwrap();
        assert_eq!(report.transactional_accounts, 2);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on the discard port
        let client = BankClient::new("http://127.0.0.1:9", &test_config()).unwrap();
        let err = client.fetch_report().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(BankClient::new("not a url", &test_config()).is_err());
        assert!(BankClient::new("ftp://bank.example.com", &test_config()).is_err());
    }
}
