//! In-memory `BankApi` used by the runner unit tests

use async_trait::async_trait;
use bankload_http::{ApiResponse, BankApi, HttpError, TransferRequest};
use parking_lot::Mutex;
use serde_json::{json, Value as JsonValue};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Records every call and answers with configurable statuses.
///
/// Account creation hands out sequential ids starting at 1 unless a fixed
/// body is configured.
pub(crate) struct FakeBank {
    start_status: u16,
    create_status: u16,
    account_body: Option<JsonValue>,
    transfer_status: u16,
    report_status: u16,
    transfer_delay: Option<Duration>,
    next_account: AtomicU64,
    simulation_starts: Mutex<Vec<u64>>,
    create_calls: AtomicUsize,
    transfers: Mutex<Vec<TransferRequest>>,
    report_calls: AtomicUsize,
}

impl FakeBank {
    pub(crate) fn new() -> Self {
        Self {
            start_status: 200,
            create_status: 200,
            account_body: None,
            transfer_status: 200,
            report_status: 200,
            transfer_delay: None,
            next_account: AtomicU64::new(1),
            simulation_starts: Mutex::new(Vec::new()),
            create_calls: AtomicUsize::new(0),
            transfers: Mutex::new(Vec::new()),
            report_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_start_status(mut self, status: u16) -> Self {
        self.start_status = status;
        self
    }

    pub(crate) fn with_create_status(mut self, status: u16) -> Self {
        self.create_status = status;
        self
    }

    pub(crate) fn with_account_body(mut self, body: JsonValue) -> Self {
        self.account_body = Some(body);
        self
    }

    pub(crate) fn with_transfer_status(mut self, status: u16) -> Self {
        self.transfer_status = status;
        self
    }

    pub(crate) fn with_report_status(mut self, status: u16) -> Self {
        self.report_status = status;
        self
    }

    /// Hold every transfer response for `delay`
    pub(crate) fn with_transfer_delay(mut self, delay: Duration) -> Self {
        self.transfer_delay = Some(delay);
        self
    }

    pub(crate) fn simulation_starts(&self) -> Vec<u64> {
        self.simulation_starts.lock().clone()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().clone()
    }

    pub(crate) fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    /// Total number of requests of any kind
    pub(crate) fn total_calls(&self) -> usize {
        self.simulation_starts.lock().len()
            + self.create_calls()
            + self.transfers.lock().len()
            + self.report_calls()
    }
}

#[async_trait]
impl BankApi for FakeBank {
    async fn start_simulation(&self, epoch_start_time: u64) -> Result<ApiResponse, HttpError> {
        self.simulation_starts.lock().push(epoch_start_time);
        Ok(ApiResponse {
            status: self.start_status,
            body: JsonValue::Null,
        })
    }

    async fn create_account(&self, _salary_cents: u64) -> Result<ApiResponse, HttpError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let body = match &self.account_body {
            Some(body) => body.clone(),
            None => json!({ "accountId": self.next_account.fetch_add(1, Ordering::SeqCst) }),
        };
        Ok(ApiResponse {
            status: self.create_status,
            body,
        })
    }

    async fn make_transfer(&self, transfer: &TransferRequest) -> Result<ApiResponse, HttpError> {
        self.transfers.lock().push(transfer.clone());
        if let Some(delay) = self.transfer_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ApiResponse {
            status: self.transfer_status,
            body: json!({ "transferId": "1" }),
        })
    }

    async fn fetch_report(&self) -> Result<ApiResponse, HttpError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ApiResponse {
            status: self.report_status,
            body: json!({
                "transactionalAccounts": 0,
                "loanAccounts": 0,
                "bankBalance": 0,
                "totalMoney": 0
            }),
        })
    }
}
