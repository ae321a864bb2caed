//! Request and response bodies of the banking API

use crate::client::ApiResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Identifier of an account on the banking API. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "String")]
pub struct AccountId(u64);

impl AccountId {
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Parse a number-like JSON value: an integer, or a string of decimal digits.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f > 0.0 && *f <= u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .and_then(Self::new),
            JsonValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Account id from a `POST /accounts` response. `None` unless the status is 200
    /// and the body carries a positive `accountId`.
    pub fn from_response(response: &ApiResponse) -> Option<Self> {
        if response.status != 200 {
            return None;
        }
        response.body.get("accountId").and_then(Self::from_json)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid account id: '{}'", s));
        }
        trimmed
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("Invalid account id: '{}'", s))
    }
}

impl TryFrom<JsonValue> for AccountId {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json(&value).ok_or_else(|| format!("Invalid account id: {}", value))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

/// Body of `POST /simulation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSimulationRequest {
    pub epoch_start_time: u64,
}

/// Body of `POST /accounts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub salary_cents: u64,
}

/// Successful body of `POST /accounts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub account_id: AccountId,
}

/// Body of `POST /transfers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount_cents: u64,
    /// Idempotency token
    pub reference: u64,
}

/// Body of `GET /report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub transactional_accounts: u64,
    pub loan_accounts: u64,
    pub bank_balance: serde_json::Number,
    pub total_money: serde_json::Number,
}

impl Report {
    /// Best-effort parse of a `GET /report` body
    pub fn from_response(response: &ApiResponse) -> Option<Self> {
        if !response.is_success() {
            return None;
        }
        serde_json::from_value(response.body.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_account_id_from_json() {
        assert_eq!(AccountId::from_json(&json!(42)), AccountId::new(42));
        assert_eq!(AccountId::from_json(&json!("42")), AccountId::new(42));
        assert_eq!(
            AccountId::from_json(&json!("100000000042")),
            AccountId::new(100_000_000_042)
        );
        assert_eq!(AccountId::from_json(&json!(7.0)), AccountId::new(7));

        assert_eq!(AccountId::from_json(&json!(0)), None);
        assert_eq!(AccountId::from_json(&json!("0")), None);
        assert_eq!(AccountId::from_json(&json!(-5)), None);
        assert_eq!(AccountId::from_json(&json!("")), None);
        assert_eq!(AccountId::from_json(&json!("+12")), None);
        assert_eq!(AccountId::from_json(&json!("12ab")), None);
        assert_eq!(AccountId::from_json(&json!(1.5)), None);
        assert_eq!(AccountId::from_json(&json!(null)), None);
    }

    #[test]
    fn test_account_id_from_response() {
        let ok = ApiResponse {
            status: 200,
            body: json!({ "accountId": "100000000001" }),
        };
        assert_eq!(AccountId::from_response(&ok), AccountId::new(100_000_000_001));

        let created = ApiResponse {
            status: 201,
            body: json!({ "accountId": "100000000001" }),
        };
        assert_eq!(AccountId::from_response(&created), None);

        let server_error = ApiResponse {
            status: 500,
            body: json!({ "title": "Internal Server Error" }),
        };
        assert_eq!(AccountId::from_response(&server_error), None);

        let missing = ApiResponse {
            status: 200,
            body: json!({}),
        };
        assert_eq!(AccountId::from_response(&missing), None);
    }

    #[test]
    fn test_transfer_request_wire_format() {
        let request = TransferRequest {
            from: AccountId::new(7).unwrap(),
            to: AccountId::new(42).unwrap(),
            amount_cents: 1,
            reference: u64::MAX,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "from": "7",
                "to": "42",
                "amountCents": 1,
                "reference": 18446744073709551615u64
            })
        );
    }

    #[test]
    fn test_create_account_response_accepts_number_like() {
        let from_string: CreateAccountResponse =
            serde_json::from_value(json!({ "accountId": "42" })).unwrap();
        let from_number: CreateAccountResponse =
            serde_json::from_value(json!({ "accountId": 42 })).unwrap();
        assert_eq!(from_string, from_number);

        assert!(serde_json::from_value::<CreateAccountResponse>(json!({ "accountId": "0" })).is_err());
    }

    #[test]
    fn test_start_simulation_wire_format() {
        let body = serde_json::to_value(StartSimulationRequest {
            epoch_start_time: 1_700_000_000,
        })
        .unwrap();
        assert_eq!(body, json!({ "epochStartTime": 1700000000u64 }));
    }

    #[test]
    fn test_report_parses() {
        let report: Report = serde_json::from_value(json!({
            "transactionalAccounts": 12,
            "loanAccounts": 3,
            "bankBalance": -1500,
            "totalMoney": 6000000
        }))
        .unwrap();
        assert_eq!(report.transactional_accounts, 12);
        assert_eq!(report.bank_balance.as_i64(), Some(-1500));
    }

    #[test]
    fn test_report_from_response() {
        let body = json!({
            "transactionalAccounts": 1,
            "loanAccounts": 0,
            "bankBalance": 0,
            "totalMoney": 500000
        });
        let ok = ApiResponse {
            status: 200,
            body: body.clone(),
        };
        assert_eq!(Report::from_response(&ok).unwrap().transactional_accounts, 1);

        let failed = ApiResponse { status: 500, body };
        assert!(Report::from_response(&failed).is_none());

        let garbage = ApiResponse {
            status: 200,
            body: json!("not a report"),
        };
        assert!(Report::from_response(&garbage).is_none());
    }
}
