//! HTTP methods and the endpoints of the banking API

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods used against the banking API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    /// Get the string representation of the HTTP method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Endpoints of the system under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    /// `POST /simulation`
    StartSimulation,
    /// `POST /accounts`
    CreateAccount,
    /// `POST /transfers`
    MakeTransfer,
    /// `GET /report`
    FetchReport,
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::FetchReport => HttpMethod::Get,
            Endpoint::StartSimulation | Endpoint::CreateAccount | Endpoint::MakeTransfer => {
                HttpMethod::Post
            }
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::StartSimulation => "/simulation",
            Endpoint::CreateAccount => "/accounts",
            Endpoint::MakeTransfer => "/transfers",
            Endpoint::FetchReport => "/report",
        }
    }

    /// Name under which samples for this endpoint are aggregated
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::StartSimulation => "Start Simulation",
            Endpoint::CreateAccount => "Create Account",
            Endpoint::MakeTransfer => "Make Transfer",
            Endpoint::FetchReport => "Fetch Report",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}
