//! HTTP client for the retail banking API
//!
//! This crate provides the wire types of the four endpoints the load
//! generator drives, a `BankApi` trait over them, and a reqwest-backed
//! implementation configured from the `http` configuration domain.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod types;

// Re-export main types for convenience
pub use client::{ApiResponse, BankApi, BankClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use models::{
    AccountId, CreateAccountRequest, CreateAccountResponse, Report, StartSimulationRequest,
    TransferRequest,
};
pub use types::{Endpoint, HttpMethod};
