//! # PayPal NVP
//!
//! A client for PayPal's Name-Value-Pair (NVP) API, the Instant Payment Notification (IPN)
//! validator, and the hosted-button "Button Manager" operations built on top of NVP.
//!
//! ## Core Components Overview
//!
//! - **[`concepts`]**: The seams of the crate, [`Transport`](concepts::Transport) for issuing
//!   HTTP requests and [`NvpApi`](concepts::NvpApi) for raw NVP method calls.
//! - **[`config`]**: Credentials, live / sandbox selection and serde-loadable configuration.
//! - **[`endpoints`]**: The fixed PayPal endpoint URLs and how one is chosen.
//! - **[`transport`]**: HTTP response / error types and the reqwest-backed transport.
//! - **[`types`]**: NVP wire encoding and indexed-field (`L_<NAME><n>`) helpers.
//! - **[`nvp`]**: The authenticated NVP client.
//! - **[`ipn`]**: The anonymous IPN validator.
//! - **[`button_manager`]**: Create, update, delete, search and inspect hosted buttons.
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "http-client")]
//! # async fn run() -> paypal_nvp::errors::Result<()> {
//! use paypal_nvp::{
//!     config::{Credentials, Environment},
//!     nvp::NvpClient,
//!     transport::{ReqwestTransport, TransportConfig},
//!     types::Fields,
//! };
//!
//! let transport = ReqwestTransport::new(TransportConfig::default())?;
//! let credentials = Credentials::builder()
//!     .user("merchant_api1.example.com")
//!     .password("secret")
//!     .signature("A1b2C3...")
//!     .build();
//!
//! let client = NvpClient::new(transport, credentials, Environment::Sandbox);
//! let balance = client.call("GetBalance", Fields::new()).await?;
//! println!("{:?}", balance.get("L_AMT0"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Signaling
//!
//! Only transport faults are hard failures everywhere. On top of that:
//!
//! - [`NvpClient::call`](nvp::NvpClient::call) also fails when the `ACK` is not a success,
//!   while [`NvpClient::send`](nvp::NvpClient::send) hands back the decoded response as-is.
//! - [`IpnValidator::validate`](ipn::IpnValidator::validate) returns a verdict that must be
//!   checked with [`IpnVerdict::is_verified`](ipn::IpnVerdict::is_verified).
//! - [`ButtonManager`](button_manager::ButtonManager) operations return `None` (or `false`)
//!   when PayPal declines the request.

pub mod button_manager;
pub mod concepts;
pub mod config;
pub mod endpoints;
pub mod errors;
pub mod ipn;
pub mod nvp;
pub mod transport;
pub mod types;
