//! # locgate-server
//!
//! Request handling for the locgate access gate.
//!
//! A request names an action and an identity:
//!
//! | Action | Effect |
//! |--------|--------|
//! | `check` | Report `none`, `active` (with `expiresOn`) or `expired` |
//! | `log` | Record a payment dated today, optionally with a `txHash` |
//!
//! [`AccessGate`] does the work and is transport-agnostic; [`http`] exposes
//! it over HTTP with axum.

pub mod error;
pub mod gate;
pub mod http;
pub mod request;

pub use error::GateError;
pub use gate::{AccessGate, LogReceipt};
pub use http::{GateServer, create_router};
pub use request::{Action, GateRequest, GateResponse, RequestError};
