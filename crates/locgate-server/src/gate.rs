//! The access gate: validates requests and dispatches them against the store
//! and the access policy.

use crate::error::GateError;
use crate::request::{Action, GateRequest, GateResponse};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use locgate_core::{AccessStatus, Clock, GateConfig, SystemClock, evaluate, expires_on, local_date};
use locgate_store::{AccessLogStore, open_store};
use std::sync::Arc;

/// Outcome of a successful `log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogReceipt {
    pub last_paid_date: NaiveDate,
    pub expires_on: NaiveDate,
}

/// Dispatches `check` and `log` requests.
///
/// Holds no access data itself: the store is read fresh on every request.
pub struct AccessGate {
    store: Arc<dyn AccessLogStore>,
    clock: Arc<dyn Clock>,
    zone: FixedOffset,
}

impl AccessGate {
    pub fn new(store: Arc<dyn AccessLogStore>, clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self { store, clock, zone }
    }

    /// Build a gate over the configured file store and the wall clock.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(
            open_store(&config.storage),
            Arc::new(SystemClock),
            config.policy.offset(),
        )
    }

    /// Evaluate access for `identity` as of `now`.
    pub fn check_at(&self, identity: &str, now: DateTime<Utc>) -> AccessStatus {
        let today = local_date(now, self.zone);
        let log = self.store.load();
        let status = evaluate(log.get(identity), today);

        tracing::debug!(identity, %today, status = status.label(), "Checked access");
        status
    }

    pub fn check(&self, identity: &str) -> AccessStatus {
        self.check_at(identity, self.clock.now())
    }

    /// Record a payment for `identity` dated `now`.
    ///
    /// The receipt always reports a fresh window starting today; it is not
    /// re-derived from the stored record. Fails if the log could not be saved.
    pub fn log_at(
        &self,
        identity: &str,
        now: DateTime<Utc>,
        tx_hash: Option<&str>,
    ) -> Result<LogReceipt, GateError> {
        let today = local_date(now, self.zone);

        let saved = self.store.update(&mut |log| {
            log.record_payment(identity, today, tx_hash);
        })?;

        let entries = saved.get(identity).map_or(0, |r| r.history.len());
        tracing::info!(
            identity,
            %today,
            has_tx_hash = tx_hash.is_some_and(|h| !h.is_empty()),
            entries,
            "Logged payment"
        );

        Ok(LogReceipt {
            last_paid_date: today,
            expires_on: expires_on(today),
        })
    }

    pub fn log(&self, identity: &str, tx_hash: Option<&str>) -> Result<LogReceipt, GateError> {
        self.log_at(identity, self.clock.now(), tx_hash)
    }

    /// Dispatch a validated request.
    pub fn handle(&self, request: &GateRequest) -> Result<GateResponse, GateError> {
        let now = self.clock.now();
        tracing::trace!(action = request.action.as_str(), identity = %request.identity, "Dispatching gate request");
        match request.action {
            Action::Check => Ok(self.check_at(&request.identity, now).into()),
            Action::Log => {
                let receipt = self.log_at(&request.identity, now, request.tx_hash.as_deref())?;
                Ok(GateResponse::Logged {
                    last_paid_date: receipt.last_paid_date,
                    expires_on: receipt.expires_on,
                })
            }
        }
    }

    /// Validate and dispatch a raw request body.
    ///
    /// Invalid requests are answered with an `error` document without
    /// touching the store.
    pub fn handle_body(&self, body: &[u8]) -> Result<GateResponse, GateError> {
        match GateRequest::parse(body) {
            Ok(request) => self.handle(&request),
            Err(err) => {
                tracing::debug!(reason = %err, "Rejected gate request");
                Ok(err.into())
            }
        }
    }
}
