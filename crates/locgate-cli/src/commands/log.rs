//! `locgate log <identity>` - record a payment dated today.

use super::print_response;
use locgate_core::GateConfig;
use locgate_server::{AccessGate, Action, GateRequest, GateResponse};

pub fn run(config: &GateConfig, identity: &str, tx_hash: Option<String>) -> anyhow::Result<()> {
    let gate = AccessGate::from_config(config);
    let response = execute(&gate, identity, tx_hash)?;
    print_response(&response)
}

pub(crate) fn execute(
    gate: &AccessGate,
    identity: &str,
    tx_hash: Option<String>,
) -> anyhow::Result<GateResponse> {
    let request = GateRequest::new(Action::Log, identity, tx_hash)?;
    Ok(gate.handle(&request)?)
}
