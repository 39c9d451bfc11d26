//! `locgate check <identity>` - print the access status of an identity.

use super::print_response;
use locgate_core::GateConfig;
use locgate_server::{AccessGate, Action, GateRequest, GateResponse};

pub fn run(config: &GateConfig, identity: &str) -> anyhow::Result<()> {
    let gate = AccessGate::from_config(config);
    let response = execute(&gate, identity)?;
    print_response(&response)
}

pub(crate) fn execute(gate: &AccessGate, identity: &str) -> anyhow::Result<GateResponse> {
    let request = GateRequest::new(Action::Check, identity, None)?;
    Ok(gate.handle(&request)?)
}
