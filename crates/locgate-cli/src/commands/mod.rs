//! CLI command implementations for locgate.

pub mod check;
pub mod log;
pub mod serve;

use locgate_server::GateResponse;

/// Print a status document to stdout.
pub(crate) fn print_response(response: &GateResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}
