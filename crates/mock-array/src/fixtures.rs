//! Canned JSON documents for read-only endpoints.

use serde_json::Value;

use crate::error::{MockError, MockResult};
use crate::store::DirectorPort;

const SYMMETRIX: &str = include_str!("../fixtures/symmetrix.json");
const PORT: &str = include_str!("../fixtures/port.json");

fn render(template: &str, substitutions: &[(&str, &str)]) -> MockResult<Value> {
    let text = substitutions
        .iter()
        .fold(template.to_string(), |acc, (placeholder, value)| {
            acc.replace(placeholder, value)
        });
    serde_json::from_str(&text).map_err(|e| MockError::Internal(format!("bad fixture: {e}")))
}

pub fn symmetrix(symid: &str) -> MockResult<Value> {
    render(SYMMETRIX, &[("__SYMID__", symid)])
}

pub fn port(director: &str, port: &DirectorPort) -> MockResult<Value> {
    render(
        PORT,
        &[
            ("__DIRECTOR__", director),
            ("__PORT__", port.port.as_str()),
            ("__TYPE__", port.port_type),
            ("__IDENTIFIER__", port.identifier.as_str()),
        ],
    )
}
