//! Response envelopes for transport collaborators.
//!
//! Success: `{"success": true, "data": <plan>}`. Failure: `{"error": <message>}`
//! with a 400 or 500 status.

use crate::config::ProtocolDefaults;
use crate::{calculator, request, DosagePlan, Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const SERVICE_NAME: &str = "PRP Calculator API";

/// Status plus JSON body, ready for any transport
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

#[derive(Debug, Serialize)]
struct SuccessBody<'a> {
    success: bool,
    data: &'a DosagePlan,
}

/// Liveness report
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub fn health() -> HealthStatus {
    HealthStatus {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// Self-description of the calculator: operations and request fields
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub operations: Vec<OperationInfo>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OperationInfo {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<&'static str>,
    /// Optional request keys and the defaults they fall back to
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_fields: BTreeMap<&'static str, f64>,
}

/// Describe the operations, using the active protocol defaults
pub fn service_info(defaults: &ProtocolDefaults) -> ServiceInfo {
    let optional_fields = BTreeMap::from([
        (request::PRP_YIELD, defaults.prp_yield_ml),
        (request::PRP_CONCENTRATION, defaults.prp_concentration_x),
        (request::PPP_CONCENTRATION, defaults.ppp_concentration_x),
    ]);

    ServiceInfo {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        operations: vec![
            OperationInfo {
                name: "calculate",
                description: "Calculate PRP dosage based on patient data and protocol",
                required_fields: vec![request::THROMBOCYTES],
                optional_fields,
            },
            OperationInfo {
                name: "health",
                description: "Health check",
                required_fields: Vec::new(),
                optional_fields: BTreeMap::new(),
            },
        ],
    }
}

/// Run a raw request body through parse → coerce → compute → envelope
pub fn respond(body: &str, defaults: &ProtocolDefaults) -> Response {
    let result = request::parse_body(body)
        .and_then(|map| request::inputs_from_map(&map, defaults))
        .and_then(|inputs| calculator::compute(&inputs));
    respond_with(result)
}

/// Wrap a calculation outcome in the matching envelope
pub fn respond_with(result: Result<DosagePlan>) -> Response {
    match result.and_then(|plan| success(&plan)) {
        Ok(response) => response,
        Err(err) => failure(&err),
    }
}

fn success(plan: &DosagePlan) -> Result<Response> {
    let body = serde_json::to_value(SuccessBody {
        success: true,
        data: plan,
    })?;
    Ok(Response { status: 200, body })
}

/// Error envelope for a failed request
pub fn failure(err: &Error) -> Response {
    let status = err.status_code();
    let message = if err.is_client_error() {
        err.to_string()
    } else {
        tracing::error!("Calculation failed: {}", err);
        format!("Calculation error: {}", err)
    };

    Response {
        status,
        body: serde_json::json!({ "error": message }),
    }
}
