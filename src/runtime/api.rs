//! API-facing request/response models and route dispatch.
//!
//! Transport is left to the embedding server: it hands over the method, path,
//! and raw body, and writes back the returned status and JSON body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::{
    CreateProcessRequest, EngineError, ProcessRegistry, RebalanceReport, TierEngine, UsageReport,
};

/// HTTP-shaped response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body; `None` for `204 No Content`.
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Serialize `body` with the given status.
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status,
                body: Some(value),
            },
            Err(e) => {
                tracing::error!("failed to encode response body: {}", e);
                Self::error(500, "Internal Server Error")
            }
        }
    }

    /// Error response with a `detail` message.
    pub fn error(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "detail": detail.into() })),
        }
    }

    /// Empty `204` response.
    #[must_use]
    pub const fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// The `detail` field of an error body, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.body.as_ref()?.get("detail")?.as_str()
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        let detail = match &err {
            EngineError::NotFound(_) => "Process not found".to_string(),
            other => other.to_string(),
        };
        Self::error(err.status_code(), detail)
    }
}

/// Rebalance response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceResponse {
    /// Always `"success"`.
    pub status: String,
    /// Pass counters.
    #[serde(flatten)]
    pub report: RebalanceReport,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}

/// Decode a JSON request body; failures are request-validation errors (422).
fn decode<T: DeserializeOwned>(body: Option<&str>) -> Result<T, ApiResponse> {
    let raw = body.ok_or_else(|| ApiResponse::error(422, "request body required"))?;
    serde_json::from_str(raw)
        .map_err(|e| ApiResponse::error(422, format!("invalid request body: {e}")))
}

fn respond<T: Serialize>(status: u16, result: Result<T, EngineError>) -> ApiResponse {
    match result {
        Ok(body) => ApiResponse::json(status, &body),
        Err(err) => err.into(),
    }
}

/// Dispatch one request against `engine`.
pub fn handle<G>(
    engine: &TierEngine<G>,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> ApiResponse
where
    G: ProcessRegistry,
{
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let method = method.to_ascii_uppercase();
    tracing::debug!(%method, path, "api request");

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["health"]) => ApiResponse::json(200, &health()),
        ("POST", ["processes"]) => match decode::<CreateProcessRequest>(body) {
            Ok(request) => respond(201, engine.create(request)),
            Err(resp) => resp,
        },
        ("GET", ["processes", id]) => respond(200, engine.get(id)),
        ("DELETE", ["processes", id]) => match engine.terminate(id) {
            Ok(()) => ApiResponse::no_content(),
            Err(err) => err.into(),
        },
        ("GET", ["processes", id, "resources"]) => respond(200, engine.resources(id)),
        ("POST", ["admin", "rebalance"]) => ApiResponse::json(
            200,
            &RebalanceResponse {
                status: "success".into(),
                report: engine.rebalance(),
            },
        ),
        ("GET", ["admin", "stats"]) => ApiResponse::json(200, &engine.stats()),
        ("POST", ["admin", "processes", id, "update-usage"]) => {
            match decode::<UsageReport>(body) {
                Ok(report) => respond(200, engine.update_usage(id, &report)),
                Err(resp) => resp,
            }
        }
        (_, ["health" | "processes"])
        | (_, ["processes", _])
        | (_, ["processes", _, "resources"])
        | (_, ["admin", "rebalance" | "stats"])
        | (_, ["admin", "processes", _, "update-usage"]) => {
            ApiResponse::error(405, "Method Not Allowed")
        }
        _ => ApiResponse::error(404, "Not Found"),
    }
}
