//! Canonical mapping of raw service responses.
//!
//! The remote service has changed its response shapes over time. Everything
//! it may return is mapped here onto a small tagged union so the polling loop
//! never looks at raw JSON.
//!
//! | raw `status` (case-insensitive)                 | canonical                          |
//! |-------------------------------------------------|------------------------------------|
//! | `succeeded`, `ready`                            | `Succeeded` if a result URL exists |
//! | `succeeded`, `ready` without a result URL       | `Pending`                          |
//! | `failed`, `error`, `cancelled`, `canceled`,     |                                    |
//! | `content moderated`, `request moderated`,       |                                    |
//! | `task not found`                                | `Failed`                           |
//! | `processing`, `pending`, `queued`, `running`    | `Pending`                          |
//! | anything else, or no status at all              | `Pending` (logged)                 |
//!
//! Result URLs are looked up in this order, first present wins:
//! `output.image_url`, `result.sample`, `result.image_url`, `result.url`.

use serde_json::Value;

use lumacanvas_core::TransformError;

/// JSON paths that may carry the result URL, in priority order.
const RESULT_URL_PATHS: [&[&str]; 4] = [
    &["output", "image_url"],
    &["result", "sample"],
    &["result", "image_url"],
    &["result", "url"],
];

const SUCCESS_STATUSES: [&str; 2] = ["succeeded", "ready"];

const FAILURE_STATUSES: [&str; 7] = [
    "failed",
    "error",
    "cancelled",
    "canceled",
    "content moderated",
    "request moderated",
    "task not found",
];

const PENDING_STATUSES: [&str; 4] = ["processing", "pending", "queued", "running"];

/// Canonical status of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// The job finished and the result is at `image_url`.
    Succeeded { image_url: String },
    /// The job ended without a result.
    Failed { reason: String },
    /// Keep polling. `raw` is the status string as received, if any.
    Pending { raw: Option<String> },
}

impl PollStatus {
    /// Map a raw poll response.
    pub fn from_response(response: &Value) -> PollStatus {
        let raw = response.get("status").and_then(Value::as_str);
        let Some(raw) = raw else {
            tracing::warn!("Poll response without a status, treating as pending");
            return PollStatus::Pending { raw: None };
        };

        let status = raw.trim().to_ascii_lowercase();

        if SUCCESS_STATUSES.contains(&status.as_str()) {
            return match result_url(response) {
                Some(image_url) => PollStatus::Succeeded { image_url },
                None => {
                    tracing::warn!("Status '{}' without a result URL, still pending", raw);
                    PollStatus::Pending {
                        raw: Some(raw.to_string()),
                    }
                }
            };
        }

        if FAILURE_STATUSES.contains(&status.as_str()) {
            let reason = detail_message(response)
                .map(|detail| format!("{}: {}", raw, detail))
                .unwrap_or_else(|| raw.to_string());
            return PollStatus::Failed { reason };
        }

        if !PENDING_STATUSES.contains(&status.as_str()) {
            tracing::warn!("Unknown job status '{}', treating as pending", raw);
        }
        PollStatus::Pending {
            raw: Some(raw.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollStatus::Pending { .. })
    }
}

/// A job accepted by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub id: String,
    /// Direct status URL, when the service provides one.
    pub polling_url: Option<String>,
}

impl SubmittedJob {
    /// Parse a submission response.
    ///
    /// An inline `error` or `detail` field is a rejection; a response
    /// without an `id` is malformed.
    pub fn from_response(response: &Value) -> Result<SubmittedJob, TransformError> {
        if !response.is_object() {
            return Err(TransformError::MalformedResponse {
                reason: "expected a JSON object".to_string(),
            });
        }

        for field in ["error", "detail"] {
            if let Some(value) = response.get(field).filter(|v| !v.is_null()) {
                return Err(TransformError::Rejected {
                    message: value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string()),
                });
            }
        }

        let id = response
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TransformError::MalformedResponse {
                reason: "missing job id".to_string(),
            })?;

        let polling_url = response
            .get("polling_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(SubmittedJob {
            id: id.to_string(),
            polling_url,
        })
    }
}

fn result_url(response: &Value) -> Option<String> {
    RESULT_URL_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(response, |node, key| node.get(key))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    })
}

fn detail_message(response: &Value) -> Option<String> {
    ["error", "details", "detail"].iter().find_map(|key| {
        response.get(key).filter(|v| !v.is_null()).map(|v| {
            v.as_str()
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string())
        })
    })
}
