//! Remote transform service.
//!
//! [`TransformService`] is the seam between the orchestrator and the
//! network. The HTTP implementation uses a blocking `ureq` agent driven from
//! `tokio::task::spawn_blocking` so no request ever stalls the runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use lumacanvas_core::TransformError;

use crate::status::SubmittedJob;

/// Upper bound on a downloaded result image.
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// The two interchangeable remote engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Engine {
    /// Higher quality, slower.
    #[default]
    KontextMax,
    /// Faster.
    KontextPro,
}

impl Engine {
    pub fn id(&self) -> &'static str {
        match self {
            Engine::KontextMax => "kontext-max",
            Engine::KontextPro => "kontext-pro",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kontext-max" | "max" | "max1" => Ok(Engine::KontextMax),
            "kontext-pro" | "pro" | "max2" => Ok(Engine::KontextPro),
            other => Err(format!("Unknown engine: {}", other)),
        }
    }
}

/// Body of a transform submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitRequest {
    pub prompt: String,
    /// Base64-encoded image bytes, without a data-URL header.
    pub input_image: String,
    pub output_format: String,
    pub safety_tolerance: u8,
    pub prompt_upsampling: bool,
}

/// Where the service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
    /// Submission endpoint of [`Engine::KontextMax`].
    pub kontext_max: String,
    /// Submission endpoint of [`Engine::KontextPro`].
    pub kontext_pro: String,
    /// Status endpoint queried with `?id=<job id>` when no polling URL is given.
    pub result: String,
}

impl ServiceEndpoints {
    pub fn submit_url(&self, engine: Engine) -> &str {
        match engine {
            Engine::KontextMax => &self.kontext_max,
            Engine::KontextPro => &self.kontext_pro,
        }
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            kontext_max: "https://api.bfl.ai/v1/flux-kontext-max".to_string(),
            kontext_pro: "https://api.bfl.ai/v1/flux-kontext-pro".to_string(),
            result: "https://api.eu4.bfl.ai/v1/get_result".to_string(),
        }
    }
}

/// Remote job-based image transformation.
#[async_trait]
pub trait TransformService: Send + Sync {
    /// Submit a job. Returns the raw response body.
    async fn submit(&self, engine: Engine, request: &SubmitRequest)
        -> Result<Value, TransformError>;

    /// Query the status of a job. Returns the raw response body.
    async fn poll(&self, job: &SubmittedJob) -> Result<Value, TransformError>;

    /// Fetch the bytes behind a result URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>, TransformError>;
}

/// HTTP implementation of [`TransformService`].
#[derive(Clone)]
pub struct HttpTransformService {
    agent: ureq::Agent,
    endpoints: ServiceEndpoints,
    api_key: Option<String>,
    api_key_variable: String,
}

impl HttpTransformService {
    /// Create a service with an explicit key. `api_key_variable` is only
    /// used to explain a missing key.
    pub fn new(
        endpoints: ServiceEndpoints,
        api_key: Option<String>,
        api_key_variable: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoints,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_variable: api_key_variable.into(),
        }
    }

    /// Create a service reading the key from the environment variable `variable`.
    pub fn from_env(endpoints: ServiceEndpoints, variable: &str, timeout: Duration) -> Self {
        let api_key = std::env::var(variable).ok();
        if api_key.is_none() {
            tracing::warn!(
                "{} is not set; transforms will use the local fallback",
                variable
            );
        }
        Self::new(endpoints, api_key, variable, timeout)
    }

    pub fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<String, TransformError> {
        self.api_key
            .clone()
            .ok_or_else(|| TransformError::MissingApiKey {
                variable: self.api_key_variable.clone(),
            })
    }
}

impl fmt::Debug for HttpTransformService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransformService")
            .field("endpoints", &self.endpoints)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl TransformService for HttpTransformService {
    async fn submit(
        &self,
        engine: Engine,
        request: &SubmitRequest,
    ) -> Result<Value, TransformError> {
        let key = self.key()?;
        let agent = self.agent.clone();
        let url = self.endpoints.submit_url(engine).to_string();
        let body = request.clone();

        tracing::debug!("Submitting {} job to {}", engine, url);
        blocking(move || {
            let mut response = agent
                .post(&url)
                .header("accept", "application/json")
                .header("x-key", &key)
                .send_json(&body)
                .map_err(map_ureq_error)?;
            response
                .body_mut()
                .read_json::<Value>()
                .map_err(map_ureq_error)
        })
        .await
    }

    async fn poll(&self, job: &SubmittedJob) -> Result<Value, TransformError> {
        let key = self.key()?;
        let agent = self.agent.clone();
        let polling_url = job.polling_url.clone();
        let result_url = self.endpoints.result.clone();
        let id = job.id.clone();

        blocking(move || {
            let request = match &polling_url {
                Some(url) => agent.get(url),
                None => agent.get(&result_url).query("id", &id),
            };
            let mut response = request
                .header("accept", "application/json")
                .header("x-key", &key)
                .call()
                .map_err(map_ureq_error)?;
            response
                .body_mut()
                .read_json::<Value>()
                .map_err(map_ureq_error)
        })
        .await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, TransformError> {
        let agent = self.agent.clone();
        let url = url.to_string();

        tracing::debug!("Downloading {}", url);
        blocking(move || {
            let mut response = agent.get(&url).call().map_err(map_ureq_error)?;
            response
                .body_mut()
                .with_config()
                .limit(MAX_DOWNLOAD_BYTES)
                .read_to_vec()
                .map_err(map_ureq_error)
        })
        .await
    }
}

/// Run a blocking request on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, TransformError>
where
    F: FnOnce() -> Result<T, TransformError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TransformError::Network {
            reason: format!("Task join error: {}", e),
        })?
}

fn map_ureq_error(error: ureq::Error) -> TransformError {
    match error {
        ureq::Error::StatusCode(status) => TransformError::HttpStatus { status },
        ureq::Error::Json(e) => TransformError::MalformedResponse {
            reason: e.to_string(),
        },
        other => TransformError::Network {
            reason: other.to_string(),
        },
    }
}
