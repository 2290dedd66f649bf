use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";

/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Low temperature keeps the rewrite close to the input file.
const TEMPERATURE: f32 = 0.1;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// The external text-transformation capability.
///
/// The pipeline depends only on this request/response contract: one text
/// prompt in, the transformed text out, or an error distinguishing transport
/// failures from empty and non-text responses.
pub trait TransformService {
    /// Sends a prompt to the service and returns the raw text response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] on transport or HTTP failure,
    /// [`Error::EmptyResponse`] when no candidate output came back, and
    /// [`Error::NonText`] when the first candidate carries no text payload.
    fn transform(&self, prompt: &str) -> Result<String>;
}

/// `generateContent` request body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

/// `generateContent` response body.
#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

/// A response part is not necessarily text (inline data parts carry no
/// `text` field), hence the Option.
#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Blocking client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Creates a new client against the given endpoint.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Builds the `generateContent` URL for the configured model.
    fn generate_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base, self.model, self.api_key
        )
    }
}

impl TransformService for GeminiClient {
    fn transform(&self, prompt: &str) -> Result<String> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("content-type", "application/json")
            .json(&request_body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(|e| Error::service(format!("failed to reach service: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::service(format!("HTTP {status}: {body}")));
        }

        let result: GenerateContentResponse = response
            .json()
            .map_err(|e| Error::service(format!("failed to parse response: {e}")))?;

        extract_text(&result)
    }
}

/// Pulls the text payload out of a decoded response, distinguishing an empty
/// candidate set from a candidate without text content.
fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    let part = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_ref())
        .and_then(|p| p.first())
        .ok_or(Error::EmptyResponse)?;

    part.text.clone().ok_or(Error::NonText)
}
