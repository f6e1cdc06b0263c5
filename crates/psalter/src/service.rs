use crate::reference::{Chapter, VerseNumber};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001/get-verse";
pub const DEFAULT_BOOK: &str = "Psalm";
pub const DEFAULT_TRANSLATION: &str = "KJV";

/// Body of a single verse lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerseRequest {
    pub book: String,
    pub chapter: Chapter,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<VerseNumber>,
}

impl VerseRequest {
    pub fn new(chapter: Chapter, verse: Option<VerseNumber>) -> Self {
        Self {
            book: DEFAULT_BOOK.to_string(),
            chapter,
            translation: DEFAULT_TRANSLATION.to_string(),
            verse,
        }
    }

    pub fn with_book(mut self, book: impl Into<String>) -> Self {
        self.book = book.into();
        self
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = translation.into();
        self
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Verse service returned HTTP {0}")]
    Status(u16),
    #[error("Invalid scripture response: {0}")]
    InvalidPayload(String),
}

/// Anything able to turn a [`VerseRequest`] into verse text.
pub trait VerseLookup: Send + Sync + 'static {
    fn lookup(
        &self,
        request: &VerseRequest,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

pub struct HttpVerseService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVerseService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("psalter/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VerseLookup for HttpVerseService {
    async fn lookup(&self, request: &VerseRequest) -> Result<String, ServiceError> {
        log::debug!(
            "POST {} {} {}:{}",
            self.endpoint,
            request.book,
            request.chapter,
            request.verse.as_ref().map(VerseNumber::as_str).unwrap_or("")
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode_payload(&body)
    }
}

fn try_parse(payload: &str) -> Option<Value> {
    serde_json::from_str(payload).ok()
}

/// Decodes a verse service response body into its text.
///
/// The service is not consistent about encoding, so three attempts are made in
/// order: the body as JSON; if that yields a JSON string, that string as JSON;
/// failing both, the body with one pair of wrapping quotes removed and `\"`
/// unescaped. The resulting object must carry either `text` or a `verses`
/// array of `{text}` records.
pub fn decode_payload(payload: &str) -> Result<String, ServiceError> {
    let mut data = try_parse(payload);

    if let Some(Value::String(inner)) = &data {
        data = try_parse(inner);
    }

    if data.is_none() {
        let trimmed = payload.trim();
        let unwrapped = trimmed.strip_prefix('"').unwrap_or(trimmed);
        let unwrapped = unwrapped.strip_suffix('"').unwrap_or(unwrapped);
        data = try_parse(&unwrapped.replace("\\\"", "\""));
    }

    let Some(Value::Object(object)) = data else {
        log::error!("Unable to parse scripture response: {}", payload);
        return Err(ServiceError::InvalidPayload(
            "expected a JSON object".to_string(),
        ));
    };

    let text = match (object.get("text"), object.get("verses")) {
        (Some(Value::String(text)), _) if !text.is_empty() => text.clone(),
        (_, Some(Value::Array(verses))) => verses
            .iter()
            .map(|v| v.get("text").and_then(Value::as_str).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n"),
        (Some(Value::String(text)), _) => text.clone(),
        _ => {
            return Err(ServiceError::InvalidPayload(
                "no `text` or `verses` field".to_string(),
            ));
        }
    };

    Ok(text.trim().to_string())
}
