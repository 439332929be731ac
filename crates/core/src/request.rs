//! Inbound request envelope and the request body sent to workers.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Kind of content a request asks the workers to assess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// A single still image.
    Image,
    /// A short video clip.
    Video,
}

impl RequestKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestKind {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(EnvelopeError::UnknownKind(other.to_owned())),
        }
    }
}

/// Caller-side validation failures for a [`RequestEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// Neither an inline payload nor a source URL was given.
    #[error("payload_b64 or source_url required")]
    MissingPayload,
    /// Both an inline payload and a source URL were given.
    #[error("payload_b64 and source_url are mutually exclusive")]
    AmbiguousPayload,
    /// Video requests are only accepted by reference.
    #[error("video requests require source_url")]
    VideoRequiresUrl,
    /// Unrecognized request kind.
    #[error("unknown request kind: {0}")]
    UnknownKind(String),
}

/// One inbound request, as handed to the router.
///
/// `priority` is computed by an external eligibility check before the
/// envelope reaches the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Request kind.
    pub kind: RequestKind,
    /// Inline payload (base64 or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_b64: Option<String>,
    /// Payload reference by URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Whether the caller is entitled to a maximal committee.
    #[serde(default)]
    pub priority: bool,
    /// Advisory deadline forwarded to the workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl RequestEnvelope {
    /// Image request carrying its payload inline.
    pub fn image_b64(payload: impl Into<String>) -> Self {
        Self::new(RequestKind::Image, Some(payload.into()), None)
    }

    /// Image request referencing its payload by URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Image, None, Some(url.into()))
    }

    /// Video request referencing its payload by URL.
    pub fn video_url(url: impl Into<String>) -> Self {
        Self::new(RequestKind::Video, None, Some(url.into()))
    }

    fn new(kind: RequestKind, payload_b64: Option<String>, source_url: Option<String>) -> Self {
        Self {
            kind,
            payload_b64,
            source_url,
            priority: false,
            deadline_ms: None,
        }
    }

    /// Set the priority flag.
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Set the deadline hint.
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    /// Check that exactly one payload reference is present.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let inline = self.payload_b64.as_deref().is_some_and(|p| !p.is_empty());
        let by_url = self.source_url.as_deref().is_some_and(|u| !u.is_empty());
        match (inline, by_url) {
            (false, false) => Err(EnvelopeError::MissingPayload),
            (true, true) => Err(EnvelopeError::AmbiguousPayload),
            (true, false) if self.kind == RequestKind::Video => Err(EnvelopeError::VideoRequiresUrl),
            _ => Ok(()),
        }
    }

    /// Build the body sent to each worker, tagged with a fresh job id.
    pub fn to_infer_request(&self) -> InferRequest {
        InferRequest {
            kind: self.kind,
            payload_b64: self.payload_b64.clone(),
            source_url: self.source_url.clone(),
            deadline_ms: self.deadline_ms,
            job_id: Ulid::new(),
        }
    }
}

/// Request body posted to a worker's inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferRequest {
    /// Request kind.
    #[serde(rename = "type")]
    pub kind: RequestKind,
    /// Inline payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_b64: Option<String>,
    /// Payload reference by URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Advisory deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    /// Correlation id shared by every committee member of one request.
    pub job_id: Ulid,
}
