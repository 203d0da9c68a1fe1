use crate::utils::error::{FetchError, ParseError, ScreenError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unprocessed bytes as received from a data source. No structure is assumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    bytes: Vec<u8>,
}

impl RawPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for RawPayload {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}

/// Display-ready text. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayValue(String);

impl DisplayValue {
    pub fn new(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for DisplayValue {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Stub,
    Network,
    LocalStore,
    Callback,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Stub => "stub",
            SourceKind::Network => "network",
            SourceKind::LocalStore => "local_store",
            SourceKind::Callback => "callback",
        };
        f.write_str(name)
    }
}

/// One completed fetch, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub source: SourceKind,
    pub result: Result<RawPayload, FetchError>,
}

/// The single message a mediator sends towards a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub request_id: u64,
    pub source: SourceKind,
    pub outcome: Result<DisplayValue, ScreenError>,
}

impl Delivery {
    pub fn is_data(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// What became of a single trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// At least one display value reached the view.
    Delivered { request_id: u64 },
    /// Only errors reached the view.
    Failed { request_id: u64 },
    /// A request was already in flight.
    Rejected,
    /// Queued behind the in-flight request.
    Coalesced,
    /// No trigger handler registered.
    Unhandled,
    /// The receiving side no longer exists.
    Detached,
}

impl TriggerOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, TriggerOutcome::Delivered { .. })
    }

    pub fn request_id(&self) -> Option<u64> {
        match self {
            TriggerOutcome::Delivered { request_id } | TriggerOutcome::Failed { request_id } => {
                Some(*request_id)
            }
            _ => None,
        }
    }
}
