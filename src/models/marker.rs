//! Practice markers
//!
//! A marker flags a moment of the performance as an error or as correctly
//! played. Markers come from two producers: the manual tap UI and the pitch
//! detection collaborator. The producer is recorded in `origin`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PracticeError;

/// Id prefix used by automatically detected markers
pub const AUTO_ID_PREFIX: &str = "auto-";

/// Id prefix for manual markers whose id is generated by the engine
pub const MANUAL_ID_PREFIX: &str = "manual-";

/// What the marker says about the performance
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Error,
    Correct,
}

/// Who placed the marker
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MarkerOrigin {
    /// Placed by pitch detection
    Auto,
    /// Placed by the performer
    Manual,
}

impl MarkerOrigin {
    /// Origin implied by an id, following the `auto-` prefix convention
    pub fn from_id(id: &str) -> Self {
        if id.starts_with(AUTO_ID_PREFIX) {
            MarkerOrigin::Auto
        } else {
            MarkerOrigin::Manual
        }
    }

    /// Prefix for ids generated for this origin
    pub fn id_prefix(self) -> &'static str {
        match self {
            MarkerOrigin::Auto => AUTO_ID_PREFIX,
            MarkerOrigin::Manual => MANUAL_ID_PREFIX,
        }
    }
}

/// A marker placed on a page of the score
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "MarkerData")]
pub struct Marker {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: MarkerKind,

    pub origin: MarkerOrigin,

    /// 1-based page number
    pub page: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Wire shape accepted when reading markers back.
///
/// Older records have no `origin`; it is derived from the id. An explicit
/// origin must agree with the id prefix.
#[derive(Deserialize)]
struct MarkerData {
    id: String,
    #[serde(rename = "type")]
    kind: MarkerKind,
    #[serde(default)]
    origin: Option<MarkerOrigin>,
    page: u32,
    #[serde(default)]
    note: Option<String>,
}

impl TryFrom<MarkerData> for Marker {
    type Error = PracticeError;

    fn try_from(data: MarkerData) -> Result<Self, Self::Error> {
        let origin = data
            .origin
            .unwrap_or_else(|| MarkerOrigin::from_id(&data.id));
        let marker = Marker {
            id: data.id,
            kind: data.kind,
            origin,
            page: data.page,
            note: data.note,
        };
        marker.check_origin()?;
        Ok(marker)
    }
}

impl Marker {
    /// Create a marker; origin follows the id prefix
    pub fn new(id: impl Into<String>, kind: MarkerKind, page: u32) -> Self {
        let id = id.into();
        let origin = MarkerOrigin::from_id(&id);
        Self {
            id,
            kind,
            origin,
            page,
            note: None,
        }
    }

    /// Attach a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// The origin must be the one the id prefix implies
    pub fn check_origin(&self) -> Result<(), PracticeError> {
        if self.origin != MarkerOrigin::from_id(&self.id) {
            return Err(PracticeError::InvalidMarker(format!(
                "id '{}' does not match origin {:?}",
                self.id, self.origin
            )));
        }
        Ok(())
    }

    pub fn is_error(&self) -> bool {
        self.kind == MarkerKind::Error
    }

    pub fn is_auto(&self) -> bool {
        self.origin == MarkerOrigin::Auto
    }
}

/// Inbound marker event from a producer (tap UI or pitch detection)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkerEvent {
    #[serde(rename = "type")]
    pub kind: MarkerKind,

    pub page: u32,

    #[serde(default)]
    pub note: Option<String>,

    /// Producer-assigned id; auto-detected events carry an `auto-` id
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub origin: Option<MarkerOrigin>,
}

impl MarkerEvent {
    /// Manual tap on a page
    pub fn manual(kind: MarkerKind, page: u32) -> Self {
        Self {
            kind,
            page,
            note: None,
            id: None,
            origin: Some(MarkerOrigin::Manual),
        }
    }

    /// Detection event with the producer's id
    pub fn detected(id: impl Into<String>, kind: MarkerKind, page: u32) -> Self {
        Self {
            kind,
            page,
            note: None,
            id: Some(id.into()),
            origin: Some(MarkerOrigin::Auto),
        }
    }

    /// Validate the event and turn it into a marker, generating an id if needed
    pub fn into_marker(self) -> Result<Marker, PracticeError> {
        if self.page == 0 {
            return Err(PracticeError::InvalidMarker(
                "page numbers start at 1".to_string(),
            ));
        }

        let (id, origin) = match (self.id, self.origin) {
            (Some(id), origin) => {
                if id.is_empty() {
                    return Err(PracticeError::InvalidMarker(
                        "marker id must not be empty".to_string(),
                    ));
                }
                let implied = MarkerOrigin::from_id(&id);
                if let Some(origin) = origin {
                    if origin != implied {
                        return Err(PracticeError::InvalidMarker(format!(
                            "id '{}' does not match origin {:?}",
                            id, origin
                        )));
                    }
                }
                (id, implied)
            }
            (None, origin) => {
                let origin = origin.unwrap_or(MarkerOrigin::Manual);
                (generate_marker_id(origin), origin)
            }
        };

        Ok(Marker {
            id,
            kind: self.kind,
            origin,
            page: self.page,
            note: self.note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Fresh marker id carrying the prefix of its origin
pub fn generate_marker_id(origin: MarkerOrigin) -> String {
    format!("{}{}", origin.id_prefix(), Uuid::new_v4())
}
