//! Form intake – the event record, upload sources, and the JSON request
//! document that carries one report submission.
//!
//! Every text field is opaque: nothing here validates venues, dates, or
//! counts, and empty values pass straight through to layout. The form never
//! enforced required fields and the document renders label-only lines for
//! missing values on purpose.

use std::fs;
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};

/// All text fields of one event report, as captured from the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub organization: String,
    pub division: String,
    pub department: String,
    pub event_type: String,
    pub title: String,
    pub venue: String,
    pub date: String,
    pub participant: String,
    pub resource_person: String,
    pub participant_count: String,
    /// Restricted description markup (p / ul / ol / li / b / i).
    pub description: String,
    /// Captions matched to gallery photos by index. Photos past the end of
    /// this list get no caption; extra captions are unused.
    pub photo_captions: Vec<String>,
}

/// Where an upload's bytes come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadSource {
    /// A file on disk.
    Path { path: PathBuf },
    /// An inline `data:<mime>;base64,...` URI.
    DataUri { data: String },
}

/// One uploaded file: the client-side name plus its byte source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    /// Original file name, used for staging and log messages.
    pub name: String,
    #[serde(flatten)]
    pub source: UploadSource,
}

impl Upload {
    /// Raw bytes of the upload, read from disk or decoded from the inline
    /// data URI. The bytes are still in whatever encoding the client sent.
    pub fn read_bytes(&self) -> BuildResult<Vec<u8>> {
        match &self.source {
            UploadSource::Path { path } => {
                fs::read(path).map_err(|e| BuildError::InvalidUpload {
                    name: self.name.clone(),
                    reason: format!("{}: {e}", path.display()),
                })
            }
            UploadSource::DataUri { data } => {
                parse_data_uri(data).map_err(|reason| BuildError::InvalidUpload {
                    name: self.name.clone(),
                    reason,
                })
            }
        }
    }
}

/// A full report submission as read from a JSON document. Missing fields
/// default to empty, matching a form posted with blanks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub division: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub participant: String,
    #[serde(default)]
    pub resource_person: String,
    #[serde(default)]
    pub participant_count: String,
    #[serde(default)]
    pub description: String,
    /// Single comma-separated caption string, exactly as the form posts it.
    #[serde(default)]
    pub photo_captions: String,
    #[serde(default)]
    pub invitation: Option<Upload>,
    #[serde(default)]
    pub photos: Vec<Upload>,
}

impl ReportRequest {
    /// Parse a request from its JSON document.
    pub fn from_json(json: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The immutable record handed to the layout engine, with the caption
    /// string split into its per-photo list.
    pub fn record(&self) -> EventRecord {
        EventRecord {
            organization: self.organization.clone(),
            division: self.division.clone(),
            department: self.department.clone(),
            event_type: self.event_type.clone(),
            title: self.title.clone(),
            venue: self.venue.clone(),
            date: self.date.clone(),
            participant: self.participant.clone(),
            resource_person: self.resource_person.clone(),
            participant_count: self.participant_count.clone(),
            description: self.description.clone(),
            photo_captions: split_captions(&self.photo_captions),
        }
    }
}

/// Split the form's comma-separated caption field into trimmed captions.
/// A blank field means no captions at all, not one empty caption.
pub fn split_captions(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|c| c.trim().to_string()).collect()
}

/// File name of the finished artifact: `{title}_{date}.pdf`, with path
/// separators replaced so the name stays a single store entry.
pub fn artifact_name(record: &EventRecord) -> String {
    let stem = format!("{}_{}", record.title, record.date);
    let safe: String = stem
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{safe}.pdf")
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
///
/// Returns `Err` if the source is not a data URI or does not use base64
/// encoding.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    if !src.starts_with("data:") {
        let preview = if src.len() > 80 { &src[..80] } else { src };
        return Err(format!(
            "upload data must be a base64 data URI \
             (e.g. `data:image/png;base64,...`). Got: {preview:?}"
        ));
    }
    let rest = &src["data:".len()..];
    let comma_pos = rest.find(',').ok_or_else(|| {
        "invalid data URI: missing `,` separator between header and data".to_string()
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err("only base64-encoded data URIs are supported. \
             The header must contain `;base64` (e.g. `data:image/png;base64,...`)."
            .to_string());
    }
    let b64_data = rest[comma_pos + 1..].trim();
    BASE64_STD
        .decode(b64_data)
        .map_err(|e| format!("base64 decode error: {e}"))
}
