//! # report-forge – Event-report form → print-ready PDF pipeline
//!
//! This crate turns a submitted event-report form (text fields, a rich-text
//! description, an invitation image and up to four photos) into a fixed-layout
//! multi-page PDF. The pipeline stages are:
//!
//! 1. **Ingest** – decode uploads, re-encode as baseline JPEG ([`normalize`]),
//!    stage and promote them in a [`storage::RequestStore`]
//! 2. **Flatten** – rich-text description markup → plain paragraph and
//!    list-item blocks ([`flatten`])
//! 3. **Compose** – place header, fields, description and photos onto pages,
//!    breaking and numbering as needed ([`layout`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//! 5. **Offer** – best-effort copies of images and PDF to a remote mirror
//!    ([`remote`])
//!
//! [`pipeline::build_report`] runs all stages; the intermediate
//! [`document::DocumentLayout`] is serializable for inspection and testing.

pub mod document;
pub mod error;
pub mod flatten;
pub mod fonts;
pub mod layout;
pub mod markup;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod remote;
pub mod render;
pub mod samples;
pub mod storage;

// Re-exports for convenience
pub use error::{BuildError, BuildResult};
pub use pipeline::{build_report, BuildOutput, PipelineConfig};
pub use record::{EventRecord, ReportRequest};
pub use storage::RequestStore;
