//! Timeline mapping and export orchestration.
//!
//! Builds per-shot panel groupings from a sequence revision's marker track,
//! resolves the media objects already attached to each panel's asset, and
//! drives the asynchronous quicktime export chain to a terminal state.

pub mod error;
pub mod orchestrator;
pub mod timeline;

pub use error::{ExportError, ExportResult};
pub use orchestrator::{ExporterConfig, PollControl, QuicktimeExporter};
pub use timeline::{assign_panels_to_markers, resolve_shot_media, ShotAssignment};
