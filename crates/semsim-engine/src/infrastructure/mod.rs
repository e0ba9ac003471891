//! Infrastructure Layer
//!
//! External-format integrations. The domain layer stays infallible and
//! dependency-free; anything that serializes, formats, or talks to the
//! outside world lives here.

pub mod trace;

pub use trace::{export_json, render_text, trace_document, TraceDocument, TraceMetadata, TraceStep};
