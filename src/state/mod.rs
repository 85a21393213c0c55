//! Persisted state.
//!
//! The only thing that survives a run is the version marker, and only when
//! every step finished.

pub mod marker;

pub use marker::{is_semver, MarkerStatus, VersionMarker, MARKER_FILE, VERSION};
