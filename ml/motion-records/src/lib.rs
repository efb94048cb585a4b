//! Validated tracking records for CortenForge.
//!
//! This crate turns loosely typed output of third-party pose estimation and
//! object tracking tools into records whose shapes are guaranteed:
//!
//! # Record Types
//!
//! - [`PosesRecord`] - Keypoint positions `(frames, individuals, keypoints, space)`
//! - [`BboxesRecord`] - Box centroids and sizes `(frames, boxes, 2)`
//!
//! # Validators
//!
//! - [`PosesRecordValidator`] - Builds a [`PosesRecord`], filling defaults
//! - [`BboxesRecordValidator`] - Builds a [`BboxesRecord`]; box names required
//!
//! # Building Blocks
//!
//! - [`RawValue`] - Dynamically typed input value
//! - [`ShapeContract`] - Rank and trailing-axis requirements
//! - [`list_of_strings`], [`ensure_array`], [`normalize_frame_rate`],
//!   [`check_list_length`] - Field converters and checks
//! - [`DiagnosticSink`] - Where warnings and rejections are reported
//! - [`ValidationConfig`] - Defaulting policy
//!
//! Structural problems abort construction with a [`RecordError`]. Imperfect
//! but recoverable input (a bare string where a list was expected, a
//! non-positive frame rate, an absent optional field) is reported as a
//! warning and construction continues.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. It can be used in:
//! - Dataset import tools
//! - Movement analysis pipelines
//! - Validation scripts
//!
//! # Example
//!
//! ```
//! use motion_records::{CollectingSink, PosesRecordValidator};
//! use ndarray::Array4;
//!
//! let sink = CollectingSink::new();
//! let record = PosesRecordValidator::new(Array4::<f64>::zeros((100, 1, 4, 2)))
//!     .keypoint_names(vec!["snout", "left_ear", "right_ear", "tail_base"])
//!     .frame_rate(-5)
//!     .build_with(&sink)
//!     .unwrap();
//!
//! assert_eq!(record.frame_rate(), None);
//! assert_eq!(record.individual_names(), ["individual_0"]);
//! assert_eq!(sink.warnings().len(), 3);
//! ```
//!
//! # Quality Standards
//!
//! This crate maintains A-grade standards:
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bboxes;
mod coerce;
mod config;
mod diagnostics;
mod error;
mod poses;
mod shape;
mod value;

// Re-export record types
pub use bboxes::{BboxesRecord, BboxesRecordValidator};
pub use poses::{PosesRecord, PosesRecordValidator};

// Re-export building blocks
pub use coerce::{check_list_length, ensure_array, list_of_strings, normalize_frame_rate};
pub use config::{LIGHTNING_POSE, ValidationConfig};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use shape::{ShapeContract, check_matches_leading, leading_dims};
pub use value::RawValue;

// Re-export error types
pub use error::{RecordError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        BboxesRecord, BboxesRecordValidator, CollectingSink, DiagnosticSink, PosesRecord,
        PosesRecordValidator, RawValue, RecordError, TracingSink, ValidationConfig,
    };
}
