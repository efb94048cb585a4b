//! Validated bounding-box tracking records.

use ndarray::{ArrayD, IxDyn};
use serde::Serialize;
use tracing::debug;

use crate::coerce::{check_list_length, list_of_strings, normalize_frame_rate};
use crate::diagnostics::{DiagnosticSink, TracingSink, reject};
use crate::error::{RecordError, Result};
use crate::shape::{ShapeContract, arrays_identical, check_matches_leading, leading_dims};
use crate::value::RawValue;

const CENTROID_POSITION: &str = "centroid_position";
const SIZE: &str = "size";
const CONFIDENCE: &str = "confidence";
const BOX_NAMES: &str = "box_names";

/// Bounding-box tracking data that satisfies every shape invariant.
///
/// - `centroid_position`: `(frames, boxes, 2)` as x/y
/// - `size`: `(frames, boxes, 2)` as width/height
/// - `confidence`: `(frames, boxes)`, NaN where unscored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BboxesRecord {
    centroid_position: ArrayD<f64>,
    size: ArrayD<f64>,
    box_names: Vec<String>,
    confidence: ArrayD<f64>,
    frame_rate: Option<f64>,
    source_software: Option<String>,
}

impl BboxesRecord {
    /// Returns the centroid positions.
    #[must_use]
    pub const fn centroid_position(&self) -> &ArrayD<f64> {
        &self.centroid_position
    }

    /// Returns the box widths and heights.
    #[must_use]
    pub const fn size(&self) -> &ArrayD<f64> {
        &self.size
    }

    /// Returns the box identifiers.
    #[must_use]
    pub fn box_names(&self) -> &[String] {
        &self.box_names
    }

    /// Returns the per-box confidence array.
    #[must_use]
    pub const fn confidence(&self) -> &ArrayD<f64> {
        &self.confidence
    }

    /// Returns the frame rate, or `None` if unknown.
    #[must_use]
    pub const fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    /// Returns the software the boxes came from, if recorded.
    #[must_use]
    pub fn source_software(&self) -> Option<&str> {
        self.source_software.as_deref()
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.centroid_position.shape()[0]
    }

    /// Returns the number of tracked boxes.
    #[must_use]
    pub fn n_boxes(&self) -> usize {
        self.centroid_position.shape()[1]
    }

    /// Returns `true` if the frame rate is known.
    #[must_use]
    pub const fn has_frame_rate(&self) -> bool {
        self.frame_rate.is_some()
    }

    /// Returns the timestamp of `frame` in seconds, if the frame rate is known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn time_in_seconds(&self, frame: usize) -> Option<f64> {
        self.frame_rate.map(|fps| frame as f64 / fps)
    }

    /// Compares two records field by field, treating NaN as equal to NaN.
    #[must_use]
    pub fn is_identical(&self, other: &Self) -> bool {
        arrays_identical(&self.centroid_position, &other.centroid_position)
            && arrays_identical(&self.size, &other.size)
            && arrays_identical(&self.confidence, &other.confidence)
            && self.box_names == other.box_names
            && self.frame_rate == other.frame_rate
            && self.source_software == other.source_software
    }
}

/// Builds a [`BboxesRecord`] from loosely typed tool output.
///
/// Unlike poses, box names have no default: a validator without
/// [`box_names`](Self::box_names) fails with
/// [`RecordError::MissingField`].
///
/// # Example
///
/// ```
/// use motion_records::{BboxesRecordValidator, CollectingSink};
/// use ndarray::Array3;
///
/// let sink = CollectingSink::new();
/// let record = BboxesRecordValidator::new(
///     Array3::<f64>::zeros((5, 2, 2)),
///     Array3::<f64>::ones((5, 2, 2)),
/// )
/// .box_names(vec!["id_1", "id_2"])
/// .frame_rate(30)
/// .build_with(&sink)
/// .unwrap();
///
/// assert_eq!(record.confidence().shape(), &[5, 2]);
/// assert_eq!(record.n_boxes(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BboxesRecordValidator {
    centroid_position: RawValue,
    size: RawValue,
    box_names: Option<RawValue>,
    confidence: Option<RawValue>,
    frame_rate: Option<RawValue>,
    source_software: Option<String>,
}

impl BboxesRecordValidator {
    /// Starts a validator for the given centroid and size arrays.
    #[must_use]
    pub fn new(centroid_position: impl Into<RawValue>, size: impl Into<RawValue>) -> Self {
        Self {
            centroid_position: centroid_position.into(),
            size: size.into(),
            box_names: None,
            confidence: None,
            frame_rate: None,
            source_software: None,
        }
    }

    /// Sets the box identifiers (required).
    #[must_use]
    pub fn box_names(mut self, names: impl Into<RawValue>) -> Self {
        self.box_names = Some(names.into());
        self
    }

    /// Sets the confidence array.
    #[must_use]
    pub fn confidence(mut self, confidence: impl Into<RawValue>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    /// Sets the frame rate.
    #[must_use]
    pub fn frame_rate(mut self, frame_rate: impl Into<RawValue>) -> Self {
        self.frame_rate = Some(frame_rate.into());
        self
    }

    /// Sets the source software label.
    #[must_use]
    pub fn source_software(mut self, source: impl Into<String>) -> Self {
        self.source_software = Some(source.into());
        self
    }

    /// Validates and builds the record, reporting diagnostics via `tracing`.
    ///
    /// # Errors
    ///
    /// See [`BboxesRecordValidator::build_with`].
    pub fn build(self) -> Result<BboxesRecord> {
        self.build_with(&TracingSink)
    }

    /// Validates and builds the record, reporting diagnostics to `sink`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidInput`] if a field has the wrong type
    /// - [`RecordError::InvalidShape`] if an array or the name list has the
    ///   wrong shape, or `size` does not match `centroid_position`
    /// - [`RecordError::MissingField`] if no box names were supplied
    pub fn build_with(self, sink: &dyn DiagnosticSink) -> Result<BboxesRecord> {
        let Self {
            centroid_position,
            size,
            box_names,
            confidence,
            frame_rate,
            source_software,
        } = self;

        let box_names = box_names
            .map(|v| list_of_strings(BOX_NAMES, &v, sink))
            .transpose()?;
        let frame_rate = normalize_frame_rate(frame_rate.as_ref(), sink)?;

        let centroid_position =
            ShapeContract::BBOX_PLANAR.enforce(CENTROID_POSITION, centroid_position, sink)?;
        let size = ShapeContract::BBOX_PLANAR.enforce(SIZE, size, sink)?;
        if size.shape() != centroid_position.shape() {
            return Err(reject(
                sink,
                RecordError::invalid_shape(
                    SIZE,
                    format!(
                        "Expected `{SIZE}` to have shape {:?} to match `{CENTROID_POSITION}`, but got {:?}.",
                        centroid_position.shape(),
                        size.shape()
                    ),
                ),
            ));
        }
        let confidence = confidence
            .map(|v| check_matches_leading(CONFIDENCE, v, &centroid_position, sink))
            .transpose()?;

        let n_boxes = centroid_position.shape()[1];
        check_list_length(BOX_NAMES, box_names.as_deref(), n_boxes, sink)?;
        debug!(shape = ?centroid_position.shape(), "bbox fields validated");

        let confidence = confidence.unwrap_or_else(|| {
            sink.warning(
                CONFIDENCE,
                "Confidence array was not provided. Setting to an array of NaNs.",
            );
            ArrayD::from_elem(IxDyn(leading_dims(centroid_position.shape())), f64::NAN)
        });
        let box_names =
            box_names.ok_or_else(|| reject(sink, RecordError::missing_field(BOX_NAMES)))?;

        Ok(BboxesRecord {
            centroid_position,
            size,
            box_names,
            confidence,
            frame_rate,
            source_software,
        })
    }
}

impl From<BboxesRecord> for BboxesRecordValidator {
    fn from(record: BboxesRecord) -> Self {
        Self {
            centroid_position: RawValue::Array(record.centroid_position),
            size: RawValue::Array(record.size),
            box_names: Some(record.box_names.into()),
            confidence: Some(RawValue::Array(record.confidence)),
            frame_rate: record.frame_rate.map(RawValue::Float),
            source_software: record.source_software,
        }
    }
}
