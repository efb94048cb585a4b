//! Validated pose-keypoint tracking records.

use ndarray::{ArrayD, IxDyn};
use serde::Serialize;
use tracing::debug;

use crate::coerce::{check_list_length, list_of_strings, normalize_frame_rate};
use crate::config::ValidationConfig;
use crate::diagnostics::{DiagnosticSink, TracingSink, reject};
use crate::error::Result;
use crate::shape::{ShapeContract, arrays_identical, check_matches_leading, leading_dims};
use crate::value::RawValue;

const POSITION: &str = "position";
const CONFIDENCE: &str = "confidence";
const INDIVIDUAL_NAMES: &str = "individual_names";
const KEYPOINT_NAMES: &str = "keypoint_names";

/// Keypoint tracking data that satisfies every shape invariant.
///
/// Produced only by [`PosesRecordValidator`]; all fields are populated and
/// read-only.
///
/// - `position`: `(frames, individuals, keypoints, space)`, `space` is 2 or 3
/// - `confidence`: `(frames, individuals, keypoints)`, NaN where unscored
///
/// Equality is element-wise, so records holding NaN confidence never
/// compare equal; use [`PosesRecord::is_identical`] instead.
///
/// The record remembers the [`ValidationConfig`] it was built under, so
/// converting it back into a [`PosesRecordValidator`] applies the same
/// defaulting policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosesRecord {
    position: ArrayD<f64>,
    confidence: ArrayD<f64>,
    individual_names: Vec<String>,
    keypoint_names: Vec<String>,
    frame_rate: Option<f64>,
    source_software: Option<String>,
    #[serde(skip)]
    config: ValidationConfig,
}

impl PosesRecord {
    /// Returns the position array.
    #[must_use]
    pub const fn position(&self) -> &ArrayD<f64> {
        &self.position
    }

    /// Returns the per-keypoint confidence array.
    #[must_use]
    pub const fn confidence(&self) -> &ArrayD<f64> {
        &self.confidence
    }

    /// Returns the individual names.
    ///
    /// For single-individual sources (see
    /// [`ValidationConfig::is_single_individual_source`]) this holds exactly
    /// one name, which can differ from [`n_individuals`](Self::n_individuals).
    #[must_use]
    pub fn individual_names(&self) -> &[String] {
        &self.individual_names
    }

    /// Returns the keypoint names.
    #[must_use]
    pub fn keypoint_names(&self) -> &[String] {
        &self.keypoint_names
    }

    /// Returns the frame rate, or `None` if unknown.
    #[must_use]
    pub const fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    /// Returns the software the poses came from, if recorded.
    #[must_use]
    pub fn source_software(&self) -> Option<&str> {
        self.source_software.as_deref()
    }

    /// Returns the config the record was validated under.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn n_frames(&self) -> usize {
        self.position.shape()[0]
    }

    /// Returns the number of individuals along the position array.
    #[must_use]
    pub fn n_individuals(&self) -> usize {
        self.position.shape()[1]
    }

    /// Returns the number of keypoints.
    #[must_use]
    pub fn n_keypoints(&self) -> usize {
        self.position.shape()[2]
    }

    /// Returns the spatial dimensionality (2 or 3).
    #[must_use]
    pub fn n_space(&self) -> usize {
        self.position.shape()[3]
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
        arrays_identical(&self.position, &other.position)
            && arrays_identical(&self.confidence, &other.confidence)
            && self.individual_names == other.individual_names
            && self.keypoint_names == other.keypoint_names
            && self.frame_rate == other.frame_rate
            && self.source_software == other.source_software
    }
}

/// Builds a [`PosesRecord`] from loosely typed tool output.
///
/// Field conversion runs first, then the shape checks that relate fields to
/// `position`, then defaults for whatever is still missing. The first
/// violation aborts construction.
///
/// # Example
///
/// ```
/// use motion_records::{CollectingSink, PosesRecordValidator};
/// use ndarray::Array4;
///
/// let sink = CollectingSink::new();
/// let record = PosesRecordValidator::new(Array4::<f64>::zeros((10, 2, 3, 2)))
///     .build_with(&sink)
///     .unwrap();
///
/// assert_eq!(record.confidence().shape(), &[10, 2, 3]);
/// assert_eq!(record.individual_names(), ["individual_0", "individual_1"]);
/// assert_eq!(sink.warnings().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct PosesRecordValidator {
    position: RawValue,
    confidence: Option<RawValue>,
    individual_names: Option<RawValue>,
    keypoint_names: Option<RawValue>,
    frame_rate: Option<RawValue>,
    source_software: Option<String>,
    config: ValidationConfig,
}

impl PosesRecordValidator {
    /// Starts a validator for the given position array.
    #[must_use]
    pub fn new(position: impl Into<RawValue>) -> Self {
        Self {
            position: position.into(),
            confidence: None,
            individual_names: None,
            keypoint_names: None,
            frame_rate: None,
            source_software: None,
            config: ValidationConfig::default(),
        }
    }

    /// Sets the confidence array.
    #[must_use]
    pub fn confidence(mut self, confidence: impl Into<RawValue>) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    /// Sets the individual names.
    #[must_use]
    pub fn individual_names(mut self, names: impl Into<RawValue>) -> Self {
        self.individual_names = Some(names.into());
        self
    }

    /// Sets the keypoint names.
    #[must_use]
    pub fn keypoint_names(mut self, names: impl Into<RawValue>) -> Self {
        self.keypoint_names = Some(names.into());
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

    /// Replaces the validation config.
    #[must_use]
    pub fn config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates and builds the record, reporting diagnostics via `tracing`.
    ///
    /// # Errors
    ///
    /// See [`PosesRecordValidator::build_with`].
    pub fn build(self) -> Result<PosesRecord> {
        self.build_with(&TracingSink)
    }

    /// Validates and builds the record, reporting diagnostics to `sink`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::InvalidInput`](crate::RecordError::InvalidInput) if a
    ///   field has the wrong type
    /// - [`RecordError::InvalidShape`](crate::RecordError::InvalidShape) if
    ///   an array or name list has the wrong shape
    /// - [`RecordError::InvalidConfig`](crate::RecordError::InvalidConfig) if
    ///   the config is unusable
    pub fn build_with(self, sink: &dyn DiagnosticSink) -> Result<PosesRecord> {
        let Self {
            position,
            confidence,
            individual_names,
            keypoint_names,
            frame_rate,
            source_software,
            config,
        } = self;
        config.validate().map_err(|e| reject(sink, e))?;

        let individual_names = individual_names
            .map(|v| list_of_strings(INDIVIDUAL_NAMES, &v, sink))
            .transpose()?;
        let keypoint_names = keypoint_names
            .map(|v| list_of_strings(KEYPOINT_NAMES, &v, sink))
            .transpose()?;
        let frame_rate = normalize_frame_rate(frame_rate.as_ref(), sink)?;

        let position = ShapeContract::POSE_POSITION.enforce(POSITION, position, sink)?;
        let confidence = confidence
            .map(|v| check_matches_leading(CONFIDENCE, v, &position, sink))
            .transpose()?;

        let single_individual = source_software
            .as_deref()
            .is_some_and(|s| config.is_single_individual_source(s));
        let n_individuals = if single_individual {
            1
        } else {
            position.shape()[1]
        };
        let n_keypoints = position.shape()[2];
        check_list_length(
            INDIVIDUAL_NAMES,
            individual_names.as_deref(),
            n_individuals,
            sink,
        )?;
        check_list_length(KEYPOINT_NAMES, keypoint_names.as_deref(), n_keypoints, sink)?;
        debug!(
            shape = ?position.shape(),
            single_individual = single_individual,
            "pose fields validated"
        );

        let confidence = confidence.unwrap_or_else(|| {
            sink.warning(
                CONFIDENCE,
                "Confidence array was not provided. Setting to an array of NaNs.",
            );
            ArrayD::from_elem(IxDyn(leading_dims(position.shape())), f64::NAN)
        });
        let individual_names = individual_names.unwrap_or_else(|| {
            let names =
                ValidationConfig::generated_names(&config.individual_prefix, n_individuals);
            sink.warning(
                INDIVIDUAL_NAMES,
                &format!("Individual names were not provided. Setting to {names:?}."),
            );
            names
        });
        let keypoint_names = keypoint_names.unwrap_or_else(|| {
            let names = ValidationConfig::generated_names(&config.keypoint_prefix, n_keypoints);
            sink.warning(
                KEYPOINT_NAMES,
                &format!("Keypoint names were not provided. Setting to {names:?}."),
            );
            names
        });

        Ok(PosesRecord {
            position,
            confidence,
            individual_names,
            keypoint_names,
            frame_rate,
            source_software,
            config,
        })
    }
}

impl From<PosesRecord> for PosesRecordValidator {
    fn from(record: PosesRecord) -> Self {
        Self {
            position: RawValue::Array(record.position),
            confidence: Some(RawValue::Array(record.confidence)),
            individual_names: Some(record.individual_names.into()),
            keypoint_names: Some(record.keypoint_names.into()),
            frame_rate: record.frame_rate.map(RawValue::Float),
            source_software: record.source_software,
            config: record.config,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::error::RecordError;
    use ndarray::{Array3, Array4, Array5};

    fn position(frames: usize, individuals: usize, keypoints: usize, space: usize) -> Array4<f64> {
        Array4::from_shape_fn((frames, individuals, keypoints, space), |(f, i, k, s)| {
            (f * 1000 + i * 100 + k * 10 + s) as f64
        })
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let sink = CollectingSink::new();
        let record = PosesRecordValidator::new(position(10, 2, 3, 2))
            .build_with(&sink)
            .unwrap();

        assert_eq!(record.confidence().shape(), &[10, 2, 3]);
        assert!(record.confidence().iter().all(|c| c.is_nan()));
        assert_eq!(record.individual_names(), ["individual_0", "individual_1"]);
        assert_eq!(
            record.keypoint_names(),
            ["keypoint_0", "keypoint_1", "keypoint_2"]
        );
        assert_eq!(record.frame_rate(), None);
        assert_eq!(record.source_software(), None);
        assert_eq!(sink.warnings().len(), 3);
        assert!(sink.errors().is_empty());
    }

    #[test]
    fn supplied_fields_are_kept() {
        let sink = CollectingSink::new();
        let confidence = Array3::<f64>::from_elem((4, 1, 2), 0.9);
        let record = PosesRecordValidator::new(position(4, 1, 2, 3))
            .confidence(confidence.clone())
            .individual_names(vec!["mouse"])
            .keypoint_names(vec!["snout", "tail"])
            .frame_rate(30)
            .source_software("DeepLabCut")
            .build_with(&sink)
            .unwrap();

        assert_eq!(record.confidence(), &confidence.into_dyn());
        assert_eq!(record.individual_names(), ["mouse"]);
        assert_eq!(record.keypoint_names(), ["snout", "tail"]);
        assert_eq!(record.frame_rate(), Some(30.0));
        assert_eq!(record.source_software(), Some("DeepLabCut"));
        assert_eq!(record.n_space(), 3);
        assert!(sink.is_empty());
    }

    #[test]
    fn dimension_accessors() {
        let record = PosesRecordValidator::new(position(7, 3, 5, 2))
            .frame_rate(50.0)
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(record.n_frames(), 7);
        assert_eq!(record.n_individuals(), 3);
        assert_eq!(record.n_keypoints(), 5);
        assert_eq!(record.n_space(), 2);
        assert!(record.has_frame_rate());
        assert_eq!(record.time_in_seconds(25), Some(0.5));
    }

    #[test]
    fn rejects_non_array_position() {
        let sink = CollectingSink::new();
        let err = PosesRecordValidator::new(vec![1.0, 2.0])
            .build_with(&sink)
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput { .. }));
        assert_eq!(err.field(), Some("position"));
        assert_eq!(sink.errors(), vec![err]);
    }

    #[test]
    fn rejects_wrong_rank() {
        let err = PosesRecordValidator::new(Array3::<f64>::zeros((10, 3, 2)))
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidShape { .. }));
        assert!(err.to_string().contains("4 dimensions, but got 3"));

        let err = PosesRecordValidator::new(Array5::<f64>::zeros((1, 1, 1, 1, 2)))
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(err.to_string().contains("but got 5"));
    }

    #[test]
    fn rejects_wrong_space() {
        let err = PosesRecordValidator::new(position(10, 2, 3, 1))
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(err.to_string().contains("2 or 3 spatial dimensions, but got 1"));
    }

    #[test]
    fn rejects_mismatched_confidence() {
        let err = PosesRecordValidator::new(position(10, 2, 3, 2))
            .confidence(Array3::<f64>::zeros((10, 2, 4)))
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidShape { .. }));
        assert_eq!(err.field(), Some("confidence"));
    }

    #[test]
    fn rejects_non_array_confidence() {
        let err = PosesRecordValidator::new(position(10, 2, 3, 2))
            .confidence(0.5)
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_wrong_name_lengths() {
        let err = PosesRecordValidator::new(position(10, 2, 3, 2))
            .individual_names(vec!["a", "b", "c"])
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(err.to_string().contains("length 2, but got 3"));

        let err = PosesRecordValidator::new(position(10, 2, 3, 2))
            .keypoint_names(vec!["nose"])
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert_eq!(err.field(), Some("keypoint_names"));
    }

    #[test]
    fn bare_string_name_is_wrapped() {
        let sink = CollectingSink::new();
        let record = PosesRecordValidator::new(position(10, 1, 3, 2))
            .individual_names("x")
            .build_with(&sink)
            .unwrap();
        assert_eq!(record.individual_names(), ["x"]);
        assert!(sink.warnings()[0].contains("Expected a list of strings"));
    }

    #[test]
    fn lightning_pose_requires_single_name() {
        let err = PosesRecordValidator::new(position(10, 1, 3, 2))
            .individual_names(vec!["a", "b"])
            .source_software("LightningPose")
            .build_with(&CollectingSink::new())
            .unwrap_err();
        assert!(err.to_string().contains("length 1, but got 2"));

        let record = PosesRecordValidator::new(position(10, 2, 3, 2))
            .individual_names(vec!["a"])
            .source_software("LightningPose")
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(record.individual_names(), ["a"]);
    }

    #[test]
    fn lightning_pose_default_names_follow_single_individual_rule() {
        let record = PosesRecordValidator::new(position(10, 2, 3, 2))
            .source_software("LightningPose")
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(record.individual_names(), ["individual_0"]);
    }

    #[test]
    fn negative_frame_rate_degrades() {
        let sink = CollectingSink::new();
        let record = PosesRecordValidator::new(position(10, 2, 3, 2))
            .frame_rate(-5)
            .build_with(&sink)
            .unwrap();
        assert!(!record.has_frame_rate());
        assert_eq!(record.time_in_seconds(3), None);
        assert!(sink.warnings()[0].contains("Invalid frame rate"));
    }

    #[test]
    fn first_violation_wins() {
        let sink = CollectingSink::new();
        let err = PosesRecordValidator::new(position(10, 2, 3, 2))
            .keypoint_names(5)
            .frame_rate("fast")
            .build_with(&sink)
            .unwrap_err();
        assert_eq!(err.field(), Some("keypoint_names"));
        assert_eq!(sink.errors().len(), 1);
    }

    #[test]
    fn custom_config_prefixes() {
        let config = ValidationConfig::default()
            .with_individual_prefix("mouse")
            .with_keypoint_prefix("bodypart");
        let record = PosesRecordValidator::new(position(2, 2, 1, 2))
            .config(config)
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(record.individual_names(), ["mouse_0", "mouse_1"]);
        assert_eq!(record.keypoint_names(), ["bodypart_0"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let sink = CollectingSink::new();
        let err = PosesRecordValidator::new(position(2, 2, 1, 2))
            .config(ValidationConfig::default().with_individual_prefix(""))
            .build_with(&sink)
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidConfig(_)));
        assert_eq!(sink.errors().len(), 1);
    }

    #[test]
    fn revalidation_is_idempotent() {
        let first = PosesRecordValidator::new(position(6, 2, 4, 3))
            .frame_rate(25)
            .build_with(&CollectingSink::new())
            .unwrap();

        let sink = CollectingSink::new();
        let second = PosesRecordValidator::from(first.clone())
            .build_with(&sink)
            .unwrap();

        assert!(second.is_identical(&first));
        assert!(sink.is_empty());
    }

    #[test]
    fn revalidation_keeps_custom_single_individual_source() {
        let config = ValidationConfig::default().with_single_individual_source("SLEAP-single");
        let first = PosesRecordValidator::new(position(3, 2, 2, 2))
            .source_software("SLEAP-single")
            .config(config.clone())
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(first.individual_names(), ["individual_0"]);
        assert_eq!(first.config(), &config);

        let sink = CollectingSink::new();
        let second = PosesRecordValidator::from(first.clone())
            .build_with(&sink)
            .unwrap();

        assert!(second.is_identical(&first));
        assert_eq!(second.config(), &config);
        assert!(sink.is_empty());
    }

    #[test]
    fn revalidation_keeps_custom_prefixes() {
        let config = ValidationConfig::default().with_keypoint_prefix("bodypart");
        let first = PosesRecordValidator::new(position(2, 1, 2, 3))
            .config(config)
            .build_with(&CollectingSink::new())
            .unwrap();

        let second = PosesRecordValidator::from(first.clone())
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(second.keypoint_names(), ["bodypart_0", "bodypart_1"]);
        assert!(second.is_identical(&first));
    }

    #[test]
    fn single_individual_names_may_differ_from_axis() {
        let record = PosesRecordValidator::new(position(4, 3, 1, 2))
            .source_software("LightningPose")
            .build_with(&CollectingSink::new())
            .unwrap();
        assert_eq!(record.n_individuals(), 3);
        assert_eq!(record.individual_names().len(), 1);
    }

    #[test]
    fn serializes_by_field_name() {
        let record = PosesRecordValidator::new(position(1, 1, 1, 2))
            .confidence(Array3::<f64>::from_elem((1, 1, 1), 1.0))
            .build_with(&CollectingSink::new())
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("position").is_some());
        assert_eq!(json["keypoint_names"][0], "keypoint_0");
        assert!(json.get("config").is_none());
    }
}
