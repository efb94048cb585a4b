//! Rank and trailing-axis contracts for tracking arrays.

use ndarray::ArrayD;
use tracing::debug;

use crate::coerce::ensure_array;
use crate::diagnostics::{DiagnosticSink, reject};
use crate::error::{RecordError, Result};
use crate::value::RawValue;

/// Required rank and trailing-axis sizes of a tracking array.
///
/// # Example
///
/// ```
/// use motion_records::ShapeContract;
///
/// let contract = ShapeContract::POSE_POSITION;
/// assert_eq!(contract.rank(), 4);
/// assert!(contract.allows_trailing(3));
/// assert!(!contract.allows_trailing(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeContract {
    rank: usize,
    trailing: &'static [usize],
    trailing_label: &'static str,
}

impl ShapeContract {
    /// `(frames, individuals, keypoints, space)` with 2D or 3D space.
    pub const POSE_POSITION: Self = Self::new(4, &[2, 3], "spatial dimensions");

    /// `(frames, boxes, 2)`: centroids as x/y, sizes as width/height.
    pub const BBOX_PLANAR: Self = Self::new(3, &[2], "spatial coordinates");

    /// Creates a contract.
    ///
    /// `trailing_label` names the last axis in error messages.
    #[must_use]
    pub const fn new(rank: usize, trailing: &'static [usize], trailing_label: &'static str) -> Self {
        Self {
            rank,
            trailing,
            trailing_label,
        }
    }

    /// Returns the required number of dimensions.
    #[must_use]
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the permitted sizes of the last axis.
    #[must_use]
    pub const fn trailing(&self) -> &'static [usize] {
        self.trailing
    }

    /// Returns `true` if `size` is a permitted last-axis size.
    #[must_use]
    pub fn allows_trailing(&self, size: usize) -> bool {
        self.trailing.contains(&size)
    }

    /// Checks rank, then last-axis size.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidShape`] on the first violation.
    pub fn check(&self, field: &str, array: &ArrayD<f64>, sink: &dyn DiagnosticSink) -> Result<()> {
        if array.ndim() != self.rank {
            return Err(reject(
                sink,
                RecordError::invalid_shape(
                    field,
                    format!(
                        "Expected `{field}` to have {} dimensions, but got {}.",
                        self.rank,
                        array.ndim()
                    ),
                ),
            ));
        }

        if let Some(&last) = array.shape().last() {
            if !self.allows_trailing(last) {
                return Err(reject(
                    sink,
                    RecordError::invalid_shape(
                        field,
                        format!(
                            "Expected `{field}` to have {} {}, but got {last}.",
                            self.trailing_text(),
                            self.trailing_label
                        ),
                    ),
                ));
            }
        }

        debug!(field = field, shape = ?array.shape(), "array shape accepted");
        Ok(())
    }

    /// Type-guards `value`, then checks it against the contract.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidInput`] if `value` is not an array and
    /// [`RecordError::InvalidShape`] if it violates the contract.
    pub fn enforce(
        &self,
        field: &str,
        value: RawValue,
        sink: &dyn DiagnosticSink,
    ) -> Result<ArrayD<f64>> {
        let array = ensure_array(field, value, sink)?;
        self.check(field, &array, sink)?;
        Ok(array)
    }

    fn trailing_text(&self) -> String {
        self.trailing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// Returns `shape` without its last axis.
#[must_use]
pub fn leading_dims(shape: &[usize]) -> &[usize] {
    shape.split_last().map_or(shape, |(_, rest)| rest)
}

/// Shape-aware array comparison where NaN equals NaN.
pub(crate) fn arrays_identical(a: &ArrayD<f64>, b: &ArrayD<f64>) -> bool {
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
}

/// Checks a per-point array against the leading dims of its
/// reference array.
///
/// # Errors
///
/// Returns [`RecordError::InvalidInput`] if `value` is not an array and
/// [`RecordError::InvalidShape`] if its shape differs.
pub fn check_matches_leading(
    field: &str,
    value: RawValue,
    reference: &ArrayD<f64>,
    sink: &dyn DiagnosticSink,
) -> Result<ArrayD<f64>> {
    let array = ensure_array(field, value, sink)?;
    let expected = leading_dims(reference.shape());
    if array.shape() != expected {
        return Err(reject(
            sink,
            RecordError::invalid_shape(
                field,
                format!(
                    "Expected `{field}` to have shape {expected:?}, but got {:?}.",
                    array.shape()
                ),
            ),
        ));
    }
    Ok(array)
}
