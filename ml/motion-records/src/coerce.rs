//! Field converters and leaf validators shared by both record types.

use ndarray::ArrayD;

use crate::diagnostics::{DiagnosticSink, reject};
use crate::error::{RecordError, Result};
use crate::value::{RawValue, format_float};

/// Coerces a name list into a `Vec<String>`.
///
/// A bare string is wrapped into a one-element list and a warning is
/// reported. Iterable values have every element converted to its string
/// form. Anything else is rejected.
///
/// # Errors
///
/// Returns [`RecordError::InvalidInput`] if `value` is neither a string nor
/// iterable.
///
/// # Example
///
/// ```
/// use motion_records::{CollectingSink, RawValue, list_of_strings};
///
/// let sink = CollectingSink::new();
/// let names = list_of_strings("individual_names", &RawValue::from("mouse"), &sink).unwrap();
/// assert_eq!(names, vec!["mouse"]);
/// assert_eq!(sink.warnings().len(), 1);
/// ```
pub fn list_of_strings(
    field: &str,
    value: &RawValue,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<String>> {
    if let Some(s) = value.as_str() {
        sink.warning(
            field,
            &format!(
                "Invalid value ({s}). Expected a list of strings. Converting to a list of length 1."
            ),
        );
        return Ok(vec![s.to_string()]);
    }

    value.element_strings().ok_or_else(|| {
        reject(
            sink,
            RecordError::invalid_input(
                field,
                format!(
                    "Invalid value ({value}) of type {}. Expected a list of strings.",
                    value.type_name()
                ),
            ),
        )
    })
}

/// Asserts that `value` is a numeric array and unwraps it.
///
/// # Errors
///
/// Returns [`RecordError::InvalidInput`] naming the actual type otherwise.
pub fn ensure_array(field: &str, value: RawValue, sink: &dyn DiagnosticSink) -> Result<ArrayD<f64>> {
    match value {
        RawValue::Array(array) => Ok(array),
        other => Err(reject(
            sink,
            RecordError::invalid_input(
                field,
                format!("Expected a numeric array, but got {}.", other.type_name()),
            ),
        )),
    }
}

/// Normalizes a frame rate.
///
/// Absent values stay unknown (`None`). Non-positive or non-finite rates
/// are replaced by `None` with a warning rather than rejected.
///
/// # Errors
///
/// Returns [`RecordError::InvalidInput`] if the value cannot be read as a
/// real number.
pub fn normalize_frame_rate(
    value: Option<&RawValue>,
    sink: &dyn DiagnosticSink,
) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let fps = value.to_f64().ok_or_else(|| {
        reject(
            sink,
            RecordError::invalid_input(
                "frame_rate",
                format!(
                    "Could not convert {} ({value}) to a real number.",
                    value.type_name()
                ),
            ),
        )
    })?;

    if fps <= 0.0 || !fps.is_finite() {
        sink.warning(
            "frame_rate",
            &format!(
                "Invalid frame rate ({}). Expected a positive number. Setting frame rate to unknown.",
                format_float(fps)
            ),
        );
        return Ok(None);
    }

    Ok(Some(fps))
}

/// Checks that a present list has exactly `expected` entries.
///
/// # Errors
///
/// Returns [`RecordError::InvalidShape`] on a length mismatch.
pub fn check_list_length(
    field: &str,
    value: Option<&[String]>,
    expected: usize,
    sink: &dyn DiagnosticSink,
) -> Result<()> {
    match value {
        Some(list) if list.len() != expected => Err(reject(
            sink,
            RecordError::invalid_shape(
                field,
                format!(
                    "Expected `{field}` to have length {expected}, but got {}.",
                    list.len()
                ),
            ),
        )),
        _ => Ok(()),
    }
}
