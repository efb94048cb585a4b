//! Loosely typed input values.
//!
//! Third-party pose and tracking tools hand over data whose types are only
//! known at runtime: a name list may arrive as a single string, a frame rate
//! as a string, an array as a nested list. [`RawValue`] is the closed set of
//! shapes such data can take before validation gives it a concrete type.

use std::fmt;

use ndarray::{Array, ArrayD, Dimension};

/// A dynamically typed field value supplied to a validator.
///
/// # Example
///
/// ```
/// use motion_records::RawValue;
/// use ndarray::Array3;
///
/// let names = RawValue::from(vec!["nose", "tail"]);
/// assert_eq!(names.type_name(), "list");
///
/// let position = RawValue::from(Array3::<f64>::zeros((5, 1, 2)));
/// assert!(position.as_array().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A single string.
    Str(String),
    /// A heterogeneous sequence.
    List(Vec<RawValue>),
    /// A multi-dimensional numeric array.
    Array(ArrayD<f64>),
}

impl RawValue {
    /// Returns a short name for the value's runtime type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Array(_) => "ndarray",
        }
    }

    /// Returns the array if this value is one.
    #[must_use]
    pub const fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the string if this value is a single string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the value can be iterated element by element.
    ///
    /// Strings are deliberately excluded, and so are 0-d arrays.
    #[must_use]
    pub fn is_iterable(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Array(array) => array.ndim() > 0,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_) => false,
        }
    }

    /// Attempts to interpret the value as a real number.
    ///
    /// Numbers and booleans convert directly, strings are parsed after
    /// trimming, and arrays convert only when they hold exactly one element.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Array(array) if array.len() == 1 => array.iter().next().copied(),
            Self::Array(_) | Self::List(_) => None,
        }
    }

    /// Returns the string form of every element, in order.
    ///
    /// Arrays iterate over their first axis. Returns `None` when the value
    /// is not iterable.
    #[must_use]
    pub fn element_strings(&self) -> Option<Vec<String>> {
        match self {
            Self::List(items) => Some(items.iter().map(ToString::to_string).collect()),
            Self::Array(array) if array.ndim() > 0 => Some(
                array
                    .outer_iter()
                    .map(|sub| {
                        if sub.ndim() == 0 {
                            sub.iter().next().map_or_else(String::new, |v| format_float(*v))
                        } else {
                            sub.to_string()
                        }
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Formats a float the way tracking tools print it: integral values keep a
/// trailing `.0`, non-finite values are lowercase, and magnitudes outside
/// `1e-4..1e16` switch to exponent form with a signed two-digit exponent
/// (`1e+16`, `1.5e-05`).
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        return format!("{sign}inf");
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    if (-4..16).contains(&exponent) {
        if value.fract() == 0.0 {
            format!("{value:.1}")
        } else {
            value.to_string()
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

/// Quotes a string as it appears inside a printed list.
fn quoted(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{s}'")
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{}", format_float(*v)),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Self::Str(s) => write!(f, "{}", quoted(s))?,
                        _ => write!(f, "{item}")?,
                    }
                }
                write!(f, "]")
            }
            Self::Array(array) => write!(f, "{array}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for RawValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl<T: Into<Self>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Self>> From<&[T]> for RawValue {
    fn from(values: &[T]) -> Self {
        Self::List(values.iter().cloned().map(Into::into).collect())
    }
}

impl<D: Dimension> From<Array<f64, D>> for RawValue {
    fn from(array: Array<f64, D>) -> Self {
        Self::Array(array.into_dyn())
    }
}

impl<D: Dimension> From<Array<f32, D>> for RawValue {
    fn from(array: Array<f32, D>) -> Self {
        Self::Array(array.mapv(f64::from).into_dyn())
    }
}
