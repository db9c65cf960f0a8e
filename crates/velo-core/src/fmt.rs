//! Fixed-precision formatting for timing and speed figures.
//!
//! All numeric echo fields in responses use three decimal places, rendered
//! as strings so clients see a stable textual representation regardless of
//! float quirks.

/// Format a value with exactly three decimal places.
pub fn format_fixed3(v: f64) -> String {
    format!("{v:.3}")
}

/// Serde adapter: serialize an `f64` as a 3-decimal string.
///
/// Use as `#[serde(serialize_with = "velo_core::fmt::fixed3")]`.
pub fn fixed3<S>(v: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_fixed3(*v))
}

/// Serde adapter for optional fields; `None` serializes as `null`.
pub fn fixed3_opt<S>(v: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match v {
        Some(x) => serializer.serialize_some(&format_fixed3(*x)),
        None => serializer.serialize_none(),
    }
}
