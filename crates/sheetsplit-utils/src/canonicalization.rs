use anyhow::{Context, Result};
use serde::Serialize;

/// Emit a value as JCS-canonical JSON (RFC 8785).
///
/// Used for every `--json` output so two runs over the same inputs print
/// byte-identical results regardless of struct field order.
///
/// # Example
///
/// ```rust
/// use sheetsplit_utils::canonicalization::emit_jcs;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     total_output: usize,
///     failed_output: usize,
/// }
///
/// let json = emit_jcs(&Summary { total_output: 2, failed_output: 0 }).unwrap();
/// assert_eq!(json, r#"{"failed_output":0,"total_output":2}"#);
/// ```
pub fn emit_jcs<T: Serialize>(value: &T) -> Result<String> {
    let json_value =
        serde_json::to_value(value).with_context(|| "Failed to serialize value to JSON")?;
    let json_bytes = serde_json_canonicalizer::to_vec(&json_value)
        .with_context(|| "Failed to canonicalize JSON using JCS")?;
    String::from_utf8(json_bytes).with_context(|| "JCS output contained invalid UTF-8")
}
