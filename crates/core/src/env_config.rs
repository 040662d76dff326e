//! Environment variable parsing that warns on unparsable values.

/// Parse `var`, falling back to `default` when it is unset or invalid.
///
/// An unset variable is the expected case and is silent; a value that fails
/// to parse is logged at warn level before falling back.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
        default
    })
}

/// Non-empty value of `var`, if set.
#[must_use]
pub fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
