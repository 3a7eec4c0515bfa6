// Secret path resolution

use crate::error::Error;

/// Build the canonical store path for user input.
///
/// Absolute input (leading `/`) is returned untouched. Relative input is
/// placed under the configured prefix and environment, each omitted when
/// empty, and the result always starts with a single `/`. Empty input is
/// rejected.
pub fn resolve(input: &str, prefix: &str, env: &str) -> Result<String, Error> {
    if input.is_empty() {
        return Err(Error::InvalidInput("path cannot be empty".to_string()));
    }
    if input.starts_with('/') {
        return Ok(input.to_string());
    }

    let mut parts: Vec<&str> = Vec::with_capacity(3);

    let prefix = prefix.trim_matches('/');
    if !prefix.is_empty() {
        parts.push(prefix);
    }
    if !env.is_empty() {
        parts.push(env);
    }
    parts.push(input);

    Ok(format!("/{}", parts.join("/")))
}
