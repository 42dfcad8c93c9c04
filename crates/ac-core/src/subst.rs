use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubstError {
    #[error("substitution pattern must not be empty")]
    EmptyPattern,
}

/// Replace every occurrence of `pattern` in `haystack` with `replacement`.
///
/// Counts the matches first so the output buffer is allocated once at its
/// exact final size, then copies spans between matches in a single
/// left-to-right scan. Matches are plain substrings; token boundaries are
/// deliberately not considered, so a pattern occurring inside a longer
/// name is replaced too. Callers that need token semantics must gate on
/// token membership before substituting.
pub fn replace_all(
    haystack: &str,
    pattern: &str,
    replacement: &str,
) -> Result<String, SubstError> {
    if pattern.is_empty() {
        return Err(SubstError::EmptyPattern);
    }

    let hits = haystack.matches(pattern).count();
    if hits == 0 {
        return Ok(haystack.to_string());
    }

    let mut out = String::with_capacity(
        haystack.len() - hits * pattern.len() + hits * replacement.len(),
    );
    let mut rest = haystack;
    while let Some(at) = rest.find(pattern) {
        out.push_str(&rest[..at]);
        out.push_str(replacement);
        rest = &rest[at + pattern.len()..];
    }
    out.push_str(rest);
    Ok(out)
}
