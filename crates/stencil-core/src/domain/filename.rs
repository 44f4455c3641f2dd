//! Variable substitution in entry names.
//!
//! A token is a variable name wrapped in `+` on both sides, e.g. `+name+`.
//! The name cannot contain `+` or the platform path separator, so a token
//! never spans two path components.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::{error::DomainError, job::Variables};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    let separator = regex::escape(&MAIN_SEPARATOR.to_string());
    Regex::new(&format!(r"\+([^+{separator}]+)\+")).expect("filename token pattern is valid")
});

/// Replace every `+name+` token in `name` with its value.
///
/// Fails on the first token whose variable is not defined; nothing is
/// substituted in that case.
pub fn render_filename(name: &str, variables: &Variables) -> Result<String, DomainError> {
    if let Some(missing) = TOKEN
        .captures_iter(name)
        .map(|caps| caps[1].to_string())
        .find(|var| !variables.contains_key(var))
    {
        return Err(DomainError::UndefinedFilenameVariable {
            name: missing,
            path: name.to_string(),
        });
    }

    let rendered = TOKEN.replace_all(name, |caps: &Captures<'_>| {
        variables.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// Render a whole path, e.g. the target root.
///
/// Paths that are not valid UTF-8 cannot contain tokens and are returned
/// unchanged.
pub fn render_path(path: &Path, variables: &Variables) -> Result<PathBuf, DomainError> {
    match path.to_str() {
        Some(text) => render_filename(text, variables).map(PathBuf::from),
        None => Ok(path.to_path_buf()),
    }
}
