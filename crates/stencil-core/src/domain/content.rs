//! Template text handling around the renderer: token rewriting before,
//! newline restoration after.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::job::Variables;

static IDENT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+([A-Za-z_][A-Za-z0-9_]*)\+").expect("content token pattern is valid")
});

/// Re-append the trailing newline a template engine trimmed.
///
/// Template engines conventionally drop one trailing newline from their
/// output. If the source ended in `\n` and the rendered text does not, a
/// single `\n` is added so the target keeps the source's line-ending
/// convention.
pub fn restore_trailing_newline(source: &str, mut rendered: String) -> String {
    if source.ends_with('\n') && !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

/// Rewrite `+name+` tokens whose name is a defined variable into the
/// renderer's own reference to that variable.
///
/// Runs on template source before rendering, so each value is emitted once
/// by the engine and never scanned for tokens itself. Unlike entry names,
/// content is lenient: tokens naming an unknown variable, or text that
/// merely looks like one (`a +b+ c`), stay as they are.
pub fn reference_defined_tokens<F>(text: &str, variables: &Variables, reference: F) -> String
where
    F: Fn(&str) -> String,
{
    IDENT_TOKEN
        .replace_all(text, |caps: &Captures<'_>| {
            if variables.contains_key(&caps[1]) {
                reference(&caps[1])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
