//! Template renderer backed by MiniJinja.
//!
//! Delimiters are doubled and flanked (`{{% %}}`, `{{{ }}}`) so templates
//! for languages that use `{}` and `{{ }}` need no escaping.

use std::path::Path;

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior, syntax::SyntaxConfig};
use stencil_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::Variables,
    error::{StencilError, StencilResult},
};
use tracing::{debug, instrument};

/// Start and end markers for each kind of template tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub block: (String, String),
    pub variable: (String, String),
    pub comment: (String, String),
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            block: ("{{%".into(), "%}}".into()),
            variable: ("{{{".into(), "}}}".into()),
            comment: ("{#".into(), "#}".into()),
        }
    }
}

/// Strict renderer: any undefined variable fails the render.
#[derive(Debug, Clone)]
pub struct MiniJinjaRenderer {
    syntax: SyntaxConfig,
    variable: (String, String),
}

impl MiniJinjaRenderer {
    /// Renderer with the default `{{% %}}` / `{{{ }}}` delimiters.
    pub fn new() -> StencilResult<Self> {
        Self::with_syntax(Delimiters::default())
    }

    /// Renderer with custom delimiters.
    pub fn with_syntax(delimiters: Delimiters) -> StencilResult<Self> {
        let Delimiters {
            block,
            variable,
            comment,
        } = delimiters;

        let syntax = SyntaxConfig::builder()
            .block_delimiters(block.0, block.1)
            .variable_delimiters(variable.0.clone(), variable.1.clone())
            .comment_delimiters(comment.0, comment.1)
            .build()
            .map_err(|e| StencilError::Configuration {
                message: format!("Invalid template delimiters: {}", e),
            })?;

        Ok(Self { syntax, variable })
    }

    fn environment<'s>(&self) -> Environment<'s> {
        let mut env = Environment::new();
        env.set_syntax(self.syntax.clone());
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    #[instrument(skip_all, fields(template = %name.display()))]
    fn render(&self, name: &Path, source: &str, variables: &Variables) -> StencilResult<String> {
        let label = name.to_string_lossy();
        let env = self.environment();

        let template = env
            .template_from_named_str(&label, source)
            .map_err(|e| syntax_error(name, &e))?;

        template.render(variables).map_err(|e| {
            if e.kind() != ErrorKind::UndefinedError {
                return syntax_error(name, &e);
            }

            // The engine does not name the variable; find the first one
            // the template uses that was not supplied.
            let mut undeclared: Vec<String> = template
                .undeclared_variables(false)
                .into_iter()
                .filter(|var| !variables.contains_key(var))
                .collect();
            undeclared.sort();
            let missing = undeclared.into_iter().next();
            debug!(?missing, "Undefined template variable");

            ApplicationError::UndefinedTemplateVariable {
                path: name.to_path_buf(),
                reason: match &missing {
                    Some(var) => format!("'{}' is undefined", var),
                    None => e.to_string(),
                },
                name: missing,
            }
            .into()
        })
    }

    fn variable_reference(&self, name: &str) -> String {
        format!("{} {} {}", self.variable.0, name, self.variable.1)
    }
}

fn syntax_error(name: &Path, e: &Error) -> StencilError {
    let reason = match e.line() {
        Some(line) => format!("{} (line {})", e.detail().unwrap_or("invalid template"), line),
        None => e.to_string(),
    };
    ApplicationError::TemplateSyntax {
        path: name.to_path_buf(),
        reason,
    }
    .into()
}
