//! Template engine for prompt management using Jinja2 syntax.
//!
//! Prompt templates live under `templates/prompts/` and are embedded into the
//! binary at compile time, so rendering never depends on the working
//! directory of the deployed process.

use minijinja::{Environment, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Embedded prompt templates: (name, source)
const TEMPLATES: &[(&str, &str)] = &[(
    "classify_issue.jinja",
    include_str!("../../../templates/prompts/classify_issue.jinja"),
)];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

/// Render a template by name with the given context.
///
/// The environment is initialized lazily on first use.
pub fn render_template(name: &str, context: Value) -> Result<String, TemplateError> {
    let env = TEMPLATE_ENV.get_or_init(init_environment);

    let template = env
        .get_template(name)
        .map_err(|_| TemplateError::NotFound(name.to_string()))?;

    template
        .render(context)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}
