//! MiniJinja-backed template engine.

use minijinja::{Environment, UndefinedBehavior};
use tracing::trace;

use kiln_core::application::{error::RenderError, ports::TemplateEngine};
use kiln_core::domain::RenderContext;

use super::helpers;

/// Strict MiniJinja environment: undefined variables are errors and a
/// template's trailing newline is preserved.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        helpers::register(&mut env);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(
        &self,
        name: &str,
        source: &str,
        context: &RenderContext,
    ) -> Result<String, RenderError> {
        trace!(template = name, "Rendering");
        self.env
            .render_named_str(name, source, context)
            .map_err(|e| RenderError::template(name, describe(&e)))
    }

    fn evaluate(
        &self,
        name: &str,
        expression: &str,
        context: &RenderContext,
    ) -> Result<bool, RenderError> {
        let probe = format!("{{% if {expression} %}}1{{% endif %}}");
        self.env
            .render_named_str(name, &probe, context)
            .map(|out| out == "1")
            .map_err(|e| RenderError::Predicate {
                file: name.to_string(),
                expression: expression.to_string(),
                message: describe(&e),
            })
    }
}

/// The error's message plus its source location, when known.
fn describe(err: &minijinja::Error) -> String {
    let detail = err
        .detail()
        .map(str::to_string)
        .unwrap_or_else(|| err.kind().to_string());
    match err.line() {
        Some(line) => format!("{detail} (line {line})"),
        None => detail,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ctx(value: serde_json::Value) -> RenderContext {
        match value {
            serde_json::Value::Object(map) => RenderContext::from(map),
            _ => RenderContext::new(),
        }
    }

    #[test]
    fn renders_with_filters_and_keeps_trailing_newline() {
        let engine = MiniJinjaEngine::new();
        let out = engine
            .render(
                "main.go",
                "package {{ name | snake_case }}\n// {{ name | pascal_case }}\n",
                &ctx(json!({ "name": "order-service" })),
            )
            .unwrap();
        assert_eq!(out, "package order_service\n// OrderService\n");
    }

    #[test]
    fn undefined_variable_is_an_error_naming_the_file() {
        let engine = MiniJinjaEngine::new();
        let err = engine
            .render("cmd/root.go", "{{ missing }}", &RenderContext::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { ref file, .. } if file == "cmd/root.go"));
    }

    #[test]
    fn syntax_error_is_reported() {
        let engine = MiniJinjaEngine::new();
        let err = engine
            .render("a.go", "{% if %}", &RenderContext::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
    }

    #[test]
    fn evaluates_boolean_expressions() {
        let engine = MiniJinjaEngine::new();
        let c = ctx(json!({ "has_database": true, "orm_gorm": false }));
        assert!(engine.evaluate("db.go", "has_database and not orm_gorm", &c).unwrap());
        assert!(!engine.evaluate("db.go", "orm_gorm", &c).unwrap());
    }

    #[test]
    fn predicate_on_unknown_flag_fails() {
        let engine = MiniJinjaEngine::new();
        let err = engine
            .evaluate("db.go", "has_dtabase", &RenderContext::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::Predicate { .. }));
    }

    #[test]
    fn engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MiniJinjaEngine>();
    }
}
