//! Blueprint compiler: turns a blueprint plus a render context into the
//! complete, in-memory list of output files.
//!
//! Nothing touches the filesystem here. The whole set is buffered so that
//! any failure discards every file, and the writer only ever sees a
//! compilation that succeeded end to end.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::application::{error::RenderError, ports::TemplateEngine};
use crate::domain::{
    Blueprint, RenderContext, RenderedFile,
    entities::{
        blueprint::{FileContent, FileSpec},
        common::RelativePath,
    },
};

/// Suffix marking a file as a template source; stripped from output paths.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

pub struct BlueprintCompiler {
    engine: Arc<dyn TemplateEngine>,
}

impl BlueprintCompiler {
    pub fn new(engine: Arc<dyn TemplateEngine>) -> Self {
        Self { engine }
    }

    /// Render every included file of `blueprint`.
    ///
    /// Files are visited in blueprint order; the result is sorted by path.
    #[instrument(skip_all, fields(blueprint = %blueprint.label()))]
    pub fn compile(
        &self,
        context: &RenderContext,
        blueprint: &Blueprint,
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let mut rendered: BTreeMap<PathBuf, RenderedFile> = BTreeMap::new();

        for spec in &blueprint.files {
            if !self.included(spec, context)? {
                trace!(file = %spec.path, "Skipped by predicate");
                continue;
            }

            let path = self.render_path(spec, context)?;
            let contents = match &spec.content {
                FileContent::Literal(bytes) => bytes.clone(),
                FileContent::Template(source) => self
                    .engine
                    .render(&spec.path, source, context)?
                    .into_bytes(),
            };

            let key = path.as_path().to_path_buf();
            if rendered.contains_key(&key) {
                return Err(RenderError::DuplicatePath {
                    path: path.to_string(),
                });
            }
            rendered.insert(key, RenderedFile::new(path, contents, spec.executable));
        }

        check_collisions(rendered.keys())?;

        let files: Vec<RenderedFile> = rendered.into_values().collect();
        debug!(files = files.len(), "Blueprint compiled");
        Ok(files)
    }

    fn included(&self, spec: &FileSpec, context: &RenderContext) -> Result<bool, RenderError> {
        match spec.when.as_deref().map(str::trim) {
            None | Some("") => Ok(true),
            Some(expression) => self.engine.evaluate(&spec.path, expression, context),
        }
    }

    fn render_path(
        &self,
        spec: &FileSpec,
        context: &RenderContext,
    ) -> Result<RelativePath, RenderError> {
        let raw = if spec.path.contains("{{") || spec.path.contains("{%") {
            self.engine.render(&spec.path, &spec.path, context)?
        } else {
            spec.path.clone()
        };
        let stripped = raw.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&raw);

        RelativePath::try_new(stripped).map_err(|violation| RenderError::InvalidPath {
            file: spec.path.clone(),
            rendered: raw.clone(),
            reason: violation.to_string(),
        })
    }
}

/// A rendered file path may not also be the ancestor of another file.
fn check_collisions<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Result<(), RenderError> {
    let paths: BTreeSet<&Path> = paths.map(PathBuf::as_path).collect();
    for path in &paths {
        for ancestor in path.ancestors().skip(1) {
            if paths.contains(ancestor) {
                return Err(RenderError::PathCollision {
                    path: ancestor.display().to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockTemplateEngine;
    use crate::domain::value_objects::{Architecture, ProjectKind};

    fn blueprint(files: Vec<FileSpec>) -> Blueprint {
        let mut b = Blueprint::builder("cli-clean", "1.0.0")
            .kind(ProjectKind::Cli)
            .architecture(Architecture::Clean);
        for f in files {
            b = b.file(f);
        }
        b.build().unwrap()
    }

    /// Engine that echoes template sources and evaluates `yes` as true.
    fn echo_engine() -> MockTemplateEngine {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_render()
            .returning(|_, source, _| Ok(source.replace("{{ name }}", "demo")));
        engine
            .expect_evaluate()
            .returning(|_, expr, _| Ok(expr == "yes"));
        engine
    }

    fn compile(engine: MockTemplateEngine, files: Vec<FileSpec>) -> Result<Vec<RenderedFile>, RenderError> {
        BlueprintCompiler::new(Arc::new(engine)).compile(&RenderContext::new(), &blueprint(files))
    }

    #[test]
    fn strips_template_suffix_and_sorts_by_path() {
        let files = compile(
            echo_engine(),
            vec![
                FileSpec::template("main.go.tmpl", "package main"),
                FileSpec::literal("README.md", "readme"),
                FileSpec::template("cmd/{{ name }}/root.go", "package cmd"),
            ],
        )
        .unwrap();

        let paths: Vec<String> = files.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["README.md", "cmd/demo/root.go", "main.go"]);
        assert_eq!(files[0].contents, b"readme");
    }

    #[test]
    fn false_predicate_skips_file_entirely() {
        let files = compile(
            echo_engine(),
            vec![
                FileSpec::template("a.go", "a").when("yes"),
                FileSpec::template("b.go", "b").when("no"),
                FileSpec::template("c.go", "c").when("  "),
            ],
        )
        .unwrap();
        let paths: Vec<String> = files.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(paths, vec!["a.go", "c.go"]);
    }

    #[test]
    fn literal_files_bypass_the_engine() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_render().never();
        engine.expect_evaluate().never();

        let bytes = vec![0u8, 159, 146, 150];
        let files = compile(engine, vec![FileSpec::literal("logo.bin", bytes.clone())]).unwrap();
        assert_eq!(files[0].contents, bytes);
    }

    #[test]
    fn executable_bit_is_carried() {
        let files = compile(
            echo_engine(),
            vec![FileSpec::literal("scripts/build.sh", "#!/bin/sh").executable(true)],
        )
        .unwrap();
        assert!(files[0].executable);
    }

    #[test]
    fn first_render_error_discards_everything() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_render()
            .withf(|name, _, _| name == "ok.go")
            .returning(|_, s, _| Ok(s.to_string()));
        engine
            .expect_render()
            .withf(|name, _, _| name == "bad.go")
            .returning(|f, _, _| Err(RenderError::template(f, "undefined value 'missing'")));

        let err = compile(
            engine,
            vec![
                FileSpec::template("ok.go", "ok"),
                FileSpec::template("bad.go", "{{ missing }}"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Template { ref file, .. } if file == "bad.go"));
    }

    #[test]
    fn rendered_path_escaping_root_is_rejected() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_render().returning(|_, _, _| Ok("../evil.go".into()));

        let err = compile(engine, vec![FileSpec::template("{{ name }}.go", "x")]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPath { .. }));
    }

    #[test]
    fn empty_rendered_path_is_rejected() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_render().returning(|_, _, _| Ok(String::new()));

        let err = compile(engine, vec![FileSpec::template("{{ name }}", "x")]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidPath { .. }));
    }

    #[test]
    fn two_specs_rendering_to_one_path_collide() {
        let mut engine = MockTemplateEngine::new();
        engine
            .expect_render()
            .returning(|name, source, _| {
                Ok(if name == source { "same.go".into() } else { source.to_string() })
            });

        let err = compile(
            engine,
            vec![
                FileSpec::template("{{ a }}", "x"),
                FileSpec::template("{{ b }}", "y"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, RenderError::DuplicatePath { path: "same.go".into() });
    }

    #[test]
    fn file_used_as_directory_collides() {
        let err = compile(
            echo_engine(),
            vec![
                FileSpec::literal("internal", "x"),
                FileSpec::literal("internal/app.go", "y"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, RenderError::PathCollision { path: "internal".into() });
    }

    #[test]
    fn predicate_error_propagates() {
        let mut engine = MockTemplateEngine::new();
        engine.expect_evaluate().returning(|f, e, _| {
            Err(RenderError::Predicate {
                file: f.into(),
                expression: e.into(),
                message: "syntax error".into(),
            })
        });

        let err = compile(engine, vec![FileSpec::literal("a", "a").when("has_(")]).unwrap_err();
        assert!(matches!(err, RenderError::Predicate { .. }));
    }
}
