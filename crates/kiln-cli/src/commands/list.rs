//! Implementation of the `kiln list` command.

use kiln_adapters::load_registry;
use kiln_core::domain::{
    Architecture, BlueprintSummary, Framework, NO_FRAMEWORK, ProjectKind, ValidationError,
};

use crate::{
    cli::{ListArgs, ListFormat, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let filter = Filter::from_args(&args)?;
    let (_, registry) = load_registry(global.blueprints, config.blueprints.dir)?;

    let summaries: Vec<BlueprintSummary> = registry
        .summaries()
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();

    match args.format {
        ListFormat::Table => {
            if summaries.is_empty() {
                output.info("No blueprints match the given filters.")?;
                return Ok(());
            }
            output.header("Available Blueprints:")?;
            for line in table_lines(&summaries) {
                output.print(&line)?;
            }
        }

        // JSON bypasses --quiet: it is meant to be piped.
        ListFormat::Json => output.json(&summaries)?,

        ListFormat::List => {
            for s in &summaries {
                output.print(&s.id)?;
            }
        }

        ListFormat::Csv => {
            for line in csv_lines(&summaries) {
                output.print(&line)?;
            }
        }
    }

    Ok(())
}

/// Canonicalised filters, so aliases like `api` match `web-api`.
#[derive(Debug, Default)]
struct Filter {
    kind: Option<String>,
    architecture: Option<String>,
    framework: Option<String>,
}

impl Filter {
    fn from_args(args: &ListArgs) -> Result<Self, ValidationError> {
        let framework = match args.framework.as_deref().map(str::trim) {
            None => None,
            Some(f) if f.eq_ignore_ascii_case(NO_FRAMEWORK) => Some(NO_FRAMEWORK.to_string()),
            Some(f) => Some(f.parse::<Framework>()?.to_string()),
        };
        Ok(Self {
            kind: args
                .kind
                .as_deref()
                .map(|k| k.parse::<ProjectKind>().map(|k| k.to_string()))
                .transpose()?,
            architecture: args
                .architecture
                .as_deref()
                .map(|a| a.parse::<Architecture>().map(|a| a.to_string()))
                .transpose()?,
            framework,
        })
    }

    fn matches(&self, summary: &BlueprintSummary) -> bool {
        self.kind.as_ref().is_none_or(|k| *k == summary.kind)
            && self
                .architecture
                .as_ref()
                .is_none_or(|a| *a == summary.architecture)
            && self
                .framework
                .as_ref()
                .is_none_or(|f| summary.frameworks.contains(f))
    }
}

fn table_lines(summaries: &[BlueprintSummary]) -> Vec<String> {
    const HEADERS: [&str; 5] = ["ID", "VERSION", "KIND", "ARCHITECTURE", "FRAMEWORKS"];

    let rows: Vec<[String; 5]> = summaries
        .iter()
        .map(|s| {
            [
                s.id.clone(),
                s.version.clone(),
                s.kind.clone(),
                s.architecture.clone(),
                s.frameworks.join(", "),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 5]| {
        let mut line = String::from(" ");
        for (cell, width) in cells.iter().zip(widths) {
            line.push_str(&format!(" {cell:<width$} "));
        }
        line.trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(HEADERS));
    for row in &rows {
        lines.push(format_row(row.each_ref().map(String::as_str)));
    }
    lines
}

fn csv_lines(summaries: &[BlueprintSummary]) -> Vec<String> {
    let mut lines = vec!["id,version,kind,architecture,frameworks,name".to_string()];
    for s in summaries {
        let frameworks = s.frameworks.join(";");
        let fields = [
            s.id.as_str(),
            s.version.as_str(),
            s.kind.as_str(),
            s.architecture.as_str(),
            frameworks.as_str(),
            s.name.as_str(),
        ];
        lines.push(fields.map(csv_field).join(","));
    }
    lines
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
