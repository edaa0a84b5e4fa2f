// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PDF and SVG exporters backed by external renderers
//!
//! Every export writes its source files first, then resolves the renderer
//! binary and runs it. Problems with the renderer (missing binary, non-zero
//! exit, no output file) are reported through [`ExportResult`]; only failures
//! to write the inputs are errors.

mod binary;

pub use binary::{resolve_binary, BinarySpec, SystemSearch};

use crate::runner::{CommandRequest, CommandRunner, ProcessRunner};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of one rendering attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    pub exporter: String,
    pub succeeded: bool,
    pub output_path: Option<PathBuf>,
    pub command: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub inputs: BTreeMap<String, PathBuf>,
    pub binary_path: Option<PathBuf>,
    pub detail: Option<String>,
}

impl ExportResult {
    fn missing_binary(exporter: &str, inputs: BTreeMap<String, PathBuf>, spec: &BinarySpec) -> Self {
        Self {
            exporter: exporter.to_string(),
            succeeded: false,
            output_path: None,
            command: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
            inputs,
            binary_path: None,
            detail: Some(spec.missing_detail.to_string()),
        }
    }

    /// JSON description of the result, paths rendered as strings.
    pub fn to_metadata(&self) -> Value {
        let path_str = |p: &PathBuf| p.display().to_string();
        let inputs: serde_json::Map<String, Value> = self
            .inputs
            .iter()
            .map(|(key, path)| (key.clone(), Value::String(path_str(path))))
            .collect();
        json!({
            "exporter": self.exporter,
            "succeeded": self.succeeded,
            "output_path": self.output_path.as_ref().map(path_str),
            "command": self.command,
            "stdout": self.stdout,
            "stderr": self.stderr,
            "inputs": inputs,
            "binary_path": self.binary_path.as_ref().map(path_str),
            "detail": self.detail,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub wkhtmltopdf_path: Option<PathBuf>,
    /// Inserted before the input and output paths
    pub extra_args: Vec<String>,
    /// Keep the intermediate HTML after a PDF is produced
    pub keep_html: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            wkhtmltopdf_path: None,
            extra_args: Vec::new(),
            keep_html: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphvizOptions {
    /// Where to write the DOT source, defaults to `<stem>.dot`
    pub dot_path: Option<PathBuf>,
    pub graphviz_path: Option<PathBuf>,
    /// Inserted right after the binary
    pub extra_args: Vec<String>,
    pub keep_dot: bool,
}

impl Default for GraphvizOptions {
    fn default() -> Self {
        Self {
            dot_path: None,
            graphviz_path: None,
            extra_args: Vec::new(),
            keep_dot: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MermaidOptions {
    pub mermaid_cli_path: Option<PathBuf>,
    /// Appended after the output path
    pub extra_args: Vec<String>,
}

type MarkdownRenderer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Runs renderers through a [`CommandRunner`].
#[derive(Clone)]
pub struct Exporter<R = ProcessRunner> {
    runner: R,
    allow_missing_preferred: bool,
    search: SystemSearch,
    markdown_renderer: MarkdownRenderer,
}

impl Exporter<ProcessRunner> {
    pub fn new() -> Self {
        Self {
            runner: ProcessRunner,
            allow_missing_preferred: false,
            search: SystemSearch::Enabled,
            markdown_renderer: Arc::new(default_markdown_to_html),
        }
    }
}

impl Default for Exporter<ProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Exporter<R> {
    /// Exporter with a custom runner. Explicit binary paths are passed to
    /// the runner even if they do not exist on disk.
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            allow_missing_preferred: true,
            search: SystemSearch::Enabled,
            markdown_renderer: Arc::new(default_markdown_to_html),
        }
    }

    pub fn with_markdown_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.markdown_renderer = Arc::new(renderer);
        self
    }

    /// Limit binary lookup beyond explicit paths and env vars.
    pub fn with_system_search(mut self, search: SystemSearch) -> Self {
        self.search = search;
        self
    }

    pub fn without_system_search(self) -> Self {
        self.with_system_search(SystemSearch::Disabled)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Write `<stem>.md` and `<stem>.html`, then render the HTML to
    /// `<stem>.pdf` with wkhtmltopdf.
    pub async fn export_markdown_to_pdf(
        &self,
        markdown: &str,
        output_dir: &Path,
        stem: &str,
        options: &PdfOptions,
    ) -> Result<ExportResult, ExportError> {
        let output_dir = absolute_dir(output_dir)?;
        let markdown_path = write_text(&output_dir.join(format!("{stem}.md")), markdown)?;
        let html = (self.markdown_renderer)(markdown);
        let html_path = write_text(&output_dir.join(format!("{stem}.html")), &html)?;
        let inputs = BTreeMap::from([
            ("markdown".to_string(), markdown_path),
            ("html".to_string(), html_path.clone()),
        ]);
        Ok(self
            .run_wkhtmltopdf("markdown->pdf", &output_dir, stem, html_path, inputs, options)
            .await)
    }

    /// Write `<stem>.html` and render it to `<stem>.pdf` with wkhtmltopdf.
    pub async fn export_html_to_pdf(
        &self,
        html: &str,
        output_dir: &Path,
        stem: &str,
        options: &PdfOptions,
    ) -> Result<ExportResult, ExportError> {
        let output_dir = absolute_dir(output_dir)?;
        let html_path = write_text(&output_dir.join(format!("{stem}.html")), html)?;
        let inputs = BTreeMap::from([("html".to_string(), html_path.clone())]);
        Ok(self
            .run_wkhtmltopdf("html->pdf", &output_dir, stem, html_path, inputs, options)
            .await)
    }

    /// Write the DOT source and render `<stem>.svg` with Graphviz.
    pub async fn export_graphviz_to_svg(
        &self,
        dot_source: &str,
        output_dir: &Path,
        stem: &str,
        options: &GraphvizOptions,
    ) -> Result<ExportResult, ExportError> {
        let spec = &BinarySpec::GRAPHVIZ_DOT;
        let output_dir = absolute_dir(output_dir)?;
        let dot_path = options
            .dot_path
            .clone()
            .unwrap_or_else(|| output_dir.join(format!("{stem}.dot")));
        let dot_path = write_text(&dot_path, dot_source)?;
        let inputs = BTreeMap::from([("dot".to_string(), dot_path.clone())]);

        let Some(binary) = self.resolve(options.graphviz_path.as_deref(), spec) else {
            return Ok(ExportResult::missing_binary("graphviz->svg", inputs, spec));
        };

        let svg_path = output_dir.join(format!("{stem}.svg"));
        let mut command = vec![binary.display().to_string()];
        command.extend(options.extra_args.iter().cloned());
        command.extend([
            "-Tsvg".to_string(),
            dot_path.display().to_string(),
            "-o".to_string(),
            svg_path.display().to_string(),
        ]);
        let result = self
            .execute("graphviz->svg", spec, binary, command, &svg_path, inputs)
            .await;
        if !options.keep_dot && svg_path.exists() {
            remove_intermediate(&dot_path);
        }
        Ok(result)
    }

    /// Write `<stem>.mmd` and render `<stem>.svg` with mermaid-cli.
    pub async fn export_mermaid_to_svg(
        &self,
        mermaid_source: &str,
        output_dir: &Path,
        stem: &str,
        options: &MermaidOptions,
    ) -> Result<ExportResult, ExportError> {
        let spec = &BinarySpec::MERMAID_CLI;
        let output_dir = absolute_dir(output_dir)?;
        let mmd_path = write_text(&output_dir.join(format!("{stem}.mmd")), mermaid_source)?;
        let inputs = BTreeMap::from([("mermaid".to_string(), mmd_path.clone())]);

        let Some(binary) = self.resolve(options.mermaid_cli_path.as_deref(), spec) else {
            return Ok(ExportResult::missing_binary("mermaid->svg", inputs, spec));
        };

        let svg_path = output_dir.join(format!("{stem}.svg"));
        let mut command = vec![
            binary.display().to_string(),
            "-i".to_string(),
            mmd_path.display().to_string(),
            "-o".to_string(),
            svg_path.display().to_string(),
        ];
        command.extend(options.extra_args.iter().cloned());
        Ok(self
            .execute("mermaid->svg", spec, binary, command, &svg_path, inputs)
            .await)
    }

    async fn run_wkhtmltopdf(
        &self,
        exporter: &str,
        output_dir: &Path,
        stem: &str,
        html_path: PathBuf,
        inputs: BTreeMap<String, PathBuf>,
        options: &PdfOptions,
    ) -> ExportResult {
        let spec = &BinarySpec::WKHTMLTOPDF;
        let Some(binary) = self.resolve(options.wkhtmltopdf_path.as_deref(), spec) else {
            return ExportResult::missing_binary(exporter, inputs, spec);
        };

        let pdf_path = output_dir.join(format!("{stem}.pdf"));
        let mut command = vec![binary.display().to_string()];
        command.extend(options.extra_args.iter().cloned());
        command.extend([html_path.display().to_string(), pdf_path.display().to_string()]);
        let result = self
            .execute(exporter, spec, binary, command, &pdf_path, inputs)
            .await;
        if !options.keep_html && pdf_path.exists() {
            remove_intermediate(&html_path);
        }
        result
    }

    fn resolve(&self, preferred: Option<&Path>, spec: &BinarySpec) -> Option<PathBuf> {
        resolve_binary(preferred, spec, self.allow_missing_preferred, &self.search)
    }

    async fn execute(
        &self,
        exporter: &str,
        spec: &BinarySpec,
        binary: PathBuf,
        command: Vec<String>,
        output_path: &Path,
        inputs: BTreeMap<String, PathBuf>,
    ) -> ExportResult {
        tracing::debug!(exporter, command = %command.join(" "), "running exporter command");
        let request = CommandRequest::new(command.clone());
        let (succeeded, stdout, stderr, detail) = match self.runner.run(&request).await {
            Ok(output) => {
                let succeeded = output.success() && output_path.exists();
                let detail = (!succeeded).then(|| spec.failed_detail.to_string());
                (succeeded, output.stdout, output.stderr, detail)
            }
            Err(e) => (false, String::new(), String::new(), Some(e.to_string())),
        };
        if succeeded {
            tracing::info!(exporter, output = %output_path.display(), "export complete");
        } else {
            tracing::warn!(exporter, detail = ?detail, "export failed");
        }
        ExportResult {
            exporter: exporter.to_string(),
            succeeded,
            output_path: succeeded.then(|| output_path.to_path_buf()),
            command,
            stdout,
            stderr,
            inputs,
            binary_path: Some(binary),
            detail,
        }
    }
}

/// Render Markdown to HTML with CommonMark rules.
#[cfg(feature = "markdown")]
pub fn default_markdown_to_html(markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Without a Markdown renderer, wrap the text in a `<pre>` block.
#[cfg(not(feature = "markdown"))]
pub fn default_markdown_to_html(markdown: &str) -> String {
    tracing::info!("markdown rendering unavailable; falling back to <pre> wrapper for HTML");
    pre_wrapped_html(markdown)
}

/// The escaped text in a `<pre>` block.
pub fn pre_wrapped_html(markdown: &str) -> String {
    let escaped = markdown.replace('<', "&lt;").replace('>', "&gt;");
    format!("<pre>{escaped}</pre>")
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, ExportError> {
    std::path::absolute(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, content: &str) -> Result<PathBuf, ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)?;
    Ok(path.to_path_buf())
}

fn remove_intermediate(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %e, "could not remove intermediate file");
    }
}

#[cfg(test)]
#[path = "../export_tests.rs"]
mod tests;
