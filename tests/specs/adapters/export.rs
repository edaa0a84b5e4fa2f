//! Exporters driven through a scripted runner.

use crate::prelude::*;
use serde_json::json;
use xm_common::adapters::{
    CommandOutput, FakeCommandRunner, GraphvizOptions, PdfOptions, TracedRunner,
};
use xm_common::Exporter;

/// Runner that creates whatever file follows `-o`, else the last argument
fn rendering_runner() -> FakeCommandRunner {
    FakeCommandRunner::with_handler(|request| {
        let argv = &request.argv;
        let target = argv
            .iter()
            .position(|a| a == "-o")
            .map(|i| argv[i + 1].clone())
            .unwrap_or_else(|| argv.last().cloned().unwrap());
        std::fs::write(target, b"%PDF").unwrap();
        Ok(CommandOutput {
            argv: argv.clone(),
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    })
}

#[tokio::test]
async fn markdown_report_becomes_pdf_with_metadata() {
    let ws = Workspace::new();
    let fake = rendering_runner();
    let exporter = Exporter::with_runner(TracedRunner::new(fake.clone()));

    let result = exporter
        .export_markdown_to_pdf(
            "# Run summary",
            &ws.join("exports"),
            "summary",
            &PdfOptions {
                wkhtmltopdf_path: Some("/opt/wkhtmltopdf".into()),
                keep_html: false,
                ..PdfOptions::default()
            },
        )
        .await
        .unwrap();

    let dir = ws.join("exports");
    assert_json_eq(
        &result.to_metadata(),
        &json!({
            "exporter": "markdown->pdf",
            "succeeded": true,
            "output_path": dir.join("summary.pdf").display().to_string(),
            "command": [
                "/opt/wkhtmltopdf",
                dir.join("summary.html").display().to_string(),
                dir.join("summary.pdf").display().to_string(),
            ],
            "stdout": "",
            "stderr": "",
            "inputs": {
                "html": dir.join("summary.html").display().to_string(),
                "markdown": dir.join("summary.md").display().to_string(),
            },
            "binary_path": "/opt/wkhtmltopdf",
            "detail": null,
        }),
    );
    assert_eq!(ws.list("exports"), vec!["summary.md", "summary.pdf"]);
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn failed_render_keeps_sources() {
    let ws = Workspace::new();
    let exporter = Exporter::with_runner(FakeCommandRunner::exiting(1, "", "syntax error"));

    let result = exporter
        .export_graphviz_to_svg(
            "digraph {",
            ws.path(),
            "deps",
            &GraphvizOptions {
                graphviz_path: Some("/usr/bin/dot".into()),
                keep_dot: false,
                ..GraphvizOptions::default()
            },
        )
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.stderr, "syntax error");
    assert_eq!(result.detail.as_deref(), Some("dot execution failed"));
    assert_eq!(ws.list(""), vec!["deps.dot"]);
}
