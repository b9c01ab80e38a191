//! Error rendering using ariadne
//!
//! Compile errors are shown against the expression text with the offending
//! span underlined. Evaluation errors underline the whole expression and add
//! the template position as a note.

use std::io::Write;
use std::ops::Range;

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};
use miette::Diagnostic;

use crate::{CompileError, ErrorInfo, Error};

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use tales::{Engine, render_error};
///
/// let engine = Engine::with_standard_types();
/// if let Err(e) = engine.compile("string:total: $1") {
///     render_error(&e.into());
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, writer, true)
}

/// Render an error to a String (useful for logs and web UIs)
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without ANSI color codes
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation(err) => render_compile_error(err, writer, use_color),
        Error::Evaluation { info, expression } => {
            render_evaluation_error(info, expression, writer, use_color)
        }
        Error::Registration(err) => writeln!(writer, "Registration error: {err}"),
    }
}

fn render_compile_error(
    error: &CompileError,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let source = error.source_text();
    let span = clamp(error.span(), source.len());
    let label = error
        .labels()
        .and_then(|mut labels| labels.next())
        .and_then(|label| label.label().map(str::to_owned))
        .unwrap_or_else(|| error.to_string());

    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let mut report = Report::build(ReportKind::Error, ("<expression>", span.clone()))
        .with_message(error.to_string())
        .with_config(Config::default().with_color(use_color))
        .with_label(
            Label::new(("<expression>", span))
                .with_message(label)
                .with_color(colors.next()),
        );
    if let Some(code) = error.code() {
        report = report.with_code(code);
    }
    if let Some(help) = error.help() {
        report = report.with_help(help.to_string());
    }
    report
        .finish()
        .write(("<expression>", Source::from(source)), &mut *writer)
}

fn render_evaluation_error(
    info: &ErrorInfo,
    expression: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let span = 0..expression.len();
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let mut report = Report::build(ReportKind::Error, ("<expression>", span.clone()))
        .with_message(info.error.to_string())
        .with_config(Config::default().with_color(use_color))
        .with_label(
            Label::new(("<expression>", span))
                .with_message("while evaluating this expression")
                .with_color(colors.next()),
        );
    if let Some(code) = info.error.code() {
        report = report.with_code(code);
    }
    if let Some(help) = info.error.help() {
        report = report.with_help(help.to_string());
    }
    if let Some(location) = location_note(info) {
        report = report.with_note(location);
    }
    report
        .finish()
        .write(("<expression>", Source::from(expression)), &mut *writer)
}

/// "in page.pt, at line 3, column 7", or whichever parts are known.
fn location_note(info: &ErrorInfo) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(file) = &info.source_file {
        parts.push(format!("in {file}"));
    }
    if let Some(line) = info.position.line {
        match info.position.column {
            Some(column) => parts.push(format!("at line {line}, column {column}")),
            None => parts.push(format!("at line {line}")),
        }
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn clamp(span: Range<usize>, len: usize) -> Range<usize> {
    span.start.min(len)..span.end.min(len)
}
