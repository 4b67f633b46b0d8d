//! Error rendering using ariadne
//!
//! Load errors point into the source text. Script errors carry no source
//! positions, so they render as a report of their message, location and
//! near snippet.

use std::io::Write;

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};

use crate::Error;

const SOURCE_ID: &str = "<script>";

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use rivet::{Interpreter, render_error};
///
/// let source = "[1 2";
/// if let Err(e) = Interpreter::new().run(source) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Load { error, .. } => {
            let mut colors = ColorGenerator::new();
            colors.next(); // Skip the first color.

            let span = clamp(error.span(), source.len());
            Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
                .with_message("could not load source")
                .with_code("load")
                .with_config(ariadne::Config::default().with_color(use_color))
                .with_label(
                    Label::new((SOURCE_ID, span))
                        .with_message(error.to_string())
                        .with_color(colors.next()),
                )
                .finish()
                .write((SOURCE_ID, Source::from(source)), &mut *writer)
        }
        Error::Script(object) => writeln!(writer, "{}", object),
        Error::Halted => writeln!(writer, "** Halted"),
        Error::Quit { status } => writeln!(writer, "** Quit with status {}", status),
    }
}

/// Keeps the span inside the source; ariadne needs at least one character
/// to point at, so an empty span at the end backs up by one.
fn clamp(span: core::ops::Range<usize>, len: usize) -> core::ops::Range<usize> {
    let start = span.start.min(len);
    let end = span.end.clamp(start, len);
    if start == end && start > 0 && start == len {
        return start - 1..end;
    }
    start..end
}
