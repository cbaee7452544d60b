//! Renders breakdown trees as indented text reports and routes them to a
//! logging sink.

use crate::measure::{measure, MeasureError, MeasuredContainer};
use crate::node::BreakdownNode;

const INDENT: &str = "  ";

/// Renders `tree` as a multi-line report, indented `indent_depth` levels.
///
/// One summary line for the node itself, one `* key = size` line per child,
/// and a recursively indented sub-block for every child that was broken down
/// further.
pub fn format(tree: &BreakdownNode, indent_depth: usize) -> String {
    let prefix = INDENT.repeat(indent_depth);
    let mut out = format!(
        "{prefix}{} contains {} keys and measures {} KB when serialized\n",
        tree.key,
        tree.children.len(),
        kilobytes(tree.size_bytes)
    );
    for child in &tree.children {
        out.push_str(&format!(
            "{prefix}* {} = {} KB\n",
            child.key,
            kilobytes(child.size_bytes)
        ));
        if !child.children.is_empty() {
            out.push_str(&format(child, indent_depth + 1));
        }
    }
    out
}

// `{:.1}` never consults a locale, so the decimal separator stays a period
// wherever the report ends up.
fn kilobytes(bytes: i64) -> String {
    format!("{:.1}", bytes as f64 / 1000.0)
}

/// Measures `container` and renders the result in one go.
pub fn breakdown_report<C: MeasuredContainer>(
    container: &mut C,
    depth_limit: i32,
) -> Result<String, MeasureError> {
    let tree = measure(container, depth_limit)?;
    Ok(format(&tree, 0))
}

/// Receives finished reports, one message per measured container.
pub trait ReportSink {
    fn log(&self, priority: log::Level, tag: &str, message: &str);
}

/// Sink that forwards reports to the `log` facade.
#[derive(Debug, Default)]
pub struct LogFacadeSink;

impl ReportSink for LogFacadeSink {
    fn log(&self, priority: log::Level, tag: &str, message: &str) {
        log::log!(target: tag, priority, "{message}");
    }
}

/// Measures `container`, renders the report and hands it to `sink` at debug
/// priority.
pub fn log_breakdown<C: MeasuredContainer>(
    sink: &dyn ReportSink,
    tag: &str,
    container: &mut C,
    depth_limit: i32,
) -> Result<(), MeasureError> {
    log_breakdown_at(sink, log::Level::Debug, tag, container, depth_limit)
}

/// Measures `container`, renders the report and hands it to `sink` at the
/// given priority.
pub fn log_breakdown_at<C: MeasuredContainer>(
    sink: &dyn ReportSink,
    priority: log::Level,
    tag: &str,
    container: &mut C,
    depth_limit: i32,
) -> Result<(), MeasureError> {
    let report = breakdown_report(container, depth_limit)?;
    sink.log(priority, tag, &report);
    Ok(())
}
