//! Break down which entries make nested key-value state big when serialized.
//!
//! Hosts that ship state across process boundaries usually expose only one
//! size oracle: serialize the whole container and count the bytes. This crate
//! derives a per-entry breakdown from that oracle alone by removing one entry
//! at a time, re-measuring and diffing, recursing into nested containers, and
//! restoring the container before returning, also when measurement fails
//! partway.
//!
//! Any key-value representation works through the [`MeasuredContainer`]
//! trait; an implementation for `serde_json::Map` is bundled.
//!
//! ```
//! let mut state: serde_json::Map<String, serde_json::Value> =
//!     serde_json::from_str(r#"{"profile": {"name": "ada"}, "token": "0123456789"}"#).unwrap();
//!
//! let report = state2breakdown::breakdown_report(&mut state, -1).unwrap();
//! assert!(report.contains("contains 2 keys"));
//! assert!(report.contains("* token = 0.0 KB"));
//! ```

mod json;
mod measure;
mod node;
mod report;

pub use measure::{measure, MeasureError, MeasuredContainer};
pub use node::BreakdownNode;
pub use report::{
    breakdown_report, format, log_breakdown, log_breakdown_at, LogFacadeSink, ReportSink,
};
