//! Adapters bridging `ProgressSink` to the caller.

use super::ProgressSink;
use tracing::{info, warn};

/// Adapter that forwards progress lines to a closure, logging them on the way.
///
/// The TUI worker uses this to push lines back over its message channel.
pub struct FnSink<F: FnMut(String)>(pub F);

impl<F: FnMut(String)> ProgressSink for FnSink<F> {
    fn on_step(&mut self, msg: &str) {
        info!("{msg}");
        (self.0)(msg.to_string());
    }

    fn on_warning(&mut self, msg: &str) {
        warn!("{msg}");
        (self.0)(format!("warning: {msg}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_sink_forwards_lines() {
        let mut lines = Vec::new();
        {
            let mut sink = FnSink(|line: String| lines.push(line));
            sink.on_step("Checking out feature-a");
            sink.on_warning("abort failed");
        }
        assert_eq!(lines, vec!["Checking out feature-a", "warning: abort failed"]);
    }
}
