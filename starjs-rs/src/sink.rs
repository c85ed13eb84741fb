//! Per-invocation capture of Starlark `print` output.

use std::cell::RefCell;

use starlark::PrintHandler;

/// Log target for captured script output.
pub const SCRIPT_LOG_TARGET: &str = "starjs::script";

/// Append-only buffer for one evaluator's `print` calls.
///
/// Each printed line is stored followed by `\n`, in emission order.  A sink
/// belongs to exactly one invocation and is never shared.
#[derive(Debug, Default)]
pub struct OutputSink {
    buf: RefCell<String>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything printed so far.
    pub fn contents(&self) -> String {
        self.buf.borrow().clone()
    }

    /// Move the accumulated output out, leaving the sink empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.buf.borrow_mut())
    }
}

impl PrintHandler for OutputSink {
    fn println(&self, text: &str) -> starlark::Result<()> {
        log::trace!(target: SCRIPT_LOG_TARGET, "{text}");
        let mut buf = self.buf.borrow_mut();
        buf.push_str(text);
        buf.push('\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_newline_terminated_in_order() {
        let sink = OutputSink::new();
        sink.println("a").unwrap();
        sink.println("b").unwrap();
        assert_eq!(sink.contents(), "a\nb\n");
    }

    #[test]
    fn empty_line_still_terminated() {
        let sink = OutputSink::new();
        sink.println("").unwrap();
        assert_eq!(sink.take(), "\n");
        assert_eq!(sink.contents(), "");
    }
}
