//! Progress callbacks for long-running exports

/// Receives `(current, total)` updates during an export.
///
/// Any `FnMut(usize, usize)` closure is a sink.
pub trait ProgressSink {
    fn update(&mut self, current: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize),
{
    fn update(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Sink that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _current: usize, _total: usize) {}
}
