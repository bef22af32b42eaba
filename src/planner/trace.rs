//! Debug tracing for the A* planner.
//!
//! Observability only: a sink receives one event per frontier pop, expansion
//! batch, goal or fallback, with the state's cost breakdown. Sinks never
//! influence control flow.

use std::io::Write;

/// What happened at this point of the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceKind {
    /// A state was popped from the frontier.
    Pop,
    /// Successors were pushed for the popped state.
    Expand,
    /// The popped state was a goal; search ends.
    Goal,
    /// The frontier emptied or the iteration budget ran out; the best
    /// state seen so far is returned.
    Fallback,
}

/// One search event with the state's cost breakdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraceEvent {
    pub kind: TraceKind,
    pub cost: f64,
    pub log_prob: f64,
    pub heuristic: f64,
    pub tree_size: usize,
    /// Dialogue-act items still uncovered.
    pub residual: usize,
    /// Successors pushed (Expand events only; 0 otherwise).
    pub successors: usize,
}

/// Caller-supplied event consumer.
pub trait TraceSink {
    fn event(&mut self, event: &TraceEvent);
}

/// Sink writing one line per event to any `io::Write`.
pub struct WriteSink<W: Write>(pub W);

impl<W: Write> TraceSink for WriteSink<W> {
    fn event(&mut self, event: &TraceEvent) {
        // Tracing must not abort generation; write errors are dropped.
        let _ = writeln!(
            self.0,
            "{:?} cost={:.4} logp={:.4} h={:.4} nodes={} residual={} successors={}",
            event.kind,
            event.cost,
            event.log_prob,
            event.heuristic,
            event.tree_size,
            event.residual,
            event.successors,
        );
    }
}
