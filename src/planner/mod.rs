//! Tree-generation planners.
//!
//! Both planners share one contract: `generate_tree` appends exactly one new
//! tree for the dialogue act to an accumulating [`Document`], so repeated
//! calls build an output corpus aligned with the input acts. Generation
//! never fails once models are loaded — when search starves, the best
//! state seen so far is returned instead.

mod astar;
mod sampling;
mod trace;

pub use astar::{astar_search, AStarPlanner, GenerationOutcome, SearchResult};
pub use sampling::SamplingPlanner;
pub use trace::{TraceEvent, TraceKind, TraceSink, WriteSink};

use crate::da::DialogueAct;
use crate::io::Document;

/// A tree generator: appends one generated tree per call, preserving order.
pub trait Planner {
    fn generate_tree(&mut self, da: &DialogueAct, doc: &mut Document);
}
