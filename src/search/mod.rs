//! Search strategies over the state graph.
//!
//! Every strategy implements [`SearchStrategy`]: it receives a root
//! [`State`] and a [`SearchContext`] (wall-clock deadline plus the piece
//! sampler used for transitions) and returns a [`SearchOutcome`]. Running out
//! of time is a normal termination, reported through
//! [`Termination::TimedOut`] with the statistics gathered so far.
//!
//! The blind family lives in [`blind`], the heuristic-driven family in
//! [`informed`]. [`Algorithm`] is the closed set of strategy tags the facade
//! and the command-line tools dispatch on.
pub mod blind;
pub mod informed;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::heuristics::Heuristic;
use crate::state::{Move, PieceSampler, State, StateId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::time::{Duration, Instant};

pub use blind::{BreadthFirst, DepthFirst, DepthLimited, DlsStatus, IterativeDeepening, UniformCost};
pub use informed::{AStar, Greedy, WeightedAStar};

/// Hard ceiling on the recursion depth of depth-limited search.
pub const MAX_RECURSION_DEPTH: u32 = 100;

/// A wall-clock budget measured from the moment it was created.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Deadline {
            start: Instant::now(),
            limit,
        }
    }

    /// Builds a deadline from a number of seconds.
    ///
    /// # Errors
    /// `SearchError::InvalidTimeLimit` for NaN, infinite, negative or
    /// unrepresentable values. Zero is accepted and expires immediately.
    pub fn from_secs(secs: f64) -> Result<Self, SearchError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(SearchError::InvalidTimeLimit(secs));
        }
        let limit =
            Duration::try_from_secs_f64(secs).map_err(|_| SearchError::InvalidTimeLimit(secs))?;
        Ok(Deadline::new(limit))
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.limit
    }
}

/// Everything a strategy needs besides the root state.
#[derive(Clone, Debug)]
pub struct SearchContext {
    pub deadline: Deadline,
    pub sampler: PieceSampler,
}

impl SearchContext {
    pub fn new(deadline: Deadline, sampler: PieceSampler) -> Self {
        SearchContext { deadline, sampler }
    }
}

/// Diagnostics reported by every strategy, whatever the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of states expanded (goal-tested and, unless they were the
    /// goal, had their successors generated).
    pub nodes_explored: usize,
    /// Deepest state expanded, or the goal depth if that is deeper.
    pub max_depth: u32,
}

impl SearchStats {
    pub(crate) fn record(&mut self, depth: u32) {
        self.nodes_explored += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn reach(&mut self, depth: u32) {
        self.max_depth = self.max_depth.max(depth);
    }

    /// Adds another run's counters, as iterative deepening does per iteration.
    pub fn absorb(&mut self, other: SearchStats) {
        self.nodes_explored += other.nodes_explored;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// Why a search stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Found,
    /// The frontier ran empty.
    Exhausted,
    /// A depth bound pruned at least one branch; a deeper search might succeed.
    Cutoff,
    TimedOut,
}

/// Result of one strategy run: a root-to-goal move list or nothing, plus statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub path: Option<Vec<Move>>,
    pub stats: SearchStats,
    pub termination: Termination,
}

impl SearchOutcome {
    pub fn found(path: Vec<Move>, stats: SearchStats) -> Self {
        SearchOutcome {
            path: Some(path),
            stats,
            termination: Termination::Found,
        }
    }

    pub fn failed(termination: Termination, stats: SearchStats) -> Self {
        SearchOutcome {
            path: None,
            stats,
            termination,
        }
    }

    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }
}

/// The single interface every concrete strategy implements.
pub trait SearchStrategy {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome;
}

/// Strategy tags, in the order the tools list them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    Bfs,
    Dfs,
    Ucs,
    Dls,
    Ids,
    Greedy,
    Astar,
    Wastar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Ucs,
        Algorithm::Dls,
        Algorithm::Ids,
        Algorithm::Greedy,
        Algorithm::Astar,
        Algorithm::Wastar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Ucs => "ucs",
            Algorithm::Dls => "dls",
            Algorithm::Ids => "ids",
            Algorithm::Greedy => "greedy",
            Algorithm::Astar => "astar",
            Algorithm::Wastar => "wastar",
        }
    }

    /// Whether the strategy needs a heuristic.
    pub fn is_informed(self) -> bool {
        matches!(self, Algorithm::Greedy | Algorithm::Astar | Algorithm::Wastar)
    }

    /// Instantiates the strategy with the parameters taken from `config`.
    ///
    /// # Errors
    /// `SearchError::MissingHeuristic` when an informed strategy is requested
    /// without a heuristic.
    pub fn build<'h>(
        self,
        config: &SearchConfig,
        heuristic: Option<&'h dyn Heuristic>,
    ) -> Result<Box<dyn SearchStrategy + 'h>, SearchError> {
        let strategy: Box<dyn SearchStrategy + 'h> = match self {
            Algorithm::Bfs => Box::new(BreadthFirst),
            Algorithm::Dfs => Box::new(DepthFirst),
            Algorithm::Ucs => Box::new(UniformCost),
            Algorithm::Dls => Box::new(DepthLimited::new(config.dls_depth_limit)),
            Algorithm::Ids => Box::new(IterativeDeepening::new(config.ids_max_depth)),
            Algorithm::Greedy => Box::new(Greedy::new(self.require(heuristic)?)),
            Algorithm::Astar => Box::new(AStar::new(self.require(heuristic)?)),
            Algorithm::Wastar => Box::new(WeightedAStar::new(
                self.require(heuristic)?,
                config.wastar_weight,
            )),
        };
        Ok(strategy)
    }

    fn require<'h>(
        self,
        heuristic: Option<&'h dyn Heuristic>,
    ) -> Result<&'h dyn Heuristic, SearchError> {
        heuristic.ok_or(SearchError::MissingHeuristic(self))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A frontier slot ordered so that a max-heap pops the lowest priority first
/// and, among equal priorities, the earliest insertion.
#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    priority: f64,
    serial: u64,
    id: StateId,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.serial.cmp(&self.serial))
    }
}

/// Min-priority queue of arena handles with FIFO tie-breaking.
#[derive(Debug, Default)]
pub(crate) struct PriorityFrontier {
    heap: BinaryHeap<FrontierEntry>,
    next_serial: u64,
}

impl PriorityFrontier {
    pub(crate) fn new() -> Self {
        PriorityFrontier::default()
    }

    pub(crate) fn push(&mut self, priority: f64, id: StateId) {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.heap.push(FrontierEntry {
            priority,
            serial,
            id,
        });
    }

    pub(crate) fn pop(&mut self) -> Option<StateId> {
        self.heap.pop().map(|entry| entry.id)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}
