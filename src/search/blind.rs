//! Uninformed strategies: breadth-first, depth-first, uniform-cost,
//! depth-limited and iterative deepening.
use super::{
    PriorityFrontier, SearchContext, SearchOutcome, SearchStats, SearchStrategy, Termination,
    MAX_RECURSION_DEPTH,
};
use crate::state::{Move, SearchTree, State, StateKey};
use log::{debug, info, trace};
use std::collections::{HashMap, HashSet, VecDeque};

/// FIFO frontier. States are marked seen when generated, and the goal test
/// runs on generation, so the first goal produced is the shallowest one.
#[derive(Clone, Copy, Debug, Default)]
pub struct BreadthFirst;

impl SearchStrategy for BreadthFirst {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let mut stats = SearchStats::default();
        if root.is_goal() {
            return SearchOutcome::found(Vec::new(), stats);
        }

        let mut seen: HashSet<StateKey> = HashSet::new();
        seen.insert(root.key());
        let mut tree = SearchTree::new();
        let mut queue = VecDeque::from([tree.insert_root(root)]);

        while let Some(id) = queue.pop_front() {
            if ctx.deadline.is_expired() {
                debug!("bfs: timed out after {} nodes", stats.nodes_explored);
                return SearchOutcome::failed(Termination::TimedOut, stats);
            }
            stats.record(tree[id].depth());

            for child in tree[id].successors(&ctx.sampler) {
                if !seen.insert(child.key()) {
                    continue;
                }
                let child_id = tree.insert_child(id, child);
                if tree[child_id].is_goal() {
                    stats.reach(tree[child_id].depth());
                    info!(
                        "bfs: goal at depth {} after {} nodes",
                        tree[child_id].depth(),
                        stats.nodes_explored
                    );
                    return SearchOutcome::found(tree.path(child_id), stats);
                }
                queue.push_back(child_id);
            }
        }

        debug!("bfs: frontier exhausted after {} nodes", stats.nodes_explored);
        SearchOutcome::failed(Termination::Exhausted, stats)
    }
}

/// LIFO frontier with a lazily checked explored set. Successors are pushed
/// in reverse so the first legal move is explored first.
#[derive(Clone, Copy, Debug, Default)]
pub struct DepthFirst;

impl SearchStrategy for DepthFirst {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let mut stats = SearchStats::default();
        let mut explored: HashSet<StateKey> = HashSet::new();
        let mut tree = SearchTree::new();
        let mut stack = vec![tree.insert_root(root)];

        while let Some(id) = stack.pop() {
            if tree[id].is_goal() {
                stats.reach(tree[id].depth());
                if tree[id].depth() > 0 {
                    info!(
                        "dfs: goal at depth {} after {} nodes",
                        tree[id].depth(),
                        stats.nodes_explored
                    );
                }
                return SearchOutcome::found(tree.path(id), stats);
            }
            if ctx.deadline.is_expired() {
                debug!("dfs: timed out after {} nodes", stats.nodes_explored);
                return SearchOutcome::failed(Termination::TimedOut, stats);
            }
            if !explored.insert(tree[id].key()) {
                continue;
            }
            stats.record(tree[id].depth());

            let children = tree[id].successors(&ctx.sampler);
            for child in children.into_iter().rev() {
                if explored.contains(&child.key()) {
                    continue;
                }
                stack.push(tree.insert_child(id, child));
            }
        }

        debug!("dfs: frontier exhausted after {} nodes", stats.nodes_explored);
        SearchOutcome::failed(Termination::Exhausted, stats)
    }
}

/// Lowest cumulative cost first. A state is re-opened only when reached
/// with a strictly smaller cost than the best one recorded.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformCost;

impl SearchStrategy for UniformCost {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let mut stats = SearchStats::default();
        let mut best_cost: HashMap<StateKey, u32> = HashMap::new();
        best_cost.insert(root.key(), root.cost());
        let mut tree = SearchTree::new();
        let mut frontier = PriorityFrontier::new();
        let root_cost = root.cost();
        frontier.push(f64::from(root_cost), tree.insert_root(root));

        while let Some(id) = frontier.pop() {
            let key = tree[id].key();
            let cost = tree[id].cost();
            if best_cost.get(&key).is_some_and(|&best| cost > best) {
                continue;
            }
            if tree[id].is_goal() {
                stats.reach(tree[id].depth());
                if tree[id].depth() > 0 {
                    info!(
                        "ucs: goal at cost {} after {} nodes",
                        cost, stats.nodes_explored
                    );
                }
                return SearchOutcome::found(tree.path(id), stats);
            }
            if ctx.deadline.is_expired() {
                debug!("ucs: timed out after {} nodes", stats.nodes_explored);
                return SearchOutcome::failed(Termination::TimedOut, stats);
            }
            stats.record(tree[id].depth());

            for child in tree[id].successors(&ctx.sampler) {
                let child_key = child.key();
                let child_cost = child.cost();
                if best_cost
                    .get(&child_key)
                    .is_some_and(|&best| child_cost >= best)
                {
                    continue;
                }
                best_cost.insert(child_key, child_cost);
                frontier.push(f64::from(child_cost), tree.insert_child(id, child));
            }
        }

        debug!("ucs: frontier exhausted after {} nodes", stats.nodes_explored);
        SearchOutcome::failed(Termination::Exhausted, stats)
    }
}

/// Result of one depth-limited run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DlsStatus {
    /// A goal was reached; the moves lead from the root to it.
    Found(Vec<Move>),
    /// Some branch was pruned by the depth limit.
    Cutoff,
    /// Every branch was explored without a goal and nothing was pruned.
    Failure,
    TimedOut,
}

/// Recursive depth-first search that never goes below `depth_limit`.
///
/// Only the ancestors of the current node are guarded against, so a state
/// reachable by several paths may be expanded once per path.
#[derive(Clone, Copy, Debug)]
pub struct DepthLimited {
    depth_limit: u32,
}

impl DepthLimited {
    /// Limits above [`MAX_RECURSION_DEPTH`] are lowered to it.
    pub fn new(depth_limit: u32) -> Self {
        DepthLimited {
            depth_limit: depth_limit.min(MAX_RECURSION_DEPTH),
        }
    }

    pub fn depth_limit(&self) -> u32 {
        self.depth_limit
    }

    /// Runs the search and reports the three-way status along with statistics.
    pub fn run(&self, root: &State, ctx: &SearchContext) -> (DlsStatus, SearchStats) {
        let mut walk = DlsWalk {
            ctx,
            depth_limit: self.depth_limit,
            stats: SearchStats::default(),
            ancestors: HashSet::new(),
            path: Vec::new(),
        };
        let status = walk.visit(root, 0);
        (status, walk.stats)
    }
}

impl SearchStrategy for DepthLimited {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let (status, stats) = self.run(&root, ctx);
        match status {
            DlsStatus::Found(path) => {
                if !path.is_empty() {
                    info!(
                        "dls: goal at depth {} after {} nodes",
                        path.len(),
                        stats.nodes_explored
                    );
                }
                SearchOutcome::found(path, stats)
            }
            DlsStatus::Cutoff => {
                debug!("dls: cut off at depth {}", self.depth_limit);
                SearchOutcome::failed(Termination::Cutoff, stats)
            }
            DlsStatus::Failure => SearchOutcome::failed(Termination::Exhausted, stats),
            DlsStatus::TimedOut => {
                debug!("dls: timed out after {} nodes", stats.nodes_explored);
                SearchOutcome::failed(Termination::TimedOut, stats)
            }
        }
    }
}

/// Mutable bookkeeping threaded through the recursion of one run.
struct DlsWalk<'a> {
    ctx: &'a SearchContext,
    depth_limit: u32,
    stats: SearchStats,
    ancestors: HashSet<StateKey>,
    path: Vec<Move>,
}

impl DlsWalk<'_> {
    fn visit(&mut self, state: &State, depth: u32) -> DlsStatus {
        if state.is_goal() {
            self.stats.reach(depth);
            return DlsStatus::Found(self.path.clone());
        }
        if self.ctx.deadline.is_expired() {
            return DlsStatus::TimedOut;
        }
        self.stats.record(depth);
        if depth >= self.depth_limit {
            return DlsStatus::Cutoff;
        }

        let key = state.key();
        self.ancestors.insert(key.clone());
        let mut cutoff = false;
        let mut status = DlsStatus::Failure;

        for child in state.successors(&self.ctx.sampler) {
            if self.ancestors.contains(&child.key()) {
                continue;
            }
            let Some(mv) = child.last_move() else {
                continue;
            };
            self.path.push(mv);
            let child_status = self.visit(&child, depth + 1);
            self.path.pop();
            match child_status {
                DlsStatus::Found(_) | DlsStatus::TimedOut => {
                    status = child_status;
                    break;
                }
                DlsStatus::Cutoff => cutoff = true,
                DlsStatus::Failure => {}
            }
        }

        self.ancestors.remove(&key);
        match status {
            DlsStatus::Failure if cutoff => DlsStatus::Cutoff,
            other => other,
        }
    }
}

/// Depth-limited search with limits `0, 1, 2, ...` up to `max_depth`.
///
/// Stops early when an iteration fails without any cutoff, since a deeper
/// limit cannot uncover anything new. All iterations share the caller's
/// deadline.
#[derive(Clone, Copy, Debug)]
pub struct IterativeDeepening {
    max_depth: u32,
}

impl IterativeDeepening {
    /// `max_depth` is capped at [`MAX_RECURSION_DEPTH`].
    pub fn new(max_depth: u32) -> Self {
        IterativeDeepening {
            max_depth: max_depth.min(MAX_RECURSION_DEPTH),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}

impl SearchStrategy for IterativeDeepening {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let mut stats = SearchStats::default();
        if root.is_goal() {
            return SearchOutcome::found(Vec::new(), stats);
        }

        for limit in 0..=self.max_depth {
            if ctx.deadline.is_expired() {
                debug!("ids: timed out before depth {}", limit);
                return SearchOutcome::failed(Termination::TimedOut, stats);
            }
            let (status, iteration) = DepthLimited::new(limit).run(&root, ctx);
            stats.absorb(iteration);
            trace!(
                "ids: depth {} explored {} nodes ({:?} remaining)",
                limit,
                iteration.nodes_explored,
                ctx.deadline.remaining()
            );

            match status {
                DlsStatus::Found(path) => {
                    info!(
                        "ids: goal at depth {} after {} nodes",
                        path.len(),
                        stats.nodes_explored
                    );
                    return SearchOutcome::found(path, stats);
                }
                DlsStatus::Failure => {
                    debug!("ids: search space exhausted at depth {}", limit);
                    return SearchOutcome::failed(Termination::Exhausted, stats);
                }
                DlsStatus::TimedOut => {
                    debug!("ids: timed out at depth {}", limit);
                    return SearchOutcome::failed(Termination::TimedOut, stats);
                }
                DlsStatus::Cutoff => {}
            }
        }

        debug!("ids: depth ceiling {} reached", self.max_depth);
        SearchOutcome::failed(Termination::Cutoff, stats)
    }
}
