//! Heuristic-driven best-first strategies.
//!
//! All three pop the lowest priority from a [`PriorityFrontier`] and break
//! ties by insertion order. Greedy keeps a closed set of expanded states;
//! A* and Weighted A* keep the best cost seen per state and re-open a state
//! only when a strictly cheaper path reaches it.
//!
//! A goal state is queued with no remaining cost, whatever the heuristic
//! says about it, so it is never ranked behind open non-goal states.
use super::{PriorityFrontier, SearchContext, SearchOutcome, SearchStats, SearchStrategy, Termination};
use crate::heuristics::Heuristic;
use crate::state::{SearchTree, State, StateKey};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

/// Expands whichever state the heuristic rates closest to a goal.
#[derive(Clone, Copy)]
pub struct Greedy<'h> {
    heuristic: &'h dyn Heuristic,
}

impl<'h> Greedy<'h> {
    pub fn new(heuristic: &'h dyn Heuristic) -> Self {
        Greedy { heuristic }
    }
}

impl SearchStrategy for Greedy<'_> {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        let mut stats = SearchStats::default();
        let mut explored: HashSet<StateKey> = HashSet::new();
        let mut tree = SearchTree::new();
        let mut frontier = PriorityFrontier::new();
        let root_priority = remaining_cost(self.heuristic, &root);
        frontier.push(root_priority, tree.insert_root(root));

        while let Some(id) = frontier.pop() {
            if tree[id].is_goal() {
                stats.reach(tree[id].depth());
                if tree[id].depth() > 0 {
                    info!(
                        "greedy: goal at depth {} after {} nodes",
                        tree[id].depth(),
                        stats.nodes_explored
                    );
                }
                return SearchOutcome::found(tree.path(id), stats);
            }
            if ctx.deadline.is_expired() {
                debug!("greedy: timed out after {} nodes", stats.nodes_explored);
                return SearchOutcome::failed(Termination::TimedOut, stats);
            }
            if !explored.insert(tree[id].key()) {
                continue;
            }
            stats.record(tree[id].depth());

            for child in tree[id].successors(&ctx.sampler) {
                if explored.contains(&child.key()) {
                    continue;
                }
                let priority = remaining_cost(self.heuristic, &child);
                frontier.push(priority, tree.insert_child(id, child));
            }
        }

        debug!("greedy: frontier exhausted after {} nodes", stats.nodes_explored);
        SearchOutcome::failed(Termination::Exhausted, stats)
    }
}

/// A* search: priority `g + h`.
#[derive(Clone, Copy)]
pub struct AStar<'h> {
    heuristic: &'h dyn Heuristic,
}

impl<'h> AStar<'h> {
    pub fn new(heuristic: &'h dyn Heuristic) -> Self {
        AStar { heuristic }
    }
}

impl SearchStrategy for AStar<'_> {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        best_first_by_cost("astar", self.heuristic, 1.0, root, ctx)
    }
}

/// Weighted A*: priority `g + weight * h`.
///
/// Weights above 1 lean on the heuristic and trade optimality for speed.
/// A negative weight is accepted with a warning and used as given.
#[derive(Clone, Copy)]
pub struct WeightedAStar<'h> {
    heuristic: &'h dyn Heuristic,
    weight: f64,
}

impl<'h> WeightedAStar<'h> {
    pub fn new(heuristic: &'h dyn Heuristic, weight: f64) -> Self {
        if weight < 0.0 {
            warn!("weighted A* running with negative weight {}", weight);
        }
        WeightedAStar { heuristic, weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl SearchStrategy for WeightedAStar<'_> {
    fn search(&self, root: State, ctx: &SearchContext) -> SearchOutcome {
        best_first_by_cost("wastar", self.heuristic, self.weight, root, ctx)
    }
}

fn remaining_cost(heuristic: &dyn Heuristic, state: &State) -> f64 {
    if state.is_goal() {
        0.0
    } else {
        heuristic.estimate(state)
    }
}

fn best_first_by_cost(
    name: &str,
    heuristic: &dyn Heuristic,
    weight: f64,
    root: State,
    ctx: &SearchContext,
) -> SearchOutcome {
    let priority =
        |state: &State| f64::from(state.cost()) + weight * remaining_cost(heuristic, state);

    let mut stats = SearchStats::default();
    let mut best_cost: HashMap<StateKey, u32> = HashMap::new();
    best_cost.insert(root.key(), root.cost());
    let mut tree = SearchTree::new();
    let mut frontier = PriorityFrontier::new();
    let root_priority = priority(&root);
    frontier.push(root_priority, tree.insert_root(root));

    while let Some(id) = frontier.pop() {
        let cost = tree[id].cost();
        if best_cost
            .get(&tree[id].key())
            .is_some_and(|&best| cost > best)
        {
            continue;
        }
        if tree[id].is_goal() {
            stats.reach(tree[id].depth());
            if tree[id].depth() > 0 {
                info!(
                    "{}: goal at cost {} after {} nodes",
                    name, cost, stats.nodes_explored
                );
            }
            return SearchOutcome::found(tree.path(id), stats);
        }
        if ctx.deadline.is_expired() {
            debug!("{}: timed out after {} nodes", name, stats.nodes_explored);
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
            let child_priority = priority(&child);
            frontier.push(child_priority, tree.insert_child(id, child));
        }
    }

    debug!("{}: frontier exhausted after {} nodes", name, stats.nodes_explored);
    SearchOutcome::failed(Termination::Exhausted, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::HeuristicKind;
    use crate::search::blind::{BreadthFirst, UniformCost};
    use crate::search::tests::{single_piece_ctx, single_piece_root};

    fn zero(_: &State) -> f64 {
        0.0
    }

    #[test]
    fn test_astar_with_zero_heuristic_matches_ucs() {
        let ctx = single_piece_ctx(5.0);
        for rows in [
            ["D#..", "....", "....", "...."],
            ["....", "....", "....", "D#.."],
            ["D...", "....", "....", "...."],
        ] {
            let root = single_piece_root(&rows, 100);
            let ucs = UniformCost.search(root.clone(), &ctx);
            let astar = AStar::new(&zero).search(root, &ctx);
            assert_eq!(astar.path, ucs.path);
            assert_eq!(astar.stats, ucs.stats);
        }
    }

    #[test]
    fn test_weight_one_matches_astar() {
        let ctx = single_piece_ctx(5.0);
        let heuristic = HeuristicKind::DiamondProximity;
        let root = single_piece_root(&["....", ".#..", "....", "D#.."], 100);
        let astar = AStar::new(&heuristic).search(root.clone(), &ctx);
        let weighted = WeightedAStar::new(&heuristic, 1.0).search(root, &ctx);
        assert_eq!(weighted, astar);
        assert!(astar.is_found());
    }

    #[test]
    fn test_astar_finds_fewest_moves_with_zero_heuristic() {
        let ctx = single_piece_ctx(5.0);
        let root = single_piece_root(&["....", "....", "....", "D#.."], 100);
        let bfs = BreadthFirst.search(root.clone(), &ctx);
        let astar = AStar::new(&zero).search(root, &ctx);
        assert_eq!(
            astar.path.as_ref().map(Vec::len),
            bfs.path.as_ref().map(Vec::len)
        );
    }

    #[test]
    fn test_greedy_path_reaches_goal() {
        let ctx = single_piece_ctx(5.0);
        let heuristic = HeuristicKind::DiamondProximity;
        let root = single_piece_root(&["....", "....", "....", "D#.."], 100);
        let outcome = Greedy::new(&heuristic).search(root.clone(), &ctx);
        let path = outcome.path.unwrap();
        assert!(root.replay(&path, &ctx.sampler).unwrap().is_goal());
    }

    #[test]
    fn test_greedy_follows_heuristic() {
        // Rate every state by how many empty cells remain in the last row.
        let last_row_gaps = |state: &State| {
            let board = state.board();
            let row = board.size() - 1;
            (0..board.size())
                .filter(|&col| board.get_cell(row, col) == crate::engine::Cell::Empty)
                .count() as f64
        };
        let root = single_piece_root(&["....", "....", "....", "D#.."], 100);
        let outcome = Greedy::new(&last_row_gaps).search(root, &single_piece_ctx(5.0));
        assert_eq!(outcome.path, Some(vec![(3, 2), (3, 3)]));
        assert_eq!(outcome.stats.nodes_explored, 2);
    }

    #[test]
    fn test_negative_weight_still_runs() {
        let heuristic = HeuristicKind::DiamondProximity;
        let strategy = WeightedAStar::new(&heuristic, -1.0);
        assert_eq!(strategy.weight(), -1.0);
        let root = single_piece_root(&[".##D", "....", "....", "...."], 100);
        let outcome = strategy.search(root, &single_piece_ctx(5.0));
        assert_eq!(outcome.path, Some(vec![(0, 0)]));
    }

    #[test]
    fn test_goal_queued_ahead_of_sentinel_states() {
        // Every state, goals included, rates at the sentinel here.
        let sentinel = |_: &State| crate::heuristics::NO_DIAMOND_SENTINEL;
        let ctx = single_piece_ctx(5.0);
        let root = single_piece_root(&[".##D", "....", "....", "...."], 100);
        let astar = AStar::new(&sentinel).search(root.clone(), &ctx);
        assert_eq!(astar.path, Some(vec![(0, 0)]));
        assert_eq!(astar.stats.nodes_explored, 1);
        let greedy = Greedy::new(&sentinel).search(root, &ctx);
        assert_eq!(greedy.path, Some(vec![(0, 0)]));
        assert_eq!(greedy.stats.nodes_explored, 1);
    }
}
