use clap::Parser;
use std::collections::HashMap;
use std::error::Error;
use std::time::Duration;
use woodblock_solver::config::SearchConfig;
use woodblock_solver::engine::{Difficulty, Game};
use woodblock_solver::error::SearchError;
use woodblock_solver::facade::suggest_move;
use woodblock_solver::heuristics::{Heuristic, HeuristicKind};
use woodblock_solver::search::{Algorithm, SearchStats};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compares every search algorithm on seeded boards", long_about = None)]
struct Args {
    /// Number of boards to evaluate
    #[clap(short, long, default_value_t = 10)]
    boards: u64,

    /// Seed of the first board; the others use the following seeds
    #[clap(short, long, default_value_t = 0)]
    start_seed: u64,

    /// Difficulty from 1 (easy) to 4 (expert)
    #[clap(short, long, default_value_t = 1)]
    difficulty: u8,

    /// Time limit per search in seconds
    #[clap(short, long, default_value_t = 2.0)]
    time_limit: f64,

    /// Heuristic for greedy, astar and wastar
    #[clap(long, value_enum, default_value_t = HeuristicKind::DiamondProximity)]
    heuristic: HeuristicKind,
}

#[derive(Default)]
struct Tally {
    solved: u32,
    failed: u32,
    errors: u32,
    nodes: usize,
    path_len: usize,
    elapsed: Duration,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let difficulty = Difficulty::new(args.difficulty)?;
    let heuristic: &dyn Heuristic = &args.heuristic;

    let mut tallies: HashMap<Algorithm, Tally> = HashMap::new();

    println!(
        "Evaluating {} algorithms on {} {} boards ({}s per search)...",
        Algorithm::ALL.len(),
        args.boards,
        difficulty.name(),
        args.time_limit
    );

    for board_idx in 0..args.boards {
        let seed = args.start_seed + board_idx;
        let snapshot = Game::new(difficulty, seed).snapshot();
        let config = SearchConfig {
            seed,
            ..SearchConfig::default()
        };

        println!("\nBoard {} (Seed: {})", board_idx, seed);
        println!("{}", snapshot.board);

        for algorithm in Algorithm::ALL {
            let tally = tallies.entry(algorithm).or_default();
            let result = suggest_move(
                &snapshot,
                algorithm,
                args.time_limit,
                Some(heuristic),
                &config,
            );
            match result {
                Ok(suggestion) => {
                    tally.solved += 1;
                    tally.nodes += suggestion.stats.nodes_explored;
                    tally.path_len += suggestion.path_len;
                    tally.elapsed += suggestion.elapsed;
                    println!(
                        "  {:<8} path {:<3} nodes {:<8} depth {:<3} {:.3}s",
                        algorithm.name(),
                        suggestion.path_len,
                        suggestion.stats.nodes_explored,
                        suggestion.stats.max_depth,
                        suggestion.elapsed.as_secs_f64()
                    );
                }
                Err(SearchError::NoSolutionFound {
                    stats: SearchStats {
                        nodes_explored,
                        max_depth,
                    },
                }) => {
                    tally.failed += 1;
                    tally.nodes += nodes_explored;
                    println!(
                        "  {:<8} no path   nodes {:<8} depth {:<3}",
                        algorithm.name(),
                        nodes_explored,
                        max_depth
                    );
                }
                Err(err) => {
                    tally.errors += 1;
                    eprintln!("  {:<8} error: {}", algorithm.name(), err);
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Summary ---");

    let mut ranking: Vec<(Algorithm, &Tally)> = Algorithm::ALL
        .iter()
        .filter_map(|algorithm| tallies.get(algorithm).map(|tally| (*algorithm, tally)))
        .collect();
    // Most boards solved first, then fewest nodes.
    ranking.sort_by(|a, b| b.1.solved.cmp(&a.1.solved).then(a.1.nodes.cmp(&b.1.nodes)));

    for (algorithm, tally) in ranking {
        let avg_path = if tally.solved > 0 {
            tally.path_len as f64 / f64::from(tally.solved)
        } else {
            0.0
        };
        let avg_time = if tally.solved > 0 {
            tally.elapsed.as_secs_f64() / f64::from(tally.solved)
        } else {
            0.0
        };
        println!(
            "{:<8}: solved {:>3}, no path {:>3}, errors {:>3}, nodes {:>9}, avg path {:.2}, avg time {:.3}s",
            algorithm.name(),
            tally.solved,
            tally.failed,
            tally.errors,
            tally.nodes,
            avg_path,
            avg_time
        );
    }
    Ok(())
}
