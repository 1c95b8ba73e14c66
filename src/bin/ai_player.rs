use clap::Parser;
use std::error::Error;
use woodblock_solver::autoplay::{play, AutoplayEnd, AutoplayOptions};
use woodblock_solver::config::{self, play_time_limit, SearchConfig};
use woodblock_solver::engine::{Difficulty, Game, GameOutcome};
use woodblock_solver::heuristics::{Heuristic, HeuristicKind};
use woodblock_solver::search::Algorithm;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Lets a search algorithm play a wood block game alone", long_about = None)]
struct Args {
    /// Search algorithm
    #[clap(short, long, value_enum, default_value_t = Algorithm::Greedy)]
    algorithm: Algorithm,

    /// Heuristic for greedy, astar and wastar
    #[clap(long, value_enum, default_value_t = HeuristicKind::DiamondProximity)]
    heuristic: HeuristicKind,

    /// Difficulty from 1 (easy) to 4 (expert)
    #[clap(short, long, default_value_t = 1)]
    difficulty: u8,

    /// Seed for the game and the search
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Time limit per move in seconds (defaults to 5 + 2 * difficulty)
    #[clap(short, long)]
    time_limit: Option<f64>,

    /// Stop after this many moves
    #[clap(short, long)]
    max_moves: Option<u32>,

    /// Heuristic weight for wastar
    #[clap(short, long, default_value_t = config::DEFAULT_WASTAR_WEIGHT)]
    weight: f64,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let difficulty = Difficulty::new(args.difficulty)?;
    let mut game = Game::new(difficulty, args.seed);
    let time_limit_secs = args
        .time_limit
        .unwrap_or_else(|| play_time_limit(difficulty));
    let config = SearchConfig {
        wastar_weight: args.weight,
        seed: args.seed,
        ..SearchConfig::default()
    };
    let options = AutoplayOptions {
        algorithm: args.algorithm,
        time_limit_secs,
        max_moves: args.max_moves,
    };
    let heuristic: Option<&dyn Heuristic> = if args.algorithm.is_informed() {
        Some(&args.heuristic)
    } else {
        None
    };

    println!("--- AI Playing Alone ---");
    print!("Algorithm: {}", args.algorithm.name().to_uppercase());
    if args.algorithm.is_informed() {
        print!(" ({})", args.heuristic.name());
    }
    println!();
    println!("Time limit per move: {}s\n", time_limit_secs);
    println!("{}\n", game);

    let report = play(&mut game, &options, heuristic, &config)?;

    println!("{}\n", game);
    let verdict = match report.end {
        AutoplayEnd::Finished(GameOutcome::Victory) => "Victory! All diamonds collected.",
        AutoplayEnd::Finished(GameOutcome::OutOfScore) => "Game over: out of score.",
        AutoplayEnd::Finished(GameOutcome::NoMoves) => "Game over: no valid moves left.",
        AutoplayEnd::AiStuck => "The AI could not find a move and cannot reroll.",
        AutoplayEnd::MoveLimit => "Move limit reached.",
    };
    println!("{}", verdict);
    println!("--- AI Play Summary ---");
    println!("Moves made: {}", report.moves);
    println!("Rerolls: {}", report.rerolls);
    println!("Final score: {}", report.final_score);
    println!(
        "Diamonds: {}/{}",
        report.diamonds_collected, report.total_diamonds
    );
    println!("Nodes explored: {}", report.stats.nodes_explored);
    println!("Total time: {:.2}s", report.elapsed.as_secs_f64());
    Ok(())
}
