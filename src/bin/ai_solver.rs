use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use woodblock_solver::config::{suggestion_time_limit, SearchConfig};
use woodblock_solver::engine::{Difficulty, Game, Piece};
use woodblock_solver::error::SearchError;
use woodblock_solver::facade::suggest_move;
use woodblock_solver::heuristics::{Heuristic, HeuristicKind};
use woodblock_solver::search::Algorithm;
use woodblock_solver::utils::{board_from_str_array, grid_lines, piece_from_str_array};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Suggests the next move for a wood block puzzle", long_about = None)]
struct Args {
    /// Search algorithm
    #[clap(short, long, value_enum, default_value_t = Algorithm::Bfs)]
    algorithm: Algorithm,

    /// Heuristic for greedy, astar and wastar
    #[clap(long, value_enum, default_value_t = HeuristicKind::DiamondProximity)]
    heuristic: HeuristicKind,

    /// Difficulty from 1 (easy) to 4 (expert)
    #[clap(short, long, default_value_t = 1)]
    difficulty: u8,

    /// Seed for board generation and for the pieces drawn during search
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Current piece as comma separated rows, e.g. "##,#."
    #[clap(short, long)]
    piece: Option<String>,

    /// Current score (defaults to the difficulty's starting score)
    #[clap(long)]
    score: Option<i32>,

    /// Search time limit in seconds (defaults to 5 + difficulty)
    #[clap(short, long)]
    time_limit: Option<f64>,

    /// Depth limit for dls
    #[clap(long, default_value_t = woodblock_solver::config::DEFAULT_DLS_DEPTH_LIMIT)]
    dls_depth: u32,

    /// Deepest iteration for ids
    #[clap(long, default_value_t = woodblock_solver::config::DEFAULT_IDS_MAX_DEPTH)]
    ids_max_depth: u32,

    /// Heuristic weight for wastar
    #[clap(short, long, default_value_t = woodblock_solver::config::DEFAULT_WASTAR_WEIGHT)]
    weight: f64,

    /// Assume every future piece equals the current one
    #[clap(long)]
    repeat_piece: bool,

    /// Path to a board file ('.' empty, '#' occupied, 'D' diamond); a board
    /// is generated from the seed when omitted
    board_file: Option<PathBuf>,
}

fn parse_piece(text: &str) -> Result<Piece, Box<dyn Error>> {
    let rows: Vec<&str> = text.split(',').map(str::trim).collect();
    Ok(piece_from_str_array(&rows)?)
}

fn load_game(args: &Args, difficulty: Difficulty) -> Result<Game, Box<dyn Error>> {
    let generated = Game::new(difficulty, args.seed);
    let board = match &args.board_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            board_from_str_array(&grid_lines(&content))?
        }
        None => generated.board().clone(),
    };
    let piece = match &args.piece {
        Some(text) => parse_piece(text)?,
        None => generated.piece().clone(),
    };
    let score = args.score.unwrap_or_else(|| difficulty.initial_score());
    Ok(Game::from_parts(board, piece, score, difficulty, args.seed))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let difficulty = Difficulty::new(args.difficulty)?;
    let game = load_game(&args, difficulty)?;
    let time_limit_secs = args
        .time_limit
        .unwrap_or_else(|| suggestion_time_limit(difficulty));
    let config = SearchConfig {
        dls_depth_limit: args.dls_depth,
        ids_max_depth: args.ids_max_depth,
        wastar_weight: args.weight,
        seed: args.seed,
        fixed_piece: args.repeat_piece.then(|| game.piece().clone()),
    };
    let heuristic: Option<&dyn Heuristic> = if args.algorithm.is_informed() {
        Some(&args.heuristic)
    } else {
        None
    };

    println!("Initial state:\n{}\n", game);
    print!("Searching with {}", args.algorithm.name().to_uppercase());
    if args.algorithm.is_informed() {
        print!(" ({})", args.heuristic.name());
    }
    println!(", time limit {}s...\n", time_limit_secs);

    match suggest_move(
        &game.snapshot(),
        args.algorithm,
        time_limit_secs,
        heuristic,
        &config,
    ) {
        Ok(suggestion) => {
            match suggestion.mv {
                Some((r, c)) => {
                    println!("Suggested move: ({}, {})", r, c);
                    println!(
                        "{}",
                        game.board()
                            .to_string_with_piece(Some((game.piece(), (r, c))))
                    );
                }
                None => println!("All diamonds are already collected. No move needed."),
            }
            println!("Path length: {}", suggestion.path_len);
            println!("Nodes explored: {}", suggestion.stats.nodes_explored);
            println!("Max depth: {}", suggestion.stats.max_depth);
            println!("Time: {:.3}s", suggestion.elapsed.as_secs_f64());
        }
        Err(SearchError::NoSolutionFound { stats }) => {
            println!("No solution found.");
            println!("Nodes explored: {}", stats.nodes_explored);
            println!("Max depth: {}", stats.max_depth);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
