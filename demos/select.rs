use gomoku_policy::{
    Backend, BoardEncoder, DeepLearningAgent, GameState, OnnxModel, install_backend,
};
use flexi_logger::Logger;

const BOARD_SIZE: usize = 9;
const NUM_MOVES: usize = 10;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let Some(source) = std::env::args().nth(1) else {
        eprintln!("usage: select <model.onnx | http(s) url>");
        std::process::exit(2);
    };

    // 1. Pick the pure-Rust backend before any session is built
    match install_backend(Backend::Tract) {
        Some(backend) => println!("Using {:?} backend.", backend),
        None => println!("Using a backend installed elsewhere."),
    }

    // 2. Load the model
    println!("Loading model from '{}'...", source);
    let model = if source.starts_with("http://") || source.starts_with("https://") {
        OnnxModel::from_url(&source)?
    } else {
        OnnxModel::from_file(&source)?
    };
    let encoder = BoardEncoder::by_name("oneplane", (BOARD_SIZE, BOARD_SIZE))?;
    let mut agent = DeepLearningAgent::new(model, encoder);

    // 3. Let the agent play against itself for a few moves
    let mut state = GameState::new_game(BOARD_SIZE, BOARD_SIZE);
    for turn in 1..=NUM_MOVES {
        if state.is_over() {
            break;
        }
        let mv = agent.select_move(&state)?;
        println!("{:>2}. {:?} plays {:?}", turn, state.next_player, mv);
        state = state.apply_move(mv)?;
    }

    if let Some(winner) = state.winner() {
        println!("Winner: {:?}", winner);
    }

    Ok(())
}
