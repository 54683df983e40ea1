mod app;
mod input;
mod net;
mod render;

use std::time::Duration;

use clap::Parser;
use coil::{Identity, OpponentMode, SessionConfig, SessionController};

use net::{ClientConfig, DEFAULT_SERVER_URL, WsConnector};

#[derive(Parser)]
#[command(name = "coil")]
#[command(about = "Snake client: play locally, then join an online room")]
struct Args {
    #[arg(
        short,
        long,
        default_value = DEFAULT_SERVER_URL,
        help = "WebSocket endpoint of the game server"
    )]
    server: String,

    #[arg(short, long, default_value = "player", help = "Name shown to other players")]
    name: String,

    #[arg(short, long, default_value_t = 1, help = "Room number to join")]
    room: u32,

    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=3),
        help = "Opponent mode: 1 DQN, 2 NEAT, 3 BFS"
    )]
    mode: u8,

    #[arg(long, default_value_t = 100, help = "Milliseconds between local simulation steps")]
    tick_ms: u64,

    #[arg(long, help = "Seed for the local simulation")]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let identity = Identity {
        name: args.name,
        room: args.room,
        mode: OpponentMode::from_selection(args.mode),
    };
    let config = ClientConfig {
        server_url: args.server,
        tick_interval: Duration::from_millis(args.tick_ms.max(10)),
        ..ClientConfig::default()
    };

    let connector = WsConnector::new(&config.server_url)?;
    let session_config = SessionConfig::default();
    let controller = match args.seed {
        Some(seed) => SessionController::with_seed(connector, identity, session_config, seed),
        None => SessionController::new(connector, identity, session_config),
    };

    log::info!("Starting client against {}", config.server_url);
    app::run(controller, config)?;

    Ok(())
}
