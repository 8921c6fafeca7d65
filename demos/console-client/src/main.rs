use anyhow::Context;
use clap::Parser;
use questlink::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser)]
#[command(name = "console-client")]
#[command(about = "Play a Questlink game from the terminal")]
struct Args {
    /// Game server WebSocket endpoint
    #[arg(long, default_value = "ws://127.0.0.1:5000/ws")]
    url: String,

    /// Game to connect to
    #[arg(long)]
    game: String,

    /// User id to act as
    #[arg(long)]
    user: Option<String>,
}

// ---------------------------------------------------------------------------
// Local commands
// ---------------------------------------------------------------------------

/// Lines starting with `:` drive the client; everything else goes to the game.
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Play(&'a str),
    Ready,
    Start,
    Leave,
    Difficulty(&'a str),
    Switch(&'a str),
    Quit,
    Help,
}

fn parse_line(line: &str) -> Line<'_> {
    let Some(rest) = line.trim().strip_prefix(':') else {
        return Line::Play(line);
    };
    let (cmd, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(c, a)| (c, a.trim()));
    match cmd {
        "ready" => Line::Ready,
        "start" => Line::Start,
        "leave" => Line::Leave,
        "difficulty" => Line::Difficulty(arg),
        "game" if !arg.is_empty() => Line::Switch(arg),
        "quit" | "q" => Line::Quit,
        _ => Line::Help,
    }
}

const HELP: &str = "\
:ready               mark yourself ready
:start               start the game
:leave               leave the room
:difficulty <level>  easy | normal | hard
:game <id>           switch to another game
:quit                exit
anything else is sent as an action (/cmd args for commands)";

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_event(event: RenderEvent) {
    match event {
        RenderEvent::State(update) => {
            let label = match update.kind {
                UpdateKind::Snapshot => "state",
                UpdateKind::Incremental => "update",
            };
            let body = serde_json::to_string_pretty(&update.payload)
                .unwrap_or_else(|_| update.payload.to_string());
            println!("[{label}] {body}");
        }
        RenderEvent::Notice(Notice::Roster(change)) => match change {
            RosterChange::Full(players) => {
                let names: Vec<_> =
                    players.iter().map(|p| p.username.as_str()).collect();
                println!("[players] {}", names.join(", "));
            }
            RosterChange::Joined(p) => println!("[players] {} joined", p.username),
            RosterChange::Left(user_id) => {
                println!("[players] {} left", user_id.as_str());
            }
            RosterChange::Ready { user_id, is_ready } => {
                println!("[players] {} ready={is_ready}", user_id.as_str());
            }
        },
        RenderEvent::Notice(Notice::GameStarted(game_id)) => {
            println!("[game] {} started", game_id.as_str());
        }
        RenderEvent::Notice(Notice::GameConcluded { message }) => {
            println!("[game] concluded: {}", message.as_deref().unwrap_or("-"));
        }
        RenderEvent::Notice(Notice::CommandResponse(payload)) => {
            println!("[command] {payload}");
        }
        RenderEvent::Notice(Notice::ServerError(message)) => {
            println!("[error] {message}");
        }
    }
}

/// Switching to another game clears every callback; reconnecting to the
/// same one keeps them.
fn switch_clears_callbacks(
    current: &str,
    next: &str,
    result: &Result<Outcome, QuestlinkError>,
) -> bool {
    current != next && matches!(result, Ok(Outcome::Applied) | Err(QuestlinkError::Session(_)))
}

fn register_callbacks(client: &GameClient) -> Result<(), QuestlinkError> {
    client.on_connect(|| println!("(connected)"))?;
    client.on_disconnect(|| println!("(disconnected, :game <id> to reconnect)"))
}

fn report(op: &str, result: Result<Outcome, QuestlinkError>) {
    match result {
        Ok(Outcome::Applied) => {}
        Ok(Outcome::Skipped(reason)) => println!("({op} skipped: {reason})"),
        Err(e) => println!("({op} failed: {e})"),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    info!(url = %args.url, game = %args.game, user = ?args.user, "starting console client");

    let (renderer, mut updates) = ChannelRenderer::new();
    let mut builder = GameClient::builder().url(args.url);
    if let Some(user) = args.user {
        builder = builder.user_id(user);
    }
    let client = builder.build(renderer).context("failed to start client")?;

    register_callbacks(&client)?;

    tokio::spawn(async move {
        while let Some(event) = updates.recv().await {
            print_event(event);
        }
    });

    client
        .connect(args.game.as_str())
        .await
        .context("failed to connect")?;
    let mut current_game = args.game;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Line::Play(text) => report("action", client.perform_action(text).await),
            Line::Ready => report("ready", client.set_ready().await),
            Line::Start => report("start", client.start_game().await),
            Line::Leave => report("leave", client.leave_room().await),
            Line::Difficulty(level) => match level.parse::<Difficulty>() {
                Ok(difficulty) => {
                    report("difficulty", client.set_difficulty(difficulty).await);
                }
                Err(e) => println!("({e})"),
            },
            Line::Switch(game) => {
                let result = client.connect(game).await;
                if switch_clears_callbacks(&current_game, game, &result) {
                    register_callbacks(&client)?;
                    current_game = game.to_owned();
                }
                report("connect", result);
            }
            Line::Quit => break,
            Line::Help => println!("{HELP}"),
        }
    }

    client.shutdown().await?;
    Ok(())
}
