//! Headless probe client: connects to a running server, prints every
//! broadcast and, whenever it holds the turn, plays the first open edge
//! it finds. Two probes against one server play a full game.

use clap::Parser;
use shared::codec::{read_packet, write_packet};
use shared::{GameSnapshot, Packet, PlayerId, Side};
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5001")]
    server: String,
}

/// First edge on the board that is not drawn yet.
fn first_open_edge(snapshot: &GameSnapshot) -> Option<(usize, usize, Side)> {
    for line in &snapshot.board.cells {
        for cell in line {
            for side in Side::ALL {
                if !cell.wall(side) {
                    return Some((cell.row, cell.col, side));
                }
            }
        }
    }
    None
}

async fn play_if_current(
    stream: &mut TcpStream,
    snapshot: &GameSnapshot,
    me: PlayerId,
) -> Result<(), Box<dyn std::error::Error>> {
    if snapshot.is_game_over || snapshot.current_player != Some(me) {
        return Ok(());
    }
    if let Some((row, col, side)) = first_open_edge(snapshot) {
        println!("My turn: drawing {:?} wall of ({}, {})", side, row, col);
        write_packet(stream, &Packet::SubmitMove { row, col, side }).await?;
    }
    Ok(())
}

fn print_scores(snapshot: &GameSnapshot) {
    for player in &snapshot.players {
        println!(
            "  Player {} ({}): {} points",
            player.id, player.color, player.score
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Connecting to {}", args.server);
    let mut stream = TcpStream::connect(&args.server).await?;

    let mut me: Option<PlayerId> = None;

    loop {
        let Some(packet) = read_packet(&mut stream).await? else {
            println!("Server closed the connection");
            return Ok(());
        };

        match packet {
            Packet::Connected { player_id, color } => {
                println!("Admitted as player {} with color {}", player_id, color);
                me = Some(player_id);
            }
            Packet::InitialState { snapshot } | Packet::StateUpdated { snapshot } => {
                println!(
                    "State: {} player(s), current: {:?}",
                    snapshot.players.len(),
                    snapshot.current_player
                );
                print_scores(&snapshot);
                if let Some(me) = me {
                    play_if_current(&mut stream, &snapshot, me).await?;
                }
            }
            Packet::GameEnded { snapshot } => {
                println!("Game over! Outcome: {:?}", snapshot.winner);
                print_scores(&snapshot);
                return Ok(());
            }
            Packet::RoomFull { message } => {
                println!("Refused: {}", message);
                return Ok(());
            }
            Packet::PeerLeft { player_id } => {
                println!("Player {} left the game", player_id);
            }
            other => {
                println!("Unexpected packet: {:?}", other);
            }
        }
    }
}
