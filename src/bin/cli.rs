//! ScoreLink CLI
//!
//! Command-line front end for the codec and a scripted exchange client.

use std::time::Duration;

use clap::{Parser, Subcommand};
use scorelink::codec::{calcsize, Format, Kind, Value};
use scorelink::network::{ExchangeClient, ExchangeEvent};
use scorelink::{Config, LinkError, PlayerState, Result, ScoreBoard};
use tracing_subscriber::{fmt, EnvFilter};

/// ScoreLink CLI
#[derive(Parser, Debug)]
#[command(name = "scorelink-cli")]
#[command(about = "Pack/unpack binary structs and talk to a ScoreLink relay")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the packed size of a format
    Calcsize {
        /// Format string, e.g. "<?h?hh"
        format: String,
    },

    /// Pack values and print the bytes as hex
    Pack {
        /// Format string
        format: String,

        /// One value per type directive (integers or true/false)
        #[arg(allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Unpack hex bytes and print one value per line
    Unpack {
        /// Format string
        format: String,

        /// Input bytes as hex (whitespace allowed)
        hex: String,

        /// Requested output kinds, comma separated (defaults to the directive kinds)
        #[arg(short, long, value_delimiter = ',')]
        kinds: Vec<String>,
    },

    /// Join a relay and exchange a fixed number of rounds
    Play {
        /// Relay address
        #[arg(short, long, default_value = "127.0.0.1:7777")]
        server: String,

        /// Rounds to play before disconnecting
        #[arg(short, long, default_value = "10")]
        rounds: usize,

        /// Starting lane position
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        position: i16,

        /// Milliseconds between exchanges
        #[arg(long, default_value = "100")]
        interval_ms: u64,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Calcsize { format } => {
            println!("{}", calcsize(&format)?);
        }
        Commands::Pack { format, values } => {
            let values = values
                .iter()
                .map(|v| v.parse::<Value>())
                .collect::<Result<Vec<_>>>()?;
            let bytes = Format::parse(&format)?.pack(&values)?;
            println!("{}", to_hex(&bytes));
        }
        Commands::Unpack { format, hex, kinds } => {
            let format = Format::parse(&format)?;
            let kinds = if kinds.is_empty() {
                format.kinds()
            } else {
                kinds
                    .iter()
                    .map(|k| k.parse::<Kind>())
                    .collect::<Result<Vec<_>>>()?
            };
            let bytes = parse_hex(&hex)?;
            for value in format.unpack(&bytes, &kinds)? {
                println!("{}", value);
            }
        }
        Commands::Play {
            server,
            rounds,
            position,
            interval_ms,
        } => play(&server, rounds, position, interval_ms)?,
    }
    Ok(())
}

fn play(server: &str, rounds: usize, position: i16, interval_ms: u64) -> Result<()> {
    let config = Config::builder()
        .relay_addr(server)
        .exchange_interval_ms(interval_ms)
        .build();

    let board = ScoreBoard::new();
    board.set_local(PlayerState::new(true, position, 0));

    let handle = ExchangeClient::connect(&config, board.clone())?.spawn()?;
    let timeout = Duration::from_millis(interval_ms.max(1) * 50);

    println!("waiting for a partner at {}", server);

    let mut seated = false;
    let mut played = 0;
    while played < rounds {
        // Pairing may take any amount of time; rounds may not
        let event = if seated {
            handle.events().recv_timeout(timeout).ok()
        } else {
            handle.events().recv().ok()
        };
        match event {
            Some(ExchangeEvent::Seated(slot)) => {
                seated = true;
                println!("paired, playing as player {}", slot.number());
            }
            Some(ExchangeEvent::Received(snapshot)) => {
                played += 1;
                board.update_local(|s| s.score = s.score.saturating_add(1));
                println!(
                    "round {:>3}: opponent active={} position={} score={}",
                    snapshot.sequence,
                    snapshot.opponent.active,
                    snapshot.opponent.position,
                    snapshot.opponent.score
                );
            }
            Some(ExchangeEvent::Closed) => {
                println!("relay closed the connection");
                break;
            }
            Some(ExchangeEvent::Failed(reason)) => {
                handle.stop();
                handle.join()?;
                return Err(LinkError::Network(reason));
            }
            None => {
                println!("no reply within {:?}, giving up", timeout);
                break;
            }
        }
    }

    handle.stop();
    handle.join()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(LinkError::Protocol(format!(
            "hex input has odd length {}",
            digits.len()
        )));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let s: String = pair.iter().collect();
            u8::from_str_radix(&s, 16)
                .map_err(|_| LinkError::Protocol(format!("invalid hex byte {:?}", s)))
        })
        .collect()
}
