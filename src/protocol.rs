//! Line-oriented text protocol for driving a session.
//!
//! Modeled on GTP: each request is `[id] command [args...]` and each reply is
//! `=[id] message` on success or `?[id] message` on failure, followed by a
//! blank line. AI seats are advanced automatically after every command, so
//! a front end only ever sends the human seat's actions.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `new_game` - Start a new match with the same configuration
//! - `next_round` - Deal the next round once the current one is over
//! - `showboard` - Chain, ends, pile size, and whose turn it is
//! - `hand [seat]` - Tiles held by a seat (defaults to the first human seat)
//! - `legal` - Legal moves for the seat to act
//! - `play <tile> <left|right>` - Play a tile, e.g. `play 6-3 right`
//! - `open` - Place the required opening tile
//! - `draw`, `pass`
//! - `ai` - Run one AI turn for the seat to act
//! - `score` - Cumulative scores and the last round result
//! - `history` - Actions taken this round

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::{error, warn};

use crate::board::End;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{Action, GameSession, Phase};
use crate::tile::Tile;

const KNOWN_COMMANDS: &[&str] = &[
    "ai",
    "draw",
    "hand",
    "history",
    "known_command",
    "legal",
    "list_commands",
    "name",
    "new_game",
    "next_round",
    "open",
    "pass",
    "play",
    "quit",
    "score",
    "showboard",
    "version",
];

pub struct ProtocolEngine {
    config: GameConfig,
    session: GameSession,
}

impl ProtocolEngine {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let mut session = GameSession::new(config.clone())?;
        session.advance_ai()?;
        Ok(Self { config, session })
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Read commands from `input` until EOF or `quit`, replying on `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            let command = parts[0].to_lowercase();
            let args = &parts[1..];

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("writing reply")?;
            output.flush().context("flushing reply")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional numeric command ID off the front of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let round_live = self.round_live();
        let result = match command {
            "name" => Ok(env!("CARGO_PKG_NAME").to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => match args.first() {
                Some(cmd) => Ok(KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str()).to_string()),
                None => return (false, "missing argument".to_string()),
            },
            "quit" => Ok(String::new()),
            "showboard" => Ok(self.show_board()),
            "hand" => return self.show_hand(args),
            "legal" => Ok(self.show_legal()),
            "score" => Ok(self.show_score()),
            "history" => Ok(self.show_history()),
            "new_game" => GameSession::new(self.config.clone()).map(|s| {
                self.session = s;
                String::new()
            }),
            "next_round" => self.session.next_round().map(|_| String::new()),
            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(end) = End::parse(args[1]) else {
                    return (false, format!("invalid end '{}'", args[1]));
                };
                args[0]
                    .parse::<Tile>()
                    .and_then(|tile| self.session.play_tile(tile, end))
                    .map(|_| String::new())
            }
            "open" => self.session.play_opening().map(|_| String::new()),
            "draw" => self.session.draw_tile().map(|t| t.to_string()),
            "pass" => self.session.pass_turn().map(|_| String::new()),
            "ai" => {
                let seat = self.session.current_seat();
                self.session
                    .take_ai_turn()
                    .map(|actions| describe_actions(seat, &actions))
            }
            _ => return (false, format!("unknown command: {command}")),
        };

        match result {
            Ok(message) => match self.advance() {
                Ok(ai_log) => {
                    let mut lines: Vec<String> = [message, ai_log]
                        .into_iter()
                        .filter(|l| !l.is_empty())
                        .collect();
                    if round_live && !self.round_live() {
                        lines.push(self.round_summary());
                    }
                    (true, lines.join("\n"))
                }
                Err(e) => {
                    error!(command, error = %e, "ai turn failed after command");
                    let applied = if message.is_empty() {
                        format!("{command} applied")
                    } else {
                        format!("{command} applied: {message}")
                    };
                    (false, format!("{applied}\nai turn failed: {e}"))
                }
            },
            Err(e) if e.is_fatal() => {
                error!(command, error = %e, "session halted");
                (false, e.to_string())
            }
            Err(e) => {
                warn!(command, error = %e, "command rejected");
                (false, e.to_string())
            }
        }
    }

    fn round_live(&self) -> bool {
        matches!(self.session.phase(), Phase::AwaitingOpening | Phase::Playing)
    }

    fn round_summary(&self) -> String {
        match self.session.round_result() {
            Some(r) => format!(
                "round {} over: seat {} wins by {:?} (+{})",
                r.round, r.winner, r.end, r.points_awarded
            ),
            None => format!("round {} halted", self.session.round()),
        }
    }

    /// Let AI seats act until a human must move, describing what they did.
    fn advance(&mut self) -> Result<String, GameError> {
        let mut lines = Vec::new();
        while self.round_live()
            && self
                .session
                .seat_kind(self.session.current_seat())
                .is_some_and(|k| !k.is_human())
        {
            let seat = self.session.current_seat();
            let actions = self.session.take_ai_turn()?;
            lines.push(describe_actions(seat, &actions));
        }
        Ok(lines.join("\n"))
    }

    fn show_board(&self) -> String {
        let s = &self.session;
        let ends = s
            .ends()
            .map_or_else(|| "-".to_string(), |e| format!("{} {}", e.left, e.right));
        let mut out = format!(
            "round {} {:?}\nboard: {}\nends: {ends}\npile: {}\nturn: seat {}",
            s.round(),
            s.phase(),
            s.board(),
            s.pile_len(),
            s.current_seat()
        );
        if let Some(tile) = s.opening_tile() {
            out.push_str(&format!("\nopening: {tile}"));
        }
        out
    }

    fn show_hand(&self, args: &[&str]) -> (bool, String) {
        let seat = match args.first() {
            Some(arg) => match arg.parse::<usize>() {
                Ok(seat) if seat < self.session.seat_count() => seat,
                _ => return (false, format!("invalid seat '{arg}'")),
            },
            None => self
                .config
                .seats
                .iter()
                .position(|k| k.is_human())
                .unwrap_or(0),
        };
        (true, format_tiles(self.session.hand(seat)))
    }

    fn show_legal(&self) -> String {
        let seat = self.session.current_seat();
        if let Some(tile) = self.session.opening_tile() {
            return format!("{tile} open");
        }
        self.session
            .legal_moves_for(seat)
            .iter()
            .map(|m| format!("{} {}", m.tile, m.end))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn show_score(&self) -> String {
        let mut out = format!("scores: {:?}", self.session.scores());
        if let Some(r) = self.session.round_result() {
            out.push_str(&format!(
                "\nround {}: seat {} by {:?}, remaining {:?}, {} actions in {:.1}s",
                r.round,
                r.winner,
                r.end,
                r.remaining_pips,
                r.move_count,
                r.duration.as_secs_f64()
            ));
        }
        out
    }

    fn show_history(&self) -> String {
        self.session
            .history()
            .iter()
            .map(|r| describe_actions(r.seat, &[r.action]))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn describe_actions(seat: usize, actions: &[Action]) -> String {
    let parts: Vec<String> = actions
        .iter()
        .map(|a| match a {
            Action::Open(t) => format!("opens {t}"),
            Action::Play(m) => format!("plays {} {}", m.tile, m.end),
            Action::Draw(_) => "draws".to_string(),
            Action::Pass => "passes".to_string(),
        })
        .collect();
    format!("seat {seat} {}", parts.join(", "))
}

fn format_tiles(tiles: &[Tile]) -> String {
    tiles.iter().map(Tile::to_string).collect::<Vec<_>>().join(" ")
}
