use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::config::BoardConfig;
use crate::coords::Square;
use crate::render::TextRenderer;
use crate::selection::{BoardController, ClickOutcome};

const HELP: &str = "\
commands:
  click X Y          click at pixel (X, Y)
  <square>           click a square, e.g. e2
  move FROM TO       click FROM then TO
  load <placement>   replace the position from a placement string
  fen [<fen>]        print the FEN, or load one
  placement          print the placement string
  show               print the board
  reset              back to the starting position
  quit
";

/// Line-oriented front end driving a [`BoardController`] with a text renderer.
pub struct Shell {
    controller: BoardController<TextRenderer>,
}

impl Shell {
    pub fn new(config: BoardConfig) -> Result<Self> {
        let controller = BoardController::new(config, TextRenderer::new())?;
        Ok(Self { controller })
    }

    pub fn controller(&self) -> &BoardController<TextRenderer> {
        &self.controller
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        print!("{}", self.controller.renderer().render());
        stdout.flush()?;

        while reader.read_line(&mut line)? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }
            match self.handle_command(command) {
                Ok(response) => print!("{}", response),
                Err(err) => println!("error: {err}"),
            }
            stdout.flush()?;
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        if parts.is_empty() {
            return Ok("".to_string());
        }

        match parts[0] {
            "help" => Ok(HELP.to_string()),
            "show" => Ok(self.controller.renderer().render()),
            "placement" => Ok(format!("{}\n", self.controller.board().placement_string())),
            "fen" if parts.len() == 1 => Ok(format!("{}\n", self.controller.board().to_fen())),
            "fen" => {
                self.controller.load_fen(&parts[1..].join(" "))?;
                Ok(self.controller.renderer().render())
            }
            "load" => {
                let placement = parts
                    .get(1)
                    .ok_or_else(|| anyhow!("load needs a placement string"))?;
                self.controller.load_placement(placement)?;
                Ok(self.controller.renderer().render())
            }
            "reset" => {
                self.controller.reset();
                Ok(self.controller.renderer().render())
            }
            "click" => {
                let [x, y] = parts[1..] else {
                    bail!("usage: click X Y");
                };
                let outcome = self.controller.click(x.parse()?, y.parse()?);
                Ok(self.describe(outcome))
            }
            "move" => {
                let [from, to] = parts[1..] else {
                    bail!("usage: move FROM TO");
                };
                let (from, to) = (from.parse::<Square>()?, to.parse::<Square>()?);
                self.controller.click_square(from);
                let outcome = self.controller.click_square(to);
                Ok(self.describe(outcome))
            }
            square => {
                let square: Square = square
                    .parse()
                    .map_err(|_| anyhow!("unknown command '{square}', try help"))?;
                let outcome = self.controller.click_square(square);
                Ok(self.describe(outcome))
            }
        }
    }

    /// Plays `count` random legal moves through the click protocol. Stops early
    /// when the side to move has no moves left.
    pub fn play_random<G: Rng>(&mut self, count: usize, rng: &mut G) -> Result<String> {
        if !self.controller.is_active() {
            bail!("random play needs an active board");
        }
        let mut played = Vec::with_capacity(count);
        for _ in 0..count {
            let board = self.controller.board();
            let moves = self.controller.executor().move_generator().generate_moves(board);
            let Some(mv) = moves.choose(rng).copied() else {
                info!(plies = played.len(), "no legal moves left");
                break;
            };
            self.controller.click_square(mv.from);
            match self.controller.click_square(mv.to) {
                ClickOutcome::Moved { .. } => played.push(format!("{}{}", mv.from, mv.to)),
                other => bail!("generated move {}{} was not played: {:?}", mv.from, mv.to, other),
            }
        }
        Ok(format!(
            "{}\n{}{}\n",
            played.join(" "),
            self.controller.renderer().render(),
            self.controller.board().to_fen()
        ))
    }

    fn describe(&self, outcome: ClickOutcome) -> String {
        let summary = match outcome {
            ClickOutcome::Ignored => return "ignored\n".to_string(),
            ClickOutcome::Selected(square) => format!("selected {square}"),
            ClickOutcome::Cleared => "cleared".to_string(),
            ClickOutcome::Moved { mv, .. } => format!("moved {}{}", mv.from, mv.to),
        };
        format!("{summary}\n{}", self.controller.renderer().render())
    }
}
