//! Game sessions: one player against one mine field.

use crate::players::{Certainty, Player, PlayerKind};
use crate::SweeperConfig;
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strictly_minesweeper::{
    Cell, Game, GameTransition, InProgress, KnowledgeError, Minefield, MinefieldError, RevealError,
};
use strum::{EnumIter, IntoEnumIterator};
use tracing::{debug, info, instrument, warn};

/// How a game ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter, Serialize, Deserialize,
)]
pub enum Outcome {
    /// Every safe cell was revealed.
    Won,
    /// A mine was revealed.
    Lost,
    /// The player had no move left.
    Stalled,
}

/// Errors that end a session early.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// The player's reasoning broke down.
    #[display("Player knowledge failed: {}", _0)]
    Knowledge(KnowledgeError),

    /// The player asked for an illegal reveal.
    #[display("Illegal reveal: {}", _0)]
    Reveal(RevealError),

    /// The board could not be built.
    #[display("Bad board: {}", _0)]
    Minefield(MinefieldError),
}

/// Summary of one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameReport {
    /// Name of the player.
    player: String,
    /// How the game ended.
    outcome: Outcome,
    /// Cells revealed, including a detonated mine.
    moves: usize,
    /// Reveals the player had proven safe.
    safe_moves: usize,
    /// Reveals made without proof.
    guesses: usize,
    /// Cells the player flagged as mines.
    flagged: usize,
    /// Flags that are actual mines.
    correct_flags: usize,
    /// Final board as the player saw it.
    board: String,
}

impl std::fmt::Display for GameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(
            f,
            "{}: {} after {} moves ({} safe, {} guesses), {}/{} flags correct",
            self.player,
            self.outcome,
            self.moves,
            self.safe_moves,
            self.guesses,
            self.correct_flags,
            self.flagged
        )
    }
}

/// Drives one player through one game.
pub struct GameSession {
    player: Box<dyn Player>,
    game: Game<InProgress>,
}

impl GameSession {
    /// Creates a session.
    pub fn new(player: Box<dyn Player>, game: Game<InProgress>) -> Self {
        Self { player, game }
    }

    /// Plays until the game ends or the player runs out of moves.
    #[instrument(skip(self), fields(player = %self.player.name()))]
    pub fn run(self) -> Result<GameReport, SessionError> {
        let Self { mut player, mut game } = self;
        let mut safe_moves = 0;
        let mut guesses = 0;

        loop {
            let Some(action) = player.next_move(&game) else {
                info!(moves = game.history().len(), "Player has no move left");
                let board = game.render(&player.flags());
                return Ok(build_report(
                    player.as_ref(),
                    Outcome::Stalled,
                    game.minefield(),
                    game.history().len(),
                    (safe_moves, guesses),
                    board,
                ));
            };

            match action.certainty {
                Certainty::Safe => safe_moves += 1,
                Certainty::Guess => guesses += 1,
            }
            debug!(cell = %action.cell, certainty = %action.certainty, "Revealing");

            game = match game.reveal(action.cell)? {
                GameTransition::InProgress { game, count } => {
                    player.observe(action.cell, count)?;
                    game
                }
                GameTransition::Won(won) => {
                    player.observe(action.cell, won.minefield().nearby_mines(action.cell))?;
                    info!(moves = won.history().len(), "Game won");
                    let board = won.render(&player.flags());
                    return Ok(build_report(
                        player.as_ref(),
                        Outcome::Won,
                        won.minefield(),
                        won.history().len(),
                        (safe_moves, guesses),
                        board,
                    ));
                }
                GameTransition::Lost(lost) => {
                    if action.certainty == Certainty::Safe {
                        warn!(cell = %lost.detonated(), "Proven safe cell held a mine");
                    }
                    info!(cell = %lost.detonated(), moves = lost.history().len(), "Game lost");
                    let board = lost.render_detonation(&player.flags());
                    return Ok(build_report(
                        player.as_ref(),
                        Outcome::Lost,
                        lost.minefield(),
                        lost.history().len(),
                        (safe_moves, guesses),
                        board,
                    ));
                }
            };
        }
    }
}

fn build_report(
    player: &dyn Player,
    outcome: Outcome,
    minefield: &Minefield,
    moves: usize,
    (safe_moves, guesses): (usize, usize),
    board: String,
) -> GameReport {
    let flags: BTreeSet<Cell> = player.flags();
    GameReport {
        player: player.name().to_string(),
        outcome,
        moves,
        safe_moves,
        guesses,
        flagged: flags.len(),
        correct_flags: flags.intersection(minefield.mines()).count(),
        board,
    }
}

/// Outcome counts over a series of games.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Player that played the series.
    player: PlayerKind,
    /// Seed of the first game.
    seed: u64,
    /// Games played.
    games: usize,
    /// Games won.
    won: usize,
    /// Games lost.
    lost: usize,
    /// Games the player gave up on.
    stalled: usize,
    /// Reveals the player had proven safe, over all games.
    safe_moves: usize,
    /// Reveals made without proof, over all games.
    guesses: usize,
}

impl SeriesSummary {
    /// Fraction of games won.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.won as f64 / self.games as f64
        }
    }

    /// Number of games that ended with `outcome`.
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Won => self.won,
            Outcome::Lost => self.lost,
            Outcome::Stalled => self.stalled,
        }
    }
}

impl std::fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} player, {} games from seed {}", self.player, self.games, self.seed)?;
        for outcome in Outcome::iter() {
            writeln!(f, "  {:<8} {}", outcome, self.count(outcome))?;
        }
        writeln!(
            f,
            "  win rate {:.1}%, {} safe moves, {} guesses",
            self.win_rate() * 100.0,
            self.safe_moves,
            self.guesses
        )
    }
}

/// Builds the board and player for the game with `seed` and plays it.
#[instrument(skip(config))]
pub fn play_one(
    config: &SweeperConfig,
    kind: PlayerKind,
    seed: u64,
) -> Result<GameReport, SessionError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let minefield = Minefield::random(*config.height(), *config.width(), *config.mines(), &mut rng)?;
    debug!(board = %minefield, "Mine field placed");
    GameSession::new(kind.build(config, seed), Game::new(minefield)).run()
}

/// Plays `config.games` games, seeding game `i` with `seed + i`.
#[instrument(skip(config), fields(games = *config.games()))]
pub fn run_series(config: &SweeperConfig, kind: PlayerKind) -> anyhow::Result<SeriesSummary> {
    config.validate()?;
    let seed = config.seed().unwrap_or_else(rand::random);

    let mut summary = SeriesSummary {
        player: kind,
        seed,
        games: 0,
        won: 0,
        lost: 0,
        stalled: 0,
        safe_moves: 0,
        guesses: 0,
    };
    for game in 0..*config.games() {
        let game_seed = seed.wrapping_add(game as u64);
        let report = play_one(config, kind, game_seed)?;
        debug!(game, outcome = %report.outcome, "Series game finished");

        summary.games += 1;
        summary.safe_moves += report.safe_moves;
        summary.guesses += report.guesses;
        match report.outcome {
            Outcome::Won => summary.won += 1,
            Outcome::Lost => summary.lost += 1,
            Outcome::Stalled => summary.stalled += 1,
        }
    }

    info!(
        won = summary.won,
        lost = summary.lost,
        stalled = summary.stalled,
        "Series finished"
    );
    Ok(summary)
}
