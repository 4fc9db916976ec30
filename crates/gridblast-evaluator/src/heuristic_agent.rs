//! Move selection: choosing the best placement for the current turn.
//!
//! The [`HeuristicAgent`] is a greedy one-step player. For every piece in the
//! hand and every origin where it fits, it simulates the turn with
//! [`PlacementAnalysis`], scores the result with its [`PlacementEvaluator`] and
//! plays the highest-scoring placement.
//!
//! Candidates are visited in the session's stable order (slot, then row, then
//! column). The first candidate seeds the best score and later ones replace it
//! only when strictly better, so ties go to the earliest placement and the
//! choice is fully deterministic.
//!
//! # Usage
//!
//! ```
//! use gridblast_engine::{GameRules, GameSession, PieceSeed};
//! use gridblast_evaluator::{heuristic_agent::HeuristicAgent, weights::WeightVector};
//!
//! let mut session = GameSession::new(&GameRules::default(), PieceSeed::from_u64(3));
//! let agent = HeuristicAgent::from_weights(WeightVector::default());
//!
//! let game = agent.play_session(&mut session, 50, |_, _, _| {}).unwrap();
//! assert_eq!(game.score(), session.stats().score());
//! assert!(game.moves() <= 50);
//! ```

use gridblast_engine::{GameSession, Placement, TurnError, TurnOutcome};

use crate::{
    placement_analysis::PlacementAnalysis,
    placement_evaluator::{FeatureBasedPlacementEvaluator, PlacementEvaluator},
    weights::WeightVector,
};

/// Why a simulated game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameEnd {
    GameOver,
    TurnLimit,
}

/// Summary of a game played by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedGame {
    score: u64,
    moves: usize,
    end: GameEnd,
}

impl PlayedGame {
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn moves(&self) -> usize {
        self.moves
    }

    #[must_use]
    pub fn end(&self) -> GameEnd {
        self.end
    }
}

#[derive(Debug)]
pub struct HeuristicAgent<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> HeuristicAgent<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Agent scoring placements with a [`FeatureBasedPlacementEvaluator`].
    #[must_use]
    pub fn from_weights(weights: WeightVector) -> Self {
        Self::new(Box::new(FeatureBasedPlacementEvaluator::new(weights)))
    }

    /// Selects the best placement for the current state of `session`.
    ///
    /// Returns `None` only when no piece in the hand fits anywhere, which is
    /// also the case once the session is over.
    #[must_use]
    pub fn choose_move(&self, session: &GameSession) -> Option<(Placement, PlacementAnalysis)> {
        if session.is_game_over() {
            return None;
        }

        let mut best: Option<(f32, Placement, PlacementAnalysis)> = None;
        for placement in session.legal_placements() {
            let Some(analysis) = PlacementAnalysis::from_session(session, placement) else {
                continue;
            };
            let score = self.placement_evaluator.evaluate_placement(&analysis);
            let better = match &best {
                None => true,
                Some((best_score, ..)) => score > *best_score,
            };
            if better {
                best = Some((score, placement, analysis));
            }
        }

        best.map(|(_, placement, analysis)| (placement, analysis))
    }

    /// Plays `session` until game over or until `turn_limit` placements have
    /// been made in this call.
    ///
    /// `on_turn` is called after every accepted placement with the updated
    /// session.
    pub fn play_session<F>(
        &self,
        session: &mut GameSession,
        turn_limit: usize,
        mut on_turn: F,
    ) -> Result<PlayedGame, TurnError>
    where
        F: FnMut(&GameSession, &Placement, &TurnOutcome),
    {
        let mut end = GameEnd::TurnLimit;
        for _ in 0..turn_limit {
            let Some((placement, _analysis)) = self.choose_move(session) else {
                end = GameEnd::GameOver;
                break;
            };
            let outcome = session.place(placement.slot(), placement.origin())?;
            on_turn(session, &placement, &outcome);
        }
        if session.is_game_over() {
            end = GameEnd::GameOver;
        }

        Ok(PlayedGame {
            score: session.stats().score(),
            moves: session.stats().moves(),
            end,
        })
    }
}
