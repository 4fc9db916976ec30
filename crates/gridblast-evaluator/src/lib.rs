//! Heuristic move selection for gridblast.
//!
//! This crate scores placements and plays games with a linear heuristic:
//!
//! 1. **Placement Evaluation** ([`placement_evaluator`]) - Scores a single placement as the
//!    weighted sum of board features ([`board_feature`]) computed after the simulated turn.
//!
//! 2. **Move Selection** ([`heuristic_agent`]) - Enumerates every legal (slot, origin) of the
//!    current hand, scores each one and plays the best, breaking ties by enumeration order.
//!
//! 3. **Weights** ([`weights`], [`weight_store`]) - The coefficient vector over the fixed
//!    feature vocabulary and its JSON persistence.
//!
//! # Architecture
//!
//! ```text
//! HeuristicAgent (select best placement, play games)
//!     ↓ uses
//! PlacementEvaluator (score single placement)
//!     ↓ uses
//! BoardFeature × WeightVector
//! ```
//!
//! # Supporting Modules
//!
//! - [`board_analysis`] - Lazily computed board metrics (heights, holes, clusters)
//! - [`placement_analysis`] - One simulated turn: lines cleared, points gained and the
//!   resulting board
//!
//! # Example
//!
//! ```
//! use gridblast_engine::{GameRules, GameSession, PieceSeed};
//! use gridblast_evaluator::{heuristic_agent::HeuristicAgent, weights::WeightVector};
//!
//! let session = GameSession::new(&GameRules::default(), PieceSeed::from_u64(42));
//! let agent = HeuristicAgent::from_weights(WeightVector::default());
//!
//! let (placement, analysis) = agent.choose_move(&session).unwrap();
//! assert!(session.board().can_place(placement.piece(), placement.origin()));
//! println!("slot {} at {} gains {}", placement.slot(), placement.origin(), analysis.score_gain());
//! ```

pub mod board_analysis;
pub mod board_feature;
pub mod heuristic_agent;
pub mod placement_analysis;
pub mod placement_evaluator;
pub mod weight_store;
pub mod weights;
