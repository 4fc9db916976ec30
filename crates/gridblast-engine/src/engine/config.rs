use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{
        board::BoardSize,
        piece::{PieceCatalog, Position},
    },
};

use super::{game_stats::ScoringRules, hand::MAX_HAND_SLOTS, piece_dealer::DealPolicy};

/// Game parameters as supplied from a configuration file or the command line.
///
/// Nothing here is trusted until [`GameConfig::validate`] turns it into
/// [`GameRules`]. Missing fields take the values of the standard game.
///
/// ```
/// use gridblast_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "width": 10, "hand_slots": 4 }"#).unwrap();
/// let rules = config.validate().unwrap();
/// assert_eq!((rules.size().width(), rules.size().height()), (10, 8));
/// assert_eq!(rules.hand_slots(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub hand_slots: usize,
    pub deal_policy: DealPolicy,
    pub scoring: ScoringRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BoardSize::STANDARD.width(),
            height: BoardSize::STANDARD.height(),
            hand_slots: 3,
            deal_policy: DealPolicy::default(),
            scoring: ScoringRules::default(),
        }
    }
}

impl GameConfig {
    /// Checks every value and builds the rules a session runs with.
    ///
    /// Out-of-range values are reported, never clamped.
    pub fn validate(&self) -> Result<GameRules, ConfigError> {
        let size = BoardSize::new(self.width, self.height)?;
        if !(1..=MAX_HAND_SLOTS).contains(&self.hand_slots) {
            return Err(ConfigError::new(
                "hand_slots",
                format!(
                    "must be between 1 and {MAX_HAND_SLOTS}, got {}",
                    self.hand_slots
                ),
            ));
        }
        GameRules {
            size,
            hand_slots: self.hand_slots,
            deal_policy: self.deal_policy,
            scoring: self.scoring,
            catalog: PieceCatalog::standard(),
        }
        .checked()
    }
}

/// Validated, immutable game parameters shared by sessions.
#[derive(Debug, Clone)]
pub struct GameRules {
    size: BoardSize,
    hand_slots: usize,
    deal_policy: DealPolicy,
    scoring: ScoringRules,
    catalog: Arc<PieceCatalog>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            size: BoardSize::STANDARD,
            hand_slots: 3,
            deal_policy: DealPolicy::default(),
            scoring: ScoringRules::default(),
            catalog: PieceCatalog::standard(),
        }
    }
}

impl GameRules {
    /// Replaces the piece catalog.
    pub fn with_catalog(mut self, catalog: Arc<PieceCatalog>) -> Result<Self, ConfigError> {
        self.catalog = catalog;
        self.checked()
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let origin = Position::new(0, 0);
        if !self.catalog.iter().any(|p| self.size.contains(p, origin)) {
            return Err(ConfigError::new(
                "pieces",
                format!(
                    "no piece fits on a {}x{} board",
                    self.size.width(),
                    self.size.height()
                ),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    #[must_use]
    pub fn hand_slots(&self) -> usize {
        self.hand_slots
    }

    #[must_use]
    pub fn deal_policy(&self) -> DealPolicy {
        self.deal_policy
    }

    #[must_use]
    pub fn scoring(&self) -> &ScoringRules {
        &self.scoring
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<PieceCatalog> {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_standard_game() {
        let rules = GameConfig::default().validate().unwrap();
        assert_eq!(rules.size(), BoardSize::STANDARD);
        assert_eq!(rules.hand_slots(), 3);
        assert_eq!(rules.deal_policy(), DealPolicy::EnsurePlayable);
        assert_eq!(rules.catalog().len(), 26);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let with = |edit: fn(&mut GameConfig)| {
            let mut config = GameConfig::default();
            edit(&mut config);
            config
        };
        let cases = [
            (with(|c| c.width = 0), "width"),
            (with(|c| c.width = 17), "width"),
            (with(|c| c.height = 0), "height"),
            (with(|c| c.hand_slots = 0), "hand_slots"),
            (with(|c| c.hand_slots = 9), "hand_slots"),
        ];
        for (config, field) in cases {
            let err = config.validate().unwrap_err();
            assert_eq!(err.field(), field, "{config:?}");
        }
    }

    #[test]
    fn test_deserialize_policy_and_reject_unknown_fields() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "deal_policy": "uniform", "scoring": { "cell_points": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.deal_policy, DealPolicy::Uniform);
        assert_eq!(config.scoring.cell_points, 0);
        assert_eq!(config.scoring.line_bonus, 10);

        assert!(serde_json::from_str::<GameConfig>(r#"{ "size": 8 }"#).is_err());
    }

    #[test]
    fn test_catalog_must_fit_board() {
        let big = PieceCatalog::from_shapes(&[[(0_u8, 0_u8), (0, 1), (0, 2)]]).unwrap();
        let rules = GameConfig {
            width: 2,
            height: 2,
            ..GameConfig::default()
        }
        .validate()
        .unwrap();
        let err = rules.with_catalog(Arc::new(big)).unwrap_err();
        assert_eq!(err.field(), "pieces");
    }
}
