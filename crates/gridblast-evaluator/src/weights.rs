//! Weight vectors over the board feature vocabulary.
//!
//! A [`WeightVector`] holds one real coefficient per [`BoardFeature`], in the
//! order of [`BoardFeature::ALL`]. Coefficients are unconstrained: negative
//! values penalize a feature, positive values reward it.
//!
//! On disk a weight vector is a JSON object mapping feature ids to numbers,
//! written in vocabulary order:
//!
//! ```
//! use gridblast_evaluator::{board_feature::BoardFeature, weights::WeightVector};
//!
//! let weights = WeightVector::default();
//! let json = serde_json::to_string(&weights).unwrap();
//! assert!(json.starts_with(r#"{"holes":-8.0,"max_height":-3.0"#));
//!
//! let restored: WeightVector = serde_json::from_str(&json).unwrap();
//! assert_eq!(restored, weights);
//! assert_eq!(restored[BoardFeature::ClearedLines], 100.0);
//! ```

use std::{
    collections::BTreeMap,
    iter,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize, ser::SerializeMap};

use crate::board_feature::BoardFeature;

/// Reasons a set of named coefficients does not form a valid [`WeightVector`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum InvalidWeightData {
    #[display("missing weight for feature `{feature}`")]
    MissingFeature { feature: BoardFeature },
    #[display("unknown feature `{name}`")]
    UnknownFeature { name: String },
    #[display("weight for feature `{feature}` is not a finite number")]
    NonFinite { feature: BoardFeature },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector([f32; BoardFeature::LEN]);

impl Default for WeightVector {
    /// Hand-tuned coefficients, usable without training.
    fn default() -> Self {
        Self(BoardFeature::ALL.map(BoardFeature::default_weight))
    }
}

impl WeightVector {
    #[must_use]
    pub const fn new(values: [f32; BoardFeature::LEN]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(BoardFeature) -> f32,
    {
        Self(BoardFeature::ALL.map(f))
    }

    /// Builds a weight vector from `(feature id, coefficient)` pairs.
    ///
    /// Every feature must appear exactly once; unknown ids and coefficients
    /// that are not finite as `f32` are rejected.
    pub fn from_named<I, S>(entries: I) -> Result<Self, InvalidWeightData>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut values = [None; BoardFeature::LEN];
        for (name, value) in entries {
            let name = name.as_ref();
            let feature =
                BoardFeature::from_id(name).ok_or_else(|| InvalidWeightData::UnknownFeature {
                    name: name.to_owned(),
                })?;
            #[expect(clippy::cast_possible_truncation)]
            let value = value as f32;
            if !value.is_finite() {
                return Err(InvalidWeightData::NonFinite { feature });
            }
            values[feature.index()] = Some(value);
        }

        let mut weights = [0.0; BoardFeature::LEN];
        for (feature, (slot, value)) in
            iter::zip(BoardFeature::ALL, iter::zip(&mut weights, values))
        {
            *slot = value.ok_or(InvalidWeightData::MissingFeature { feature })?;
        }
        Ok(Self(weights))
    }

    #[must_use]
    pub fn get(&self, feature: BoardFeature) -> f32 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: BoardFeature, value: f32) {
        self.0[feature.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoardFeature, f32)> + '_ {
        iter::zip(BoardFeature::ALL, self.0.iter().copied())
    }

    /// Fails with the first feature whose coefficient is NaN or infinite.
    pub fn check_finite(&self) -> Result<(), InvalidWeightData> {
        match self.iter().find(|(_, w)| !w.is_finite()) {
            Some((feature, _)) => Err(InvalidWeightData::NonFinite { feature }),
            None => Ok(()),
        }
    }

    /// Weighted sum of feature values given in vocabulary order.
    #[must_use]
    pub fn dot(&self, values: &[f32; BoardFeature::LEN]) -> f32 {
        iter::zip(&self.0, values).map(|(w, v)| w * v).sum()
    }
}

impl Index<BoardFeature> for WeightVector {
    type Output = f32;

    fn index(&self, feature: BoardFeature) -> &f32 {
        &self.0[feature.index()]
    }
}

impl IndexMut<BoardFeature> for WeightVector {
    fn index_mut(&mut self, feature: BoardFeature) -> &mut f32 {
        &mut self.0[feature.index()]
    }
}

impl Serialize for WeightVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(BoardFeature::LEN))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.id(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeightVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Self::from_named(entries).map_err(serde::de::Error::custom)
    }
}
