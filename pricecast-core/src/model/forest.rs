//! Random forest regressor: bootstrap-bagged CART trees, averaged.
//!
//! Trees are grown in parallel. Each tree's RNG is seeded from a BLAKE3 hash
//! of the master seed and the tree index, so a fitted forest is identical
//! regardless of thread count or scheduling.

use super::tree::{RegressionTree, TreeParams};
use super::{ModelError, Regressor};
use crate::domain::FeatureMatrix;
use crate::profile::TrainingProfile;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per split; `None` means one third of the features.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::for_profile(TrainingProfile::default(), 42)
    }
}

impl ForestConfig {
    /// Tree count and depth from a training profile.
    pub fn for_profile(profile: TrainingProfile, seed: u64) -> Self {
        Self {
            n_trees: profile.tree_count(),
            max_depth: profile.max_depth(),
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            bootstrap: true,
            seed,
        }
    }

    /// Seed for tree `index`, independent of the order trees are built in.
    pub fn tree_seed(&self, index: usize) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.seed.to_le_bytes());
        hasher.update(b"tree");
        hasher.update(&(index as u64).to_le_bytes());
        *hasher.finalize().as_bytes()
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

impl Regressor for RandomForest {
    fn fit(&mut self, features: &FeatureMatrix, target: &[f64]) -> Result<(), ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.len() != target.len() {
            return Err(ModelError::DimensionMismatch {
                expected: features.len(),
                actual: target.len(),
            });
        }

        let rows = features.rows();
        let n = rows.len();
        let n_features = features.width();
        let params = TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self
                .config
                .max_features
                .unwrap_or((n_features / 3).max(1)),
        };

        let started = Instant::now();
        let config = &self.config;
        let trees: Vec<RegressionTree> = (0..config.n_trees.max(1))
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::from_seed(config.tree_seed(i));
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(rows, target, samples, &params, &mut rng)
            })
            .collect();

        debug!(
            trees = trees.len(),
            rows = n,
            features = n_features,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fitted random forest"
        );

        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    fn predict_one(&self, features: &[f64]) -> Result<f64, ModelError> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
