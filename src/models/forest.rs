//! Random forest regressor (bagged CART trees).
//!
//! Trees are grown in parallel with rayon. Tree `t` draws its bootstrap
//! sample and feature subsets from its own `StdRng` seeded with `seed + t`, so
//! the fitted forest does not depend on thread scheduling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::ForestConfig;
use crate::error::AppError;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{Regressor, check_fit_input, check_predict_input};

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    /// Normalized SSE-reduction importances (sum to 1 when any split exists).
    importances: Vec<f64>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            importances: Vec::new(),
            n_features: 0,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "Random Forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), AppError> {
        let n_features = check_fit_input(x, y)?;
        if self.config.n_trees == 0 {
            return Err(AppError::model("Random forest needs at least one tree."));
        }

        let n = x.len();
        let params = TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features,
        };
        let bootstrap = self.config.bootstrap;
        let seed = self.config.seed;

        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let indices: Vec<usize> = if bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(x, y, &indices, &params, &mut rng)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (acc, imp) in importances.iter_mut().zip(tree.importances()) {
                *acc += imp;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.importances = importances;
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, AppError> {
        if self.trees.is_empty() {
            return Err(AppError::model("Random forest used before fit."));
        }
        check_predict_input(x, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        Ok(x
            .par_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / n_trees)
            .collect())
    }
}
