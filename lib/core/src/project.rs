//! t-SNE projection of the combined reference + candidate matrix.
//!
//! Implements exact t-SNE (van der Maaten & Hinton, 2008):
//! - Gaussian input affinities with per-row binary-search bandwidth
//! - Student-t output affinities
//! - Gradient descent with momentum and early exaggeration
//!
//! The projection is not composable across calls: reference and candidate
//! rows must go through one combined call, reference rows first, and the
//! output re-sliced at the same split point. [`project_combined`] owns that
//! contract.

use crate::error::{Error, Result};
use crate::vector::FeatureVector;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Dimensionality reducer over standardized feature rows.
///
/// Output has one coordinate row per input row, in input order.
pub trait Projector: Send + Sync {
    fn project(&self, rows: &[FeatureVector], dims: usize) -> Result<Vec<Vec<f64>>>;
}

/// t-SNE parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsneConfig {
    /// Target perplexity; clamped to (n - 1) / 3 for small inputs.
    pub perplexity: f64,
    /// Gradient step size.
    pub learning_rate: f64,
    /// Total optimization iterations.
    pub n_iter: usize,
    /// Affinity multiplier during the early phase.
    pub exaggeration: f64,
    /// Number of early-exaggeration iterations.
    pub exaggeration_iters: usize,
    /// Seed for the embedding initialization.
    pub random_state: u64,
}

impl Default for TsneConfig {
    fn default() -> Self {
        Self {
            perplexity: 10.0,
            learning_rate: 200.0,
            n_iter: 1000,
            exaggeration: 12.0,
            exaggeration_iters: 250,
            random_state: 42,
        }
    }
}

/// Exact t-SNE. Quadratic in row count, which is fine at dashboard scale
/// (tens of reference rows plus a capped candidate selection).
pub struct Tsne {
    config: TsneConfig,
}

impl Tsne {
    pub fn new(config: TsneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TsneConfig {
        &self.config
    }
}

impl Default for Tsne {
    fn default() -> Self {
        Self::new(TsneConfig::default())
    }
}

impl Projector for Tsne {
    fn project(&self, rows: &[FeatureVector], dims: usize) -> Result<Vec<Vec<f64>>> {
        if dims != 2 && dims != 3 {
            return Err(Error::InvalidProjectionDim(dims));
        }
        let n = rows.len();
        if n < 4 {
            return Err(Error::TooFewRows { min: 4, actual: n });
        }

        // Phase 1: pairwise squared distances in the input space.
        let dist_sq: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (0..n).map(|j| rows[i].l2_distance_sq(&rows[j])).collect())
            .collect();

        // Phase 2: symmetrized input affinities.
        let perplexity = self.config.perplexity.min((n as f64 - 1.0) / 3.0).max(1.0);
        let p_cond = conditional_affinities(&dist_sq, perplexity);
        let mut p = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    p[i][j] = ((p_cond[i][j] + p_cond[j][i]) / (2.0 * n as f64)).max(1e-12);
                }
            }
        }

        // Phase 3: gradient descent from a small random layout.
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        let mut embedding: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..dims).map(|_| rng.random_range(-1e-4..1e-4)).collect())
            .collect();
        let mut velocity = vec![vec![0.0f64; dims]; n];

        for iter in 0..self.config.n_iter {
            let exaggeration = if iter < self.config.exaggeration_iters {
                self.config.exaggeration
            } else {
                1.0
            };
            let momentum = if iter < self.config.exaggeration_iters {
                0.5
            } else {
                0.8
            };

            // Student-t numerators and partition function.
            let q_num: Vec<Vec<f64>> = (0..n)
                .into_par_iter()
                .map(|i| {
                    (0..n)
                        .map(|j| {
                            if i == j {
                                0.0
                            } else {
                                1.0 / (1.0 + layout_dist_sq(&embedding[i], &embedding[j]))
                            }
                        })
                        .collect()
                })
                .collect();
            let z: f64 = q_num
                .iter()
                .map(|row| row.iter().sum::<f64>())
                .sum::<f64>()
                .max(1e-12);

            let gradients: Vec<Vec<f64>> = (0..n)
                .into_par_iter()
                .map(|i| {
                    let mut grad = vec![0.0f64; dims];
                    for j in 0..n {
                        if i == j {
                            continue;
                        }
                        let q = q_num[i][j] / z;
                        let coeff = 4.0 * (exaggeration * p[i][j] - q) * q_num[i][j];
                        for (d, slot) in grad.iter_mut().enumerate() {
                            *slot += coeff * (embedding[i][d] - embedding[j][d]);
                        }
                    }
                    grad
                })
                .collect();

            for i in 0..n {
                for d in 0..dims {
                    velocity[i][d] =
                        momentum * velocity[i][d] - self.config.learning_rate * gradients[i][d];
                    embedding[i][d] += velocity[i][d];
                }
            }

            // Keep the layout centered at the origin.
            for d in 0..dims {
                let mean: f64 = embedding.iter().map(|row| row[d]).sum::<f64>() / n as f64;
                for row in &mut embedding {
                    row[d] -= mean;
                }
            }
        }

        Ok(embedding)
    }
}

#[inline]
fn layout_dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Row-normalized Gaussian affinities with bandwidth matched to the target
/// perplexity by binary search on the precision beta.
fn conditional_affinities(dist_sq: &[Vec<f64>], perplexity: f64) -> Vec<Vec<f64>> {
    let n = dist_sq.len();
    let target_entropy = perplexity.ln();

    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut beta = 1.0f64;
            let mut beta_min = f64::NEG_INFINITY;
            let mut beta_max = f64::INFINITY;
            let mut row = affinity_row(&dist_sq[i], i, beta);

            for _ in 0..50 {
                let diff = row.entropy - target_entropy;
                if diff.abs() < 1e-5 {
                    break;
                }
                if diff > 0.0 {
                    // Entropy too high: narrow the kernel.
                    beta_min = beta;
                    beta = if beta_max.is_finite() {
                        (beta + beta_max) / 2.0
                    } else {
                        beta * 2.0
                    };
                } else {
                    beta_max = beta;
                    beta = if beta_min.is_finite() {
                        (beta + beta_min) / 2.0
                    } else {
                        beta / 2.0
                    };
                }
                row = affinity_row(&dist_sq[i], i, beta);
            }

            row.probabilities
        })
        .collect()
}

struct AffinityRow {
    probabilities: Vec<f64>,
    entropy: f64,
}

fn affinity_row(dist_sq: &[f64], skip: usize, beta: f64) -> AffinityRow {
    let n = dist_sq.len();
    let mut probabilities = vec![0.0f64; n];
    let mut sum = 0.0f64;
    for (j, &d) in dist_sq.iter().enumerate() {
        if j == skip {
            continue;
        }
        let w = (-beta * d).exp();
        probabilities[j] = w;
        sum += w;
    }
    let sum = sum.max(1e-300);

    let mut entropy = 0.0f64;
    for (j, p) in probabilities.iter_mut().enumerate() {
        if j == skip {
            continue;
        }
        *p /= sum;
        if *p > 1e-300 {
            entropy -= *p * p.ln();
        }
    }

    AffinityRow {
        probabilities,
        entropy,
    }
}

/// Project `[reference; candidates]` in one call and re-slice the output at
/// the reference row count.
///
/// Row order in equals row order out; the split point is owned here so no
/// caller can pair a coordinate with the wrong ZIP code.
pub fn project_combined(
    projector: &dyn Projector,
    reference: &[FeatureVector],
    candidates: &[FeatureVector],
    dims: usize,
) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let total = reference.len() + candidates.len();
    let mut rows = Vec::with_capacity(total);
    rows.extend_from_slice(reference);
    rows.extend_from_slice(candidates);

    let mut coords = projector.project(&rows, dims)?;
    if coords.len() != total {
        return Err(Error::ProjectionShape {
            expected: total,
            actual: coords.len(),
        });
    }

    let candidate_coords = coords.split_off(reference.len());
    Ok((coords, candidate_coords))
}
