use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::vectorizer::VectorMatrix;

/// Default number of neighbours returned by [`SimilarityMatrix::top_k`]
pub const DEFAULT_TOP_K: usize = 5;

/// Dense, symmetric all-pairs cosine similarity matrix.
///
/// Memory is `O(n^2)`; a few tens of thousands of movies is the practical
/// ceiling for this representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredMatrix")]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f32>,
}

/// Serialized layout; checked for shape before becoming a [`SimilarityMatrix`]
#[derive(Deserialize)]
struct StoredMatrix {
    size: usize,
    scores: Vec<f32>,
}

impl TryFrom<StoredMatrix> for SimilarityMatrix {
    type Error = AppError;

    fn try_from(stored: StoredMatrix) -> AppResult<Self> {
        Self::from_parts(stored.size, stored.scores)
    }
}

fn cosine(dot: u64, norm_a: u64, norm_b: u64) -> f32 {
    if norm_a == 0 || norm_b == 0 {
        return 0.0;
    }
    // sqrt of the product keeps identical rows at exactly 1.0
    let score = dot as f64 / ((norm_a as f64) * (norm_b as f64)).sqrt();
    score.min(1.0) as f32
}

impl SimilarityMatrix {
    /// Computes cosine similarity for every pair of rows.
    ///
    /// `sim(i, i)` is 1 and pairs involving a zero row score 0.
    pub fn build(matrix: &VectorMatrix) -> Self {
        let rows = matrix.rows();
        let size = rows.len();
        let norms: Vec<u64> = rows.iter().map(|row| row.norm_squared()).collect();
        let mut scores = vec![0.0f32; size * size];

        for i in 0..size {
            scores[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let score = cosine(rows[i].dot(&rows[j]), norms[i], norms[j]);
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        Self { size, scores }
    }

    /// Reassembles a matrix from its row-major scores
    pub fn from_parts(size: usize, scores: Vec<f32>) -> AppResult<Self> {
        if size.checked_mul(size) != Some(scores.len()) {
            return Err(AppError::Build(format!(
                "similarity matrix has {} scores, expected {size}x{size}",
                scores.len()
            )));
        }
        Ok(Self { size, scores })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.size && j < self.size {
            Some(self.scores[i * self.size + j])
        } else {
            None
        }
    }

    fn row(&self, index: usize) -> &[f32] {
        &self.scores[index * self.size..(index + 1) * self.size]
    }

    /// Returns the `k` rows most similar to `index`, excluding `index` itself.
    ///
    /// Results are ordered by descending score; equal scores keep ascending
    /// row order.
    pub fn top_k(&self, index: usize, k: usize) -> AppResult<Vec<(usize, f32)>> {
        if index >= self.size {
            return Err(AppError::NotFound(format!("row {index} is out of range")));
        }

        let mut ranked: Vec<(usize, f32)> = self
            .row(index)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        Ok(ranked)
    }
}
