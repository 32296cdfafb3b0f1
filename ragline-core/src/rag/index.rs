//! Exact nearest-neighbor vector index.
//!
//! Embeddings are kept in one contiguous row-major buffer and searched with a
//! brute-force scan using squared Euclidean distance.

use super::{RagError, Result};
use crate::provider::Embedding;

/// A flat L2 index over embeddings of one fixed dimensionality.
///
/// Row *i* corresponds to document *i* of the corpus the index was built
/// from.
///
/// # Characteristics
///
/// - **Exact**: every search scans all rows, O(n * d)
/// - **Deterministic**: ties are broken by insertion order
/// - **Ephemeral**: nothing is persisted
///
/// # Example
///
/// ```
/// # use ragline_core::{Embedding, VectorIndex};
/// let index = VectorIndex::build(vec![
///     Embedding::new(vec![1.0, 0.0]),
///     Embedding::new(vec![0.0, 1.0]),
/// ]).unwrap();
///
/// let hits = index.search(&[0.9, 0.1], 1).unwrap();
/// assert_eq!(hits[0].0, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dim: usize,
    len: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `embeddings`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any embedding's length
    /// differs from the first one's. An empty input yields an empty index.
    pub fn build(embeddings: Vec<Embedding>) -> Result<Self> {
        let mut index = Self::new();
        for embedding in embeddings {
            index.add(embedding)?;
        }
        Ok(index)
    }

    /// Appends one embedding as the next row.
    ///
    /// The first embedding fixes the dimensionality of the index.
    pub fn add(&mut self, embedding: Embedding) -> Result<()> {
        if self.len > 0 && embedding.dim() != self.dim {
            return Err(RagError::DimensionMismatch {
                expected: self.dim,
                actual: embedding.dim(),
            });
        }
        if self.len == 0 {
            self.dim = embedding.dim();
        }
        self.data.extend(embedding.into_inner());
        self.len += 1;
        Ok(())
    }

    /// Returns the `k` rows closest to `query` as `(row, squared distance)`
    /// pairs in ascending distance order.
    ///
    /// Equal distances keep the lower row first. Asking for more rows than
    /// the index holds returns all of them; `k == 0` returns nothing.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyIndex`] if the index holds no rows and `k > 0`
    /// - [`RagError::DimensionMismatch`] if `query` has the wrong length
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if self.len == 0 {
            return Err(RagError::EmptyIndex);
        }
        if query.len() != self.dim {
            return Err(RagError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .rows()
            .enumerate()
            .map(|(i, row)| (i, squared_l2(query, row)))
            .collect();

        // NaN distances (either sign) rank after every real distance. Stable
        // sort keeps insertion order among equal distances.
        hits.sort_by(|a, b| {
            a.1.is_nan()
                .cmp(&b.1.is_nan())
                .then_with(|| a.1.total_cmp(&b.1))
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Number of stored embeddings.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimensionality of the stored embeddings, `None` while empty.
    pub fn dim(&self) -> Option<usize> {
        (self.len > 0).then_some(self.dim)
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // A zero-dimensional index still has `len` (empty) rows.
        (0..self.len).map(move |i| &self.data[i * self.dim..(i + 1) * self.dim])
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
