//! Document-level retrieval over a [`VectorIndex`].

use super::index::VectorIndex;
use super::types::{Document, SearchResult};
use super::{RagError, Result};

/// Binds an index to the documents it was built from.
///
/// Borrows both; row *i* of the index must correspond to `documents[i]`.
#[derive(Debug, Clone, Copy)]
pub struct Retriever<'a> {
    index: &'a VectorIndex,
    documents: &'a [Document],
}

impl<'a> Retriever<'a> {
    /// # Errors
    ///
    /// [`RagError::InvalidArgument`] when the index and the document list
    /// differ in length.
    pub fn new(index: &'a VectorIndex, documents: &'a [Document]) -> Result<Self> {
        if index.len() != documents.len() {
            return Err(RagError::InvalidArgument(format!(
                "index holds {} embeddings but {} documents were given",
                index.len(),
                documents.len()
            )));
        }
        Ok(Self { index, documents })
    }

    /// Returns the `k` documents closest to `query_embedding`, closest first.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidArgument`] when `k` is zero; index errors are
    /// passed through unchanged.
    pub fn retrieve(&self, query_embedding: &[f32], k: usize) -> Result<Vec<&'a Document>> {
        let hits = self.hits(query_embedding, k)?;
        Ok(hits.into_iter().map(|(i, _)| &self.documents[i]).collect())
    }

    /// Like [`retrieve`](Self::retrieve), keeping positions and distances.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let hits = self.hits(query_embedding, k)?;
        Ok(hits
            .into_iter()
            .map(|(index, distance)| SearchResult {
                index,
                document: self.documents[index].clone(),
                distance,
            })
            .collect())
    }

    fn hits(&self, query_embedding: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be at least 1".to_string()));
        }
        self.index.search(query_embedding, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Embedding;

    fn fixture() -> (VectorIndex, Vec<Document>) {
        let vectors = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.7, 0.7],
            vec![-1.0, 0.0],
        ];
        let index = VectorIndex::build(vectors.into_iter().map(Embedding::new).collect()).unwrap();
        let documents = ["east", "north", "north-east", "west"]
            .into_iter()
            .map(Document::new)
            .collect();
        (index, documents)
    }

    #[test]
    fn test_retrieve_matches_index_order() {
        let (index, documents) = fixture();
        let retriever = Retriever::new(&index, &documents).unwrap();
        let query = [0.6, 0.8];

        let expected: Vec<&str> = index
            .search(&query, 3)
            .unwrap()
            .into_iter()
            .map(|(i, _)| documents[i].content.as_str())
            .collect();
        let retrieved: Vec<&str> = retriever
            .retrieve(&query, 3)
            .unwrap()
            .into_iter()
            .map(|d| d.content.as_str())
            .collect();

        assert_eq!(retrieved, expected);
        assert_eq!(retrieved[0], "north-east");
    }

    #[test]
    fn test_search_keeps_distances() {
        let (index, documents) = fixture();
        let retriever = Retriever::new(&index, &documents).unwrap();

        let results = retriever.search(&[-1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].index, 3);
        assert_eq!(results[0].distance, 0.0);
        assert_eq!(results[0].document.content, "west");
        assert!(results[0].distance <= results[1].distance);
    }

    #[test]
    fn test_retrieve_zero_k_is_invalid() {
        let (index, documents) = fixture();
        let retriever = Retriever::new(&index, &documents).unwrap();

        let err = retriever.retrieve(&[1.0, 0.0], 0).unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }

    #[test]
    fn test_retrieve_propagates_index_errors() {
        let (index, documents) = fixture();
        let retriever = Retriever::new(&index, &documents).unwrap();
        assert!(matches!(
            retriever.retrieve(&[1.0, 0.0, 0.0], 1),
            Err(RagError::DimensionMismatch { expected: 2, actual: 3 })
        ));

        let empty = VectorIndex::new();
        let retriever = Retriever::new(&empty, &[]).unwrap();
        assert!(matches!(retriever.retrieve(&[1.0], 1), Err(RagError::EmptyIndex)));
    }

    #[test]
    fn test_new_rejects_misaligned_documents() {
        let (index, documents) = fixture();

        let err = Retriever::new(&index, &documents[..1]).unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
        assert!(Retriever::new(&VectorIndex::new(), &documents).is_err());
    }
}
