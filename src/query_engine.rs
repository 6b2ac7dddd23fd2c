use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::analyzer::{Analyzers, detect_language};
use crate::data_models::IndexedDocument;
use crate::db::DocumentStore;

/// Term -> weight.
pub type TermVector = HashMap<String, f64>;

/// Retrieval model selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Boolean model: every query term must appear in the document.
    Boolean,
    /// Extended Boolean model: at least one query term must appear.
    ExtendedBoolean,
    /// Vector model: documents ranked by cosine similarity to the query.
    Vector,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::Boolean,
        Algorithm::ExtendedBoolean,
        Algorithm::Vector,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Algorithm::Boolean => "BM",
            Algorithm::ExtendedBoolean => "EBM",
            Algorithm::Vector => "VM",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BM" => Ok(Algorithm::Boolean),
            "EBM" => Ok(Algorithm::ExtendedBoolean),
            "VM" => Ok(Algorithm::Vector),
            _ => Err(SearchError::InvalidAlgorithm),
        }
    }
}

/// How vector-model term weights are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    #[default]
    TermFrequency,
    TfIdf,
}

impl FromStr for Weighting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tf" => Ok(Weighting::TermFrequency),
            "tfidf" | "tf-idf" => Ok(Weighting::TfIdf),
            other => Err(anyhow::anyhow!("unknown weighting: {other}")),
        }
    }
}

/// Failures reported back to the user. The `Display` text is what ends up in the
/// response envelope's `error_message`.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Please enter a search query.")]
    EmptyQuery,

    #[error("Invalid search algorithm selected.")]
    InvalidAlgorithm,

    #[error("An error occurred during search: {0:#}")]
    Search(anyhow::Error),

    #[error("An error occurred while retrieving documents: {0:#}")]
    Retrieval(anyhow::Error),
}

/// A document that matched, with its similarity when the model produces one.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: IndexedDocument,
    pub score: Option<f64>,
}

/// Number of times `term` occurs in `tokens`.
pub fn calculate_tf(term: &str, tokens: &[String]) -> usize {
    tokens.iter().filter(|t| t.as_str() == term).count()
}

/// Inverse document frequency of `term` across `vectors`. A term found nowhere gets
/// `ln(N + 1)` instead of dividing by zero.
pub fn calculate_idf(term: &str, vectors: &[TermVector]) -> f64 {
    let n = vectors.len() as f64;
    let containing = vectors.iter().filter(|v| v.contains_key(term)).count();
    if containing == 0 {
        (n + 1.0).ln()
    } else {
        (n / containing as f64).ln()
    }
}

pub fn calculate_tf_idf(term: &str, tokens: &[String], vectors: &[TermVector]) -> f64 {
    calculate_tf(term, tokens) as f64 * calculate_idf(term, vectors)
}

pub fn document_length(tokens: &[String]) -> usize {
    tokens.len()
}

/// Raw term counts.
pub fn term_frequency_vector(tokens: &[String]) -> TermVector {
    let mut counts = TermVector::new();
    for term in tokens {
        *counts.entry(term.clone()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity between the query and a document. The dot product runs over the
/// document's terms; either norm being zero yields 0.
pub fn cosine_similarity(query: &TermVector, document: &TermVector) -> f64 {
    let dot: f64 = document
        .iter()
        .map(|(term, weight)| query.get(term).copied().unwrap_or(0.0) * weight)
        .sum();
    let norm_query = query.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_document = document.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_query > 0.0 && norm_document > 0.0 {
        dot / (norm_query * norm_document)
    } else {
        0.0
    }
}

fn raw_terms(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// Boolean model relevance: every whitespace-separated query term occurs in the text.
pub fn is_relevant_bm(query: &str, text: &str) -> bool {
    let terms = raw_terms(query);
    !terms.is_empty() && terms.iter().all(|term| text.contains(term))
}

/// Extended Boolean model relevance: at least one query term occurs in the text.
pub fn is_relevant_ebm(query: &str, text: &str) -> bool {
    raw_terms(query).iter().any(|term| text.contains(term))
}

pub struct QueryEngine {
    analyzers: Analyzers,
    weighting: Weighting,
}

impl QueryEngine {
    pub fn new(weighting: Weighting) -> Self {
        Self {
            analyzers: Analyzers::new(),
            weighting,
        }
    }

    /// Loads every document from `source` and ranks it against `query`.
    pub async fn search(
        &self,
        source: &dyn DocumentStore,
        query: &str,
        algorithm: Algorithm,
    ) -> Result<Vec<ScoredDocument>> {
        let documents = source.list_documents().await?;
        log::debug!(
            "searching {} documents with {} for {:?}",
            documents.len(),
            algorithm,
            query
        );
        self.rank(query, algorithm, documents)
    }

    /// Applies the selected retrieval model to an in-memory document set.
    pub fn rank(
        &self,
        query: &str,
        algorithm: Algorithm,
        documents: Vec<IndexedDocument>,
    ) -> Result<Vec<ScoredDocument>> {
        let unscored = |document: IndexedDocument| ScoredDocument {
            document,
            score: None,
        };
        match algorithm {
            Algorithm::Boolean => Ok(documents
                .into_iter()
                .filter(|d| is_relevant_bm(query, &d.text))
                .map(unscored)
                .collect()),
            Algorithm::ExtendedBoolean => Ok(documents
                .into_iter()
                .filter(|d| is_relevant_ebm(query, &d.text))
                .map(unscored)
                .collect()),
            Algorithm::Vector => self.rank_vector(query, documents),
        }
    }

    fn rank_vector(
        &self,
        query: &str,
        documents: Vec<IndexedDocument>,
    ) -> Result<Vec<ScoredDocument>> {
        let query_terms = self.analyzers.get(detect_language(query)).terms(query)?;

        let mut document_vectors = Vec::with_capacity(documents.len());
        for document in &documents {
            let terms = self.analyzers.get(document.language).terms(&document.text)?;
            document_vectors.push(term_frequency_vector(&terms));
        }
        let mut query_vector = term_frequency_vector(&query_terms);

        if self.weighting == Weighting::TfIdf {
            let idf = |term: &str| calculate_idf(term, &document_vectors);
            for (term, weight) in query_vector.iter_mut() {
                *weight *= idf(term.as_str());
            }
            let weighted: Vec<TermVector> = document_vectors
                .iter()
                .map(|v| v.iter().map(|(t, w)| (t.clone(), w * idf(t.as_str()))).collect())
                .collect();
            document_vectors = weighted;
        }

        // every document is ranked, unrelated ones score 0 and sink to the end
        let mut scored: Vec<ScoredDocument> = documents
            .into_iter()
            .zip(document_vectors.iter())
            .map(|(document, vector)| ScoredDocument {
                score: Some(cosine_similarity(&query_vector, vector)),
                document,
            })
            .collect();

        // stable: equal scores keep store order
        scored.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0))
        });
        Ok(scored)
    }
}
