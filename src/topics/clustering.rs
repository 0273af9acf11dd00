//! TF-IDF + k-means tier
//!
//! Sentences are the documents. Clusters become topics labeled by the
//! heaviest terms of their centroid.

use crate::topics::models::{TierError, TierInput, TierResult};

#[cfg(feature = "clustering")]
pub(crate) fn extract(input: &TierInput<'_>) -> TierResult {
    if !input.capabilities.clustering {
        return Err(TierError::Unavailable("clustering disabled".to_string()));
    }
    imp::extract(input)
}

#[cfg(not(feature = "clustering"))]
pub(crate) fn extract(_input: &TierInput<'_>) -> TierResult {
    Err(TierError::Unavailable(
        "built without the clustering feature".to_string(),
    ))
}

#[cfg(feature = "clustering")]
mod imp {
    use nalgebra::DVector;
    use std::collections::{BTreeMap, HashMap};

    use super::*;
    use crate::text::content_tokens;
    use crate::topics::models::Candidate;

    /// Terms used to label a cluster
    const LABEL_TERMS: usize = 2;

    /// Terms used to match utterances against a cluster
    const MATCH_TERMS: usize = 5;

    struct Document {
        sentence: usize,
        tokens: Vec<String>,
    }

    pub(super) fn extract(input: &TierInput<'_>) -> TierResult {
        let documents: Vec<Document> = input
            .sentences
            .iter()
            .enumerate()
            .map(|(sentence, s)| Document {
                sentence,
                tokens: content_tokens(&s.text),
            })
            .filter(|d| !d.tokens.is_empty())
            .collect();

        if documents.len() < 2 || documents.len() < input.num_topics {
            return Err(TierError::Insufficient(format!(
                "{} content sentences for {} topics",
                documents.len(),
                input.num_topics
            )));
        }

        let vocabulary = build_vocabulary(&documents, input.settings.tfidf_max_features);
        let vectors = tfidf_vectors(&documents, &vocabulary);

        // Documents with no vocabulary term have nothing to cluster on
        let (members, vectors): (Vec<usize>, Vec<DVector<f64>>) = vectors
            .into_iter()
            .enumerate()
            .filter(|(_, v)| v.norm() > 0.0)
            .unzip();

        if vectors.len() < 2 {
            return Err(TierError::Insufficient(
                "fewer than two vectorizable sentences".to_string(),
            ));
        }
        let k = input.num_topics.min(vectors.len() / 2).max(1);

        let (assignments, centroids) =
            kmeans(&vectors, k, input.settings.kmeans_max_iterations)?;

        let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (position, cluster) in assignments.iter().enumerate() {
            clusters
                .entry(*cluster)
                .or_default()
                .push(documents[members[position]].sentence);
        }

        let mut candidates = Vec::new();
        for (cluster, sentences) in clusters {
            let terms = top_terms(&centroids[cluster], &vocabulary, MATCH_TERMS);
            if terms.is_empty() {
                continue;
            }
            let label = terms
                .iter()
                .take(LABEL_TERMS)
                .cloned()
                .collect::<Vec<_>>()
                .join(" / ");

            candidates.push(Candidate {
                label,
                relevance: sentences.len() as f64 / vectors.len() as f64,
                terms,
                sentences,
            });
        }

        if candidates.is_empty() {
            return Err(TierError::Failed("every cluster came out empty".to_string()));
        }

        Ok(candidates)
    }

    /// Terms by document frequency, most common first, ties alphabetical
    fn build_vocabulary(documents: &[Document], max_features: usize) -> Vec<String> {
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for document in documents {
            let mut seen: Vec<&str> = document.tokens.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let mut terms: Vec<(&str, usize)> = document_frequency.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        terms.truncate(max_features.max(1));
        terms.into_iter().map(|(term, _)| term.to_string()).collect()
    }

    /// L2-normalized TF-IDF vectors with smoothed idf
    fn tfidf_vectors(documents: &[Document], vocabulary: &[String]) -> Vec<DVector<f64>> {
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let n = documents.len() as f64;
        let mut document_frequency = vec![0usize; vocabulary.len()];
        for document in documents {
            let mut seen = vec![false; vocabulary.len()];
            for token in &document.tokens {
                if let Some(&i) = index.get(token.as_str()) {
                    if !seen[i] {
                        seen[i] = true;
                        document_frequency[i] += 1;
                    }
                }
            }
        }

        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();

        documents
            .iter()
            .map(|document| {
                let mut vector = DVector::<f64>::zeros(vocabulary.len());
                let length = document.tokens.len() as f64;
                for token in &document.tokens {
                    if let Some(&i) = index.get(token.as_str()) {
                        vector[i] += idf[i] / length;
                    }
                }
                let norm = vector.norm();
                if norm > 0.0 {
                    vector /= norm;
                }
                vector
            })
            .collect()
    }

    /// Lloyd's k-means with farthest-point seeding, so results are deterministic
    fn kmeans(
        vectors: &[DVector<f64>],
        k: usize,
        max_iterations: usize,
    ) -> Result<(Vec<usize>, Vec<DVector<f64>>), TierError> {
        let mut centroids = vec![vectors[0].clone()];
        while centroids.len() < k {
            let farthest = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| (i, nearest(v, &centroids).1))
                .fold((0, f64::MIN), |best, candidate| {
                    if candidate.1 > best.1 {
                        candidate
                    } else {
                        best
                    }
                });
            if farthest.1 <= 0.0 {
                // Remaining points coincide with existing centroids
                break;
            }
            centroids.push(vectors[farthest.0].clone());
        }

        let mut assignments = vec![usize::MAX; vectors.len()];
        for _ in 0..max_iterations.max(1) {
            let next: Vec<usize> = vectors.iter().map(|v| nearest(v, &centroids).0).collect();
            if next == assignments {
                break;
            }
            assignments = next;

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&DVector<f64>> = vectors
                    .iter()
                    .zip(&assignments)
                    .filter(|(_, a)| **a == cluster)
                    .map(|(v, _)| v)
                    .collect();
                if members.is_empty() {
                    continue;
                }
                let mut sum = DVector::<f64>::zeros(centroid.len());
                for member in &members {
                    sum += *member;
                }
                *centroid = sum / members.len() as f64;
            }
        }

        if centroids.iter().any(|c| c.iter().any(|x| !x.is_finite())) {
            return Err(TierError::Failed("k-means produced a non-finite centroid".to_string()));
        }

        Ok((assignments, centroids))
    }

    /// Index of and squared distance to the closest centroid; ties go to the lower index
    fn nearest(vector: &DVector<f64>, centroids: &[DVector<f64>]) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (i, centroid) in centroids.iter().enumerate() {
            let distance = (vector - centroid).norm_squared();
            if distance < best.1 {
                best = (i, distance);
            }
        }
        best
    }

    fn top_terms(centroid: &DVector<f64>, vocabulary: &[String], limit: usize) -> Vec<String> {
        let mut weighted: Vec<(usize, f64)> = centroid
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, w)| *w > 0.0)
            .collect();
        weighted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        weighted
            .into_iter()
            .take(limit)
            .map(|(i, _)| vocabulary[i].clone())
            .collect()
    }

}
