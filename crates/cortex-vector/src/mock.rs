use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use cortex_core::errors::{CortexError, VectorError};
use cortex_core::traits::{VectorPoint, VectorSearchFilter, VectorSearchHit, VectorStore};
use cortex_core::CortexResult;

/// In-process `VectorStore` for tests and the degraded-vector-write
/// scenarios in §8 — no network, deterministic cosine search over a
/// `DashMap` of points.
pub struct InMemoryVectorStore {
    points: DashMap<Uuid, VectorPoint>,
    dimensions: usize,
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

impl InMemoryVectorStore {
    pub fn new(dimensions: usize) -> Self {
        Self {
            points: DashMap::new(),
            dimensions,
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, _name: &str, _dimensions: usize) -> CortexResult<()> {
        Ok(())
    }

    async fn upsert_points(&self, points: &[VectorPoint]) -> CortexResult<()> {
        for point in points {
            if point.vector.len() != self.dimensions {
                return Err(CortexError::VectorError(VectorError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: point.vector.len(),
                }));
            }
            self.points.insert(point.memory_id, point.clone());
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &[f32],
        limit: usize,
        filter: &VectorSearchFilter,
    ) -> CortexResult<Vec<VectorSearchHit>> {
        if query.len() != self.dimensions {
            return Err(CortexError::VectorError(VectorError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            }));
        }

        let mut hits: Vec<VectorSearchHit> = self
            .points
            .iter()
            .filter(|entry| {
                if let Some(scope) = &filter.scope {
                    if &entry.scope != scope {
                        return false;
                    }
                }
                if let Some(min_confidence) = filter.min_confidence {
                    if entry.confidence < min_confidence {
                        return false;
                    }
                }
                true
            })
            .map(|entry| VectorSearchHit {
                memory_id: entry.memory_id,
                score: cosine_similarity(query, &entry.vector),
            })
            .filter(|hit| filter.score_threshold.map_or(true, |t| hit.score >= t))
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn get_point(&self, memory_id: Uuid) -> CortexResult<Option<VectorPoint>> {
        Ok(self.points.get(&memory_id).map(|r| r.clone()))
    }

    async fn delete_points(&self, memory_ids: &[Uuid]) -> CortexResult<()> {
        for id in memory_ids {
            self.points.remove(id);
        }
        Ok(())
    }

    async fn count(&self) -> CortexResult<u64> {
        Ok(self.points.len() as u64)
    }

    async fn health(&self) -> CortexResult<bool> {
        Ok(true)
    }
}
