use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    GetPointsBuilder, PointId, PointStruct, PointsIdsList, Range, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use uuid::Uuid;

use cortex_core::errors::{CortexError, VectorError};
use cortex_core::scope::Scope;
use cortex_core::traits::{VectorPoint, VectorSearchFilter, VectorSearchHit, VectorStore};
use cortex_core::CortexResult;

/// Qdrant-backed Vector Store Gateway. One scope-agnostic collection per
/// `VectorConfig::collection_name`; tenant isolation is enforced entirely
/// through payload equality filters (§6), not separate collections.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

fn transport_err(reason: impl Into<String>) -> CortexError {
    CortexError::VectorError(VectorError::Transport {
        reason: reason.into(),
    })
}

impl QdrantVectorStore {
    pub fn connect(url: &str, collection: impl Into<String>, dimensions: usize) -> CortexResult<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| transport_err(e.to_string()))?;
        Ok(Self {
            client,
            collection: collection.into(),
            dimensions,
        })
    }

    fn payload_for(point: &VectorPoint) -> HashMap<String, QdrantValue> {
        let mut payload = HashMap::new();
        payload.insert("memory_id".to_string(), point.memory_id.to_string().into());
        payload.insert("confidence".to_string(), point.confidence.into());
        if let Some(topic) = &point.topic {
            payload.insert("topic".to_string(), topic.clone().into());
        }
        for (key, value) in point.scope.iter() {
            payload.insert(format!("scope.{key}"), value.to_string().into());
        }
        payload
    }

    fn scope_conditions(scope: &Scope) -> Vec<Condition> {
        scope
            .iter()
            .map(|(key, value)| Condition::matches(format!("scope.{key}"), value.to_string()))
            .collect()
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> CortexResult<()> {
        let existing = self.client.collection_info(name).await;
        if existing.is_ok() {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| transport_err(e.to_string()))?;
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
        }

        let structs: Vec<PointStruct> = points
            .iter()
            .map(|p| {
                PointStruct::new(
                    p.memory_id.to_string(),
                    p.vector.clone(),
                    Self::payload_for(p),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, structs))
            .await
            .map_err(|e| {
                CortexError::VectorError(VectorError::UpsertFailed {
                    reason: e.to_string(),
                })
            })?;
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

        let mut conditions = Vec::new();
        if let Some(scope) = &filter.scope {
            conditions.extend(Self::scope_conditions(scope));
        }
        if let Some(min_confidence) = filter.min_confidence {
            conditions.push(Condition::range(
                "confidence",
                Range {
                    gte: Some(min_confidence),
                    ..Default::default()
                },
            ));
        }

        let mut builder = SearchPointsBuilder::new(&self.collection, query.to_vec(), limit as u64);
        if !conditions.is_empty() {
            builder = builder.filter(Filter::must(conditions));
        }
        if let Some(threshold) = filter.score_threshold {
            builder = builder.score_threshold(threshold as f32);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| {
                CortexError::VectorError(VectorError::SearchFailed {
                    reason: e.to_string(),
                })
            })?;

        response
            .result
            .into_iter()
            .map(|hit| {
                let memory_id = hit
                    .payload
                    .get("memory_id")
                    .and_then(|v| v.as_str().map(str::to_string))
                    .ok_or_else(|| {
                        CortexError::VectorError(VectorError::SearchFailed {
                            reason: "hit payload missing memory_id".to_string(),
                        })
                    })?;
                Ok(VectorSearchHit {
                    memory_id: Uuid::parse_str(&memory_id).map_err(|e| {
                        CortexError::VectorError(VectorError::SearchFailed {
                            reason: format!("corrupt memory_id in hit payload: {e}"),
                        })
                    })?,
                    score: hit.score as f64,
                })
            })
            .collect()
    }

    async fn get_point(&self, memory_id: Uuid) -> CortexResult<Option<VectorPoint>> {
        let response = self
            .client
            .get_points(GetPointsBuilder::new(
                &self.collection,
                vec![memory_id.to_string().into()],
            ))
            .await
            .map_err(|e| transport_err(e.to_string()))?;

        let Some(retrieved) = response.result.into_iter().next() else {
            return Ok(None);
        };

        let vector = retrieved
            .vectors
            .and_then(|v| v.vector)
            .and_then(|v| match v {
                qdrant_client::qdrant::vector_output::Vector::Dense(dense) => Some(dense.data),
                _ => None,
            })
            .unwrap_or_default();

        let confidence = retrieved
            .payload
            .get("confidence")
            .and_then(|v| v.as_double())
            .unwrap_or(0.0);
        let topic = retrieved
            .payload
            .get("topic")
            .and_then(|v| v.as_str().map(str::to_string));

        let scope_pairs: Vec<(String, String)> = retrieved
            .payload
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("scope.")
                    .and_then(|key| v.as_str().map(|val| (key.to_string(), val.to_string())))
            })
            .collect();
        let scope = Scope::new(scope_pairs).map_err(|_| {
            CortexError::VectorError(VectorError::SearchFailed {
                reason: "point payload carried no scope keys".to_string(),
            })
        })?;

        Ok(Some(VectorPoint {
            memory_id,
            vector,
            scope,
            confidence,
            topic,
        }))
    }

    async fn delete_points(&self, memory_ids: &[Uuid]) -> CortexResult<()> {
        let ids: Vec<PointId> = memory_ids.iter().map(|id| id.to_string().into()).collect();
        self.client
            .delete_points(DeletePointsBuilder::new(&self.collection).points(PointsIdsList { ids }))
            .await
            .map_err(|e| transport_err(e.to_string()))?;
        Ok(())
    }

    async fn count(&self) -> CortexResult<u64> {
        let info = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| transport_err(e.to_string()))?;
        Ok(info
            .result
            .and_then(|r| r.points_count)
            .unwrap_or(0))
    }

    async fn health(&self) -> CortexResult<bool> {
        Ok(self.client.health_check().await.is_ok())
    }
}
