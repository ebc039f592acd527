// Vector Database Manager - Qdrant collection of FAQ records
use anyhow::{Context, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, CreateCollectionBuilder, Distance, PointId,
    PointStruct, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::knowledge::{FaqRecord, QueryResult, VectorIndex};

/// Payload key holding the indexed document text
const DOCUMENT_KEY: &str = "document";

/// Vector database manager bound to one Qdrant collection
pub struct VectorDBManager {
    client: Qdrant,
    collection: String,
}

impl VectorDBManager {
    /// Connect and make sure the collection exists (cosine distance, `dimension` wide)
    pub async fn open_or_create(url: &str, collection: &str, dimension: usize) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .context("Failed to create Qdrant client")?;

        let exists = client
            .collection_exists(collection)
            .await
            .with_context(|| format!("Failed to reach Qdrant at {}", url))?;

        if !exists {
            client
                .create_collection(
                    CreateCollectionBuilder::new(collection)
                        .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
                )
                .await
                .with_context(|| format!("Failed to create collection: {}", collection))?;
            info!(collection, dimension, "Created vector collection");
        }

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }
}

#[async_trait]
impl VectorIndex for VectorDBManager {
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<QueryResult>> {
        let search_result = self
            .client
            .search_points(
                SearchPointsBuilder::new(self.collection.as_str(), embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .context("Failed to search points")?;

        debug!(
            collection = %self.collection,
            hits = search_result.result.len(),
            "Vector search complete"
        );

        Ok(search_result.result.into_iter().map(scored_point_to_result).collect())
    }

    async fn upsert(&self, records: Vec<FaqRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(records.len());
        for record in records {
            let document = record.document();
            let payload = Payload::try_from(json!({
                "question": record.question,
                "answer": record.answer,
                "document": document,
            }))
            .context("Failed to build point payload")?;

            points.push(PointStruct::new(point_id_for(&record.id), record.embedding, payload));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(self.collection.as_str(), points).wait(true))
            .await
            .context("Failed to upsert points")?;

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let info = self
            .client
            .collection_info(self.collection.as_str())
            .await
            .context("Failed to get collection info")?;

        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

/// Qdrant only accepts integer or UUID ids, so string ids map to UUID v5
fn point_id_for(id: &str) -> PointId {
    if let Ok(n) = id.parse::<u64>() {
        return PointId::from(n);
    }
    let uuid = Uuid::parse_str(id).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()));
    PointId::from(uuid.to_string())
}

fn scored_point_to_result(point: ScoredPoint) -> QueryResult {
    let mut document = String::new();
    let mut metadata = HashMap::new();

    for (key, value) in point.payload {
        if key == DOCUMENT_KEY {
            document = qdrant_value_to_string(&value).unwrap_or_default();
        } else if let Some(json_val) = qdrant_to_json_value(&value) {
            metadata.insert(key, json_val);
        }
    }

    QueryResult {
        id: point_id_to_string(&point.id),
        score: point.score,
        document,
        metadata,
    }
}

fn qdrant_to_json_value(value: &QdrantValue) -> Option<JsonValue> {
    value.kind.as_ref().and_then(|kind| match kind {
        Kind::StringValue(s) => Some(JsonValue::String(s.clone())),
        Kind::IntegerValue(i) => Some(JsonValue::Number((*i).into())),
        Kind::DoubleValue(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
        Kind::BoolValue(b) => Some(JsonValue::Bool(*b)),
        _ => None,
    })
}

fn qdrant_value_to_string(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref() {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    match point_id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => n.to_string(),
        Some(PointIdOptions::Uuid(u)) => u.clone(),
        None => "unknown".to_string(),
    }
}
