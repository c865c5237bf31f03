//! Firestore REST implementation of the health store
//!
//! Documents are addressed under per-user collection paths
//! (`users/{uid}`, `users/{uid}/healthRecords/{rid}`,
//! `users/{uid}/insights/{iid}`) and encoded to Firestore's typed-value JSON.
//! Timestamps are stored as native `timestampValue`s so the server-side
//! ordering on `recorded_at` is correct.

use async_trait::async_trait;
use healthtrack_core::{
    HealthInsight, HealthRecord, InsightId, RecordId, UserId, UserProfile,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{HealthStore, RecordQuery};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Document fields holding RFC 3339 timestamps, stored as `timestampValue`
const TIMESTAMP_FIELDS: [&str; 3] = ["recorded_at", "created_at", "updated_at"];

/// Firestore client configuration
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,

    /// Database id, `(default)` unless using a named database
    pub database: String,

    /// OAuth bearer token derived from the service-account credential.
    /// Empty when talking to the emulator.
    pub access_token: String,

    /// API base URL; override to point at the emulator
    pub base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Validate the configuration before building a client
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.project_id.is_empty() {
            return Err(StoreError::Configuration(
                "Firestore project id is required".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(StoreError::Configuration(
                "Firestore base URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Firestore-backed document store
pub struct FirestoreStore {
    client: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    /// Create a store from a validated configuration
    pub fn new(config: FirestoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    /// Root path for documents in this project/database
    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.config.base_url, self.config.project_id, self.config.database
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.access_token.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.config.access_token)
        }
    }

    async fn get_document<T: DeserializeOwned>(&self, path: &str) -> StoreResult<Option<T>> {
        let url = format!("{}/{}", self.documents_root(), path);
        let response = self.request(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: Value = response.json().await?;
                Ok(Some(decode_document(&body)?))
            }
            status => Err(rejection(status, response).await),
        }
    }

    /// Create a document, failing with `AlreadyExists` if the id is taken
    async fn create_document<T: Serialize>(
        &self,
        parent: &str,
        document_id: &str,
        entity: &T,
    ) -> StoreResult<()> {
        let url = format!("{}/{}", self.documents_root(), parent);
        let body = json!({ "fields": encode_fields(entity)? });
        let response = self
            .request(self.client.post(&url).query(&[("documentId", document_id)]))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(StoreError::AlreadyExists(format!(
                "{}/{}",
                parent, document_id
            ))),
            status if status.is_success() => Ok(()),
            status => Err(rejection(status, response).await),
        }
    }

    /// Replace a document's fields
    async fn put_document<T: Serialize>(&self, path: &str, entity: &T) -> StoreResult<()> {
        let url = format!("{}/{}", self.documents_root(), path);
        let body = json!({ "fields": encode_fields(entity)? });
        let response = self.request(self.client.patch(&url)).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejection(status, response).await)
        }
    }

    async fn delete_document(&self, path: &str) -> StoreResult<()> {
        let url = format!("{}/{}", self.documents_root(), path);
        let response = self.request(self.client.delete(&url)).send().await?;

        let status = response.status();
        // Firestore deletes are success even for absent documents
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(rejection(status, response).await)
        }
    }

    /// Run a structured query under one user's document
    async fn run_query<T: DeserializeOwned>(
        &self,
        parent: &str,
        structured_query: Value,
    ) -> StoreResult<Vec<T>> {
        let url = format!("{}/{}:runQuery", self.documents_root(), parent);
        let response = self
            .request(self.client.post(&url))
            .json(&json!({ "structuredQuery": structured_query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(status, response).await);
        }

        let rows: Vec<Value> = response.json().await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            // runQuery streams a final row without a document when empty
            if let Some(document) = row.get("document") {
                results.push(decode_document(document)?);
            }
        }
        debug!(parent, rows = results.len(), "firestore query complete");
        Ok(results)
    }

    fn profile_path(user: &UserId) -> String {
        format!("users/{}", user)
    }

    fn record_path(user: &UserId, id: &RecordId) -> String {
        format!("users/{}/healthRecords/{}", user, id)
    }

    fn insight_path(user: &UserId, id: &InsightId) -> String {
        format!("users/{}/insights/{}", user, id)
    }
}

#[async_trait]
impl HealthStore for FirestoreStore {
    async fn get_profile(&self, user: &UserId) -> StoreResult<Option<UserProfile>> {
        self.get_document(&Self::profile_path(user)).await
    }

    async fn create_profile_if_absent(&self, profile: UserProfile) -> StoreResult<UserProfile> {
        match self
            .create_document("users", profile.id.as_str(), &profile)
            .await
        {
            Ok(()) => Ok(profile),
            Err(StoreError::AlreadyExists(_)) => self
                .get_profile(&profile.id)
                .await?
                .ok_or_else(|| StoreError::NotFound(Self::profile_path(&profile.id))),
            Err(e) => Err(e),
        }
    }

    async fn put_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.put_document(&Self::profile_path(&profile.id), profile)
            .await
    }

    async fn insert_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()> {
        let parent = format!("users/{}/healthRecords", user);
        self.create_document(&parent, &record.id.to_string(), record)
            .await
    }

    async fn get_record(&self, user: &UserId, id: &RecordId) -> StoreResult<Option<HealthRecord>> {
        self.get_document(&Self::record_path(user, id)).await
    }

    async fn list_records(
        &self,
        user: &UserId,
        query: &RecordQuery,
    ) -> StoreResult<Vec<HealthRecord>> {
        let mut structured = json!({
            "from": [{ "collectionId": "healthRecords" }],
            "orderBy": [{
                "field": { "fieldPath": "recorded_at" },
                "direction": "DESCENDING"
            }],
            "limit": query.limit,
        });

        if let Some(record_type) = query.record_type {
            structured["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": "record_type" },
                    "op": "EQUAL",
                    "value": { "stringValue": record_type.to_string() }
                }
            });
        }

        self.run_query(&Self::profile_path(user), structured).await
    }

    async fn put_record(&self, user: &UserId, record: &HealthRecord) -> StoreResult<()> {
        self.put_document(&Self::record_path(user, &record.id), record)
            .await
    }

    async fn delete_record(&self, user: &UserId, id: &RecordId) -> StoreResult<bool> {
        // The REST delete is unconditional; probe first so callers learn
        // whether a document actually existed.
        let existing: Option<HealthRecord> = self.get_record(user, id).await?;
        if existing.is_none() {
            return Ok(false);
        }
        self.delete_document(&Self::record_path(user, id)).await?;
        Ok(true)
    }

    async fn insert_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()> {
        let parent = format!("users/{}/insights", user);
        self.create_document(&parent, &insight.id.to_string(), insight)
            .await
    }

    async fn get_insight(
        &self,
        user: &UserId,
        id: &InsightId,
    ) -> StoreResult<Option<HealthInsight>> {
        self.get_document(&Self::insight_path(user, id)).await
    }

    async fn list_insights(&self, user: &UserId, limit: usize) -> StoreResult<Vec<HealthInsight>> {
        let structured = json!({
            "from": [{ "collectionId": "insights" }],
            "orderBy": [{
                "field": { "fieldPath": "created_at" },
                "direction": "DESCENDING"
            }],
            "limit": limit,
        });
        self.run_query(&Self::profile_path(user), structured).await
    }

    async fn put_insight(&self, user: &UserId, insight: &HealthInsight) -> StoreResult<()> {
        self.put_document(&Self::insight_path(user, &insight.id), insight)
            .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        let url = format!("{}/users", self.documents_root());
        let response = self
            .request(self.client.get(&url).query(&[("pageSize", "1")]))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejection(status, response).await)
        }
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> StoreError {
    let message = response.text().await.unwrap_or_default();
    StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Encode an entity into Firestore's `fields` map
fn encode_fields<T: Serialize>(entity: &T) -> StoreResult<Map<String, Value>> {
    let value = serde_json::to_value(entity)?;
    let Value::Object(object) = value else {
        return Err(StoreError::InvalidDocument(
            "entity did not serialize to an object".to_string(),
        ));
    };

    let mut fields = Map::new();
    for (key, value) in object {
        let encoded = if TIMESTAMP_FIELDS.contains(&key.as_str()) {
            encode_timestamp(&value)?
        } else {
            encode_value(&value)
        };
        fields.insert(key, encoded);
    }
    Ok(fields)
}

fn encode_timestamp(value: &Value) -> StoreResult<Value> {
    match value {
        Value::String(s) => Ok(json!({ "timestampValue": s })),
        Value::Null => Ok(json!({ "nullValue": null })),
        other => Err(StoreError::InvalidDocument(format!(
            "timestamp field was not a string: {}",
            other
        ))),
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(object) => {
            let fields: Map<String, Value> = object
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode a Firestore document into a domain entity
fn decode_document<T: DeserializeOwned>(document: &Value) -> StoreResult<T> {
    let fields = document
        .get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut object = Map::new();
    for (key, value) in fields {
        object.insert(key, decode_value(&value)?);
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

fn decode_value(value: &Value) -> StoreResult<Value> {
    let Some(object) = value.as_object() else {
        return Err(StoreError::InvalidDocument(format!(
            "expected typed value, got {}",
            value
        )));
    };

    if let Some((kind, inner)) = object.iter().next() {
        let decoded = match kind.as_str() {
            "nullValue" => Value::Null,
            "booleanValue" => inner.clone(),
            "stringValue" | "timestampValue" => inner.clone(),
            "doubleValue" => inner.clone(),
            "integerValue" => {
                let raw = inner.as_str().ok_or_else(|| {
                    StoreError::InvalidDocument("integerValue was not a string".to_string())
                })?;
                let parsed: i64 = raw.parse().map_err(|_| {
                    StoreError::InvalidDocument(format!("bad integerValue: {}", raw))
                })?;
                Value::from(parsed)
            }
            "arrayValue" => {
                let items = inner
                    .get("values")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                Value::Array(
                    items
                        .iter()
                        .map(decode_value)
                        .collect::<StoreResult<Vec<_>>>()?,
                )
            }
            "mapValue" => {
                let fields = inner
                    .get("fields")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let mut object = Map::new();
                for (key, value) in fields {
                    object.insert(key, decode_value(&value)?);
                }
                Value::Object(object)
            }
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "unsupported value kind: {}",
                    other
                )))
            }
        };
        Ok(decoded)
    } else {
        Err(StoreError::InvalidDocument("empty typed value".to_string()))
    }
}
