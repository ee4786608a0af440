//! Record - one stored document
//!
//! A record is a typed envelope around an opaque JSON payload, with a free-text
//! memo, a string→string metas map and lifecycle timestamps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::soft_delete_sentinel;
use crate::error::Result;

pub const COLUMN_ID: &str = "id";
pub const COLUMN_TYPE: &str = "type";
pub const COLUMN_PAYLOAD: &str = "payload";
pub const COLUMN_MEMO: &str = "memo";
pub const COLUMN_METAS: &str = "metas";
pub const COLUMN_CREATED_AT: &str = "created_at";
pub const COLUMN_UPDATED_AT: &str = "updated_at";
pub const COLUMN_SOFT_DELETED_AT: &str = "soft_deleted_at";

/// Every column of the record table, in table order
pub const RECORD_COLUMNS: &[&str] = &[
    COLUMN_ID,
    COLUMN_TYPE,
    COLUMN_PAYLOAD,
    COLUMN_MEMO,
    COLUMN_METAS,
    COLUMN_CREATED_AT,
    COLUMN_UPDATED_AT,
    COLUMN_SOFT_DELETED_AT,
];

/// A stored document
///
/// `payload` and `metas` are kept as the JSON text that is persisted; the map
/// accessors decode on every call and fail with a JSON error when the text is
/// not the expected shape. The raw accessors never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: String,
    #[serde(rename = "type")]
    record_type: String,
    payload: String,
    memo: String,
    metas: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    soft_deleted_at: DateTime<Utc>,
}

impl Record {
    /// Create an unsaved record of the given type
    ///
    /// The id stays empty until the store assigns one; timestamps are
    /// overwritten by the store on create.
    pub fn new(record_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            record_type: record_type.into(),
            payload: String::new(),
            memo: String::new(),
            metas: String::new(),
            created_at: now,
            updated_at: now,
            soft_deleted_at: soft_delete_sentinel(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Set the raw payload (expected to be JSON, not checked)
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set the payload from a map, encoding it as JSON
    pub fn with_payload_map(
        mut self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self> {
        self.set_payload_map(payload)?;
        Ok(self)
    }

    /// Replace all metas
    pub fn with_metas(mut self, metas: &BTreeMap<String, String>) -> Result<Self> {
        self.set_metas(metas)?;
        Ok(self)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn set_record_type(&mut self, record_type: impl Into<String>) {
        self.record_type = record_type.into();
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.memo = memo.into();
    }

    // =========================================================================
    // Payload
    // =========================================================================

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<String>) {
        self.payload = payload.into();
    }

    /// Decode the payload as a JSON object; an empty payload is an empty map
    pub fn payload_map(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        if self.payload.trim().is_empty() {
            return Ok(serde_json::Map::new());
        }
        Ok(serde_json::from_str(&self.payload)?)
    }

    pub fn set_payload_map(
        &mut self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        self.payload = serde_json::to_string(payload)?;
        Ok(())
    }

    /// Value stored under `key` in the payload object, if any
    pub fn payload_map_key(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.payload_map()?.remove(key))
    }

    /// Set one payload key, keeping the others
    pub fn set_payload_map_key(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<()> {
        let mut payload = self.payload_map()?;
        payload.insert(key.into(), value);
        self.set_payload_map(&payload)
    }

    // =========================================================================
    // Metas
    // =========================================================================

    /// Raw metas JSON text
    pub fn metas_raw(&self) -> &str {
        &self.metas
    }

    pub(crate) fn set_metas_raw(&mut self, metas: impl Into<String>) {
        self.metas = metas.into();
    }

    /// Decode all metas; empty text is an empty map
    pub fn metas(&self) -> Result<BTreeMap<String, String>> {
        if self.metas.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&self.metas)?)
    }

    pub fn meta(&self, name: &str) -> Result<Option<String>> {
        Ok(self.metas()?.remove(name))
    }

    pub fn set_meta(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut metas = self.metas()?;
        metas.insert(name.into(), value.into());
        self.set_metas(&metas)
    }

    /// Replace all metas
    pub fn set_metas(&mut self, metas: &BTreeMap<String, String>) -> Result<()> {
        self.metas = serde_json::to_string(metas)?;
        Ok(())
    }

    /// Merge `metas` into the existing ones, overwriting matching keys only
    pub fn upsert_metas(&mut self, metas: &BTreeMap<String, String>) -> Result<()> {
        let mut current = self.metas()?;
        current.extend(metas.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.set_metas(&current)
    }

    // =========================================================================
    // Timestamps
    // =========================================================================

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_updated_at(&mut self, updated_at: DateTime<Utc>) {
        self.updated_at = updated_at;
    }

    pub fn soft_deleted_at(&self) -> DateTime<Utc> {
        self.soft_deleted_at
    }

    pub fn set_soft_deleted_at(&mut self, soft_deleted_at: DateTime<Utc>) {
        self.soft_deleted_at = soft_deleted_at;
    }

    /// Soft-deleted as of `now`: the deletion time lies strictly in the past
    ///
    /// Store queries keep only rows whose `soft_deleted_at` is strictly after
    /// now, so a record deleted at exactly `now` is already hidden from
    /// `list`/`count`/`find_by_id` even though this returns `false`.
    pub fn is_soft_deleted_at(&self, now: DateTime<Utc>) -> bool {
        self.soft_deleted_at < now
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.is_soft_deleted_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        value.as_object().cloned().unwrap()
    }

    // =========================================================================
    // Construction Tests
    // =========================================================================

    #[test]
    fn test_new_record_defaults() {
        let record = Record::new("note");
        assert_eq!(record.record_type(), "note");
        assert!(record.id().is_empty());
        assert!(record.payload().is_empty());
        assert!(record.memo().is_empty());
        assert_eq!(record.soft_deleted_at(), soft_delete_sentinel());
        assert!(!record.is_soft_deleted());
    }

    #[test]
    fn test_builder_options() {
        let record = Record::new("test")
            .with_id("my-id-123")
            .with_memo("hello memo")
            .with_payload(r#"{"a":1,"b":"two"}"#);

        assert_eq!(record.id(), "my-id-123");
        assert_eq!(record.memo(), "hello memo");
        assert_eq!(record.payload(), r#"{"a":1,"b":"two"}"#);
    }

    #[test]
    fn test_with_payload_map() {
        let record = Record::new("test")
            .with_payload_map(&object(json!({"x": 9, "y": "yes"})))
            .unwrap();

        assert_eq!(record.payload_map().unwrap(), object(json!({"x": 9, "y": "yes"})));
    }

    #[test]
    fn test_with_metas() {
        let metas = BTreeMap::from([
            ("k1".to_string(), "v1".to_string()),
            ("k2".to_string(), "v2".to_string()),
        ]);
        let record = Record::new("test").with_metas(&metas).unwrap();
        assert_eq!(record.metas().unwrap(), metas);
    }

    // =========================================================================
    // Payload Tests
    // =========================================================================

    #[test]
    fn test_empty_payload_is_empty_map() {
        let record = Record::new("test");
        assert!(record.payload_map().unwrap().is_empty());
    }

    #[test]
    fn test_non_json_payload_fails_only_structured_access() {
        let record = Record::new("test").with_payload("not json at all");
        assert_eq!(record.payload(), "not json at all");
        assert!(matches!(
            record.payload_map(),
            Err(crate::error::RecordStoreError::Json(_))
        ));
        assert!(record.payload_map_key("a").is_err());
    }

    #[test]
    fn test_payload_map_key() {
        let mut record = Record::new("test").with_payload(r#"{"a":1}"#);
        assert_eq!(record.payload_map_key("a").unwrap(), Some(json!(1)));
        assert_eq!(record.payload_map_key("b").unwrap(), None);

        record.set_payload_map_key("b", json!([1, 2])).unwrap();
        assert_eq!(record.payload_map().unwrap(), object(json!({"a": 1, "b": [1, 2]})));
    }

    // =========================================================================
    // Metas Tests
    // =========================================================================

    #[test]
    fn test_set_meta_keeps_other_keys() {
        let mut record = Record::new("test");
        record.set_meta("owner", "alice").unwrap();
        record.set_meta("status", "draft").unwrap();
        record.set_meta("status", "final").unwrap();

        assert_eq!(record.meta("owner").unwrap().as_deref(), Some("alice"));
        assert_eq!(record.meta("status").unwrap().as_deref(), Some("final"));
        assert_eq!(record.meta("missing").unwrap(), None);
    }

    #[test]
    fn test_upsert_metas_merges() {
        let mut record = Record::new("test");
        record
            .set_metas(&BTreeMap::from([
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]))
            .unwrap();
        record
            .upsert_metas(&BTreeMap::from([
                ("b".to_string(), "20".to_string()),
                ("c".to_string(), "30".to_string()),
            ]))
            .unwrap();

        let metas = record.metas().unwrap();
        assert_eq!(metas.len(), 3);
        assert_eq!(metas["a"], "1");
        assert_eq!(metas["b"], "20");
        assert_eq!(metas["c"], "30");
    }

    #[test]
    fn test_set_metas_replaces() {
        let mut record = Record::new("test");
        record.set_meta("a", "1").unwrap();
        record
            .set_metas(&BTreeMap::from([("b".to_string(), "2".to_string())]))
            .unwrap();
        assert_eq!(record.meta("a").unwrap(), None);
        assert_eq!(record.metas_raw(), r#"{"b":"2"}"#);
    }

    #[test]
    fn test_metas_must_be_string_map() {
        let mut record = Record::new("test");
        record.set_metas_raw(r#"{"a":1}"#);
        assert!(record.metas().is_err());
        assert!(record.set_meta("b", "2").is_err());
    }

    // =========================================================================
    // Soft Delete Tests
    // =========================================================================

    #[test]
    fn test_is_soft_deleted_at() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut record = Record::new("test");
        assert!(!record.is_soft_deleted_at(now));

        record.set_soft_deleted_at(now);
        assert!(!record.is_soft_deleted_at(now));
        assert!(record.is_soft_deleted_at(now + Duration::microseconds(1)));

        record.set_soft_deleted_at(now + Duration::days(1));
        assert!(!record.is_soft_deleted_at(now));
    }

    #[test]
    fn test_record_serialization_uses_camel_case() {
        let record = Record::new("note").with_id("r1");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], "r1");
        assert_eq!(value["type"], "note");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("softDeletedAt").is_some());
    }
}
