// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::stats::HospitalStats;
use crate::{EntityKind, Node, Record, RecordKey};

/// Records from a list or search response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub records: Vec<Record>,
    pub total: Option<usize>,
    pub node: Option<Node>,
}

/// Body of a successful create, update or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub message: Option<String>,
    pub id_hospital: Option<i64>,
    pub id_personal: Option<i64>,
}

/// REST backend as seen by the controllers.
///
/// Every call is a single request/response; implementations must not retry.
pub trait Backend {
    fn list(&self, kind: EntityKind) -> Result<ListPage, ApiError>;

    fn search(&self, kind: EntityKind, term: &str) -> Result<ListPage, ApiError>;

    fn fetch(&self, kind: EntityKind, key: &RecordKey) -> Result<Record, ApiError>;

    fn create(&self, kind: EntityKind, payload: &Map<String, Value>)
    -> Result<WriteOutcome, ApiError>;

    fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        payload: &Map<String, Value>,
    ) -> Result<WriteOutcome, ApiError>;

    /// `suffix` is an extra trailing path segment (experience rows carry
    /// their role there).
    fn delete(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        suffix: Option<&str>,
    ) -> Result<WriteOutcome, ApiError>;

    fn stats(&self) -> Result<HospitalStats, ApiError>;
}
