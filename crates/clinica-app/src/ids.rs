// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hospital number as the backend sends it in `ID_Hospital`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HospitalId(i64);

impl HospitalId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for HospitalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one record as the backend addresses it.
///
/// Node-partitioned entities are keyed by `(hospital, id)`; specialties and
/// attention types live in a single global catalog keyed by id alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    Composite { hospital: HospitalId, id: i64 },
    Global(i64),
}

impl RecordKey {
    pub const fn composite(hospital: i64, id: i64) -> Self {
        Self::Composite {
            hospital: HospitalId::new(hospital),
            id,
        }
    }

    pub const fn hospital(&self) -> Option<HospitalId> {
        match self {
            Self::Composite { hospital, .. } => Some(*hospital),
            Self::Global(_) => None,
        }
    }

    pub const fn id(&self) -> i64 {
        match self {
            Self::Composite { id, .. } | Self::Global(id) => *id,
        }
    }

    /// Path segments after the entity collection, e.g. `["1", "5"]`.
    pub fn path_segments(&self) -> Vec<String> {
        match self {
            Self::Composite { hospital, id } => vec![hospital.to_string(), id.to_string()],
            Self::Global(id) => vec![id.to_string()],
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite { hospital, id } => write!(f, "{hospital}/{id}"),
            Self::Global(id) => write!(f, "{id}"),
        }
    }
}
