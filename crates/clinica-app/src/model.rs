// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::HospitalId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Patients,
    Staff,
    Contracts,
    Specialties,
    AttentionTypes,
    Visits,
    Experience,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Patients,
        Self::Staff,
        Self::Contracts,
        Self::Specialties,
        Self::AttentionTypes,
        Self::Visits,
        Self::Experience,
    ];

    /// Collection segment under `/api`.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Patients => "pacientes",
            Self::Staff => "personal-medico",
            Self::Contracts => "contratos",
            Self::Specialties => "especialidades",
            Self::AttentionTypes => "tipos-atencion",
            Self::Visits => "atenciones",
            Self::Experience => "experiencias",
        }
    }

    /// Key holding the record array in list and search responses.
    pub const fn list_key(self) -> &'static str {
        match self {
            Self::Patients => "pacientes",
            Self::Staff => "personal_medico",
            Self::Contracts => "contratos",
            Self::Specialties => "especialidades",
            Self::AttentionTypes => "tipos_atencion",
            Self::Visits => "atenciones",
            Self::Experience => "experiencias",
        }
    }

    /// Key holding the record in single-record responses.
    pub const fn item_key(self) -> &'static str {
        match self {
            Self::Patients => "paciente",
            Self::Staff => "personal",
            Self::Contracts => "contrato",
            Self::Specialties => "especialidad",
            Self::AttentionTypes => "tipo_atencion",
            Self::Visits => "atencion",
            Self::Experience => "experiencia",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Patients => "pacientes",
            Self::Staff => "personal médico",
            Self::Contracts => "contratos",
            Self::Specialties => "especialidades",
            Self::AttentionTypes => "tipos de atención",
            Self::Visits => "atenciones",
            Self::Experience => "experiencias",
        }
    }

    /// Accepts the collection path or the list key, e.g. `personal-medico`
    /// or `personal_medico`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.path() == value || kind.list_key() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TabKind {
    Dashboard,
    Entity(EntityKind),
}

impl TabKind {
    pub const ALL: [Self; 8] = [
        Self::Dashboard,
        Self::Entity(EntityKind::Patients),
        Self::Entity(EntityKind::Staff),
        Self::Entity(EntityKind::Contracts),
        Self::Entity(EntityKind::Specialties),
        Self::Entity(EntityKind::AttentionTypes),
        Self::Entity(EntityKind::Visits),
        Self::Entity(EntityKind::Experience),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "inicio",
            Self::Entity(EntityKind::Patients) => "pacientes",
            Self::Entity(EntityKind::Staff) => "personal",
            Self::Entity(EntityKind::Contracts) => "contratos",
            Self::Entity(EntityKind::Specialties) => "especialidades",
            Self::Entity(EntityKind::AttentionTypes) => "tipos",
            Self::Entity(EntityKind::Visits) => "atenciones",
            Self::Entity(EntityKind::Experience) => "experiencia",
        }
    }

    pub const fn entity(self) -> Option<EntityKind> {
        match self {
            Self::Dashboard => None,
            Self::Entity(kind) => Some(kind),
        }
    }
}

/// Backend site that answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Quito,
    Guayaquil,
}

impl Node {
    pub const ALL: [Self; 2] = [Self::Quito, Self::Guayaquil];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quito => "quito",
            Self::Guayaquil => "guayaquil",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quito" => Some(Self::Quito),
            "guayaquil" => Some(Self::Guayaquil),
            _ => None,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Quito => "Quito",
            Self::Guayaquil => "Guayaquil",
        }
    }

    /// Host label shown next to the node in page headers.
    pub const fn host_label(self) -> &'static str {
        match self {
            Self::Quito => "Quito (ASUSVIVOBOOK)",
            Self::Guayaquil => "Guayaquil (DESKTOP-5U7KKBV)",
        }
    }

    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Quito => "success",
            Self::Guayaquil => "info",
        }
    }

    pub const fn hospital(self) -> HospitalId {
        match self {
            Self::Quito => HospitalId::new(1),
            Self::Guayaquil => HospitalId::new(2),
        }
    }

    /// Hospital 1 is Quito; every other hospital id renders as Guayaquil.
    pub const fn for_hospital(hospital: HospitalId) -> Self {
        if hospital.get() == 1 {
            Self::Quito
        } else {
            Self::Guayaquil
        }
    }

    /// Inclusive range of staff ids owned by this node.
    pub const fn staff_range(self) -> (i64, i64) {
        match self {
            Self::Quito => (1, 10),
            Self::Guayaquil => (11, 20),
        }
    }
}

/// One row as the backend sent it, keyed by exact wire field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Non-object payloads become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_owned(), value);
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Integer view of a field; numeric strings are accepted.
    pub fn integer(&self, field: &str) -> Option<i64> {
        match self.get(field)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Display text for a field, empty when missing or null.
    pub fn text(&self, field: &str) -> String {
        match self.get(field) {
            None => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(Value::Bool(flag)) => if *flag { "sí" } else { "no" }.to_owned(),
            Some(other) => other.to_string(),
        }
    }

    pub fn hospital(&self) -> Option<HospitalId> {
        self.integer("ID_Hospital").map(HospitalId::new)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
    Form,
    Confirm,
}
