// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Declarative description of every entity the console manages.
//!
//! One [`EntityListController`](crate::EntityListController) is driven by
//! these tables; there is no per-entity controller code.

use crate::{EntityKind, Record, RecordKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    /// `YYYY-MM-DD` in forms; lists may carry `dd/mm/yyyy`.
    Date,
    /// Fixed choices as `(wire value, label)` pairs.
    Choice(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Editable in both create and edit.
    Editable,
    /// Server-assigned identity: hidden on create, shown disabled on edit.
    Identity,
    /// Entered on create, shown disabled on edit.
    LockedOnEdit,
    /// Only part of the create form.
    CreateOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name in records returned by the backend.
    pub key: &'static str,
    /// Field name in write payloads; `None` keeps the value out of payloads.
    pub payload_key: Option<&'static str>,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub role: FieldRole,
}

impl FieldSpec {
    const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            payload_key: Some(key),
            label,
            kind,
            required: false,
            role: FieldRole::Editable,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn role(mut self, role: FieldRole) -> Self {
        self.role = role;
        self
    }

    const fn identity(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            payload_key: None,
            label,
            kind: FieldKind::Integer,
            required: false,
            role: FieldRole::Identity,
        }
    }

    const fn payload_as(mut self, payload_key: &'static str) -> Self {
        self.payload_key = Some(payload_key);
        self
    }

    pub const fn shown_on_create(&self) -> bool {
        !matches!(self.role, FieldRole::Identity)
    }

    pub const fn shown_on_edit(&self) -> bool {
        !matches!(self.role, FieldRole::CreateOnly)
    }

    pub const fn editable_on_edit(&self) -> bool {
        matches!(self.role, FieldRole::Editable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
    /// Shown when the field is missing, null or empty.
    pub placeholder: &'static str,
    /// Appended to non-empty values, e.g. `" años"`.
    pub suffix: &'static str,
    /// Identity columns render bold and centered.
    pub strong: bool,
}

impl ColumnSpec {
    const fn new(key: &'static str, header: &'static str) -> Self {
        Self {
            key,
            header,
            placeholder: "N/A",
            suffix: "",
            strong: false,
        }
    }

    const fn strong(mut self) -> Self {
        self.strong = true;
        self
    }

    const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    const fn suffix(mut self, suffix: &'static str) -> Self {
        self.suffix = suffix;
        self
    }

    pub fn display(&self, record: &Record) -> String {
        let value = record.text(self.key);
        let value = value.trim();
        if value.is_empty() {
            self.placeholder.to_owned()
        } else {
            format!("{value}{}", self.suffix)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    Equals,
    ContainsIgnoreCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChoices {
    Fixed(&'static [(&'static str, &'static str)]),
    /// Distinct values observed in the loaded collection.
    Observed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub field: &'static str,
    pub label: &'static str,
    pub rule: MatchRule,
    pub choices: FilterChoices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// `GET /api/{path}/search?q=`.
    Server,
    /// Case-insensitive substring over the listed fields, no request.
    Local(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Singular noun used in messages, e.g. `"paciente"`.
    pub singular: &'static str,
    /// `(hospital field, id field)` or just the id field for global catalogs.
    pub identity: Identity,
    pub columns: &'static [ColumnSpec],
    pub fields: &'static [FieldSpec],
    pub filters: &'static [FilterSpec],
    pub search: SearchMode,
    pub can_create: bool,
    pub can_delete: bool,
    /// Message shown when create or delete is refused.
    pub locked_message: &'static str,
    /// Fetch the single record before opening the edit form.
    pub fetch_before_edit: bool,
    /// Field whose value must fall inside the active node's staff range.
    pub staff_range_field: Option<&'static str>,
    /// Field appended to the delete path.
    pub delete_suffix_field: Option<&'static str>,
    pub empty_message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Composite {
        hospital: &'static str,
        id: &'static str,
    },
    Global(&'static str),
}

impl EntitySchema {
    pub fn key_of(&self, record: &Record) -> Option<RecordKey> {
        match self.identity {
            Identity::Composite { hospital, id } => Some(RecordKey::composite(
                record.integer(hospital)?,
                record.integer(id)?,
            )),
            Identity::Global(id) => record.integer(id).map(RecordKey::Global),
        }
    }

    pub const fn is_node_partitioned(&self) -> bool {
        matches!(self.identity, Identity::Composite { .. })
    }

    /// Header count of the rendered table: data columns, node badge when
    /// partitioned, and the actions column.
    pub const fn column_count(&self) -> usize {
        let node = if self.is_node_partitioned() { 1 } else { 0 };
        self.columns.len() + node + 1
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

const SEX: &[(&str, &str)] = &[("M", "Masculino"), ("F", "Femenino")];
const HOSPITALS: &[(&str, &str)] = &[("1", "Quito"), ("2", "Guayaquil")];

const HOSPITAL_FILTER: FilterSpec = FilterSpec {
    field: "ID_Hospital",
    label: "hospital",
    rule: MatchRule::Equals,
    choices: FilterChoices::Fixed(HOSPITALS),
};

static PATIENTS: EntitySchema = EntitySchema {
    kind: EntityKind::Patients,
    singular: "paciente",
    identity: Identity::Composite {
        hospital: "ID_Hospital",
        id: "ID_Paciente",
    },
    columns: &[
        ColumnSpec::new("ID_Hospital", "Hospital").strong(),
        ColumnSpec::new("ID_Paciente", "ID").strong(),
        ColumnSpec::new("Nombre", "Nombre"),
        ColumnSpec::new("Apellido", "Apellido"),
        ColumnSpec::new("FechaNacimiento", "Nacimiento"),
        ColumnSpec::new("Sexo", "Sexo"),
        ColumnSpec::new("Direccion", "Dirección").placeholder("Sin dirección"),
        ColumnSpec::new("Telefono", "Teléfono").placeholder("Sin teléfono"),
    ],
    fields: &[
        FieldSpec::identity("ID_Hospital", "Hospital"),
        FieldSpec::identity("ID_Paciente", "ID Paciente"),
        FieldSpec::new("Nombre", "Nombre", FieldKind::Text).required(),
        FieldSpec::new("Apellido", "Apellido", FieldKind::Text).required(),
        FieldSpec::new("Direccion", "Dirección", FieldKind::Text),
        FieldSpec::new("FechaNacimiento", "Fecha de nacimiento", FieldKind::Date).required(),
        FieldSpec::new("Sexo", "Sexo", FieldKind::Choice(SEX)).required(),
        FieldSpec::new("Telefono", "Teléfono", FieldKind::Text),
    ],
    filters: &[
        HOSPITAL_FILTER,
        FilterSpec {
            field: "Sexo",
            label: "sexo",
            rule: MatchRule::Equals,
            choices: FilterChoices::Fixed(SEX),
        },
    ],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: true,
    staff_range_field: None,
    delete_suffix_field: None,
    empty_message: "No hay pacientes disponibles",
};

static STAFF: EntitySchema = EntitySchema {
    kind: EntityKind::Staff,
    singular: "personal médico",
    identity: Identity::Composite {
        hospital: "ID_Hospital",
        id: "ID_Personal",
    },
    columns: &[
        ColumnSpec::new("ID_Hospital", "Hospital").strong(),
        ColumnSpec::new("ID_Personal", "ID").strong(),
        ColumnSpec::new("ID_Especialidad", "Especialidad"),
        ColumnSpec::new("Nombre", "Nombre"),
        ColumnSpec::new("Apellido", "Apellido"),
        ColumnSpec::new("Teléfono", "Teléfono").placeholder("Sin teléfono"),
    ],
    fields: &[
        FieldSpec::identity("ID_Hospital", "Hospital"),
        FieldSpec::identity("ID_Personal", "ID Personal"),
        FieldSpec::new("ID_Especialidad", "ID Especialidad", FieldKind::Integer).required(),
        FieldSpec::new("Nombre", "Nombre", FieldKind::Text).required(),
        FieldSpec::new("Apellido", "Apellido", FieldKind::Text).required(),
        FieldSpec::new("Teléfono", "Teléfono", FieldKind::Text),
        FieldSpec::new("Salario", "Salario del contrato", FieldKind::Decimal)
            .role(FieldRole::CreateOnly),
        FieldSpec::new("Fecha_Contrato", "Fecha del contrato", FieldKind::Date)
            .role(FieldRole::CreateOnly),
    ],
    filters: &[HOSPITAL_FILTER],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: false,
    staff_range_field: None,
    delete_suffix_field: None,
    empty_message: "No hay personal médico disponible",
};

static CONTRACTS: EntitySchema = EntitySchema {
    kind: EntityKind::Contracts,
    singular: "contrato",
    identity: Identity::Composite {
        hospital: "ID_Hospital",
        id: "ID_Personal",
    },
    columns: &[
        ColumnSpec::new("ID_Hospital", "Hospital").strong(),
        ColumnSpec::new("ID_Personal", "ID Personal").strong(),
        ColumnSpec::new("Salario", "Salario"),
        ColumnSpec::new("Fecha_Contrato", "Fecha de contrato").placeholder("Sin fecha"),
    ],
    fields: &[
        FieldSpec::identity("ID_Hospital", "Hospital").payload_as("id_hospital"),
        FieldSpec::identity("ID_Personal", "ID Personal").payload_as("id_personal"),
        FieldSpec::new("Salario", "Salario", FieldKind::Decimal)
            .payload_as("salario")
            .required(),
        FieldSpec::new("Fecha_Contrato", "Fecha de contrato", FieldKind::Date)
            .payload_as("fecha_contrato"),
    ],
    filters: &[HOSPITAL_FILTER],
    search: SearchMode::Local(&["ID_Personal", "Salario"]),
    can_create: false,
    can_delete: false,
    locked_message: "La creación/eliminación de contratos está deshabilitada. \
                     Use el módulo Personal Médico para gestionar contratos.",
    fetch_before_edit: false,
    staff_range_field: None,
    delete_suffix_field: None,
    empty_message: "No hay contratos disponibles",
};

static SPECIALTIES: EntitySchema = EntitySchema {
    kind: EntityKind::Specialties,
    singular: "especialidad",
    identity: Identity::Global("ID_Especialidad"),
    columns: &[
        ColumnSpec::new("ID_Especialidad", "ID").strong(),
        ColumnSpec::new("Área", "Área"),
    ],
    fields: &[
        FieldSpec::identity("ID_Especialidad", "ID Especialidad"),
        FieldSpec::new("Área", "Área", FieldKind::Text).required(),
    ],
    filters: &[],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: false,
    staff_range_field: None,
    delete_suffix_field: None,
    empty_message: "No hay especialidades disponibles",
};

static ATTENTION_TYPES: EntitySchema = EntitySchema {
    kind: EntityKind::AttentionTypes,
    singular: "tipo de atención",
    identity: Identity::Global("ID_Tipo"),
    columns: &[
        ColumnSpec::new("ID_Tipo", "ID").strong(),
        ColumnSpec::new("Tipo", "Tipo"),
    ],
    fields: &[
        FieldSpec::identity("ID_Tipo", "ID Tipo"),
        FieldSpec::new("Tipo", "Tipo", FieldKind::Text).required(),
    ],
    filters: &[],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: false,
    staff_range_field: None,
    delete_suffix_field: None,
    empty_message: "No hay tipos de atención disponibles",
};

static VISITS: EntitySchema = EntitySchema {
    kind: EntityKind::Visits,
    singular: "atención médica",
    identity: Identity::Composite {
        hospital: "ID_Hospital",
        id: "ID_Atención",
    },
    columns: &[
        ColumnSpec::new("ID_Hospital", "Hospital").strong(),
        ColumnSpec::new("ID_Atención", "ID").strong(),
        ColumnSpec::new("ID_Paciente", "Paciente"),
        ColumnSpec::new("ID_Personal", "Personal"),
        ColumnSpec::new("ID_Tipo", "Tipo"),
        ColumnSpec::new("Fecha", "Fecha"),
        ColumnSpec::new("Diagnostico", "Diagnóstico"),
        ColumnSpec::new("Descripción", "Descripción"),
        ColumnSpec::new("Tratamiento", "Tratamiento"),
    ],
    fields: &[
        FieldSpec::identity("ID_Hospital", "Hospital"),
        FieldSpec::identity("ID_Atención", "ID Atención"),
        FieldSpec::new("ID_Personal", "ID Personal", FieldKind::Integer)
            .required()
            .role(FieldRole::LockedOnEdit),
        FieldSpec::new("ID_Paciente", "ID Paciente", FieldKind::Integer)
            .required()
            .role(FieldRole::LockedOnEdit),
        FieldSpec::new("ID_Tipo", "ID Tipo", FieldKind::Integer)
            .required()
            .role(FieldRole::LockedOnEdit),
        FieldSpec::new("Fecha", "Fecha", FieldKind::Date).required(),
        FieldSpec::new("Diagnostico", "Diagnóstico", FieldKind::Text).required(),
        FieldSpec::new("Descripción", "Descripción", FieldKind::Text).required(),
        FieldSpec::new("Tratamiento", "Tratamiento", FieldKind::Text).required(),
    ],
    filters: &[
        HOSPITAL_FILTER,
        FilterSpec {
            field: "ID_Tipo",
            label: "tipo",
            rule: MatchRule::Equals,
            choices: FilterChoices::Observed,
        },
    ],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: false,
    staff_range_field: Some("ID_Personal"),
    delete_suffix_field: None,
    empty_message: "No hay atenciones médicas disponibles",
};

static EXPERIENCE: EntitySchema = EntitySchema {
    kind: EntityKind::Experience,
    singular: "experiencia",
    identity: Identity::Composite {
        hospital: "ID_Hospital",
        id: "ID_Personal",
    },
    columns: &[
        ColumnSpec::new("ID_Hospital", "Hospital").strong(),
        ColumnSpec::new("ID_Personal", "ID Personal").strong(),
        ColumnSpec::new("Cargo", "Cargo").placeholder("Sin cargo"),
        ColumnSpec::new("Años_exp", "Experiencia").suffix(" años"),
    ],
    fields: &[
        FieldSpec::identity("ID_Hospital", "Hospital"),
        FieldSpec::new("ID_Personal", "ID Personal", FieldKind::Integer)
            .required()
            .role(FieldRole::LockedOnEdit),
        FieldSpec::new("Cargo", "Cargo", FieldKind::Text).required(),
        FieldSpec::new("Años_exp", "Años de experiencia", FieldKind::Integer).required(),
    ],
    filters: &[
        HOSPITAL_FILTER,
        FilterSpec {
            field: "Cargo",
            label: "cargo",
            rule: MatchRule::ContainsIgnoreCase,
            choices: FilterChoices::Observed,
        },
    ],
    search: SearchMode::Server,
    can_create: true,
    can_delete: true,
    locked_message: "",
    fetch_before_edit: false,
    staff_range_field: Some("ID_Personal"),
    delete_suffix_field: Some("Cargo"),
    empty_message: "No hay experiencias disponibles",
};

pub fn schema(kind: EntityKind) -> &'static EntitySchema {
    match kind {
        EntityKind::Patients => &PATIENTS,
        EntityKind::Staff => &STAFF,
        EntityKind::Contracts => &CONTRACTS,
        EntityKind::Specialties => &SPECIALTIES,
        EntityKind::AttentionTypes => &ATTENTION_TYPES,
        EntityKind::Visits => &VISITS,
        EntityKind::Experience => &EXPERIENCE,
    }
}
