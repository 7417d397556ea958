// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fixture records and an in-memory backend for console and CLI tests.

use anyhow::{Result, anyhow};
use clinica_app::schema::{Identity, schema};
use clinica_app::{
    ApiError, Backend, EntityKind, HospitalStats, ListPage, Node, NodeStats, Record, RecordKey,
    WriteOutcome,
};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// Seeded rows for `kind`, as the Quito node would return them.
pub fn sample_records(kind: EntityKind) -> Vec<Record> {
    let rows = match kind {
        EntityKind::Patients => json!([
            {"ID_Hospital": 1, "ID_Paciente": 1, "Nombre": "Ana", "Apellido": "Paredes",
             "Direccion": "Av. Amazonas 120", "FechaNacimiento": "14/02/1988", "Sexo": "F",
             "Telefono": "0991234567"},
            {"ID_Hospital": 1, "ID_Paciente": 2, "Nombre": "Luis", "Apellido": "Mora",
             "Direccion": null, "FechaNacimiento": "03/11/1975", "Sexo": "M", "Telefono": ""},
            {"ID_Hospital": 1, "ID_Paciente": 3, "Nombre": "Marta", "Apellido": "Vera",
             "Direccion": "Calle Olmedo 45", "FechaNacimiento": "22/07/2001", "Sexo": "F",
             "Telefono": "0987654321"},
        ]),
        EntityKind::Staff => json!([
            {"ID_Hospital": 1, "ID_Personal": 1, "ID_Especialidad": 1, "Nombre": "Rosa",
             "Apellido": "León", "Teléfono": "022345678"},
            {"ID_Hospital": 1, "ID_Personal": 5, "ID_Especialidad": 2, "Nombre": "Iván",
             "Apellido": "Cruz", "Teléfono": null},
        ]),
        EntityKind::Contracts => json!([
            {"ID_Hospital": 1, "ID_Personal": 1, "Salario": 2100.0, "Fecha_Contrato": "01/03/2020"},
            {"ID_Hospital": 1, "ID_Personal": 5, "Salario": 1850.5, "Fecha_Contrato": null},
        ]),
        EntityKind::Specialties => json!([
            {"ID_Especialidad": 1, "Área": "Cardiología"},
            {"ID_Especialidad": 2, "Área": "Pediatría"},
        ]),
        EntityKind::AttentionTypes => json!([
            {"ID_Tipo": 1, "Tipo": "Consulta externa"},
            {"ID_Tipo": 2, "Tipo": "Emergencia"},
        ]),
        EntityKind::Visits => json!([
            {"ID_Hospital": 1, "ID_Atención": 10, "ID_Paciente": 1, "ID_Personal": 1,
             "ID_Tipo": 1, "Fecha": "05/01/2024", "Diagnostico": "Hipertensión",
             "Descripción": "Control mensual", "Tratamiento": "Losartán"},
            {"ID_Hospital": 1, "ID_Atención": 11, "ID_Paciente": 3, "ID_Personal": 5,
             "ID_Tipo": 2, "Fecha": "18/02/2024", "Diagnostico": "Fractura",
             "Descripción": "Caída en casa", "Tratamiento": "Yeso"},
        ]),
        EntityKind::Experience => json!([
            {"ID_Hospital": 1, "ID_Personal": 1, "Cargo": "Jefe de área", "Años_exp": 12},
            {"ID_Hospital": 1, "ID_Personal": 5, "Cargo": "Residente", "Años_exp": 2},
        ]),
    };
    match rows {
        Value::Array(items) => items.into_iter().map(Record::from_value).collect(),
        _ => Vec::new(),
    }
}

/// JSON body of a list response, as the REST API sends it.
pub fn list_body(kind: EntityKind, records: &[Record], node: Node) -> String {
    let mut body = Map::new();
    body.insert("success".to_owned(), Value::Bool(true));
    body.insert(
        kind.list_key().to_owned(),
        Value::Array(
            records
                .iter()
                .map(|record| Value::Object(record.fields().clone()))
                .collect(),
        ),
    );
    body.insert("total".to_owned(), json!(records.len()));
    body.insert("node".to_owned(), json!(node.as_str()));
    Value::Object(body).to_string()
}

pub fn error_body(message: &str) -> String {
    json!({"success": false, "error": message}).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Search,
    Fetch,
    Create,
    Update,
    Delete,
    Stats,
}

/// One request the fake backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub kind: Option<EntityKind>,
    pub detail: String,
}

#[derive(Debug, Default)]
struct FakeState {
    node: Option<Node>,
    collections: BTreeMap<EntityKind, Vec<Record>>,
    failures: VecDeque<(Operation, ApiError)>,
    calls: Vec<Call>,
}

/// In-memory backend that behaves like the REST API for one node.
///
/// Clones share state, so a clone can be moved into a worker thread while
/// the test keeps inspecting calls.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new(node: Node) -> Self {
        let backend = Self::default();
        backend.lock().node = Some(node);
        backend
    }

    /// Backend preloaded with [`sample_records`] for every entity.
    pub fn seeded(node: Node) -> Self {
        let backend = Self::new(node);
        for kind in EntityKind::ALL {
            backend.insert_all(kind, sample_records(kind));
        }
        backend
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn insert_all(&self, kind: EntityKind, records: Vec<Record>) {
        self.lock()
            .collections
            .entry(kind)
            .or_default()
            .extend(records);
    }

    pub fn records(&self, kind: EntityKind) -> Vec<Record> {
        self.lock()
            .collections
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// The next call of `operation` fails with `error`.
    pub fn fail_next(&self, operation: Operation, error: ApiError) {
        self.lock().failures.push_back((operation, error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    pub fn find(&self, kind: EntityKind, key: &RecordKey) -> Result<Record> {
        let schema = schema(kind);
        self.records(kind)
            .into_iter()
            .find(|record| schema.key_of(record).as_ref() == Some(key))
            .ok_or_else(|| anyhow!("{} {key} not found", kind.path()))
    }

    fn begin(
        &self,
        operation: Operation,
        kind: Option<EntityKind>,
        detail: String,
    ) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(Call {
            operation,
            kind,
            detail,
        });
        if let Some(position) = state.failures.iter().position(|(op, _)| *op == operation)
            && let Some((_, error)) = state.failures.remove(position)
        {
            return Err(error);
        }
        Ok(state)
    }
}

fn page(records: Vec<Record>, node: Option<Node>) -> ListPage {
    ListPage {
        total: Some(records.len()),
        records,
        node,
    }
}

fn next_id(records: &[Record], field: &str) -> i64 {
    records
        .iter()
        .filter_map(|record| record.integer(field))
        .max()
        .unwrap_or(0)
        + 1
}

/// Copies payload values onto record fields, mapping payload keys back to
/// the record's field names.
fn merge_payload(kind: EntityKind, record: &mut Record, payload: &Map<String, Value>) {
    for field in schema(kind).fields {
        if let Some(payload_key) = field.payload_key
            && let Some(value) = payload.get(payload_key)
        {
            record.set(field.key, value.clone());
        }
    }
}

impl Backend for FakeBackend {
    fn list(&self, kind: EntityKind) -> Result<ListPage, ApiError> {
        let state = self.begin(Operation::List, Some(kind), kind.path().to_owned())?;
        let records = state.collections.get(&kind).cloned().unwrap_or_default();
        Ok(page(records, state.node))
    }

    fn search(&self, kind: EntityKind, term: &str) -> Result<ListPage, ApiError> {
        let state = self.begin(Operation::Search, Some(kind), term.to_owned())?;
        let needle = term.trim().to_lowercase();
        let records = state
            .collections
            .get(&kind)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        record.fields().keys().any(|field| {
                            record.text(field).to_lowercase().contains(&needle)
                        })
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(page(records, state.node))
    }

    fn fetch(&self, kind: EntityKind, key: &RecordKey) -> Result<Record, ApiError> {
        let state = self.begin(Operation::Fetch, Some(kind), key.to_string())?;
        let schema = schema(kind);
        state
            .collections
            .get(&kind)
            .and_then(|records| {
                records
                    .iter()
                    .find(|record| schema.key_of(record).as_ref() == Some(key))
            })
            .cloned()
            .ok_or_else(|| ApiError::server(format!("{} no encontrado", schema.singular)))
    }

    fn create(
        &self,
        kind: EntityKind,
        payload: &Map<String, Value>,
    ) -> Result<WriteOutcome, ApiError> {
        let detail = Value::Object(payload.clone()).to_string();
        let mut state = self.begin(Operation::Create, Some(kind), detail)?;
        let hospital = state.node.unwrap_or(Node::Quito).hospital().get();
        let records = state.collections.entry(kind).or_default();

        let mut record = Record::default();
        merge_payload(kind, &mut record, payload);
        let mut outcome = WriteOutcome::default();
        match schema(kind).identity {
            Identity::Composite { hospital: field, id } => {
                record.set(field, json!(hospital));
                if record.integer(id).is_none() {
                    record.set(id, json!(next_id(records, id)));
                }
                outcome.id_hospital = Some(hospital);
                if id == "ID_Personal" {
                    outcome.id_personal = record.integer(id);
                }
            }
            Identity::Global(id) => record.set(id, json!(next_id(records, id))),
        }
        records.push(record);
        Ok(outcome)
    }

    fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        payload: &Map<String, Value>,
    ) -> Result<WriteOutcome, ApiError> {
        let detail = format!("{key} {}", Value::Object(payload.clone()));
        let mut state = self.begin(Operation::Update, Some(kind), detail)?;
        let schema = schema(kind);
        let record = state
            .collections
            .get_mut(&kind)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|record| schema.key_of(record).as_ref() == Some(key))
            })
            .ok_or_else(|| ApiError::server(format!("{} no encontrado", schema.singular)))?;
        merge_payload(kind, record, payload);
        Ok(WriteOutcome::default())
    }

    fn delete(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        suffix: Option<&str>,
    ) -> Result<WriteOutcome, ApiError> {
        let detail = match suffix {
            Some(suffix) => format!("{key}/{suffix}"),
            None => key.to_string(),
        };
        let mut state = self.begin(Operation::Delete, Some(kind), detail)?;
        let schema = schema(kind);
        let records = state.collections.entry(kind).or_default();
        let before = records.len();
        records.retain(|record| {
            let same_key = schema.key_of(record).as_ref() == Some(key);
            let same_suffix = match (schema.delete_suffix_field, suffix) {
                (Some(field), Some(suffix)) => record.text(field) == suffix,
                _ => true,
            };
            !(same_key && same_suffix)
        });
        if records.len() == before {
            return Err(ApiError::server(format!("{} no encontrado", schema.singular)));
        }
        Ok(WriteOutcome::default())
    }

    fn stats(&self) -> Result<HospitalStats, ApiError> {
        let state = self.begin(Operation::Stats, None, String::new())?;
        let count = |kind: EntityKind, hospital: Option<i64>| -> u64 {
            state
                .collections
                .get(&kind)
                .map(|records| {
                    records
                        .iter()
                        .filter(|record| {
                            hospital.is_none_or(|id| record.integer("ID_Hospital") == Some(id))
                        })
                        .count() as u64
                })
                .unwrap_or(0)
        };
        let node = |hospital: i64| NodeStats {
            pacientes: count(EntityKind::Patients, Some(hospital)),
            citas: count(EntityKind::Visits, Some(hospital)),
            personal_medico: count(EntityKind::Staff, Some(hospital)),
        };
        Ok(HospitalStats {
            total_pacientes: count(EntityKind::Patients, None),
            total_citas: count(EntityKind::Visits, None),
            total_personal: count(EntityKind::Staff, None),
            total_especialidades: count(EntityKind::Specialties, None),
            quito: node(1),
            guayaquil: node(2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FakeBackend, Operation, list_body, sample_records};
    use clinica_app::schema::schema;
    use clinica_app::{ApiError, Backend, EntityKind, Node, RecordKey};
    use serde_json::{Map, Value, json};

    #[test]
    fn every_fixture_row_has_an_identity() {
        for kind in EntityKind::ALL {
            let records = sample_records(kind);
            assert!(!records.is_empty(), "{kind:?}");
            assert!(
                records.iter().all(|record| schema(kind).key_of(record).is_some()),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn list_body_uses_entity_list_key() -> anyhow::Result<()> {
        let body = list_body(EntityKind::Staff, &sample_records(EntityKind::Staff), Node::Quito);
        let parsed: Value = serde_json::from_str(&body)?;
        assert_eq!(parsed["total"], json!(2));
        assert_eq!(parsed["node"], json!("quito"));
        assert!(parsed["personal_medico"].is_array());
        Ok(())
    }

    #[test]
    fn create_assigns_next_id_on_active_node() -> anyhow::Result<()> {
        let backend = FakeBackend::seeded(Node::Guayaquil);
        let mut payload = Map::new();
        payload.insert("Nombre".to_owned(), json!("Eva"));
        payload.insert("ID_Especialidad".to_owned(), json!(1));

        let outcome = backend.create(EntityKind::Staff, &payload)?;
        assert_eq!(outcome.id_hospital, Some(2));
        assert_eq!(outcome.id_personal, Some(6));
        let created = backend.find(EntityKind::Staff, &RecordKey::composite(2, 6))?;
        assert_eq!(created.text("Nombre"), "Eva");
        Ok(())
    }

    #[test]
    fn scripted_failure_hits_only_the_next_matching_call() {
        let backend = FakeBackend::seeded(Node::Quito);
        backend.fail_next(Operation::Delete, ApiError::server("en uso"));

        assert!(backend.list(EntityKind::Staff).is_ok());
        let error = backend
            .delete(EntityKind::Staff, &RecordKey::composite(1, 5), None)
            .expect_err("scripted failure");
        assert_eq!(error.to_string(), "en uso");
        assert!(
            backend
                .delete(EntityKind::Staff, &RecordKey::composite(1, 5), None)
                .is_ok()
        );
        assert_eq!(backend.count(Operation::Delete), 2);
    }

    #[test]
    fn update_maps_payload_keys_back_to_record_fields() -> anyhow::Result<()> {
        let backend = FakeBackend::seeded(Node::Quito);
        let key = RecordKey::composite(1, 5);
        let mut payload = Map::new();
        payload.insert("salario".to_owned(), json!(1999.0));

        backend.update(EntityKind::Contracts, &key, &payload)?;
        let contract = backend.find(EntityKind::Contracts, &key)?;
        assert_eq!(contract.text("Salario"), "1999.0");
        Ok(())
    }

    #[test]
    fn stats_count_rows_per_hospital() -> anyhow::Result<()> {
        let backend = FakeBackend::seeded(Node::Quito);
        let stats = backend.stats()?;
        assert_eq!(stats.total_pacientes, 3);
        assert_eq!(stats.quito.pacientes, 3);
        assert_eq!(stats.guayaquil.pacientes, 0);
        assert_eq!(stats.total_especialidades, 2);
        Ok(())
    }
}
