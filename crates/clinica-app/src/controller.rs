// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::backend::{Backend, ListPage, WriteOutcome};
use crate::error::ApiError;
use crate::forms::{FormMode, FormState};
use crate::notify::Level;
use crate::schema::{EntitySchema, FilterChoices, FilterSpec, SearchMode, schema};
use crate::view::{EntityList, FilterClause, SearchHits, ViewQuery};
use crate::{EntityKind, Node, Record, RecordKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Notify { level: Level, message: String },
    ViewChanged,
    FormOpened,
    FormClosed,
    ConfirmOpened,
    ConfirmClosed,
    /// A response arrived after a newer request was dispatched.
    Discarded { ticket: u64 },
}

impl ControllerEvent {
    pub fn notify(level: Level, message: impl Into<String>) -> Self {
        Self::Notify {
            level,
            message: message.into(),
        }
    }
}

/// Monotonic request tickets; only the newest ticket may update state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSeq {
    last: u64,
}

impl RequestSeq {
    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.last
    }
}

/// Outcome of starting a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStep {
    /// Resolved without a request.
    Done(Vec<ControllerEvent>),
    /// The caller must run `Backend::search` and hand the result to
    /// [`EntityListController::finish_search`] with this ticket.
    Remote { ticket: u64, term: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub key: RecordKey,
    pub suffix: Option<String>,
    pub summary: String,
}

/// Current state of one structured filter, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterView {
    pub label: &'static str,
    pub selected: Option<String>,
    pub choices: Vec<(String, String)>,
}

/// Generic list/search/filter/CRUD lifecycle for one entity.
#[derive(Debug, Clone)]
pub struct EntityListController {
    schema: &'static EntitySchema,
    list: EntityList,
    search_term: String,
    /// Term of the server search still in flight, shown once it lands.
    pending_term: Option<(u64, String)>,
    hits: Option<SearchHits>,
    filters: Vec<Option<String>>,
    seq: RequestSeq,
    form: Option<FormState>,
    pending_delete: Option<PendingDelete>,
}

impl EntityListController {
    pub fn new(kind: EntityKind) -> Self {
        let schema = schema(kind);
        Self {
            schema,
            list: EntityList::new(schema),
            search_term: String::new(),
            pending_term: None,
            hits: None,
            filters: vec![None; schema.filters.len()],
            seq: RequestSeq::default(),
            form: None,
            pending_delete: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn list(&self) -> &EntityList {
        &self.list
    }

    pub fn node(&self) -> Option<Node> {
        self.list.node()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    fn query(&self) -> ViewQuery {
        let filters = self
            .schema
            .filters
            .iter()
            .zip(&self.filters)
            .filter_map(|(spec, selected)| {
                selected.as_ref().map(|value| FilterClause {
                    field: spec.field,
                    rule: spec.rule,
                    value: value.clone(),
                })
            })
            .collect();
        ViewQuery {
            hits: self.hits.clone(),
            filters,
        }
    }

    // Loading

    /// Takes a ticket; any search still in flight can no longer land.
    pub fn begin_load(&mut self) -> u64 {
        self.pending_term = None;
        self.seq.next()
    }

    pub fn load<B: Backend + ?Sized>(&mut self, backend: &B) -> Vec<ControllerEvent> {
        let ticket = self.begin_load();
        let result = backend.list(self.kind());
        self.finish_load(ticket, result)
    }

    /// Replaces the collection on success and resets search and filters, so
    /// every returned row is visible. A failure keeps the last good
    /// collection and view untouched.
    pub fn finish_load(
        &mut self,
        ticket: u64,
        result: Result<ListPage, ApiError>,
    ) -> Vec<ControllerEvent> {
        let kind = self.kind();
        if !self.seq.is_current(ticket) {
            debug!(entity = kind.path(), ticket, "discarding stale list response");
            return vec![ControllerEvent::Discarded { ticket }];
        }

        match result {
            Ok(page) => {
                self.reset_view();
                let dropped = self.list.replace(page.records, page.total, page.node);
                if dropped > 0 {
                    warn!(entity = kind.path(), dropped, "rows without identity dropped");
                }
                let node = self.list.node().map_or("nodo desconocido", Node::as_str);
                info!(entity = kind.path(), count = self.list.total(), node, "records loaded");
                vec![
                    ControllerEvent::ViewChanged,
                    ControllerEvent::notify(
                        Level::Success,
                        format!(
                            "Cargados {} registros de {} ({node})",
                            self.list.total(),
                            kind.label()
                        ),
                    ),
                ]
            }
            Err(error) => {
                warn!(entity = kind.path(), %error, "list request failed");
                vec![ControllerEvent::notify(
                    Level::Error,
                    format!("Error al cargar {}: {error}", kind.label()),
                )]
            }
        }
    }

    // Searching

    /// Records `term` and resolves everything that needs no request. Every
    /// call takes a ticket, so a clear or local search also invalidates any
    /// server search still in flight.
    pub fn begin_search(&mut self, term: &str) -> SearchStep {
        let ticket = self.seq.next();
        self.pending_term = None;
        let trimmed = term.trim();

        if trimmed.is_empty() {
            self.search_term.clear();
            self.hits = None;
            return SearchStep::Done(self.apply_filters());
        }

        match self.schema.search {
            SearchMode::Local(fields) => {
                self.search_term = trimmed.to_owned();
                self.hits = Some(SearchHits::Local {
                    term: trimmed.to_owned(),
                    fields,
                });
                SearchStep::Done(self.apply_filters())
            }
            SearchMode::Server => {
                self.pending_term = Some((ticket, trimmed.to_owned()));
                SearchStep::Remote {
                    ticket,
                    term: trimmed.to_owned(),
                }
            }
        }
    }

    pub fn finish_search(
        &mut self,
        ticket: u64,
        result: Result<ListPage, ApiError>,
    ) -> Vec<ControllerEvent> {
        let kind = self.kind();
        if !self.seq.is_current(ticket) {
            debug!(entity = kind.path(), ticket, "discarding stale search response");
            return vec![ControllerEvent::Discarded { ticket }];
        }

        let pending = self
            .pending_term
            .take()
            .filter(|(pending, _)| *pending == ticket);
        match result {
            Ok(page) => {
                if let Some((_, term)) = pending {
                    self.search_term = term;
                }
                let keys: BTreeSet<RecordKey> = page
                    .records
                    .iter()
                    .filter_map(|record| self.schema.key_of(record))
                    .collect();
                debug!(entity = kind.path(), hits = keys.len(), "search results");
                self.hits = Some(SearchHits::Keys(keys));
                self.apply_filters()
            }
            Err(error) => {
                warn!(entity = kind.path(), %error, "search request failed");
                vec![ControllerEvent::notify(
                    Level::Error,
                    format!("Error en la búsqueda: {error}"),
                )]
            }
        }
    }

    pub fn search<B: Backend + ?Sized>(&mut self, term: &str, backend: &B) -> Vec<ControllerEvent> {
        match self.begin_search(term) {
            SearchStep::Done(events) => events,
            SearchStep::Remote { ticket, term } => {
                let result = backend.search(self.kind(), &term);
                self.finish_search(ticket, result)
            }
        }
    }

    // Filtering

    fn choices(&self, spec: &FilterSpec) -> Vec<(String, String)> {
        match spec.choices {
            FilterChoices::Fixed(choices) => choices
                .iter()
                .map(|(value, label)| ((*value).to_owned(), (*label).to_owned()))
                .collect(),
            FilterChoices::Observed => self
                .list
                .observed_values(spec.field)
                .into_iter()
                .map(|value| (value.clone(), value))
                .collect(),
        }
    }

    pub fn filter_views(&self) -> Vec<FilterView> {
        self.schema
            .filters
            .iter()
            .zip(&self.filters)
            .map(|(spec, selected)| FilterView {
                label: spec.label,
                selected: selected.clone(),
                choices: self.choices(spec),
            })
            .collect()
    }

    pub fn set_filter(&mut self, slot: usize, value: Option<String>) -> Vec<ControllerEvent> {
        let Some(selected) = self.filters.get_mut(slot) else {
            return Vec::new();
        };
        *selected = value.filter(|value| !value.trim().is_empty());
        self.apply_filters()
    }

    /// Advances a filter through "all" and each of its choices.
    pub fn cycle_filter(&mut self, slot: usize) -> Vec<ControllerEvent> {
        let Some(spec) = self.schema.filters.get(slot) else {
            return Vec::new();
        };
        let choices = self.choices(spec);
        let current = self.filters[slot].as_deref();
        let next = match current.and_then(|value| choices.iter().position(|(v, _)| v == value)) {
            None => choices.first(),
            Some(index) => choices.get(index + 1),
        };
        let next = next.map(|(value, _)| value.clone());
        self.set_filter(slot, next)
    }

    fn reset_view(&mut self) {
        self.search_term.clear();
        self.pending_term = None;
        self.hits = None;
        self.filters.iter_mut().for_each(|selected| *selected = None);
    }

    /// Recomposes search hits and structured filters over `all`.
    pub fn apply_filters(&mut self) -> Vec<ControllerEvent> {
        let query = self.query();
        self.list.apply(&query);
        vec![ControllerEvent::ViewChanged]
    }

    // Rendering

    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers: Vec<&'static str> =
            self.schema.columns.iter().map(|column| column.header).collect();
        if self.schema.is_node_partitioned() {
            headers.push("Nodo");
        }
        headers.push("Acciones");
        headers
    }

    /// Visible rows as display strings, one per data column plus the node
    /// name for partitioned entities.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.list
            .filtered()
            .map(|record| {
                let mut cells: Vec<String> = self
                    .schema
                    .columns
                    .iter()
                    .map(|column| column.display(record))
                    .collect();
                if self.schema.is_node_partitioned() {
                    cells.push(
                        record
                            .hospital()
                            .map(|hospital| Node::for_hospital(hospital).display_name())
                            .unwrap_or("N/A")
                            .to_owned(),
                    );
                }
                cells
            })
            .collect()
    }

    /// `<tbody>` content for the current view.
    pub fn render(&self) -> askama::Result<String> {
        crate::html::render_rows(&self.list)
    }

    // Writing

    pub fn open_create(&mut self) -> Vec<ControllerEvent> {
        if !self.schema.can_create {
            return vec![ControllerEvent::notify(
                Level::Error,
                self.schema.locked_message,
            )];
        }
        self.form = Some(FormState::create(self.schema));
        vec![ControllerEvent::FormOpened]
    }

    /// Opens the edit form, fetching the record first when the entity asks
    /// for it.
    pub fn open_edit<B: Backend + ?Sized>(
        &mut self,
        key: &RecordKey,
        backend: &B,
    ) -> Vec<ControllerEvent> {
        if self.schema.fetch_before_edit {
            return match backend.fetch(self.kind(), key) {
                Ok(record) => self.edit_record(key.clone(), &record),
                Err(error) => {
                    warn!(entity = self.kind().path(), %key, %error, "fetch before edit failed");
                    vec![ControllerEvent::notify(
                        Level::Error,
                        format!("Error al cargar {}: {error}", self.schema.singular),
                    )]
                }
            };
        }
        match self.list.get(key).cloned() {
            Some(record) => self.edit_record(key.clone(), &record),
            None => vec![not_found(key)],
        }
    }

    pub fn open_edit_row<B: Backend + ?Sized>(
        &mut self,
        position: usize,
        backend: &B,
    ) -> Vec<ControllerEvent> {
        let Some((key, record)) = self.list.row(position) else {
            return Vec::new();
        };
        let (key, record) = (key.clone(), record.clone());
        if self.schema.fetch_before_edit {
            return self.open_edit(&key, backend);
        }
        self.edit_record(key, &record)
    }

    fn edit_record(&mut self, key: RecordKey, record: &Record) -> Vec<ControllerEvent> {
        self.form = Some(FormState::edit(self.schema, key, record));
        vec![ControllerEvent::FormOpened]
    }

    pub fn close_form(&mut self) -> Vec<ControllerEvent> {
        if self.form.take().is_some() {
            vec![ControllerEvent::FormClosed]
        } else {
            Vec::new()
        }
    }

    /// Validates the open form, sends it, and reloads on success. The form
    /// stays open on any failure.
    pub fn submit<B: Backend + ?Sized>(&mut self, backend: &B) -> Vec<ControllerEvent> {
        let kind = self.kind();
        let Some(form) = self.form.as_ref() else {
            return Vec::new();
        };
        let payload = match form.payload(self.list.node()) {
            Ok(payload) => payload,
            Err(error) => {
                debug!(entity = kind.path(), %error, "form rejected");
                return vec![ControllerEvent::notify(Level::Error, error.to_string())];
            }
        };

        let mode = form.mode().clone();
        let result = match &mode {
            FormMode::Create => backend.create(kind, &payload),
            FormMode::Edit(key) => backend.update(kind, key, &payload),
        };

        match result {
            Ok(outcome) => {
                info!(entity = kind.path(), ?mode, "record saved");
                self.form = None;
                let mut events = vec![
                    ControllerEvent::FormClosed,
                    ControllerEvent::notify(Level::Success, self.saved_message(&mode, &outcome)),
                ];
                events.extend(self.load(backend));
                events
            }
            Err(error) => {
                warn!(entity = kind.path(), %error, "save failed");
                vec![ControllerEvent::notify(
                    Level::Error,
                    format!("Error al guardar {}: {error}", self.schema.singular),
                )]
            }
        }
    }

    fn saved_message(&self, mode: &FormMode, outcome: &WriteOutcome) -> String {
        if let Some(message) = outcome.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return message.to_owned();
        }
        match mode {
            FormMode::Create => match (outcome.id_personal, outcome.id_hospital) {
                (Some(staff), Some(hospital)) => format!(
                    "Registro de {} creado con ID {staff} en Hospital {hospital}",
                    self.schema.singular
                ),
                _ => format!("Registro de {} creado exitosamente", self.schema.singular),
            },
            FormMode::Edit(_) => {
                format!("Registro de {} actualizado exitosamente", self.schema.singular)
            }
        }
    }

    // Deleting

    pub fn request_delete(&mut self, key: &RecordKey) -> Vec<ControllerEvent> {
        if !self.schema.can_delete {
            return vec![ControllerEvent::notify(
                Level::Error,
                self.schema.locked_message,
            )];
        }
        match self.list.get(key).cloned() {
            Some(record) => self.confirm(key.clone(), &record),
            None => vec![not_found(key)],
        }
    }

    pub fn request_delete_row(&mut self, position: usize) -> Vec<ControllerEvent> {
        if !self.schema.can_delete {
            return vec![ControllerEvent::notify(
                Level::Error,
                self.schema.locked_message,
            )];
        }
        let Some((key, record)) = self.list.row(position) else {
            return Vec::new();
        };
        let (key, record) = (key.clone(), record.clone());
        self.confirm(key, &record)
    }

    fn confirm(&mut self, key: RecordKey, record: &Record) -> Vec<ControllerEvent> {
        let suffix = self
            .schema
            .delete_suffix_field
            .map(|field| record.text(field));
        let detail: Vec<String> = self
            .schema
            .columns
            .iter()
            .filter(|column| !column.strong)
            .take(2)
            .map(|column| record.text(column.key))
            .filter(|text| !text.trim().is_empty())
            .collect();
        let summary = if detail.is_empty() {
            format!("{} {key}", self.schema.singular)
        } else {
            format!("{} {key} ({})", self.schema.singular, detail.join(" "))
        };
        self.pending_delete = Some(PendingDelete {
            key,
            suffix,
            summary,
        });
        vec![ControllerEvent::ConfirmOpened]
    }

    pub fn cancel_delete(&mut self) -> Vec<ControllerEvent> {
        if self.pending_delete.take().is_some() {
            vec![ControllerEvent::ConfirmClosed]
        } else {
            Vec::new()
        }
    }

    /// Sends the pending delete. Success reloads; failure leaves the
    /// collection exactly as it was.
    pub fn confirm_delete<B: Backend + ?Sized>(&mut self, backend: &B) -> Vec<ControllerEvent> {
        let kind = self.kind();
        let Some(pending) = self.pending_delete.take() else {
            return Vec::new();
        };

        match backend.delete(kind, &pending.key, pending.suffix.as_deref()) {
            Ok(outcome) => {
                info!(entity = kind.path(), key = %pending.key, "record deleted");
                let message = outcome.message.unwrap_or_else(|| {
                    format!("Registro de {} eliminado exitosamente", self.schema.singular)
                });
                let mut events = vec![
                    ControllerEvent::ConfirmClosed,
                    ControllerEvent::notify(Level::Success, message),
                ];
                events.extend(self.load(backend));
                events
            }
            Err(error) => {
                warn!(entity = kind.path(), key = %pending.key, %error, "delete failed");
                vec![
                    ControllerEvent::ConfirmClosed,
                    ControllerEvent::notify(
                        Level::Error,
                        format!("Error al eliminar {}: {error}", self.schema.singular),
                    ),
                ]
            }
        }
    }
}

fn not_found(key: &RecordKey) -> ControllerEvent {
    ControllerEvent::notify(Level::Error, format!("Registro {key} no encontrado"))
}

#[cfg(test)]
mod tests {
    use super::{ControllerEvent, EntityListController, SearchStep};
    use crate::backend::{Backend, ListPage, WriteOutcome};
    use crate::error::ApiError;
    use crate::notify::Level;
    use crate::stats::HospitalStats;
    use crate::{EntityKind, Node, Record, RecordKey};
    use serde_json::{Map, Value, json};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Answers from queued responses and records every call.
    #[derive(Default)]
    struct ScriptedBackend {
        lists: RefCell<VecDeque<Result<ListPage, ApiError>>>,
        searches: RefCell<VecDeque<Result<ListPage, ApiError>>>,
        writes: RefCell<VecDeque<Result<WriteOutcome, ApiError>>>,
        fetches: RefCell<VecDeque<Result<Record, ApiError>>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn log(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    fn exhausted<T>() -> Result<T, ApiError> {
        Err(ApiError::Transport("no scripted response".to_owned()))
    }

    impl Backend for ScriptedBackend {
        fn list(&self, kind: EntityKind) -> Result<ListPage, ApiError> {
            self.log(format!("GET /api/{}", kind.path()));
            self.lists.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn search(&self, kind: EntityKind, term: &str) -> Result<ListPage, ApiError> {
            self.log(format!("GET /api/{}/search?q={term}", kind.path()));
            self.searches.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn fetch(&self, kind: EntityKind, key: &RecordKey) -> Result<Record, ApiError> {
            self.log(format!("GET /api/{}/{key}", kind.path()));
            self.fetches.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn create(
            &self,
            kind: EntityKind,
            payload: &Map<String, Value>,
        ) -> Result<WriteOutcome, ApiError> {
            self.log(format!(
                "POST /api/{}/add {}",
                kind.path(),
                Value::Object(payload.clone())
            ));
            self.writes.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn update(
            &self,
            kind: EntityKind,
            key: &RecordKey,
            payload: &Map<String, Value>,
        ) -> Result<WriteOutcome, ApiError> {
            self.log(format!(
                "PUT /api/{}/{key} {}",
                kind.path(),
                Value::Object(payload.clone())
            ));
            self.writes.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn delete(
            &self,
            kind: EntityKind,
            key: &RecordKey,
            suffix: Option<&str>,
        ) -> Result<WriteOutcome, ApiError> {
            let suffix = suffix.map(|s| format!("/{s}")).unwrap_or_default();
            self.log(format!("DELETE /api/{}/{key}{suffix}", kind.path()));
            self.writes.borrow_mut().pop_front().unwrap_or_else(exhausted)
        }

        fn stats(&self) -> Result<HospitalStats, ApiError> {
            exhausted()
        }
    }

    fn page(records: Value, node: Node) -> ListPage {
        let records: Vec<Record> = match records {
            Value::Array(items) => items.into_iter().map(Record::from_value).collect(),
            _ => Vec::new(),
        };
        ListPage {
            total: Some(records.len()),
            records,
            node: Some(node),
        }
    }

    fn patients_page() -> ListPage {
        page(
            json!([
                {"ID_Hospital": 1, "ID_Paciente": 1, "Nombre": "Ana",
                 "Apellido": "Paz", "Sexo": "F"},
                {"ID_Hospital": 1, "ID_Paciente": 2, "Nombre": "Luis",
                 "Apellido": "Mora", "Sexo": "M"},
                {"ID_Hospital": 1, "ID_Paciente": 3, "Nombre": "Marta",
                 "Apellido": "Vera", "Sexo": "F"},
            ]),
            Node::Quito,
        )
    }

    fn staff_page() -> ListPage {
        page(
            json!([
                {"ID_Hospital": 1, "ID_Personal": 4, "ID_Especialidad": 2,
                 "Nombre": "Rosa", "Apellido": "León"},
                {"ID_Hospital": 1, "ID_Personal": 5, "ID_Especialidad": 1,
                 "Nombre": "Iván", "Apellido": "Cruz"},
            ]),
            Node::Quito,
        )
    }

    fn names(controller: &EntityListController) -> Vec<String> {
        controller
            .list()
            .filtered()
            .map(|record| record.text("Nombre"))
            .collect()
    }

    fn notifications(events: &[ControllerEvent], wanted: Level) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                ControllerEvent::Notify { level, message } if *level == wanted => {
                    Some(message.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn load_single_patient_renders_row_badge_and_toast() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(
            json!([{
                "ID_Hospital": 1, "ID_Paciente": 5, "Nombre": "Ana",
                "Apellido": "Paz", "FechaNacimiento": "01/02/1990", "Sexo": "F",
            }]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Patients);

        let events = controller.load(&backend);

        assert_eq!(controller.list().filtered_len(), 1);
        assert_eq!(controller.list().total(), 1);
        let html = controller.render().expect("rows render");
        assert_eq!(html.matches("<tr").count(), 1);
        assert!(html.contains("Quito"));
        assert_eq!(crate::html::count_label(controller.list()), "1 registros");
        let success = notifications(&events, Level::Success);
        assert_eq!(success.len(), 1);
        assert!(success[0].contains('1'));
        assert!(success[0].contains("quito"));
    }

    #[test]
    fn filtered_matches_total_after_every_load() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.lists.borrow_mut().push_back(Ok(staff_page()));

        let mut patients = EntityListController::new(EntityKind::Patients);
        patients.load(&backend);
        assert_eq!(patients.list().filtered_len(), patients.list().total());

        let mut staff = EntityListController::new(EntityKind::Staff);
        staff.load(&backend);
        assert_eq!(staff.list().filtered_len(), 2);
    }

    #[test]
    fn non_list_payload_becomes_empty_collection() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(json!({"oops": true}), Node::Guayaquil)));
        let mut controller = EntityListController::new(EntityKind::Visits);

        controller.load(&backend);
        assert_eq!(controller.list().filtered_len(), 0);
        let html = controller.render().expect("rows render");
        assert!(html.contains(&format!(
            "colspan=\"{}\"",
            controller.schema().column_count()
        )));
    }

    #[test]
    fn failed_reload_keeps_last_good_collection() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend
            .lists
            .borrow_mut()
            .push_back(Err(ApiError::Transport("connection refused".to_owned())));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let events = controller.load(&backend);
        assert_eq!(names(&controller), vec!["Ana", "Luis", "Marta"]);
        let errors = notifications(&events, Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("connection refused"));
    }

    #[test]
    fn reload_clears_structured_filters() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        controller.set_filter(1, Some("M".to_owned()));
        assert_eq!(names(&controller), vec!["Luis"]);

        controller.load(&backend);
        assert_eq!(controller.list().filtered_len(), controller.list().total());
        assert_eq!(names(&controller), vec!["Ana", "Luis", "Marta"]);
        assert!(
            controller
                .filter_views()
                .iter()
                .all(|filter| filter.selected.is_none())
        );
    }

    #[test]
    fn reload_clears_local_contract_search() {
        let contracts = || {
            page(
                json!([
                    {"ID_Hospital": 1, "ID_Personal": 4, "Salario": 1800.0},
                    {"ID_Hospital": 1, "ID_Personal": 7, "Salario": 2400.5},
                ]),
                Node::Quito,
            )
        };
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(contracts()));
        backend.lists.borrow_mut().push_back(Ok(contracts()));
        let mut controller = EntityListController::new(EntityKind::Contracts);
        controller.load(&backend);

        controller.search("2400", &backend);
        assert_eq!(controller.list().filtered_len(), 1);
        assert_eq!(controller.search_term(), "2400");

        controller.load(&backend);
        assert_eq!(controller.search_term(), "");
        assert_eq!(controller.list().filtered_len(), 2);
        assert_eq!(controller.list().filtered_len(), controller.list().total());
    }

    #[test]
    fn reload_during_server_search_drops_its_term() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let SearchStep::Remote { ticket, .. } = controller.begin_search("luis") else {
            panic!("server search expected");
        };
        assert_eq!(controller.search_term(), "");

        controller.load(&backend);
        let events = controller.finish_search(
            ticket,
            Ok(page(json!([{"ID_Hospital": 1, "ID_Paciente": 2}]), Node::Quito)),
        );
        assert_eq!(events, vec![ControllerEvent::Discarded { ticket }]);
        assert_eq!(controller.search_term(), "");
        assert_eq!(controller.list().filtered_len(), 3);
    }

    #[test]
    fn failed_server_search_keeps_previous_term() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.searches.borrow_mut().push_back(Ok(page(
            json!([{"ID_Hospital": 1, "ID_Paciente": 3}]),
            Node::Quito,
        )));
        backend
            .searches
            .borrow_mut()
            .push_back(Err(ApiError::Transport("timeout".to_owned())));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        controller.search("mar", &backend);
        controller.search("zzz", &backend);
        assert_eq!(controller.search_term(), "mar");
        assert_eq!(names(&controller), vec!["Marta"]);
    }

    #[test]
    fn empty_search_restores_all_in_fetch_order() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.searches.borrow_mut().push_back(Ok(page(
            json!([{"ID_Hospital": 1, "ID_Paciente": 3, "Nombre": "Marta"}]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        controller.search("mar", &backend);
        assert_eq!(names(&controller), vec!["Marta"]);

        controller.search("   ", &backend);
        assert_eq!(names(&controller), vec!["Ana", "Luis", "Marta"]);
        assert_eq!(
            backend.calls(),
            vec!["GET /api/pacientes", "GET /api/pacientes/search?q=mar"]
        );
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let SearchStep::Remote { ticket: slow, .. } = controller.begin_search("a") else {
            panic!("server search expected");
        };
        let SearchStep::Remote { ticket: fast, .. } = controller.begin_search("luis") else {
            panic!("server search expected");
        };

        controller.finish_search(
            fast,
            Ok(page(json!([{"ID_Hospital": 1, "ID_Paciente": 2}]), Node::Quito)),
        );
        let events = controller.finish_search(slow, Ok(patients_page()));

        assert_eq!(events, vec![ControllerEvent::Discarded { ticket: slow }]);
        assert_eq!(names(&controller), vec!["Luis"]);
    }

    #[test]
    fn clearing_search_invalidates_in_flight_request() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let SearchStep::Remote { ticket, .. } = controller.begin_search("ana") else {
            panic!("server search expected");
        };
        controller.search("", &backend);
        controller.finish_search(
            ticket,
            Ok(page(json!([{"ID_Hospital": 1, "ID_Paciente": 1}]), Node::Quito)),
        );
        assert_eq!(controller.list().filtered_len(), 3);
    }

    #[test]
    fn failed_search_preserves_view() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend
            .searches
            .borrow_mut()
            .push_back(Err(ApiError::server("consulta inválida")));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let events = controller.search("x", &backend);
        assert_eq!(controller.list().filtered_len(), 3);
        assert_eq!(notifications(&events, Level::Error).len(), 1);
    }

    #[test]
    fn contracts_search_locally_without_requests() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(
            json!([
                {"ID_Hospital": 1, "ID_Personal": 4, "Salario": 1800.0},
                {"ID_Hospital": 1, "ID_Personal": 7, "Salario": 2400.5},
            ]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Contracts);
        controller.load(&backend);

        controller.search("2400", &backend);
        assert_eq!(controller.list().filtered_len(), 1);
        assert_eq!(backend.calls(), vec!["GET /api/contratos"]);
    }

    #[test]
    fn filters_compose_with_search_and_are_idempotent() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.searches.borrow_mut().push_back(Ok(page(
            json!([
                {"ID_Hospital": 1, "ID_Paciente": 2},
                {"ID_Hospital": 1, "ID_Paciente": 3},
            ]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);
        controller.search("a", &backend);

        controller.set_filter(1, Some("F".to_owned()));
        assert_eq!(names(&controller), vec!["Marta"]);
        controller.apply_filters();
        controller.apply_filters();
        assert_eq!(names(&controller), vec!["Marta"]);

        controller.set_filter(1, None);
        assert_eq!(names(&controller), vec!["Luis", "Marta"]);
    }

    #[test]
    fn cycling_a_filter_walks_choices_then_all() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        controller.cycle_filter(1);
        assert_eq!(controller.filter_views()[1].selected.as_deref(), Some("M"));
        controller.cycle_filter(1);
        assert_eq!(controller.filter_views()[1].selected.as_deref(), Some("F"));
        controller.cycle_filter(1);
        assert_eq!(controller.filter_views()[1].selected, None);
        assert_eq!(controller.list().filtered_len(), 3);
    }

    #[test]
    fn delete_failure_leaves_collection_untouched() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        backend
            .writes
            .borrow_mut()
            .push_back(Err(ApiError::server("en uso")));
        let mut controller = EntityListController::new(EntityKind::Staff);
        controller.load(&backend);

        let key = RecordKey::composite(1, 5);
        assert_eq!(
            controller.request_delete(&key),
            vec![ControllerEvent::ConfirmOpened]
        );
        let events = controller.confirm_delete(&backend);

        let errors = notifications(&events, Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("en uso"));
        assert!(controller.list().contains(&key));
        assert_eq!(
            backend.calls(),
            vec!["GET /api/personal-medico", "DELETE /api/personal-medico/1/5"]
        );
    }

    #[test]
    fn delete_success_reloads_from_server() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        backend.writes.borrow_mut().push_back(Ok(WriteOutcome::default()));
        backend.lists.borrow_mut().push_back(Ok(page(
            json!([{"ID_Hospital": 1, "ID_Personal": 4, "Nombre": "Rosa"}]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Staff);
        controller.load(&backend);

        controller.request_delete(&RecordKey::composite(1, 5));
        let events = controller.confirm_delete(&backend);

        assert!(events.contains(&ControllerEvent::ConfirmClosed));
        assert_eq!(names(&controller), vec!["Rosa"]);
        assert_eq!(backend.calls().len(), 3);
    }

    #[test]
    fn cancel_delete_sends_nothing() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        let mut controller = EntityListController::new(EntityKind::Staff);
        controller.load(&backend);

        controller.request_delete_row(0);
        assert!(controller.pending_delete().is_some());
        assert_eq!(controller.cancel_delete(), vec![ControllerEvent::ConfirmClosed]);
        assert_eq!(backend.calls().len(), 1);
    }

    #[test]
    fn experience_delete_appends_role_segment() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(
            json!([{
                "ID_Hospital": 2, "ID_Personal": 12, "Cargo": "Jefe de área", "Años_exp": 8,
            }]),
            Node::Guayaquil,
        )));
        backend.writes.borrow_mut().push_back(Err(ApiError::server("no existe")));
        let mut controller = EntityListController::new(EntityKind::Experience);
        controller.load(&backend);

        controller.request_delete_row(0);
        controller.confirm_delete(&backend);
        assert_eq!(
            backend.calls()[1],
            "DELETE /api/experiencias/2/12/Jefe de área"
        );
    }

    #[test]
    fn out_of_range_visit_is_rejected_without_request() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(json!([]), Node::Quito)));
        let mut controller = EntityListController::new(EntityKind::Visits);
        controller.load(&backend);

        controller.open_create();
        let form = controller.form_mut().expect("form open");
        for (key, value) in [
            ("ID_Personal", "99"),
            ("ID_Paciente", "1"),
            ("ID_Tipo", "1"),
            ("Fecha", "2024-01-10"),
            ("Diagnostico", "Control"),
            ("Descripción", "Chequeo"),
            ("Tratamiento", "Ninguno"),
        ] {
            form.set_value(key, value).expect("editable");
        }

        let events = controller.submit(&backend);
        let errors = notifications(&events, Level::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("entre 1 y 10"));
        assert!(controller.form().is_some());
        assert_eq!(backend.calls(), vec!["GET /api/atenciones"]);
    }

    #[test]
    fn successful_create_closes_form_and_reloads() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        backend.writes.borrow_mut().push_back(Ok(WriteOutcome {
            message: None,
            id_hospital: Some(1),
            id_personal: Some(6),
        }));
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        let mut controller = EntityListController::new(EntityKind::Staff);
        controller.load(&backend);

        controller.open_create();
        let form = controller.form_mut().expect("form open");
        form.set_value("ID_Especialidad", "2").expect("editable");
        form.set_value("Nombre", "Eva").expect("editable");
        form.set_value("Apellido", "Ríos").expect("editable");
        form.set_value("Salario", "1200.50").expect("editable");

        let events = controller.submit(&backend);
        assert!(controller.form().is_none());
        let success = notifications(&events, Level::Success);
        assert!(success[0].contains("ID 6 en Hospital 1"));
        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].starts_with("POST /api/personal-medico/add"));
        assert!(calls[1].contains("\"Salario\":1200.5"));
        assert!(calls[1].contains("\"Fecha_Contrato\":null"));
    }

    #[test]
    fn failed_update_keeps_form_open() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(staff_page()));
        backend
            .writes
            .borrow_mut()
            .push_back(Err(ApiError::server("especialidad inexistente")));
        let mut controller = EntityListController::new(EntityKind::Staff);
        controller.load(&backend);

        controller.open_edit(&RecordKey::composite(1, 4), &backend);
        let events = controller.submit(&backend);

        assert!(controller.form().is_some());
        assert!(notifications(&events, Level::Error)[0].contains("especialidad inexistente"));
        assert!(backend.calls()[1].starts_with("PUT /api/personal-medico/1/4"));
    }

    #[test]
    fn patient_edit_fetches_record_first() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(patients_page()));
        backend.fetches.borrow_mut().push_back(Ok(Record::from_value(json!({
            "ID_Hospital": 1, "ID_Paciente": 2, "Nombre": "Luis",
            "Apellido": "Mora", "FechaNacimiento": "15/08/1985", "Sexo": "M",
        }))));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let events = controller.open_edit_row(1, &backend);
        assert_eq!(events, vec![ControllerEvent::FormOpened]);
        let form = controller.form().expect("form open");
        assert_eq!(form.value("FechaNacimiento"), Some("1985-08-15"));
        assert_eq!(backend.calls()[1], "GET /api/pacientes/1/2");
    }

    #[test]
    fn contracts_refuse_create_and_delete() {
        let mut controller = EntityListController::new(EntityKind::Contracts);

        let create = controller.open_create();
        assert!(controller.form().is_none());
        assert!(notifications(&create, Level::Error)[0].contains("deshabilitada"));

        let delete = controller.request_delete(&RecordKey::composite(1, 1));
        assert!(controller.pending_delete().is_none());
        assert!(notifications(&delete, Level::Error)[0].contains("Personal Médico"));
    }

    #[test]
    fn script_in_cell_renders_escaped() {
        let backend = ScriptedBackend::default();
        backend.lists.borrow_mut().push_back(Ok(page(
            json!([{"ID_Hospital": 1, "ID_Paciente": 1, "Nombre": "<script>"}]),
            Node::Quito,
        )));
        let mut controller = EntityListController::new(EntityKind::Patients);
        controller.load(&backend);

        let html = controller.render().expect("rows render");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
