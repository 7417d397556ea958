// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::schema::{EntitySchema, MatchRule};
use crate::{Node, Record, RecordKey};

/// One structured filter: `field` compared against `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: &'static str,
    pub rule: MatchRule,
    pub value: String,
}

impl FilterClause {
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.text(self.field);
        match self.rule {
            MatchRule::Equals => actual.trim() == self.value.trim(),
            MatchRule::ContainsIgnoreCase => actual
                .to_lowercase()
                .contains(&self.value.trim().to_lowercase()),
        }
    }
}

/// Result of the last search, kept separately from the collection so filters
/// can be recomposed without repeating the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHits {
    /// Identities returned by the server search endpoint.
    Keys(BTreeSet<RecordKey>),
    /// Case-insensitive substring over the given fields.
    Local {
        term: String,
        fields: &'static [&'static str],
    },
}

impl SearchHits {
    fn admits(&self, key: &RecordKey, record: &Record) -> bool {
        match self {
            Self::Keys(keys) => keys.contains(key),
            Self::Local { term, fields } => {
                let needle = term.trim().to_lowercase();
                fields
                    .iter()
                    .any(|field| record.text(field).to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub hits: Option<SearchHits>,
    pub filters: Vec<FilterClause>,
}

impl ViewQuery {
    fn admits(&self, key: &RecordKey, record: &Record) -> bool {
        self.hits
            .as_ref()
            .is_none_or(|hits| hits.admits(key, record))
            && self.filters.iter().all(|clause| clause.matches(record))
    }
}

/// Collection state of one entity: the last successful fetch and the
/// currently visible projection of it.
///
/// `filtered` is stored as positions into `all`, so it can never contain a
/// record the last fetch did not return and always keeps fetch order.
#[derive(Debug, Clone)]
pub struct EntityList {
    schema: &'static EntitySchema,
    all: Vec<Record>,
    keys: Vec<RecordKey>,
    visible: Vec<usize>,
    node: Option<Node>,
    total: usize,
}

impl EntityList {
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            all: Vec::new(),
            keys: Vec::new(),
            visible: Vec::new(),
            node: None,
            total: 0,
        }
    }

    /// Replaces the collection with a fresh fetch; every row starts visible.
    /// Returns how many rows were dropped for lacking an identity.
    pub fn replace(
        &mut self,
        records: Vec<Record>,
        total: Option<usize>,
        node: Option<Node>,
    ) -> usize {
        let received = records.len();
        let mut all = Vec::with_capacity(received);
        let mut keys = Vec::with_capacity(received);
        for record in records {
            if let Some(key) = self.schema.key_of(&record) {
                keys.push(key);
                all.push(record);
            }
        }
        let dropped = received - all.len();

        self.all = all;
        self.keys = keys;
        self.node = node;
        self.total = if dropped == 0 {
            total.unwrap_or(self.all.len())
        } else {
            self.all.len()
        };
        self.visible = (0..self.all.len()).collect();
        dropped
    }

    /// Recomputes the visible rows from `all`. Idempotent.
    pub fn apply(&mut self, query: &ViewQuery) {
        self.visible = self
            .all
            .iter()
            .zip(&self.keys)
            .enumerate()
            .filter(|(_, (record, key))| query.admits(key, record))
            .map(|(index, _)| index)
            .collect();
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn all(&self) -> &[Record] {
        &self.all
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Record> + '_ {
        self.visible.iter().map(|index| &self.all[*index])
    }

    pub fn filtered_keys(&self) -> impl Iterator<Item = &RecordKey> + '_ {
        self.visible.iter().map(|index| &self.keys[*index])
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    /// Visible row at `position` with its identity.
    pub fn row(&self, position: usize) -> Option<(&RecordKey, &Record)> {
        let index = *self.visible.get(position)?;
        Some((&self.keys[index], &self.all[index]))
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        let index = self.keys.iter().position(|candidate| candidate == key)?;
        self.all.get(index)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.keys.contains(key)
    }

    pub fn node(&self) -> Option<Node> {
        self.node
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Distinct non-empty values of `field` across `all`, sorted.
    pub fn observed_values(&self, field: &str) -> Vec<String> {
        self.all
            .iter()
            .map(|record| record.text(field).trim().to_owned())
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityList, FilterClause, SearchHits, ViewQuery};
    use crate::schema::{MatchRule, schema};
    use crate::{EntityKind, Node, Record, RecordKey};
    use serde_json::json;
    use std::collections::BTreeSet;

    fn patients() -> Vec<Record> {
        vec![
            Record::from_value(
                json!({"ID_Hospital": 1, "ID_Paciente": 1, "Nombre": "Ana", "Sexo": "F"}),
            ),
            Record::from_value(
                json!({"ID_Hospital": 1, "ID_Paciente": 2, "Nombre": "Luis", "Sexo": "M"}),
            ),
            Record::from_value(
                json!({"ID_Hospital": 2, "ID_Paciente": 21, "Nombre": "Marta", "Sexo": "F"}),
            ),
        ]
    }

    fn names(list: &EntityList) -> Vec<String> {
        list.filtered().map(|record| record.text("Nombre")).collect()
    }

    #[test]
    fn replace_without_query_shows_everything() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        let dropped = list.replace(patients(), Some(3), Some(Node::Quito));

        assert_eq!(dropped, 0);
        assert_eq!(list.filtered_len(), 3);
        assert_eq!(list.total(), 3);
        assert_eq!(list.node(), Some(Node::Quito));
    }

    #[test]
    fn rows_without_identity_are_dropped() {
        let mut records = patients();
        records.push(Record::from_value(json!({"Nombre": "Sin id"})));
        let mut list = EntityList::new(schema(EntityKind::Patients));

        let dropped = list.replace(records, Some(4), None);
        assert_eq!(dropped, 1);
        assert_eq!(list.total(), 3);
        assert_eq!(list.filtered_len(), list.total());
    }

    #[test]
    fn filters_compose_with_and_and_are_idempotent() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        let query = ViewQuery {
            hits: None,
            filters: vec![
                FilterClause {
                    field: "ID_Hospital",
                    rule: MatchRule::Equals,
                    value: "1".to_owned(),
                },
                FilterClause {
                    field: "Sexo",
                    rule: MatchRule::Equals,
                    value: "F".to_owned(),
                },
            ],
        };
        list.replace(patients(), None, None);
        list.apply(&query);
        assert_eq!(names(&list), vec!["Ana"]);

        list.apply(&query);
        list.apply(&query);
        assert_eq!(names(&list), vec!["Ana"]);
    }

    #[test]
    fn server_hits_outside_the_collection_are_ignored() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        list.replace(patients(), None, None);

        let query = ViewQuery {
            hits: Some(SearchHits::Keys(BTreeSet::from([
                RecordKey::composite(2, 21),
                RecordKey::composite(2, 99),
            ]))),
            filters: Vec::new(),
        };
        list.apply(&query);
        assert_eq!(names(&list), vec!["Marta"]);
        assert!(list.filtered().all(|record| list.all().contains(record)));
    }

    #[test]
    fn local_search_is_case_insensitive_substring() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        list.replace(patients(), None, None);

        list.apply(&ViewQuery {
            hits: Some(SearchHits::Local {
                term: "MAR".to_owned(),
                fields: &["Nombre"],
            }),
            filters: Vec::new(),
        });
        assert_eq!(names(&list), vec!["Marta"]);
    }

    #[test]
    fn clearing_the_query_restores_fetch_order() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        list.replace(patients(), None, None);
        list.apply(&ViewQuery {
            hits: Some(SearchHits::Keys(BTreeSet::from([RecordKey::composite(1, 2)]))),
            filters: Vec::new(),
        });

        list.apply(&ViewQuery::default());
        assert_eq!(names(&list), vec!["Ana", "Luis", "Marta"]);
    }

    #[test]
    fn replace_discards_the_previous_projection() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        list.replace(patients(), None, None);
        list.apply(&ViewQuery {
            hits: None,
            filters: vec![FilterClause {
                field: "Sexo",
                rule: MatchRule::Equals,
                value: "M".to_owned(),
            }],
        });
        assert_eq!(names(&list), vec!["Luis"]);

        list.replace(patients(), Some(3), None);
        assert_eq!(names(&list), vec!["Ana", "Luis", "Marta"]);
        assert_eq!(list.filtered_len(), list.total());
    }

    #[test]
    fn observed_values_are_distinct_and_sorted() {
        let mut list = EntityList::new(schema(EntityKind::Patients));
        list.replace(patients(), None, None);
        assert_eq!(list.observed_values("Sexo"), vec!["F", "M"]);
    }
}
