// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! HTML fragments for the table, badges, toasts and dashboard cards.
//!
//! Markup lives in askama templates under `templates/`; every interpolated
//! value is HTML-escaped by the template engine.

use askama::Template;

use crate::notify::{Level, Notifications};
use crate::stats::{Dashboard, StatSlot};
use crate::view::EntityList;
use crate::{Node, Record, RecordKey};

#[derive(Template)]
#[template(path = "badge.html")]
struct Badge {
    class: &'static str,
    label: String,
}

impl Badge {
    fn new(class: &'static str, label: impl Into<String>) -> Self {
        Self {
            class,
            label: label.into(),
        }
    }

    fn for_record(record: &Record) -> Self {
        match record.hospital().map(Node::for_hospital) {
            Some(node) => Self::new(node.badge_class(), node.display_name()),
            None => Self::new("secondary", "N/A"),
        }
    }
}

struct Cell {
    text: String,
    strong: bool,
}

struct Row {
    key: String,
    has_suffix: bool,
    suffix: String,
    cells: Vec<Cell>,
    badge: Badge,
}

#[derive(Template)]
#[template(path = "rows.html")]
struct Rows {
    rows: Vec<Row>,
    colspan: usize,
    empty_message: &'static str,
    partitioned: bool,
    can_delete: bool,
    locked_message: &'static str,
}

#[derive(Template)]
#[template(path = "table.html")]
struct Table {
    headers: Vec<&'static str>,
    body: String,
}

struct Toast {
    id: u64,
    class: &'static str,
    title: &'static str,
    message: String,
}

#[derive(Template)]
#[template(path = "toasts.html")]
struct Toasts {
    toasts: Vec<Toast>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct Cards {
    slots: Vec<StatSlot>,
}

pub fn count_label(list: &EntityList) -> String {
    format!("{} registros", list.filtered_len())
}

pub fn render_count_badge(list: &EntityList) -> askama::Result<String> {
    Badge::new("secondary", count_label(list)).render()
}

/// Badge for the node that answered the last fetch.
pub fn render_node_badge(node: Option<Node>) -> askama::Result<String> {
    match node {
        Some(node) => Badge::new(node.badge_class(), node.host_label()),
        None => Badge::new("secondary", "Sin conexión"),
    }
    .render()
}

fn row(list: &EntityList, key: &RecordKey, record: &Record) -> Row {
    let schema = list.schema();
    let suffix = schema.delete_suffix_field.map(|field| record.text(field));
    Row {
        key: key.to_string(),
        has_suffix: suffix.is_some(),
        suffix: suffix.unwrap_or_default(),
        cells: schema
            .columns
            .iter()
            .map(|column| Cell {
                text: column.display(record),
                strong: column.strong,
            })
            .collect(),
        badge: Badge::for_record(record),
    }
}

/// `<tbody>` content for the visible rows of `list`. An empty view renders
/// one row spanning every header column.
pub fn render_rows(list: &EntityList) -> askama::Result<String> {
    let schema = list.schema();
    Rows {
        rows: list
            .filtered_keys()
            .zip(list.filtered())
            .map(|(key, record)| row(list, key, record))
            .collect(),
        colspan: schema.column_count(),
        empty_message: schema.empty_message,
        partitioned: schema.is_node_partitioned(),
        can_delete: schema.can_delete,
        locked_message: schema.locked_message,
    }
    .render()
}

/// Complete table with header, for export.
pub fn render_table(list: &EntityList) -> askama::Result<String> {
    let schema = list.schema();
    let mut headers: Vec<&'static str> =
        schema.columns.iter().map(|column| column.header).collect();
    if schema.is_node_partitioned() {
        headers.push("Nodo");
    }
    headers.push("Acciones");
    Table {
        headers,
        body: render_rows(list)?,
    }
    .render()
}

pub fn render_toasts(notifications: &Notifications) -> askama::Result<String> {
    Toasts {
        toasts: notifications
            .items()
            .iter()
            .map(|item| Toast {
                id: item.id,
                class: match item.level {
                    Level::Success => "text-bg-success",
                    Level::Error => "text-bg-danger",
                },
                title: item.level.title(),
                message: item.message.clone(),
            })
            .collect(),
    }
    .render()
}

pub fn render_dashboard(dashboard: &Dashboard) -> askama::Result<String> {
    Cards {
        slots: dashboard.slots(),
    }
    .render()
}
