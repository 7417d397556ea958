// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use clinica_app::html::{render_count_badge, render_node_badge, render_table};
use clinica_app::{Backend, ControllerEvent, EntityKind, EntityListController, Level};
use tracing::info;

/// Loads one entity and renders the count badge, node badge and table the
/// admin page shows for it.
pub fn export_html<B: Backend + ?Sized>(backend: &B, kind: EntityKind) -> Result<String> {
    let mut controller = EntityListController::new(kind);
    let events = controller.load(backend);
    if let Some(message) = events.iter().find_map(|event| match event {
        ControllerEvent::Notify {
            level: Level::Error,
            message,
        } => Some(message),
        _ => None,
    }) {
        bail!("{message}");
    }

    let list = controller.list();
    info!(entity = kind.path(), rows = list.filtered_len(), "html export");
    Ok(format!(
        "{}\n{}\n{}\n",
        render_count_badge(list)?,
        render_node_badge(controller.node())?,
        render_table(list)?
    ))
}
