// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::controller::ControllerEvent;
use crate::error::ApiError;
use crate::notify::Level;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeStats {
    pub pacientes: u64,
    pub citas: u64,
    pub personal_medico: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalStats {
    pub total_pacientes: u64,
    pub total_citas: u64,
    pub total_personal: u64,
    pub total_especialidades: u64,
    pub quito: NodeStats,
    pub guayaquil: NodeStats,
}

/// What the dashboard shows while no statistics are available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    #[default]
    Zero,
    Placeholder(String),
}

impl FallbackPolicy {
    fn text(&self) -> String {
        match self {
            Self::Zero => "0".to_owned(),
            Self::Placeholder(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSlot {
    /// Stable element id, e.g. `quito-citas`.
    pub id: &'static str,
    pub label: &'static str,
    pub value: String,
}

const SLOTS: [(&str, &str); 10] = [
    ("total-pacientes", "Total pacientes"),
    ("total-citas", "Total citas"),
    ("total-personal", "Total personal"),
    ("total-especialidades", "Especialidades"),
    ("quito-pacientes", "Quito: pacientes"),
    ("quito-citas", "Quito: citas"),
    ("quito-personal", "Quito: personal médico"),
    ("guayaquil-pacientes", "Guayaquil: pacientes"),
    ("guayaquil-citas", "Guayaquil: citas"),
    ("guayaquil-personal", "Guayaquil: personal médico"),
];

fn slot_values(stats: &HospitalStats) -> [u64; 10] {
    [
        stats.total_pacientes,
        stats.total_citas,
        stats.total_personal,
        stats.total_especialidades,
        stats.quito.pacientes,
        stats.quito.citas,
        stats.quito.personal_medico,
        stats.guayaquil.pacientes,
        stats.guayaquil.citas,
        stats.guayaquil.personal_medico,
    ]
}

/// Dashboard counters; never shows stale numbers after a failed refresh.
#[derive(Debug, Clone)]
pub struct Dashboard {
    policy: FallbackPolicy,
    stats: Option<HospitalStats>,
}

impl Dashboard {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self {
            policy,
            stats: None,
        }
    }

    pub fn load<B: Backend + ?Sized>(&mut self, backend: &B) -> Vec<ControllerEvent> {
        self.apply(backend.stats())
    }

    pub fn apply(&mut self, result: Result<HospitalStats, ApiError>) -> Vec<ControllerEvent> {
        match result {
            Ok(stats) => {
                info!(
                    pacientes = stats.total_pacientes,
                    citas = stats.total_citas,
                    "dashboard stats loaded"
                );
                self.stats = Some(stats);
                vec![ControllerEvent::ViewChanged]
            }
            Err(error) => {
                warn!(%error, "dashboard stats failed");
                self.stats = None;
                vec![
                    ControllerEvent::ViewChanged,
                    ControllerEvent::notify(
                        Level::Error,
                        format!("Error al cargar estadísticas: {error}"),
                    ),
                ]
            }
        }
    }

    pub fn stats(&self) -> Option<&HospitalStats> {
        self.stats.as_ref()
    }

    pub fn slots(&self) -> Vec<StatSlot> {
        let values = self.stats.as_ref().map(slot_values);
        SLOTS
            .iter()
            .enumerate()
            .map(|(index, &(id, label))| StatSlot {
                id,
                label,
                value: values.map_or_else(
                    || self.policy.text(),
                    |values| values[index].to_string(),
                ),
            })
            .collect()
    }
}
