// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::Node;

/// Failure of one backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("error de conexión: {0}")]
    Transport(String),
    /// A response arrived but its body was not the expected JSON.
    #[error("respuesta inválida del servidor: {0}")]
    Decode(String),
    /// The backend answered with `success: false` or an error status.
    #[error("{message}")]
    Server { status: Option<u16>, message: String },
}

impl ApiError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            message: message.into(),
        }
    }
}

/// Client-side form rejection; raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Por favor complete todos los campos obligatorios: {}", .0.join(", "))]
    MissingRequired(Vec<String>),
    #[error("{0} debe ser un número entero")]
    InvalidInteger(String),
    #[error("{0} debe ser un número")]
    InvalidDecimal(String),
    #[error("{0} debe tener el formato AAAA-MM-DD")]
    InvalidDate(String),
    #[error("{label} debe ser una de las opciones disponibles")]
    InvalidChoice { label: String },
    #[error("{field} debe estar entre {min} y {max} para el nodo {}", .node.display_name())]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        node: Node,
    },
    #[error("el campo {0} no se puede modificar")]
    ReadOnly(String),
}
