// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use clinica_app::{
    ApiError, Backend, EntityKind, HospitalStats, ListPage, Node, Record, RecordKey, WriteOutcome,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Blocking client for the hospital REST API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = Url::parse(trimmed)
            .with_context(|| format!("api.base_url {trimmed:?} is not a valid URL"))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            bail!("api.base_url must be an http(s) URL -- got {trimmed:?}");
        }
        if timeout.is_zero() {
            bail!("api.timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url: parsed,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/api/{segments...}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn entity_endpoint(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        suffix: Option<&str>,
    ) -> Result<Url, ApiError> {
        let mut segments = vec![kind.path().to_owned()];
        segments.extend(key.path_segments());
        segments.extend(suffix.map(str::to_owned));
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        self.endpoint(&segments)
    }

    fn send(&self, method: &str, url: &Url, request: RequestBuilder) -> Result<Envelope, ApiError> {
        debug!(method, %url, "api request");
        let response = request
            .send()
            .map_err(|error| connection_error(self.base_url(), &error))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| ApiError::Transport(format!("read response body: {error}")))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|error| ApiError::Decode(format!("{method} {}: {error}", url.path())))?;
        if envelope.success == Some(false) {
            return Err(ApiError::Server {
                status: Some(status.as_u16()),
                message: envelope
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "error desconocido del servidor".to_owned()),
            });
        }
        Ok(envelope)
    }

    fn get(&self, url: Url) -> Result<Envelope, ApiError> {
        self.send("GET", &url, self.http.get(url.clone()))
    }
}

impl Backend for Client {
    fn list(&self, kind: EntityKind) -> Result<ListPage, ApiError> {
        let url = self.endpoint(&[kind.path()])?;
        self.get(url).map(|envelope| envelope.into_page(kind))
    }

    fn search(&self, kind: EntityKind, term: &str) -> Result<ListPage, ApiError> {
        let mut url = self.endpoint(&[kind.path(), "search"])?;
        url.query_pairs_mut().append_pair("q", term);
        self.get(url).map(|envelope| envelope.into_page(kind))
    }

    fn fetch(&self, kind: EntityKind, key: &RecordKey) -> Result<Record, ApiError> {
        let url = self.entity_endpoint(kind, key, None)?;
        let mut envelope = self.get(url)?;
        match envelope.rest.remove(kind.item_key()) {
            Some(value @ Value::Object(_)) => Ok(Record::from_value(value)),
            _ => Err(ApiError::Decode(format!(
                "falta el campo {:?} en la respuesta",
                kind.item_key()
            ))),
        }
    }

    fn create(
        &self,
        kind: EntityKind,
        payload: &Map<String, Value>,
    ) -> Result<WriteOutcome, ApiError> {
        let url = self.endpoint(&[kind.path(), "add"])?;
        let request = self.http.post(url.clone()).json(payload);
        self.send("POST", &url, request).map(Envelope::into_outcome)
    }

    fn update(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        payload: &Map<String, Value>,
    ) -> Result<WriteOutcome, ApiError> {
        let url = self.entity_endpoint(kind, key, None)?;
        let request = self.http.put(url.clone()).json(payload);
        self.send("PUT", &url, request).map(Envelope::into_outcome)
    }

    fn delete(
        &self,
        kind: EntityKind,
        key: &RecordKey,
        suffix: Option<&str>,
    ) -> Result<WriteOutcome, ApiError> {
        let url = self.entity_endpoint(kind, key, suffix)?;
        let request = self.http.delete(url.clone());
        self.send("DELETE", &url, request).map(Envelope::into_outcome)
    }

    fn stats(&self) -> Result<HospitalStats, ApiError> {
        let url = self.endpoint(&["hospital", "stats"])?;
        let mut envelope = self.get(url)?;
        let stats = envelope.rest.remove("stats").ok_or_else(|| {
            ApiError::Decode("falta el campo \"stats\" en la respuesta".to_owned())
        })?;
        serde_json::from_value(stats).map_err(|error| ApiError::Decode(format!("stats: {error}")))
    }
}

/// Common response shape; the entity-specific payload lands in `rest`.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: Option<bool>,
    error: Option<String>,
    message: Option<String>,
    total: Option<u64>,
    node: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl Envelope {
    /// Anything other than an array under the list key becomes an empty page.
    fn into_page(mut self, kind: EntityKind) -> ListPage {
        let records = match self.rest.remove(kind.list_key()) {
            Some(Value::Array(items)) => items.into_iter().map(Record::from_value).collect(),
            _ => Vec::new(),
        };
        ListPage {
            records,
            total: self.total.and_then(|total| usize::try_from(total).ok()),
            node: self.node.as_deref().and_then(Node::parse),
        }
    }

    fn into_outcome(self) -> WriteOutcome {
        WriteOutcome {
            message: self.message,
            id_hospital: self.rest.get("id_hospital").and_then(Value::as_i64),
            id_personal: self.rest.get("id_personal").and_then(Value::as_i64),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> ApiError {
    if error.is_timeout() {
        return ApiError::Transport(format!("{base_url} no respondió a tiempo ({error})"));
    }
    ApiError::Transport(format!(
        "no se puede conectar con {base_url} -- verifique que el servidor esté en ejecución ({error})"
    ))
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    let code = Some(status.as_u16());
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.trim().is_empty()
    {
        return ApiError::Server {
            status: code,
            message,
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty()
        && trimmed.len() < 100
        && !trimmed.contains('<')
        && !trimmed.contains('{')
    {
        return ApiError::Server {
            status: code,
            message: format!("error del servidor ({}): {trimmed}", status.as_u16()),
        };
    }

    ApiError::Server {
        status: code,
        message: format!("el servidor respondió {}", status.as_u16()),
    }
}
