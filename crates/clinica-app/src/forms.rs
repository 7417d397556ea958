// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::{Map, Number, Value};
use time::Date;
use time::macros::format_description;

use crate::error::FormError;
use crate::schema::{EntitySchema, FieldKind, FieldRole, FieldSpec};
use crate::{Node, Record, RecordKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub spec: &'static FieldSpec,
    pub value: String,
    pub enabled: bool,
}

/// Modal form over one entity's field schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    schema: &'static EntitySchema,
    mode: FormMode,
    fields: Vec<FormField>,
    focus: usize,
}

impl FormState {
    pub fn create(schema: &'static EntitySchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .filter(|spec| spec.shown_on_create())
            .map(|spec| FormField {
                spec,
                value: String::new(),
                enabled: true,
            })
            .collect();
        Self::with_fields(schema, FormMode::Create, fields)
    }

    /// Pre-fills from `record`; identity and locked fields are disabled.
    pub fn edit(schema: &'static EntitySchema, key: RecordKey, record: &Record) -> Self {
        let fields = schema
            .fields
            .iter()
            .filter(|spec| spec.shown_on_edit())
            .map(|spec| {
                let raw = record.text(spec.key);
                let value = match spec.kind {
                    FieldKind::Date => normalize_date(&raw),
                    _ => raw.trim().to_owned(),
                };
                FormField {
                    spec,
                    value,
                    enabled: spec.editable_on_edit(),
                }
            })
            .collect();
        Self::with_fields(schema, FormMode::Edit(key), fields)
    }

    fn with_fields(schema: &'static EntitySchema, mode: FormMode, fields: Vec<FormField>) -> Self {
        let mut form = Self {
            schema,
            mode,
            fields,
            focus: 0,
        };
        form.focus = form.first_enabled().unwrap_or(0);
        form
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("Nuevo {}", self.schema.singular),
            FormMode::Edit(ref key) => format!("Editar {} {key}", self.schema.singular),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.spec.key == key)
            .map(|field| field.value.as_str())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), FormError> {
        let Some(field) = self.fields.iter_mut().find(|field| field.spec.key == key) else {
            return Err(FormError::ReadOnly(key.to_owned()));
        };
        if !field.enabled {
            return Err(FormError::ReadOnly(field.spec.label.to_owned()));
        }
        field.value = value.to_owned();
        Ok(())
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        if len == 0 {
            return;
        }
        let mut next = self.focus as isize;
        for _ in 0..len {
            next = (next + delta).rem_euclid(len);
            if self.fields[next as usize].enabled {
                self.focus = next as usize;
                return;
            }
        }
    }

    fn first_enabled(&self) -> Option<usize> {
        self.fields.iter().position(|field| field.enabled)
    }

    fn focused_mut(&mut self) -> Option<&mut FormField> {
        self.fields
            .get_mut(self.focus)
            .filter(|field| field.enabled)
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(field) = self.focused_mut()
            && !matches!(field.spec.kind, FieldKind::Choice(_))
        {
            field.value.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_mut() {
            field.value.pop();
        }
    }

    /// Moves a choice field to its next or previous option.
    pub fn cycle_choice(&mut self, delta: isize) {
        let Some(field) = self.focused_mut() else {
            return;
        };
        let FieldKind::Choice(choices) = field.spec.kind else {
            return;
        };
        if choices.is_empty() {
            return;
        }
        let len = choices.len() as isize;
        let next = match choices.iter().position(|(value, _)| *value == field.value) {
            Some(current) => (current as isize + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        field.value = choices[next as usize].0.to_owned();
    }

    /// Validates every field and builds the JSON body for the write request.
    ///
    /// Checks run in order: required fields, value parsing, then the staff id
    /// range of `node` when the entity declares one and the node is known.
    pub fn payload(&self, node: Option<Node>) -> Result<Map<String, Value>, FormError> {
        let missing: Vec<String> = self
            .fields
            .iter()
            .filter(|field| field.spec.required && field.value.trim().is_empty())
            .map(|field| field.spec.label.to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        let mut payload = Map::new();
        for field in &self.fields {
            let Some(payload_key) = field.spec.payload_key else {
                continue;
            };
            if matches!(field.spec.role, FieldRole::Identity) && self.mode == FormMode::Create {
                continue;
            }
            let value = parse_value(field.spec, &field.value)?;
            if let (Some(range_field), Some(node)) = (self.schema.staff_range_field, node)
                && range_field == field.spec.key
                && let Value::Number(number) = &value
                && let Some(id) = number.as_i64()
            {
                let (min, max) = node.staff_range();
                if !(min..=max).contains(&id) {
                    return Err(FormError::OutOfRange {
                        field: field.spec.key.to_owned(),
                        min,
                        max,
                        node,
                    });
                }
            }
            payload.insert(payload_key.to_owned(), value);
        }
        Ok(payload)
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> Result<Value, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(match spec.kind {
            FieldKind::Text | FieldKind::Choice(_) => Value::String(String::new()),
            FieldKind::Integer | FieldKind::Decimal | FieldKind::Date => Value::Null,
        });
    }

    match spec.kind {
        FieldKind::Text => Ok(Value::String(trimmed.to_owned())),
        FieldKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| FormError::InvalidInteger(spec.label.to_owned())),
        FieldKind::Decimal => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| FormError::InvalidDecimal(spec.label.to_owned())),
        FieldKind::Date => parse_iso_date(trimmed)
            .map(|_| Value::String(trimmed.to_owned()))
            .ok_or_else(|| FormError::InvalidDate(spec.label.to_owned())),
        FieldKind::Choice(choices) => choices
            .iter()
            .find(|(value, _)| *value == trimmed)
            .map(|(value, _)| Value::String((*value).to_owned()))
            .ok_or_else(|| FormError::InvalidChoice {
                label: spec.label.to_owned(),
            }),
    }
}

pub fn parse_iso_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

/// Converts list dates (`dd/mm/yyyy` or an ISO timestamp) to `YYYY-MM-DD`;
/// anything unrecognised is returned trimmed.
pub fn normalize_date(value: &str) -> String {
    let value = value.trim();
    if let Ok(date) = Date::parse(value, format_description!("[day]/[month]/[year]")) {
        return format_iso(date).unwrap_or_else(|| value.to_owned());
    }
    if let Some(prefix) = value.get(..10)
        && parse_iso_date(prefix).is_some()
    {
        return prefix.to_owned();
    }
    value.to_owned()
}

fn format_iso(date: Date) -> Option<String> {
    date.format(format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::{FormMode, FormState, normalize_date};
    use crate::error::FormError;
    use crate::schema::schema;
    use crate::{EntityKind, Node, Record, RecordKey};
    use serde_json::json;

    fn visit_form() -> FormState {
        let mut form = FormState::create(schema(EntityKind::Visits));
        for (key, value) in [
            ("ID_Personal", "3"),
            ("ID_Paciente", "7"),
            ("ID_Tipo", "1"),
            ("Fecha", "2024-05-02"),
            ("Diagnostico", "Gripe"),
            ("Descripción", "Fiebre alta"),
            ("Tratamiento", "Reposo"),
        ] {
            form.set_value(key, value).expect("field should be editable");
        }
        form
    }

    #[test]
    fn create_form_hides_server_assigned_identity() {
        let form = FormState::create(schema(EntityKind::Patients));
        assert!(form.value("ID_Paciente").is_none());
        assert!(form.value("Nombre").is_some());
        assert_eq!(form.mode(), &FormMode::Create);
    }

    #[test]
    fn edit_form_disables_identity_and_normalizes_dates() {
        let record = Record::from_value(json!({
            "ID_Hospital": 1,
            "ID_Paciente": 5,
            "Nombre": "Ana",
            "FechaNacimiento": "09/03/1990",
            "Sexo": "F",
        }));
        let mut form = FormState::edit(
            schema(EntityKind::Patients),
            RecordKey::composite(1, 5),
            &record,
        );

        assert_eq!(form.value("FechaNacimiento"), Some("1990-03-09"));
        assert_eq!(
            form.set_value("ID_Paciente", "6"),
            Err(FormError::ReadOnly("ID Paciente".to_owned()))
        );
        assert_eq!(form.fields()[form.focus()].spec.key, "Nombre");
    }

    #[test]
    fn missing_required_fields_are_reported_together() {
        let form = FormState::create(schema(EntityKind::Patients));
        let Err(FormError::MissingRequired(labels)) = form.payload(None) else {
            panic!("expected missing required error");
        };
        assert_eq!(
            labels,
            vec!["Nombre", "Apellido", "Fecha de nacimiento", "Sexo"]
        );
    }

    #[test]
    fn visit_payload_uses_typed_values() {
        let payload = visit_form().payload(Some(Node::Quito)).expect("valid payload");
        assert_eq!(payload["ID_Personal"], json!(3));
        assert_eq!(payload["Descripción"], json!("Fiebre alta"));
        assert!(!payload.contains_key("ID_Hospital"));
    }

    #[test]
    fn staff_id_outside_node_range_is_rejected() {
        let mut form = visit_form();
        form.set_value("ID_Personal", "99").expect("editable");

        assert_eq!(
            form.payload(Some(Node::Quito)),
            Err(FormError::OutOfRange {
                field: "ID_Personal".to_owned(),
                min: 1,
                max: 10,
                node: Node::Quito,
            })
        );
        form.set_value("ID_Personal", "12").expect("editable");
        assert!(form.payload(Some(Node::Guayaquil)).is_ok());
        assert!(form.payload(None).is_ok());
    }

    #[test]
    fn integer_fields_reject_non_numeric_text() {
        let mut form = visit_form();
        form.set_value("ID_Tipo", "uno").expect("editable");
        assert_eq!(
            form.payload(None),
            Err(FormError::InvalidInteger("ID Tipo".to_owned()))
        );
    }

    #[test]
    fn contract_update_sends_lowercase_keys_and_null_date() {
        let record = Record::from_value(json!({
            "ID_Hospital": 2,
            "ID_Personal": 14,
            "Salario": 2500.0,
            "Fecha_Contrato": null,
        }));
        let form = FormState::edit(
            schema(EntityKind::Contracts),
            RecordKey::composite(2, 14),
            &record,
        );

        let payload = form.payload(None).expect("valid payload");
        assert_eq!(payload["id_hospital"], json!(2));
        assert_eq!(payload["id_personal"], json!(14));
        assert_eq!(payload["salario"], json!(2500.0));
        assert_eq!(payload["fecha_contrato"], json!(null));
    }

    #[test]
    fn choice_fields_cycle_through_options() {
        let mut form = FormState::create(schema(EntityKind::Patients));
        while form.fields()[form.focus()].spec.key != "Sexo" {
            form.focus_next();
        }
        form.cycle_choice(1);
        assert_eq!(form.value("Sexo"), Some("M"));
        form.cycle_choice(1);
        assert_eq!(form.value("Sexo"), Some("F"));
        form.insert_char('x');
        assert_eq!(form.value("Sexo"), Some("F"));
    }

    #[test]
    fn date_normalization_handles_list_formats() {
        assert_eq!(normalize_date("31/12/2023"), "2023-12-31");
        assert_eq!(normalize_date("2023-12-31T00:00:00"), "2023-12-31");
        assert_eq!(normalize_date(" sin fecha "), "sin fecha");
    }
}
