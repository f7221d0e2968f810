//! Parsing and shape validation of raw input records.
//!
//! The engine trusts the shape of its typed inputs, so everything arriving
//! as JSON passes through here first. Any structural problem (the document
//! is not a list, an id is not a string or is blank, a required field is
//! missing) is fatal and reported as [`Error::InvalidInput`] naming the
//! offending location, e.g. `components[3].id`.

use crate::domain::{ComponentId, ComponentType, DependencyFact, RawComponent};
use crate::error::{Error, Result};
use crate::extract::ReferencePayload;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a JSON list of component records.
///
/// A numeric `type` is read as a platform solution-component type code
/// (see [`ComponentType::from_solution_code`]).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for malformed shape and [`Error::Json`]
/// for text that is not JSON at all.
pub fn parse_components(text: &str) -> Result<Vec<RawComponent>> {
    let records = parse_list(text, "components")?;
    let mut components = Vec::with_capacity(records.len());

    for (index, mut record) in records.into_iter().enumerate() {
        let context = format!("components[{index}]");
        require_id_field(&record, &context, "id")?;
        if let Some(code) = record.get("type").and_then(Value::as_i64) {
            let discriminator = ComponentType::from_solution_code(code)
                .map_or_else(|| code.to_string(), |kind| kind.to_string());
            record["type"] = Value::String(discriminator);
        }
        components.push(decode::<RawComponent>(record, &context)?);
    }

    Ok(components)
}

/// Parse a JSON list of `{ "from": ..., "to": ... }` dependency facts.
///
/// `fromId`/`toId` are accepted as aliases.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for malformed shape and [`Error::Json`]
/// for text that is not JSON at all.
pub fn parse_facts(text: &str) -> Result<Vec<DependencyFact>> {
    let records = parse_list(text, "dependencies")?;
    let mut facts = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let context = format!("dependencies[{index}]");
        let from_key = if record.get("from").is_some() { "from" } else { "fromId" };
        let to_key = if record.get("to").is_some() { "to" } else { "toId" };
        require_id_field(&record, &context, from_key)?;
        require_id_field(&record, &context, to_key)?;
        facts.push(decode::<DependencyFact>(record, &context)?);
    }

    Ok(facts)
}

/// Parse a JSON list of tagged reference payloads.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for malformed shape and [`Error::Json`]
/// for text that is not JSON at all.
pub fn parse_payloads(text: &str) -> Result<Vec<ReferencePayload>> {
    let payloads = parse_list(text, "payloads")?
        .into_iter()
        .enumerate()
        .map(|(index, record)| decode::<ReferencePayload>(record, &format!("payloads[{index}]")))
        .collect::<Result<Vec<_>>>()?;
    validate_payloads(&payloads)?;
    Ok(payloads)
}

/// Check typed component records for blank ids.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for the first blank id.
pub fn validate_components(components: &[RawComponent]) -> Result<()> {
    for (index, component) in components.iter().enumerate() {
        if component.id.trim().is_empty() {
            return Err(Error::invalid_input(
                format!("components[{index}].id"),
                "id must not be blank",
            ));
        }
    }
    Ok(())
}

/// Check typed dependency facts for blank ids.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for the first blank id.
pub fn validate_facts(facts: &[DependencyFact]) -> Result<()> {
    for (index, fact) in facts.iter().enumerate() {
        for (field, id) in [("from", &fact.from), ("to", &fact.to)] {
            if id.as_str().trim().is_empty() {
                return Err(Error::invalid_input(
                    format!("dependencies[{index}].{field}"),
                    "id must not be blank",
                ));
            }
        }
    }
    Ok(())
}

/// Check typed payloads for blank component ids.
///
/// Names inside payloads (entities, libraries) may be blank and are skipped
/// during extraction; ids may not.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for the first blank id, located as e.g.
/// `payloads[2].form_id` or `payloads[0].components[1]`.
pub fn validate_payloads(payloads: &[ReferencePayload]) -> Result<()> {
    for (index, payload) in payloads.iter().enumerate() {
        for (field, id) in payload_ids(payload) {
            if id.as_str().trim().is_empty() {
                return Err(Error::invalid_input(
                    format!("payloads[{index}].{field}"),
                    "id must not be blank",
                ));
            }
        }
    }
    Ok(())
}

fn payload_ids(payload: &ReferencePayload) -> Vec<(String, &ComponentId)> {
    match payload {
        ReferencePayload::Form { form_id, .. } => vec![("form_id".to_string(), form_id)],
        ReferencePayload::View { view_id, .. } => vec![("view_id".to_string(), view_id)],
        ReferencePayload::PluginStep { plugin_id, .. } => {
            vec![("plugin_id".to_string(), plugin_id)]
        }
        ReferencePayload::Workflow { workflow_id, .. } => {
            vec![("workflow_id".to_string(), workflow_id)]
        }
        ReferencePayload::App { app_id, components } => {
            let mut ids = vec![("app_id".to_string(), app_id)];
            ids.extend(
                components
                    .iter()
                    .enumerate()
                    .map(|(i, id)| (format!("components[{i}]"), id)),
            );
            ids
        }
        ReferencePayload::Relationship { from_id, to_id } => vec![
            ("from_id".to_string(), from_id),
            ("to_id".to_string(), to_id),
        ],
    }
}

fn parse_list(text: &str, context: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        other => Err(Error::invalid_input(
            context,
            format!("expected a list, found {}", json_kind(&other)),
        )),
    }
}

fn require_id_field(record: &Value, context: &str, field: &str) -> Result<()> {
    let Value::Object(map) = record else {
        return Err(Error::invalid_input(
            context,
            format!("expected an object, found {}", json_kind(record)),
        ));
    };
    match map.get(field) {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(()),
        Some(Value::String(_)) => Err(Error::invalid_input(
            format!("{context}.{field}"),
            "id must not be blank",
        )),
        Some(other) => Err(Error::invalid_input(
            format!("{context}.{field}"),
            format!("expected a string, found {}", json_kind(other)),
        )),
        None => Err(Error::invalid_input(
            format!("{context}.{field}"),
            "missing required field",
        )),
    }
}

fn decode<T: DeserializeOwned>(record: Value, context: &str) -> Result<T> {
    serde_json::from_value(record).map_err(|e| Error::invalid_input(context, e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
