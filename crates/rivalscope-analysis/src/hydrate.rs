use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use rivalscope_core::error::MalformedResponse;
use rivalscope_core::report::{AnalysisReport, ReportBody};
use rivalscope_core::urls::canonical_key;

const FENCE: &str = "```";

/// Remove one wrapping code fence from generated text.
///
/// Only a leading ```` ``` ```` (optionally tagged `json`) and a trailing
/// ```` ``` ```` at the ends of the trimmed text are removed. Fence sequences
/// anywhere else are left alone, so text without a wrapper comes back
/// trimmed but otherwise unchanged.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn generated text into a report for the given request URLs.
///
/// `primary_url` and `competitors` are copied verbatim; identity fields in
/// the payload (`id`, `primaryUrl`, ...) are ignored.
pub fn hydrate(
    raw: &str,
    primary_url: &str,
    competitors: &[String],
) -> Result<AnalysisReport, MalformedResponse> {
    let text = strip_fences(raw);
    let value: Value = serde_json::from_str(text).map_err(MalformedResponse::InvalidJson)?;

    let object = match value {
        Value::Object(object) => object,
        other => return Err(MalformedResponse::NotAnObject(kind_of(&other))),
    };

    let missing: Vec<String> = ReportBody::REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(MalformedResponse::MissingFields(missing));
    }

    let mut body: ReportBody =
        serde_json::from_value(Value::Object(object)).map_err(MalformedResponse::Shape)?;

    let requested: Vec<&str> = std::iter::once(primary_url)
        .chain(competitors.iter().map(String::as_str))
        .collect();
    reconcile_keys(&mut body, &requested);

    let report = AnalysisReport {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        primary_url: primary_url.to_string(),
        competitors: competitors.to_vec(),
        body,
    };
    debug!(
        report_id = %report.id,
        features = report.body.features.len(),
        "Hydrated report"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// URL key reconciliation
// ---------------------------------------------------------------------------

/// The requested URL a model-returned key refers to, if any.
///
/// An exact match wins; otherwise the first requested URL with the same
/// canonical key.
fn resolve<'a>(key: &str, requested: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = requested.iter().copied().find(|url| *url == key) {
        return Some(exact);
    }
    let wanted = canonical_key(key);
    requested
        .iter()
        .find(|url| canonical_key(url) == wanted)
        .copied()
}

/// Rewrite near-miss keys to the requested URL.
///
/// When a rewritten key would collide with an entry that already uses the
/// exact URL, the exact entry is kept and the other stays under its
/// original key.
fn reconcile_map<V>(map: &mut BTreeMap<String, V>, requested: &[&str]) {
    let mut displaced = Vec::new();
    for key in map.keys() {
        if let Some(target) = resolve(key, requested)
            && target != key.as_str()
        {
            displaced.push((key.clone(), target));
        }
    }
    for (key, target) in displaced {
        if map.contains_key(target) {
            continue;
        }
        if let Some(value) = map.remove(&key) {
            map.insert(target.to_string(), value);
        }
    }
}

fn reconcile_url(url: &mut String, requested: &[&str]) {
    if let Some(target) = resolve(url, requested)
        && target != url.as_str()
    {
        *url = target.to_string();
    }
}

fn reconcile_keys(body: &mut ReportBody, requested: &[&str]) {
    for profile in &mut body.profiles {
        reconcile_url(&mut profile.url, requested);
    }
    for feature in &mut body.features {
        reconcile_map(&mut feature.availability, requested);
    }
    for pricing in &mut body.pricing {
        reconcile_url(&mut pricing.url, requested);
    }
    for seo in &mut body.seo {
        reconcile_url(&mut seo.url, requested);
    }
    for stack in &mut body.tech_stacks {
        reconcile_url(&mut stack.url, requested);
    }
    reconcile_map(&mut body.swot, requested);
    reconcile_map(&mut body.market_positioning, requested);
}
