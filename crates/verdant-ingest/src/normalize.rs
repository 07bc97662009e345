// SPDX-License-Identifier: Apache-2.0

use crate::IngestError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use verdant_model::{CategoryTotals, EmissionsRecord, ReportingPeriod, ScopeTotals};

/// Wrapper keys the calculation workflow has been observed to nest its
/// payload under, probed in this order. First present object-valued key
/// wins.
pub const WRAPPER_KEYS: [&str; 5] = ["data", "json", "output", "result", "body"];

/// Upper bound on the raw-response excerpt carried in shape-error messages.
pub const RAW_EXCERPT_MAX: usize = 500;

/// The canonical snake_case shape every workflow response is reduced to.
/// This is the persisted field set; the workflow's own shape is not under
/// our control and changes without notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct NormalizedEmissions {
    pub total_emissions: f64,
    pub scope1_total: f64,
    pub scope2_total: f64,
    pub scope3_total: f64,
    pub electricity_total: f64,
    pub gas_total: f64,
    pub fuel_total: f64,
    pub flights_total: f64,
    pub water_total: f64,
    pub waste_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_breakdown: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_period: Option<String>,
}

impl NormalizedEmissions {
    /// Attach the upload context and produce the persistable record. The
    /// workflow may echo a reporting period of its own; the caller-supplied
    /// period wins because it is what the user asked for.
    pub fn into_record(
        self,
        period: ReportingPeriod,
        source_file: String,
        source_digest: Option<String>,
    ) -> Result<EmissionsRecord, IngestError> {
        let record = EmissionsRecord {
            period,
            categories: CategoryTotals {
                electricity: self.electricity_total,
                gas: self.gas_total,
                fuel: self.fuel_total,
                flights: self.flights_total,
                water: self.water_total,
                waste: self.waste_total,
            },
            scopes: ScopeTotals {
                scope1: self.scope1_total,
                scope2: self.scope2_total,
                scope3: self.scope3_total,
            },
            total_emissions: self.total_emissions,
            site_breakdown: self.site_breakdown,
            source_file,
            source_digest,
        };
        record
            .validate()
            .map_err(|e| IngestError(format!("normalized record failed validation: {e}")))?;
        Ok(record)
    }
}

/// Reduce the workflow's ad-hoc response body to [`NormalizedEmissions`].
///
/// Steps, first match wins at each one:
/// 1. an array body is replaced by its first element;
/// 2. a body without `total_emissions` is probed for a wrapper key
///    ([`WRAPPER_KEYS`]) and unwrapped, once more unwrapping an array;
/// 3. a body exposing `totalEmissions`, `scopes`, or `emissions` is
///    remapped field-by-field from the camelCase-nested shape;
/// 4. anything else is taken as already canonical.
///
/// Unparseable bodies and bodies that still lack a usable total after
/// unwrapping are errors; nothing is persisted on that path.
pub fn normalize_workflow_response(raw: &str) -> Result<NormalizedEmissions, IngestError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|_| {
        IngestError(format!(
            "workflow response is not JSON: {}",
            excerpt(raw, RAW_EXCERPT_MAX)
        ))
    })?;

    let mut body = unwrap_array(parsed, raw)?;

    if body.get("total_emissions").is_none() {
        if let Some(inner) = probe_wrapper_keys(&body) {
            body = unwrap_array(inner, raw)?;
        }
    }

    let obj = body.as_object().ok_or_else(|| {
        IngestError(format!(
            "workflow response is not an object: {}",
            excerpt(raw, RAW_EXCERPT_MAX)
        ))
    })?;

    let normalized = if obj.contains_key("totalEmissions")
        || obj.contains_key("scopes")
        || obj.contains_key("emissions")
    {
        remap_camel_case(obj)
    } else {
        canonical_from(obj)
    };

    if !has_usable_total(obj) {
        let mut keys: Vec<String> = obj.keys().cloned().collect();
        keys.sort();
        return Err(IngestError(format!(
            "workflow response has no total_emissions; observed keys: [{}]",
            keys.join(", ")
        )));
    }

    Ok(normalized)
}

fn unwrap_array(value: Value, raw: &str) -> Result<Value, IngestError> {
    match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err(IngestError(format!(
                    "workflow response is an empty array: {}",
                    excerpt(raw, RAW_EXCERPT_MAX)
                )));
            }
            Ok(items.swap_remove(0))
        }
        other => Ok(other),
    }
}

fn probe_wrapper_keys(body: &Value) -> Option<Value> {
    let obj = body.as_object()?;
    for key in WRAPPER_KEYS {
        if let Some(inner) = obj.get(key) {
            if inner.is_object() || inner.is_array() {
                return Some(inner.clone());
            }
        }
    }
    None
}

fn has_usable_total(obj: &Map<String, Value>) -> bool {
    obj.contains_key("total_emissions") || obj.contains_key("totalEmissions")
}

fn remap_camel_case(obj: &Map<String, Value>) -> NormalizedEmissions {
    let scopes = obj.get("scopes").and_then(Value::as_object);
    let emissions = obj.get("emissions").and_then(Value::as_object);

    NormalizedEmissions {
        total_emissions: num(obj.get("totalEmissions"))
            .or_else(|| num(obj.get("total_emissions")))
            .unwrap_or(0.0),
        scope1_total: nested_num(scopes, "scope1")
            .or_else(|| num(obj.get("scope1_total")))
            .unwrap_or(0.0),
        scope2_total: nested_num(scopes, "scope2")
            .or_else(|| num(obj.get("scope2_total")))
            .unwrap_or(0.0),
        scope3_total: nested_num(scopes, "scope3")
            .or_else(|| num(obj.get("scope3_total")))
            .unwrap_or(0.0),
        electricity_total: nested_num(emissions, "electricity")
            .or_else(|| num(obj.get("electricity_total")))
            .unwrap_or(0.0),
        gas_total: nested_num(emissions, "gas")
            .or_else(|| num(obj.get("gas_total")))
            .unwrap_or(0.0),
        fuel_total: nested_num(emissions, "fuel")
            .or_else(|| num(obj.get("fuel_total")))
            .unwrap_or(0.0),
        flights_total: nested_num(emissions, "flights")
            .or_else(|| num(obj.get("flights_total")))
            .unwrap_or(0.0),
        water_total: nested_num(emissions, "water")
            .or_else(|| num(obj.get("water_total")))
            .unwrap_or(0.0),
        waste_total: nested_num(emissions, "waste")
            .or_else(|| num(obj.get("waste_total")))
            .unwrap_or(0.0),
        site_breakdown: site_map(obj.get("siteBreakdown").or_else(|| obj.get("site_breakdown"))),
        reporting_period: text(obj.get("reportingPeriod").or_else(|| obj.get("reporting_period"))),
    }
}

fn canonical_from(obj: &Map<String, Value>) -> NormalizedEmissions {
    NormalizedEmissions {
        total_emissions: num(obj.get("total_emissions")).unwrap_or(0.0),
        scope1_total: num(obj.get("scope1_total")).unwrap_or(0.0),
        scope2_total: num(obj.get("scope2_total")).unwrap_or(0.0),
        scope3_total: num(obj.get("scope3_total")).unwrap_or(0.0),
        electricity_total: num(obj.get("electricity_total")).unwrap_or(0.0),
        gas_total: num(obj.get("gas_total")).unwrap_or(0.0),
        fuel_total: num(obj.get("fuel_total")).unwrap_or(0.0),
        flights_total: num(obj.get("flights_total")).unwrap_or(0.0),
        water_total: num(obj.get("water_total")).unwrap_or(0.0),
        waste_total: num(obj.get("waste_total")).unwrap_or(0.0),
        site_breakdown: site_map(obj.get("site_breakdown")),
        reporting_period: text(obj.get("reporting_period")),
    }
}

// The workflow sometimes emits numbers as strings; both count as numeric.
fn num(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn nested_num(obj: Option<&Map<String, Value>>, key: &str) -> Option<f64> {
    num(obj?.get(key))
}

fn text(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn site_map(value: Option<&Value>) -> Option<BTreeMap<String, f64>> {
    let obj = value?.as_object()?;
    let mut out = BTreeMap::new();
    for (site, v) in obj {
        out.insert(site.clone(), num(Some(v)).unwrap_or(0.0));
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn excerpt(raw: &str, max: usize) -> String {
    if raw.len() <= max {
        return raw.to_string();
    }
    let mut cut = max;
    while cut > 0 && !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &raw[..cut])
}
