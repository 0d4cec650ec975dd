use crate::utils::{CallLabel, Result};
use serde::Serialize;
use serde_json::Value;
use std::{collections::BTreeMap, str::FromStr};

/// Read classification tag emitted by the genotyper for every read that
/// overlaps the repeat region.
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReadTag {
    /// Spans the full repeat plus both flanks.
    Full,
    /// Anchored in the prefix flank, extends into the repeat.
    Pref,
    /// Anchored in the suffix flank, extends into the repeat.
    Post,
    /// Contained entirely within the repeat.
    Rept,
    /// Hanging read with no usable anchor; not evidence for a call.
    Hang,
}

impl ReadTag {
    /// Evidence bucket for display. Hanging reads carry no usable repeat
    /// count and are left out of the buckets.
    pub fn class(&self) -> Option<ReadClass> {
        match self {
            ReadTag::Full => Some(ReadClass::FullSpanning),
            ReadTag::Pref | ReadTag::Post => Some(ReadClass::PartialSpanning),
            ReadTag::Rept => Some(ReadClass::RepeatOnly),
            ReadTag::Hang => None,
        }
    }
}

impl FromStr for ReadTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "FULL" => Ok(ReadTag::Full),
            "PREF" => Ok(ReadTag::Pref),
            "POST" => Ok(ReadTag::Post),
            "REPT" => Ok(ReadTag::Rept),
            "HANG" => Ok(ReadTag::Hang),
            _ => Err(format!("Unknown read tag: {}", s)),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadClass {
    FullSpanning,
    PartialSpanning,
    RepeatOnly,
}

/// One supporting read: its tag, observed repeat count and sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadDetail {
    pub tag: ReadTag,
    pub h: i64,
    pub seq: String,
}

/// Per-locus slice of the genotyper output.
#[derive(Debug, Clone, PartialEq)]
pub struct TredCalls {
    pub allele1: i64,
    pub allele2: i64,
    pub ci: String,
    pub label: Option<CallLabel>,
    pub details: Vec<ReadDetail>,
    pub prob_h1: BTreeMap<u32, f64>,
    pub prob_h2: BTreeMap<u32, f64>,
}

/// Parsed genotyper stdout. The call map uses a `<locus>.<field>` key
/// convention (`HD.1`, `HD.CI`, `HD.label`, ...), with sample-level fields
/// (`inferredGender`, `depthY`) alongside.
#[derive(Debug, Clone)]
pub struct Payload {
    pub samplekey: String,
    pub bam: String,
    calls: serde_json::Map<String, Value>,
}

impl Payload {
    /// Parses raw stdout. A top-level `error` field short-circuits: the
    /// message is returned as the error string.
    pub fn parse(stdout: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(stdout)
            .map_err(|e| format!("Invalid JSON from genotyper: {}", e))?;
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(message.to_string());
        }
        let object = value
            .as_object()
            .ok_or_else(|| "Genotyper output is not a JSON object".to_string())?;
        let calls = object
            .get("tredCalls")
            .and_then(Value::as_object)
            .ok_or_else(|| "Genotyper output has no tredCalls field".to_string())?
            .clone();
        Ok(Self {
            samplekey: string_field(object, "samplekey"),
            bam: string_field(object, "bam"),
            calls,
        })
    }

    pub fn inferred_gender(&self) -> Option<&str> {
        self.calls.get("inferredGender").and_then(Value::as_str)
    }

    pub fn depth_y(&self) -> Option<f64> {
        self.calls.get("depthY").and_then(Value::as_f64)
    }

    /// Names of loci that have at least an allele call in the payload.
    pub fn loci(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .calls
            .keys()
            .filter_map(|k| k.strip_suffix(".1"))
            .collect();
        names.sort_unstable();
        names
    }

    /// Extracts the per-locus call view, or an error if the locus has no
    /// allele calls in this payload.
    pub fn calls_for(&self, locus: &str) -> Result<TredCalls> {
        let field = |name: &str| self.calls.get(&format!("{}.{}", locus, name));

        let allele1 = field("1").and_then(Value::as_i64).ok_or_else(|| {
            let available = self.loci();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            format!(
                "No calls for locus {} in genotyper output (available: {})",
                locus, available
            )
        })?;
        let allele2 = field("2").and_then(Value::as_i64).unwrap_or(-1);

        let ci = field("CI")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let label = field("label")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());

        let details = field("details")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(parse_detail).collect())
            .unwrap_or_default();

        Ok(TredCalls {
            allele1,
            allele2,
            ci,
            label,
            details,
            prob_h1: field("P_h1").map(parse_density).unwrap_or_default(),
            prob_h2: field("P_h2").map(parse_density).unwrap_or_default(),
        })
    }
}

fn string_field(object: &serde_json::Map<String, Value>, name: &str) -> String {
    object
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_detail(entry: &Value) -> Option<ReadDetail> {
    let tag = entry.get("tag")?.as_str()?.parse().ok()?;
    Some(ReadDetail {
        tag,
        h: entry.get("h")?.as_i64()?,
        seq: entry
            .get("seq")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// A probability density arrives as a string-keyed map of repeat count to
/// frequency. Unparseable keys are dropped.
fn parse_density(value: &Value) -> BTreeMap<u32, f64> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_f64()?)))
                .collect()
        })
        .unwrap_or_default()
}
