use crate::exec::ExecutionRecord;
use crate::report::{Payload, ReadClass, ReadDetail, TredCalls};
use crate::utils::{CallLabel, TredMeta, TredRepo};
use serde::Serialize;
use std::collections::BTreeMap;

/// Display severity in the register of the original web UI (bootstrap
/// panel styles).
#[derive(Debug, PartialEq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Default,
}

impl From<CallLabel> for Severity {
    fn from(label: CallLabel) -> Self {
        match label {
            CallLabel::Ok => Severity::Success,
            CallLabel::Prerisk => Severity::Warning,
            CallLabel::Risk => Severity::Danger,
            CallLabel::Missing => Severity::Default,
        }
    }
}

/// Read evidence bucketed by how much of the repeat each read covers.
#[derive(Debug, Default, PartialEq, Clone, Serialize)]
pub struct ReadSupport {
    pub full_spanning: Vec<ReadDetail>,
    pub partial_spanning: Vec<ReadDetail>,
    pub repeat_only: Vec<ReadDetail>,
}

impl ReadSupport {
    fn from_details(details: Vec<ReadDetail>) -> Self {
        let mut support = ReadSupport::default();
        for detail in details {
            match detail.tag.class() {
                Some(ReadClass::FullSpanning) => support.full_spanning.push(detail),
                Some(ReadClass::PartialSpanning) => support.partial_spanning.push(detail),
                Some(ReadClass::RepeatOnly) => support.repeat_only.push(detail),
                None => {}
            }
        }
        support
    }
}

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct CallDisplay {
    pub locus: String,
    pub samplekey: String,
    pub bam: String,
    pub title: String,
    pub gene_name: String,
    pub gene_location: String,
    pub motif: String,
    pub inheritance: String,
    pub ref_copies: Option<u32>,
    pub alleles: (i64, i64),
    pub ci_h1: String,
    pub ci_h2: String,
    pub label: CallLabel,
    pub status: Severity,
    pub reads: ReadSupport,
    pub prob_h1: BTreeMap<u32, f64>,
    pub prob_h2: BTreeMap<u32, f64>,
    pub inferred_gender: Option<String>,
    pub depth_y: Option<f64>,
}

/// What the client renders for one subscribed command key: either an error
/// banner or a full call panel.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayModel {
    Error { message: String },
    Call(CallDisplay),
}

impl DisplayModel {
    fn error(message: impl Into<String>) -> Self {
        DisplayModel::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DisplayModel::Error { .. })
    }
}

/// Projects a stored execution record into its display model. Pure and
/// deterministic: parse failures and error payloads become an error model,
/// never a panic.
pub fn render(record: &ExecutionRecord, locus: &str, repo: &TredRepo) -> DisplayModel {
    let payload = match Payload::parse(&record.stdout) {
        Ok(payload) => payload,
        Err(message) => return DisplayModel::error(message),
    };
    let meta = match repo.get(locus) {
        Some(meta) => meta,
        None => return DisplayModel::error(format!("Unknown locus: {}", locus)),
    };
    let calls = match payload.calls_for(locus) {
        Ok(calls) => calls,
        Err(message) => return DisplayModel::error(message),
    };
    DisplayModel::Call(project(locus, meta, &payload, calls))
}

fn project(locus: &str, meta: &TredMeta, payload: &Payload, calls: TredCalls) -> CallDisplay {
    // The genotyper's own label wins when present; otherwise reclassify
    // from the allele pair and the locus cutoffs.
    let label = calls
        .label
        .unwrap_or_else(|| meta.label(calls.allele1, calls.allele2));

    let (ci_h1, ci_h2) = split_ci(&calls.ci);

    CallDisplay {
        locus: locus.to_string(),
        samplekey: payload.samplekey.clone(),
        bam: payload.bam.clone(),
        title: meta.title.clone(),
        gene_name: meta.gene_name.clone(),
        gene_location: meta.gene_location.clone(),
        motif: meta.repeat.clone(),
        inheritance: meta.inheritance.full_name().to_string(),
        ref_copies: meta.ref_copies().ok(),
        alleles: (calls.allele1, calls.allele2),
        ci_h1,
        ci_h2,
        label,
        status: Severity::from(label),
        reads: ReadSupport::from_details(calls.details),
        prob_h1: calls.prob_h1,
        prob_h2: calls.prob_h2,
        inferred_gender: payload.inferred_gender().map(str::to_string),
        depth_y: payload.depth_y(),
    }
}

/// The credible interval arrives pipe-delimited, one range per haplotype
/// ("17-17|39-42").
fn split_ci(ci: &str) -> (String, String) {
    let mut parts = ci.splitn(2, '|');
    let h1 = parts.next().unwrap_or_default().to_string();
    let h2 = parts.next().unwrap_or_default().to_string();
    (h1, h2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ExecutionRecord;

    fn record_with(stdout: &str) -> ExecutionRecord {
        ExecutionRecord::new("tred.py sample.bam --tred HD --ref hg38", stdout, "")
    }

    fn payload_with_label(label: &str) -> String {
        serde_json::json!({
            "samplekey": "sample",
            "bam": "sample.bam",
            "tredCalls": {
                "inferredGender": "Female",
                "depthY": -1.0,
                "HD.1": 17,
                "HD.2": 41,
                "HD.CI": "17-17|39-42",
                "HD.label": label,
                "HD.details": [
                    {"tag": "FULL", "h": 17, "seq": "CAGCAG"},
                    {"tag": "PREF", "h": 40, "seq": "CAGCAA"},
                    {"tag": "HANG", "h": 2, "seq": "CA"}
                ],
                "HD.P_h1": {"17": 1.0},
                "HD.P_h2": {"41": 1.0}
            }
        })
        .to_string()
    }

    #[test]
    fn test_label_to_severity_round_trip() {
        let repo = TredRepo::builtin();
        for (label, severity) in [
            ("ok", Severity::Success),
            ("prerisk", Severity::Warning),
            ("risk", Severity::Danger),
        ] {
            let record = record_with(&payload_with_label(label));
            match render(&record, "HD", repo) {
                DisplayModel::Call(call) => assert_eq!(call.status, severity),
                DisplayModel::Error { message } => panic!("Unexpected error: {}", message),
            }
        }
    }

    #[test]
    fn test_render_full_call() {
        let record = record_with(&payload_with_label("risk"));
        let call = match render(&record, "HD", TredRepo::builtin()) {
            DisplayModel::Call(call) => call,
            DisplayModel::Error { message } => panic!("Unexpected error: {}", message),
        };
        assert_eq!(call.samplekey, "sample");
        assert_eq!(call.bam, "sample.bam");
        assert_eq!(call.gene_name, "HTT");
        assert_eq!(call.motif, "CAG");
        assert_eq!(call.alleles, (17, 41));
        assert_eq!(call.ci_h1, "17-17");
        assert_eq!(call.ci_h2, "39-42");
        assert_eq!(call.reads.full_spanning.len(), 1);
        assert_eq!(call.reads.partial_spanning.len(), 1);
        assert!(call.reads.repeat_only.is_empty());
        assert_eq!(call.prob_h1[&17], 1.0);
        assert_eq!(call.inferred_gender.as_deref(), Some("Female"));
        assert_eq!(call.ref_copies, Some(19));
    }

    #[test]
    fn test_missing_label_is_recomputed_from_cutoffs() {
        let text = serde_json::json!({
            "samplekey": "s",
            "bam": "b",
            "tredCalls": {"HD.1": 17, "HD.2": 44}
        })
        .to_string();
        let call = match render(&record_with(&text), "HD", TredRepo::builtin()) {
            DisplayModel::Call(call) => call,
            DisplayModel::Error { message } => panic!("Unexpected error: {}", message),
        };
        // 44 repeats is above the HD risk cutoff of 40.
        assert_eq!(call.label, CallLabel::Risk);
        assert_eq!(call.status, Severity::Danger);
    }

    #[test]
    fn test_oversized_allele_does_not_wrap() {
        // 2^34 repeats is nonsense, but a hostile payload must still land
        // on the risk side of the cutoff instead of wrapping to ok.
        let text = serde_json::json!({
            "samplekey": "s",
            "bam": "b",
            "tredCalls": {"HD.1": 17, "HD.2": 17_179_869_184i64}
        })
        .to_string();
        let call = match render(&record_with(&text), "HD", TredRepo::builtin()) {
            DisplayModel::Call(call) => call,
            DisplayModel::Error { message } => panic!("Unexpected error: {}", message),
        };
        assert_eq!(call.label, CallLabel::Risk);
        assert_eq!(call.status, Severity::Danger);
    }

    #[test]
    fn test_error_payload_renders_error_model() {
        let record = record_with("{\"error\": \"boom\"}");
        match render(&record, "HD", TredRepo::builtin()) {
            DisplayModel::Error { message } => assert_eq!(message, "boom"),
            DisplayModel::Call(_) => panic!("Expected an error model"),
        }
    }

    #[test]
    fn test_garbage_stdout_renders_error_model() {
        let record = record_with("Traceback (most recent call last): ...");
        assert!(render(&record, "HD", TredRepo::builtin()).is_error());
    }

    #[test]
    fn test_unknown_locus_renders_error_model() {
        let record = record_with(&payload_with_label("ok"));
        match render(&record, "XYZ", TredRepo::builtin()) {
            DisplayModel::Error { message } => assert!(message.contains("Unknown locus")),
            DisplayModel::Call(_) => panic!("Expected an error model"),
        }
    }

    #[test]
    fn test_locus_absent_from_payload_renders_error_model() {
        let record = record_with(&payload_with_label("ok"));
        match render(&record, "DM1", TredRepo::builtin()) {
            DisplayModel::Error { message } => {
                assert!(message.contains("No calls for locus DM1"))
            }
            DisplayModel::Call(_) => panic!("Expected an error model"),
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = record_with(&payload_with_label("prerisk"));
        let repo = TredRepo::builtin();
        assert_eq!(render(&record, "HD", repo), render(&record, "HD", repo));
    }

    #[test]
    fn test_display_model_serializes() {
        let record = record_with(&payload_with_label("ok"));
        let model = render(&record, "HD", TredRepo::builtin());
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["kind"], "call");
        assert_eq!(json["status"], "success");
        assert_eq!(json["reads"]["full_spanning"][0]["tag"], "FULL");
    }
}
