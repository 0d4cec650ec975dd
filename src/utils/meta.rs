use crate::utils::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, io, path::Path, str::FromStr};

/// Built-in reference table, compiled from `data/treds.json`. Shipped with
/// the demo so that the tool works out of the box; a full table can be
/// loaded with `TredRepo::from_path`.
static BUILTIN: Lazy<TredRepo> = Lazy::new(|| {
    TredRepo::from_json(include_str!("../../data/treds.json"))
        .unwrap_or_else(|e| panic!("Built-in locus table is malformed: {}", e))
});

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum Inheritance {
    #[serde(rename = "AD")]
    AutosomalDominant,
    #[serde(rename = "AR")]
    AutosomalRecessive,
    #[serde(rename = "XLD")]
    XLinkedDominant,
    #[serde(rename = "XLR")]
    XLinkedRecessive,
}

impl Inheritance {
    pub fn full_name(&self) -> &'static str {
        match self {
            Inheritance::AutosomalDominant => "Autosomal dominant",
            Inheritance::AutosomalRecessive => "Autosomal recessive",
            Inheritance::XLinkedDominant => "X-linked dominant",
            Inheritance::XLinkedRecessive => "X-linked recessive",
        }
    }
}

impl FromStr for Inheritance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "AD" => Ok(Inheritance::AutosomalDominant),
            "AR" => Ok(Inheritance::AutosomalRecessive),
            "XLD" => Ok(Inheritance::XLinkedDominant),
            "XLR" => Ok(Inheritance::XLinkedRecessive),
            _ => Err(format!("Unknown inheritance mode: {}", s)),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationNature {
    Increase,
    Decrease,
}

/// Disease status of an allele call. The genotyper emits the same values in
/// its `<locus>.label` field.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallLabel {
    Ok,
    Prerisk,
    Risk,
    Missing,
}

impl CallLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallLabel::Ok => "ok",
            CallLabel::Prerisk => "prerisk",
            CallLabel::Risk => "risk",
            CallLabel::Missing => "missing",
        }
    }
}

impl FromStr for CallLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ok" => Ok(CallLabel::Ok),
            "prerisk" => Ok(CallLabel::Prerisk),
            "risk" => Ok(CallLabel::Risk),
            "missing" => Ok(CallLabel::Missing),
            _ => Err(format!("Unknown call label: {}", s)),
        }
    }
}

/// Metadata for one tracked STR disease locus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TredMeta {
    pub title: String,
    pub gene_name: String,
    pub gene_location: String,
    pub gene_part: String,
    pub inheritance: Inheritance,
    pub mutation_nature: MutationNature,
    pub repeat: String,
    pub repeat_location: String,
    pub cutoff_prerisk: i32,
    pub cutoff_risk: i32,
    pub prefix: String,
    pub suffix: String,
    pub symptom: String,
    pub omim_id: Option<u32>,
    pub src: Option<String>,
    pub url: Option<String>,
}

impl TredMeta {
    pub fn is_expansion(&self) -> bool {
        self.mutation_nature == MutationNature::Increase
    }

    pub fn is_recessive(&self) -> bool {
        matches!(
            self.inheritance,
            Inheritance::AutosomalRecessive | Inheritance::XLinkedRecessive
        )
    }

    pub fn is_xlinked(&self) -> bool {
        matches!(
            self.inheritance,
            Inheritance::XLinkedDominant | Inheritance::XLinkedRecessive
        )
    }

    /// Parses `repeat_location` (e.g. "chr4:3074877-3074933") into
    /// (chrom, start, end).
    pub fn region(&self) -> Result<(String, u32, u32)> {
        let error_msg = || format!("Invalid repeat location: {}", self.repeat_location);
        let elements: Vec<&str> = self.repeat_location.split(&[':', '-']).collect();
        if elements.len() != 3 {
            return Err(error_msg());
        }
        let start: u32 = elements[1].parse().map_err(|_| error_msg())?;
        let end: u32 = elements[2].parse().map_err(|_| error_msg())?;
        if start >= end {
            return Err(format!("Invalid region: start {} >= end {}", start, end));
        }
        Ok((elements[0].to_string(), start, end))
    }

    /// Number of repeat units in the reference genome.
    pub fn ref_copies(&self) -> Result<u32> {
        if self.repeat.is_empty() {
            return Err(format!("Empty repeat motif for gene {}", self.gene_name));
        }
        let (_, start, end) = self.region()?;
        Ok((end - start + 1) / self.repeat.len() as u32)
    }

    /// Classifies an allele pair against the locus cutoffs. The critical
    /// allele depends on the mutation direction and the inheritance mode:
    /// expansion loci look at the longer allele (shorter if recessive),
    /// contraction loci at the shorter allele (longer if recessive).
    /// An allele of -1 means the genotyper made no call.
    pub fn label(&self, allele1: i64, allele2: i64) -> CallLabel {
        let (a, b) = if allele1 <= allele2 {
            (allele1, allele2)
        } else {
            (allele2, allele1)
        };
        let mut label = if a != -1 {
            CallLabel::Ok
        } else {
            CallLabel::Missing
        };
        let (prerisk, risk) = (self.cutoff_prerisk as i64, self.cutoff_risk as i64);
        if self.is_expansion() {
            let crit = if self.is_recessive() { a } else { b };
            if prerisk <= crit && crit < risk {
                label = CallLabel::Prerisk;
            } else if crit >= risk {
                label = CallLabel::Risk;
            }
        } else {
            let crit = if self.is_recessive() { b } else { a };
            if prerisk <= crit && crit < risk {
                label = CallLabel::Prerisk;
            } else if 0 < crit && crit <= risk {
                label = CallLabel::Risk;
            }
        }
        label
    }
}

/// Read-only table of known STR disease loci, keyed by locus name.
/// Loaded once at startup and immutable for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct TredRepo {
    treds: HashMap<String, TredMeta>,
}

impl TredRepo {
    pub fn builtin() -> &'static TredRepo {
        &BUILTIN
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .map_err(|e| format!("Failed to open locus table {}: {}", path.display(), e))?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let treds: HashMap<String, TredMeta> = serde_json::from_reader(reader)
            .map_err(|e| format!("Failed to parse locus table: {}", e))?;
        Ok(Self { treds })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn get(&self, name: &str) -> Option<&TredMeta> {
        self.treds.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.treds.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.treds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.treds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expansion_meta(inheritance: Inheritance) -> TredMeta {
        TredMeta {
            title: "Huntington disease".to_string(),
            gene_name: "HTT".to_string(),
            gene_location: "4p16.3".to_string(),
            gene_part: "Coding".to_string(),
            inheritance,
            mutation_nature: MutationNature::Increase,
            repeat: "CAG".to_string(),
            repeat_location: "chr4:3074877-3074933".to_string(),
            cutoff_prerisk: 36,
            cutoff_risk: 40,
            prefix: "CCTTCG".to_string(),
            suffix: "CAACAG".to_string(),
            symptom: "Chorea".to_string(),
            omim_id: Some(143100),
            src: Some("omim".to_string()),
            url: None,
        }
    }

    fn contraction_meta() -> TredMeta {
        let mut meta = expansion_meta(Inheritance::AutosomalDominant);
        meta.mutation_nature = MutationNature::Decrease;
        meta.cutoff_prerisk = 100;
        meta.cutoff_risk = 10;
        meta
    }

    #[test]
    fn test_builtin_table() {
        let repo = TredRepo::builtin();
        assert!(!repo.is_empty());
        let hd = repo.get("HD").unwrap();
        assert_eq!(hd.repeat, "CAG");
        assert_eq!(hd.cutoff_risk, 40);
        assert!(hd.is_expansion());
        assert!(!hd.is_recessive());
        assert_eq!(repo.get("DM1").unwrap().repeat, "CTG");
        assert!(repo.get("NO_SUCH_LOCUS").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let names = TredRepo::builtin().names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"HD"));
    }

    #[test]
    fn test_region_and_ref_copies() {
        let meta = expansion_meta(Inheritance::AutosomalDominant);
        let (chrom, start, end) = meta.region().unwrap();
        assert_eq!(chrom, "chr4");
        assert_eq!(start, 3074877);
        assert_eq!(end, 3074933);
        assert_eq!(meta.ref_copies().unwrap(), 19);
    }

    #[test]
    fn test_ref_copies_empty_motif() {
        let mut meta = expansion_meta(Inheritance::AutosomalDominant);
        meta.repeat = String::new();
        let err = meta.ref_copies().unwrap_err();
        assert!(err.contains("Empty repeat motif"));
    }

    #[test]
    fn test_region_invalid() {
        let mut meta = expansion_meta(Inheritance::AutosomalDominant);
        meta.repeat_location = "chr4".to_string();
        assert!(meta.region().is_err());
        meta.repeat_location = "chr4:200-100".to_string();
        assert!(meta.region().is_err());
    }

    #[test]
    fn test_label_expansion_dominant() {
        let meta = expansion_meta(Inheritance::AutosomalDominant);
        assert_eq!(meta.label(17, 20), CallLabel::Ok);
        assert_eq!(meta.label(17, 37), CallLabel::Prerisk);
        assert_eq!(meta.label(17, 41), CallLabel::Risk);
        assert_eq!(meta.label(41, 17), CallLabel::Risk);
        assert_eq!(meta.label(40, 40), CallLabel::Risk);
        // Allele counts wider than 32 bits must not wrap around.
        assert_eq!(meta.label(17, 17_179_869_184), CallLabel::Risk);
    }

    #[test]
    fn test_label_expansion_recessive() {
        let meta = expansion_meta(Inheritance::AutosomalRecessive);
        // One expanded allele is not enough for a recessive locus.
        assert_eq!(meta.label(17, 45), CallLabel::Ok);
        assert_eq!(meta.label(42, 45), CallLabel::Risk);
        assert_eq!(meta.label(37, 45), CallLabel::Prerisk);
    }

    #[test]
    fn test_label_contraction() {
        let meta = contraction_meta();
        assert_eq!(meta.label(30, 40), CallLabel::Ok);
        assert_eq!(meta.label(5, 40), CallLabel::Risk);
        assert_eq!(meta.label(10, 40), CallLabel::Risk);
    }

    #[test]
    fn test_label_missing() {
        let meta = expansion_meta(Inheritance::AutosomalDominant);
        assert_eq!(meta.label(-1, -1), CallLabel::Missing);
        // A single called allele above the cutoff still flags risk.
        assert_eq!(meta.label(-1, 45), CallLabel::Risk);
    }

    #[test]
    fn test_from_reader_rejects_garbage() {
        assert!(TredRepo::from_json("not json").is_err());
        assert!(TredRepo::from_json("{\"HD\": {\"title\": \"x\"}}").is_err());
    }

    #[test]
    fn test_inheritance_round_trip() {
        assert_eq!(
            "XLR".parse::<Inheritance>().unwrap(),
            Inheritance::XLinkedRecessive
        );
        assert!("ZZ".parse::<Inheritance>().is_err());
        assert_eq!(
            Inheritance::XLinkedDominant.full_name(),
            "X-linked dominant"
        );
    }
}
