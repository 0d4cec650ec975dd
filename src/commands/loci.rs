use crate::cli::LociArgs;
use crate::commands::load_repo;
use crate::utils::{Result, TredMeta};
use itertools::Itertools;

pub fn loci(args: LociArgs) -> Result<()> {
    let repo = load_repo(&args.treds)?;

    if let Some(name) = &args.tred {
        let meta = repo
            .get(name)
            .ok_or_else(|| format!("Unknown locus: {} (known: {})", name, repo.names().iter().join(", ")))?;
        print_detail(name, meta);
        return Ok(());
    }

    for name in repo.names() {
        let meta = repo.get(name).unwrap();
        println!(
            "{:8} {:6} ({:8}) motif={:6} {:22} prerisk>={:<4} risk>={}",
            name,
            meta.gene_name,
            meta.gene_location,
            meta.repeat,
            meta.inheritance.full_name(),
            meta.cutoff_prerisk,
            meta.cutoff_risk
        );
    }
    Ok(())
}

fn print_detail(name: &str, meta: &TredMeta) {
    println!("{} ({})", name, meta.title);
    println!("Gene        {} ({}) - {}", meta.gene_name, meta.gene_location, meta.gene_part);
    println!("Inheritance {}", meta.inheritance.full_name());
    println!("Location    {}", meta.repeat_location);
    match meta.ref_copies() {
        Ok(copies) => println!("Sequence    ({})x{} in the reference", meta.repeat, copies),
        Err(_) => println!("Sequence    ({})x", meta.repeat),
    }
    println!("Cutoffs     prerisk={} risk={}", meta.cutoff_prerisk, meta.cutoff_risk);
    println!("Symptom     {}", meta.symptom);
    if let Some(url) = &meta.url {
        println!("See also    {}", url);
    }
}
