use crate::output::{print_json, print_table};
use anyhow::Context;
use manifestor_core::config::Config;
use manifestor_core::eventlistener::extract_services;
use manifestor_core::layout::Manifest;
use manifestor_core::paths;
use std::path::Path;

pub fn run(root: &Path, manifest: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let manifest_path = match manifest {
        Some(p) => paths::resolve(root, p),
        None => config.manifest_path(root),
    };
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;
    let records = extract_services(&manifest).context("failed to extract services")?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No services with a source URL.");
        return Ok(());
    }

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.env.clone(),
                r.name.clone(),
                r.repo_name.clone(),
                r.ci.template.clone(),
                r.ci.binding.clone(),
            ]
        })
        .collect();
    print_table(&["ENV", "TRIGGER", "REPO", "CI TEMPLATE", "CI BINDING"], rows);
    Ok(())
}
