use anyhow::Context;
use manifestor_core::config::Config;
use manifestor_core::eventlistener::{generate_event_listener, OutputFormat};
use manifestor_core::layout::Manifest;
use manifestor_core::paths;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub manifest: Option<PathBuf>,
    pub name: Option<String>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

pub fn run(root: &Path, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    // Flag paths resolve against the root, same as the config's paths.
    let manifest_path = match args.manifest {
        Some(p) => paths::resolve(root, &p),
        None => config.manifest_path(root),
    };
    let name = args.name.unwrap_or_else(|| config.listener.name.clone());
    // --json is shorthand for --format json
    let format = match (args.format, json) {
        (Some(f), _) => f,
        (None, true) => OutputFormat::Json,
        (None, false) => config.output.format,
    };
    let output = match args.output {
        Some(p) => Some(paths::resolve(root, &p)),
        None => config.output_path(root),
    };

    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("failed to load manifest {}", manifest_path.display()))?;
    let listener = generate_event_listener(&name, &manifest)
        .context("failed to generate event listener")?;
    tracing::debug!(
        listener = %name,
        triggers = listener.spec.triggers.len(),
        "generated event listener"
    );

    match output {
        Some(path) => {
            listener
                .write(&path, format)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote EventListener '{}' ({} triggers) to {}",
                name,
                listener.spec.triggers.len(),
                path.display()
            );
        }
        None => print!("{}", listener.render(format)?),
    }
    Ok(())
}
