//! Tekton `EventListener` generation from a deployment [`Manifest`].
//!
//! Every service with a `source_url` gets one trigger, wired to its
//! environment's integration template/binding and guarded by a CEL filter
//! that matches pull requests against the service's repository.

use crate::error::{ManifestorError, Result};
use crate::layout::{Application, Environment, Manifest, Service, TemplateBinding, Visitor};
use crate::repo::repository_from_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const API_VERSION: &str = "triggers.tekton.dev/v1alpha1";
pub const KIND: &str = "EventListener";

/// CEL filter for pull-request events on `repo`.
///
/// NOTE: `&&` binds tighter than `||`, so this reads as
/// `(pull_request && opened) || synchronize`. Consumers match on the exact
/// string, so keep it as-is until the filter contract changes.
pub fn ci_filter(repo: &str) -> String {
    format!(
        "(header.match('X-GitHub-Event', 'pull_request') && body.action == 'opened' || body.action == 'synchronize') && body.pull_request.head.repo.full_name == '{repo}'"
    )
}

// ---------------------------------------------------------------------------
// ServiceRecord extraction
// ---------------------------------------------------------------------------

/// A CI/CD-eligible service flattened out of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// `owner/name` taken from the service's source URL.
    pub repo_name: String,
    /// `<application>-<service>`.
    pub name: String,
    pub env: String,
    pub ci: TemplateBinding,
    /// Carried for deployment triggers; the listener only wires `ci` today.
    pub cd: TemplateBinding,
}

#[derive(Debug, Default)]
struct ServiceVisitor {
    services: Vec<ServiceRecord>,
}

impl Visitor for ServiceVisitor {
    fn on_service(&mut self, env: &Environment, app: &Application, svc: &Service) -> Result<()> {
        if !svc.has_source() {
            return Ok(());
        }
        let record = ServiceRecord {
            repo_name: repository_from_url(&svc.source_url)?,
            name: format!("{}-{}", app.name, svc.name),
            env: env.name.clone(),
            ci: env.pipelines.integration.clone(),
            cd: env.pipelines.deployment.clone(),
        };
        tracing::debug!(
            env = %record.env,
            trigger = %record.name,
            repo = %record.repo_name,
            "extracted service"
        );
        self.services.push(record);
        Ok(())
    }
}

/// Collect a [`ServiceRecord`] for every service that has a source URL, in
/// manifest order. Any malformed URL fails the whole extraction.
pub fn extract_services(manifest: &Manifest) -> Result<Vec<ServiceRecord>> {
    let mut visitor = ServiceVisitor::default();
    manifest.walk(&mut visitor)?;
    Ok(visitor.services)
}

// ---------------------------------------------------------------------------
// EventListener resource
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListenerBinding {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListenerTemplate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelInterceptor {
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInterceptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cel: Option<CelInterceptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListenerTrigger {
    pub name: String,
    pub bindings: Vec<EventListenerBinding>,
    pub template: EventListenerTemplate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interceptors: Vec<EventInterceptor>,
}

impl EventListenerTrigger {
    pub fn from_record(record: &ServiceRecord) -> Self {
        Self {
            name: record.name.clone(),
            bindings: vec![EventListenerBinding {
                name: record.ci.binding.clone(),
            }],
            template: EventListenerTemplate {
                name: record.ci.template.clone(),
            },
            interceptors: vec![EventInterceptor {
                cel: Some(CelInterceptor {
                    filter: ci_filter(&record.repo_name),
                }),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListenerSpec {
    #[serde(default)]
    pub triggers: Vec<EventListenerTrigger>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListener {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: EventListenerSpec,
}

impl EventListener {
    pub fn new(name: impl Into<String>, triggers: Vec<EventListenerTrigger>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta { name: name.into() },
            spec: EventListenerSpec { triggers },
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Yaml => self.to_yaml(),
            OutputFormat::Json => self.to_json().map(|mut s| {
                s.push('\n');
                s
            }),
        }
    }

    pub fn write(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let data = self.render(format)?;
        crate::io::atomic_write(path, data.as_bytes())?;
        tracing::info!(
            path = %path.display(),
            triggers = self.spec.triggers.len(),
            "wrote event listener"
        );
        Ok(())
    }
}

/// One trigger per record, same order.
pub fn make_triggers(records: &[ServiceRecord]) -> Vec<EventListenerTrigger> {
    records.iter().map(EventListenerTrigger::from_record).collect()
}

/// Build the `EventListener` named `name` for every CI-eligible service in
/// `manifest`.
pub fn generate_event_listener(name: &str, manifest: &Manifest) -> Result<EventListener> {
    let records = extract_services(manifest)?;
    Ok(EventListener::new(name, make_triggers(&records)))
}

// ---------------------------------------------------------------------------
// OutputFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ManifestorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ManifestorError::InvalidOutputFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
