use crate::error::{ManifestorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// TemplateBinding / Pipelines
// ---------------------------------------------------------------------------

/// Names of a pre-existing TriggerTemplate and TriggerBinding pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
    pub template: String,
    pub binding: String,
}

impl TemplateBinding {
    pub fn new(template: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            binding: binding.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipelines {
    pub integration: TemplateBinding,
    pub deployment: TemplateBinding,
}

// ---------------------------------------------------------------------------
// Service / Application / Environment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    /// Where the service is built from. Empty means the service has no
    /// CI/CD wiring.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_url: String,
}

impl Service {
    pub fn new(name: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_url: source_url.into(),
        }
    }

    pub fn has_source(&self) -> bool {
        !self.source_url.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub pipelines: Pipelines,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apps: Vec<Application>,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub environments: Vec<Environment>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ManifestorError::ManifestNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_yaml::from_str(&data)?;
        tracing::debug!(
            path = %path.display(),
            environments = manifest.environments.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Visit every environment, application and service in source order.
    ///
    /// Each environment is reported before its applications, and each
    /// application before its services. The walk stops at the first error a
    /// callback returns and hands that error back unchanged.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        for env in &self.environments {
            visitor.on_environment(env)?;
            for app in &env.apps {
                visitor.on_application(env, app)?;
                for svc in &app.services {
                    visitor.on_service(env, app, svc)?;
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Visitor
// ---------------------------------------------------------------------------

/// Callbacks driven by [`Manifest::walk`]. All three default to no-ops.
pub trait Visitor {
    fn on_environment(&mut self, _env: &Environment) -> Result<()> {
        Ok(())
    }

    fn on_application(&mut self, _env: &Environment, _app: &Application) -> Result<()> {
        Ok(())
    }

    fn on_service(
        &mut self,
        _env: &Environment,
        _app: &Application,
        _svc: &Service,
    ) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pipelines(env: &str) -> Pipelines {
        Pipelines {
            integration: TemplateBinding::new(
                format!("{env}-ci-template"),
                format!("{env}-ci-binding"),
            ),
            deployment: TemplateBinding::new(
                format!("{env}-cd-template"),
                format!("{env}-cd-binding"),
            ),
        }
    }

    fn two_env_manifest() -> Manifest {
        Manifest {
            environments: vec![
                Environment {
                    name: "dev".to_string(),
                    pipelines: pipelines("dev"),
                    apps: vec![
                        Application {
                            name: "a1".to_string(),
                            services: vec![
                                Service::new("s1", "https://github.com/o/r1"),
                                Service::new("s2", ""),
                            ],
                        },
                        Application {
                            name: "a2".to_string(),
                            services: vec![],
                        },
                    ],
                },
                Environment {
                    name: "prod".to_string(),
                    pipelines: pipelines("prod"),
                    apps: vec![Application {
                        name: "a3".to_string(),
                        services: vec![Service::new("s3", "https://github.com/o/r3")],
                    }],
                },
            ],
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        fail_on: Option<String>,
    }

    impl Recorder {
        fn record(&mut self, call: String) -> Result<()> {
            let failing = self.fail_on.as_deref() == Some(call.as_str());
            self.calls.push(call.clone());
            if failing {
                return Err(ManifestorError::InvalidRepositoryPath(call));
            }
            Ok(())
        }
    }

    impl Visitor for Recorder {
        fn on_environment(&mut self, env: &Environment) -> Result<()> {
            self.record(format!("env:{}", env.name))
        }

        fn on_application(&mut self, env: &Environment, app: &Application) -> Result<()> {
            self.record(format!("app:{}/{}", env.name, app.name))
        }

        fn on_service(&mut self, env: &Environment, app: &Application, svc: &Service) -> Result<()> {
            self.record(format!("svc:{}/{}/{}", env.name, app.name, svc.name))
        }
    }

    #[test]
    fn walk_visits_depth_first_in_source_order() {
        let mut rec = Recorder::default();
        two_env_manifest().walk(&mut rec).unwrap();
        assert_eq!(
            rec.calls,
            vec![
                "env:dev",
                "app:dev/a1",
                "svc:dev/a1/s1",
                "svc:dev/a1/s2",
                "app:dev/a2",
                "env:prod",
                "app:prod/a3",
                "svc:prod/a3/s3",
            ]
        );
    }

    #[test]
    fn walk_does_not_filter_services_without_source() {
        let mut rec = Recorder::default();
        two_env_manifest().walk(&mut rec).unwrap();
        assert!(rec.calls.contains(&"svc:dev/a1/s2".to_string()));
    }

    #[test]
    fn walk_stops_at_first_error() {
        let mut rec = Recorder {
            fail_on: Some("app:dev/a2".to_string()),
            ..Default::default()
        };
        let err = two_env_manifest().walk(&mut rec).unwrap_err();
        assert!(matches!(
            err,
            ManifestorError::InvalidRepositoryPath(ref c) if c == "app:dev/a2"
        ));
        assert_eq!(rec.calls.last().map(String::as_str), Some("app:dev/a2"));
        assert!(!rec.calls.iter().any(|c| c.starts_with("env:prod")));
    }

    #[test]
    fn walk_error_in_environment_callback_skips_children() {
        let mut rec = Recorder {
            fail_on: Some("env:dev".to_string()),
            ..Default::default()
        };
        assert!(two_env_manifest().walk(&mut rec).is_err());
        assert_eq!(rec.calls, vec!["env:dev"]);
    }

    #[test]
    fn walk_empty_manifest_is_ok() {
        let mut rec = Recorder::default();
        Manifest::default().walk(&mut rec).unwrap();
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn default_visitor_is_noop() {
        struct Nothing;
        impl Visitor for Nothing {}
        two_env_manifest().walk(&mut Nothing).unwrap();
    }

    #[test]
    fn manifest_yaml_optional_fields() {
        let yaml = r#"
environments:
  - name: staging
    pipelines:
      integration:
        template: ci-t
        binding: ci-b
      deployment:
        template: cd-t
        binding: cd-b
    apps:
      - name: web
        services:
          - name: frontend
            source_url: https://github.com/acme/frontend
          - name: cache
  - name: empty
    pipelines:
      integration: { template: t, binding: b }
      deployment: { template: t, binding: b }
"#;
        let m: Manifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(m.environments.len(), 2);
        let svcs = &m.environments[0].apps[0].services;
        assert!(svcs[0].has_source());
        assert!(!svcs[1].has_source());
        assert!(m.environments[1].apps.is_empty());
    }

    #[test]
    fn manifest_yaml_requires_pipelines() {
        let yaml = "environments:\n  - name: dev\n";
        assert!(serde_yaml::from_str::<Manifest>(yaml).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.yaml");
        let m = two_env_manifest();
        m.save(&path).unwrap();

        let out = std::fs::read_to_string(&path).unwrap();
        assert!(out.contains("source_url: https://github.com/o/r1"));
        // services without a source don't emit an empty key
        assert_eq!(out.matches("source_url").count(), 2);

        assert_eq!(Manifest::load(&path).unwrap(), m);
    }

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ManifestorError::ManifestNotFound(_)));
    }

    #[test]
    fn load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.yaml");
        std::fs::write(&path, "environments: [").unwrap();
        assert!(matches!(
            Manifest::load(&path).unwrap_err(),
            ManifestorError::Yaml(_)
        ));
    }
}
