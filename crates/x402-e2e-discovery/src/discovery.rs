//! Walks `servers/`, `clients/`, `facilitators/` (and, when enabled,
//! `legacy/legacy-*`) and binds each valid subdirectory into a `Discovered*`
//! entity (spec.md §4.2).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use x402_e2e_config::{load_test_config_of_kind, ComponentKind, TestConfig};

use crate::proxy::{ClientProxy, FacilitatorProxy, ServerProxy};

/// Builds concrete Proxy implementations for a discovered directory.
///
/// Discovery itself is proxy-agnostic: it only knows *that* a component
/// needs a handle, never *how* that handle runs its subprocess. A real
/// factory (in `x402-e2e-proxy`) wraps `tokio::process::Command`; tests use
/// an in-memory fake.
pub trait ProxyFactory: Send + Sync {
    fn server_proxy(&self, dir: &Path, config: &TestConfig) -> Arc<dyn ServerProxy>;
    fn client_proxy(&self, dir: &Path, config: &TestConfig) -> Arc<dyn ClientProxy>;
    fn facilitator_proxy(&self, dir: &Path, config: &TestConfig) -> Arc<dyn FacilitatorProxy>;
}

#[derive(Clone)]
pub struct DiscoveredServer {
    pub name: String,
    pub directory: PathBuf,
    pub config: TestConfig,
    pub proxy: Arc<dyn ServerProxy>,
}

#[derive(Clone)]
pub struct DiscoveredClient {
    pub name: String,
    pub directory: PathBuf,
    pub config: TestConfig,
    pub proxy: Arc<dyn ClientProxy>,
}

#[derive(Clone)]
pub struct DiscoveredFacilitator {
    pub name: String,
    pub directory: PathBuf,
    pub config: TestConfig,
    pub proxy: Arc<dyn FacilitatorProxy>,
}

/// Options controlling the discovery walk.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// When set, also walk `<base>/legacy/legacy-*` directories as
    /// additional candidates of the relevant kind (spec.md §4.2).
    pub include_legacy: bool,
}

const LEGACY_PREFIX: &str = "legacy-";

/// Subdirectories (non-recursive, one level) of `root` sorted by name for
/// deterministic discovery order.
fn immediate_subdirs(root: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|p| p.is_dir())
        .collect()
}

fn walk_kind(
    base: &Path,
    subdir_name: &str,
    kind: ComponentKind,
    options: &DiscoveryOptions,
) -> Vec<(PathBuf, TestConfig)> {
    let mut found = Vec::new();

    let root = base.join(subdir_name);
    for dir in immediate_subdirs(&root) {
        match load_test_config_of_kind(&dir, kind) {
            Ok(Some(config)) => found.push((dir, config)),
            Ok(None) => {
                tracing::debug!(dir = %dir.display(), "no test.config.json, skipping");
            }
            Err(err) => {
                tracing::warn!(dir = %dir.display(), %err, "skipping component with invalid config");
            }
        }
    }

    if options.include_legacy {
        let legacy_root = base.join("legacy");
        for dir in immediate_subdirs(&legacy_root) {
            let is_legacy = dir
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LEGACY_PREFIX));
            if !is_legacy {
                continue;
            }
            match load_test_config_of_kind(&dir, kind) {
                Ok(Some(config)) => found.push((dir, config)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), %err, "skipping legacy component with invalid config");
                }
            }
        }
    }

    found
}

/// Discovers all servers under `<base>/servers/`.
pub fn discover_servers(
    base: &Path,
    options: &DiscoveryOptions,
    factory: &dyn ProxyFactory,
) -> Vec<DiscoveredServer> {
    walk_kind(base, "servers", ComponentKind::Server, options)
        .into_iter()
        .map(|(dir, config)| DiscoveredServer {
            name: config.name.clone(),
            proxy: factory.server_proxy(&dir, &config),
            directory: dir,
            config,
        })
        .collect()
}

/// Discovers all clients under `<base>/clients/`.
pub fn discover_clients(
    base: &Path,
    options: &DiscoveryOptions,
    factory: &dyn ProxyFactory,
) -> Vec<DiscoveredClient> {
    walk_kind(base, "clients", ComponentKind::Client, options)
        .into_iter()
        .map(|(dir, config)| DiscoveredClient {
            name: config.name.clone(),
            proxy: factory.client_proxy(&dir, &config),
            directory: dir,
            config,
        })
        .collect()
}

/// Discovers all facilitators under `<base>/facilitators/`.
pub fn discover_facilitators(
    base: &Path,
    options: &DiscoveryOptions,
    factory: &dyn ProxyFactory,
) -> Vec<DiscoveredFacilitator> {
    walk_kind(base, "facilitators", ComponentKind::Facilitator, options)
        .into_iter()
        .map(|(dir, config)| DiscoveredFacilitator {
            name: config.name.clone(),
            proxy: factory.facilitator_proxy(&dir, &config),
            directory: dir,
            config,
        })
        .collect()
}
