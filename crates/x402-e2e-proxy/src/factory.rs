use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use x402_e2e_config::TestConfig;
use x402_e2e_discovery::{ClientProxy, FacilitatorProxy, ProxyFactory, ServerProxy};

use crate::client_proxy::SubprocessClientProxy;
use crate::facilitator_proxy::SubprocessFacilitatorProxy;
use crate::server_proxy::SubprocessServerProxy;

/// Builds subprocess-backed proxies for discovery. Each component
/// directory is expected to expose a `run` script (`run.sh` on Unix, or
/// whatever `command`/`args` the caller configures) that this factory
/// invokes with the working directory set to the component's own folder.
pub struct SubprocessProxyFactory {
    runner: String,
    extra_env: HashMap<String, String>,
}

impl SubprocessProxyFactory {
    /// `runner` is the interpreter/launcher (e.g. `"./run.sh"`, `"node"`,
    /// `"cargo run --"`) each discovered component is invoked through;
    /// `extra_env` is merged into every spawned subprocess's environment
    /// (used for the globally-required keys validated in spec.md §4.13
    /// step 1).
    pub fn new(runner: impl Into<String>, extra_env: HashMap<String, String>) -> Self {
        Self {
            runner: runner.into(),
            extra_env,
        }
    }
}

impl ProxyFactory for SubprocessProxyFactory {
    fn server_proxy(&self, dir: &Path, config: &TestConfig) -> Arc<dyn ServerProxy> {
        let protected_path = config
            .payment_endpoints()
            .next()
            .map(|e| e.path.clone())
            .unwrap_or_else(|| "/paid".to_string());
        Arc::new(SubprocessServerProxy::new(
            self.runner.clone(),
            Vec::new(),
            Some(dir.to_path_buf()),
            protected_path,
            self.extra_env.clone(),
        ))
    }

    fn client_proxy(&self, dir: &Path, _config: &TestConfig) -> Arc<dyn ClientProxy> {
        Arc::new(SubprocessClientProxy::new(
            self.runner.clone(),
            Vec::new(),
            Some(dir.to_path_buf()),
            self.extra_env.clone(),
        ))
    }

    fn facilitator_proxy(&self, dir: &Path, _config: &TestConfig) -> Arc<dyn FacilitatorProxy> {
        Arc::new(SubprocessFacilitatorProxy::new(
            self.runner.clone(),
            Vec::new(),
            Some(dir.to_path_buf()),
            self.extra_env.clone(),
        ))
    }
}
