use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use x402_e2e_discovery::{FacilitatorConfig, FacilitatorProxy, HealthStatus, ProxyError};

use crate::child_process::{ChildProcessHandle, SpawnSpec};

/// `FacilitatorProxy` backed by a subprocess, identical lifecycle shape to
/// [`crate::server_proxy::SubprocessServerProxy`] but without a protected
/// path (facilitators expose a settlement API, not payment-gated routes).
pub struct SubprocessFacilitatorProxy {
    handle: ChildProcessHandle,
    http: reqwest::Client,
    base_env: HashMap<String, String>,
    port: parking_lot::Mutex<Option<u16>>,
}

impl SubprocessFacilitatorProxy {
    pub fn new(
        command: String,
        args: Vec<String>,
        working_directory: Option<PathBuf>,
        base_env: HashMap<String, String>,
    ) -> Self {
        Self {
            handle: ChildProcessHandle::new(SpawnSpec {
                command,
                args,
                working_directory,
            }),
            http: reqwest::Client::new(),
            base_env,
            port: parking_lot::Mutex::new(None),
        }
    }
}

#[async_trait]
impl FacilitatorProxy for SubprocessFacilitatorProxy {
    async fn start(&self, config: FacilitatorConfig) -> Result<(), ProxyError> {
        let mut env = self.base_env.clone();
        env.insert("PORT".to_string(), config.port.to_string());
        env.insert("NETWORKS".to_string(), config.networks.join(","));
        env.extend(config.extra_env);

        *self.port.lock() = Some(config.port);
        self.handle
            .spawn(env)
            .await
            .map_err(|err| ProxyError::Spawn(err.to_string()))
    }

    async fn health(&self) -> HealthStatus {
        let url = format!("{}/health", self.get_url());
        let success = self
            .http
            .get(&url)
            .send()
            .await
            .map(|response| response.status().is_success())
            .unwrap_or(false);
        HealthStatus { success }
    }

    fn get_url(&self) -> String {
        let port = self.port.lock().unwrap_or(0);
        format!("http://localhost:{port}")
    }

    async fn stop(&self) {
        self.handle.stop().await;
    }
}
