use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use x402_e2e_config::ProtocolFamily;
use x402_e2e_discovery::{HealthStatus, ProxyError, ServerConfig, ServerProxy};

use crate::child_process::{ChildProcessHandle, SpawnSpec};

/// `ServerProxy` backed by a subprocess that serves HTTP, gated by a
/// `/health` endpoint. Grounded on the child-process transport's
/// config/spawn shape, generalized from "speak MCP over stdio" to
/// "serve HTTP on a port and answer `/health`".
pub struct SubprocessServerProxy {
    handle: ChildProcessHandle,
    protected_path: String,
    http: reqwest::Client,
    base_env: HashMap<String, String>,
    port: parking_lot::Mutex<Option<u16>>,
}

impl SubprocessServerProxy {
    pub fn new(
        command: String,
        args: Vec<String>,
        working_directory: Option<PathBuf>,
        protected_path: String,
        base_env: HashMap<String, String>,
    ) -> Self {
        Self {
            handle: ChildProcessHandle::new(SpawnSpec {
                command,
                args,
                working_directory,
            }),
            protected_path,
            http: reqwest::Client::new(),
            base_env,
            port: parking_lot::Mutex::new(None),
        }
    }
}

#[async_trait]
impl ServerProxy for SubprocessServerProxy {
    async fn start(&self, config: ServerConfig) -> Result<(), ProxyError> {
        let mut env = self.base_env.clone();
        env.insert("PORT".to_string(), config.port.to_string());
        env.insert("NETWORKS".to_string(), config.networks.join(","));
        if let Some(url) = &config.facilitator_url {
            env.insert("FACILITATOR_URL".to_string(), url.clone());
        }
        for (family, address) in &config.payee_addresses {
            let key = match family {
                ProtocolFamily::Evm => "SERVER_EVM_ADDRESS",
                ProtocolFamily::Svm => "SERVER_SVM_ADDRESS",
                ProtocolFamily::Aptos => "SERVER_APTOS_ADDRESS",
            };
            env.insert(key.to_string(), address.clone());
        }

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

    fn get_protected_path(&self) -> String {
        self.protected_path.clone()
    }

    async fn stop(&self) {
        self.handle.stop().await;
    }
}
