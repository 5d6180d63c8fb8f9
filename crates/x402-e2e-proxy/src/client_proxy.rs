use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use x402_e2e_config::ProtocolFamily;
use x402_e2e_discovery::{ClientConfig, ClientProxy, ClientResult, PaymentResponse};

use crate::child_process::{ChildProcessHandle, SpawnSpec};
use crate::stdio_result::parse_last_json_line;

/// Mirrors the JSON shape a client subprocess prints as its final stdout
/// line (spec.md §4.6, §9). Kept separate from [`ClientResult`] because
/// that type isn't `Deserialize` — it's the orchestrator-facing value, this
/// is the wire shape.
#[derive(Debug, Deserialize)]
struct RawClientOutput {
    success: bool,
    data: Option<serde_json::Value>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
    #[serde(rename = "paymentResponse")]
    payment_response: Option<PaymentResponse>,
    error: Option<String>,
}

/// `ClientProxy` backed by a short-lived subprocess: spawn, let it perform
/// one payment-gated HTTP call, read its last stdout line as JSON.
pub struct SubprocessClientProxy {
    handle: ChildProcessHandle,
    base_env: HashMap<String, String>,
}

impl SubprocessClientProxy {
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
            base_env,
        }
    }
}

#[async_trait]
impl ClientProxy for SubprocessClientProxy {
    async fn call(&self, config: ClientConfig) -> ClientResult {
        let mut env = self.base_env.clone();
        env.insert("SERVER_URL".to_string(), config.server_url);
        env.insert("ENDPOINT_PATH".to_string(), config.endpoint_path);
        for (family, key) in &config.private_keys {
            let var = match family {
                ProtocolFamily::Evm => "CLIENT_EVM_PRIVATE_KEY",
                ProtocolFamily::Svm => "CLIENT_SVM_PRIVATE_KEY",
                ProtocolFamily::Aptos => "CLIENT_APTOS_PRIVATE_KEY",
            };
            env.insert(var.to_string(), key.clone());
        }

        if let Err(err) = self.handle.spawn(env).await {
            return ClientResult {
                success: false,
                data: None,
                status_code: None,
                payment_response: None,
                error: Some(err.to_string()),
            };
        }

        let output = match self.handle.wait_for_exit_collecting_stdout().await {
            Ok(output) => output,
            Err(err) => {
                return ClientResult {
                    success: false,
                    data: None,
                    status_code: None,
                    payment_response: None,
                    error: Some(err.to_string()),
                }
            }
        };

        match parse_last_json_line::<RawClientOutput>(&output) {
            Some(raw) => ClientResult {
                success: raw.success,
                data: raw.data,
                status_code: raw.status_code,
                payment_response: raw.payment_response,
                error: raw.error,
            },
            None => ClientResult {
                success: false,
                data: None,
                status_code: None,
                payment_response: None,
                error: Some("client produced no parseable JSON result line".to_string()),
            },
        }
    }

    async fn force_stop(&self) {
        self.handle.stop().await;
    }
}
