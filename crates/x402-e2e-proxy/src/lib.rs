//! Concrete, subprocess-backed Proxy Contract implementations and the
//! health poller (spec.md §4.6, §4.7, §9).

mod child_process;
mod client_proxy;
mod facilitator_proxy;
mod factory;
mod health;
mod server_proxy;
mod stdio_result;

pub use child_process::{ChildProcessError, ChildProcessHandle, SpawnSpec};
pub use client_proxy::SubprocessClientProxy;
pub use facilitator_proxy::SubprocessFacilitatorProxy;
pub use factory::SubprocessProxyFactory;
pub use health::{wait_for_health, HealthPollOptions};
pub use server_proxy::SubprocessServerProxy;
pub use stdio_result::parse_last_json_line;
