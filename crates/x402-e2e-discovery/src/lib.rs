//! Discovery and the Proxy Contract (spec.md §4.2, §4.6).

mod discovery;
mod proxy;

pub use discovery::{
    discover_clients, discover_facilitators, discover_servers, DiscoveredClient,
    DiscoveredFacilitator, DiscoveredServer, DiscoveryOptions, ProxyFactory,
};
pub use proxy::{
    ClientConfig, ClientProxy, ClientResult, FacilitatorConfig, FacilitatorProxy, HealthStatus,
    PaymentResponse, ProxyError, ServerConfig, ServerProxy,
};
