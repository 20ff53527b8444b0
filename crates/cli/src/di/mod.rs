use ferrous_lookup_application::ports::QueryObserver;
use ferrous_lookup_application::use_cases::{FollowCnamesUseCase, IterativeQueryUseCase};
use ferrous_lookup_domain::Config;
use ferrous_lookup_infrastructure::dns::{
    DnsCache, TcpTransport, TracingQueryObserver, UdpNameserverClient, UdpTransport,
};
use std::sync::Arc;
use tracing::info;

pub struct ResolverServices {
    pub cache: Arc<DnsCache>,
    pub follow_cnames: FollowCnamesUseCase,
}

impl ResolverServices {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let resolver_config = &config.resolver;

        let cache = Arc::new(DnsCache::with_root_hints(&resolver_config.root_servers));
        let observer: Arc<dyn QueryObserver> = Arc::new(TracingQueryObserver);

        let socket = Arc::new(UdpTransport::bind().await?);
        let client = Arc::new(
            UdpNameserverClient::new(socket, Arc::new(TcpTransport::new()), resolver_config)
                .with_observer(observer.clone()),
        );

        let iterative = Arc::new(
            IterativeQueryUseCase::new(cache.clone(), client)
                .with_observer(observer)
                .with_nameserver_indirection(resolver_config.max_nameserver_indirection)
                .with_ipv6_nameservers(resolver_config.use_ipv6_nameservers),
        );

        info!(
            root_servers = resolver_config.root_servers.len(),
            port = resolver_config.dns_port,
            timeout_ms = resolver_config.query_timeout_ms,
            attempts = resolver_config.max_query_attempts,
            tcp_fallback = resolver_config.tcp_fallback,
            "Resolver services initialized"
        );

        Ok(Self {
            cache,
            follow_cnames: FollowCnamesUseCase::new(iterative),
        })
    }
}
