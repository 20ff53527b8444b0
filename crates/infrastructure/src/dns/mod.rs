pub mod cache;
pub mod client;
pub mod observer;
pub mod transport;
pub mod wire;

pub use cache::{CacheMetrics, DnsCache};
pub use client::UdpNameserverClient;
pub use observer::TracingQueryObserver;
pub use transport::{DatagramSocket, DnsTransport, TcpTransport, TransportResponse, UdpTransport};
pub use wire::{MessageBuilder, ResponseParser};
