//! Transport selection: turn a discovered agent into a live [`Transport`].

use crate::error::A2AResult;

use super::card_resolver::ResolvedAgent;
use super::grpc::GrpcTransport;
use super::jsonrpc::JsonRpcTransport;
use super::rest::RestTransport;
use super::transport::{Transport, TransportConfig, TransportKind};

/// `host:port` of a gRPC endpoint URL: the `grpc://`, `http://` or
/// `https://` prefix is stripped and everything from the first `/` dropped.
pub fn extract_grpc_address(url: &str) -> &str {
    let rest = ["grpc://", "http://", "https://"]
        .iter()
        .fold(url, |acc, prefix| acc.strip_prefix(prefix).unwrap_or(acc));
    rest.split('/').next().unwrap_or(rest)
}

/// Build the adapter the card asks for.
///
/// REST and JSON-RPC share one HTTP adapter. gRPC dials the host of the
/// card's `url`, or of the base URL when the card has none; list operations
/// still go through the HTTP adapter.
pub fn build_transport(
    agent: &ResolvedAgent,
    config: &TransportConfig,
) -> A2AResult<Box<dyn Transport>> {
    let kind = TransportKind::from_card(&agent.card);
    let rest = RestTransport::new(agent.base_url.clone(), config)?;

    tracing::debug!(
        transport = %kind,
        base_url = %agent.base_url,
        agent_id = %agent.agent_id,
        "selected transport"
    );

    let transport: Box<dyn Transport> = match kind {
        TransportKind::Rest => Box::new(rest),
        TransportKind::JsonRpc => Box::new(JsonRpcTransport::new(rest)),
        TransportKind::Grpc => {
            let service_url = if agent.card.url.is_empty() {
                agent.base_url.as_str()
            } else {
                agent.card.url.as_str()
            };
            let address = extract_grpc_address(service_url);
            Box::new(GrpcTransport::connect(
                address,
                rest,
                config,
                agent.single_agent,
            )?)
        }
    };
    Ok(transport)
}
