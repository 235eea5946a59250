//! Agent card discovery and resolution.
//!
//! A locator may be an agent card URL
//! (`https://svc/v1/agents/assistant/.well-known/agent-card.json`), an
//! agent-scoped base URL (`https://svc/v1/agents/assistant`) or a bare service
//! URL (`https://svc`). Discovery tries, in order:
//!
//! 1. `{base}/v1/agents/{agent_id}/.well-known/agent-card.json`, when an
//!    agent ID is known;
//! 2. the locator itself, treated as a card URL, unless it is candidate 1.
//!
//! A locator containing `/v1/agents/{id}` is split into the service base and
//! the agent ID; an explicit agent ID still wins over the inferred one. The
//! first candidate answering 200 with a JSON card wins. A card whose `url`
//! contains `/v1/agents/` overrides the derived base URL.

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;

/// Well-known card path, relative to an agent-scoped base URL.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Path segment that separates the service base URL from the agent ID.
const AGENTS_SEGMENT: &str = "/v1/agents/";

/// Agent ID used when discovery finds no card and no ID was given.
pub const DEFAULT_AGENT_ID: &str = "default";

/// The outcome of discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAgent {
    /// The agent's card (synthesized for single-agent fallbacks).
    pub card: AgentCard,
    /// Service base URL requests are built from.
    pub base_url: String,
    /// Agent to address; may be empty when a card was found at a URL that
    /// names no agent.
    pub agent_id: String,
    /// `true` when the endpoint is assumed to serve exactly one agent, so the
    /// agent does not need to be named on each call.
    pub single_agent: bool,
}

/// Resolves [`AgentCard`]s from locators.
///
/// # Example
///
/// ```no_run
/// use a2a_universal::client::CardResolver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = CardResolver::new();
/// let agent = resolver.resolve("http://localhost:8080", Some("assistant")).await?;
/// println!("Agent: {} via {}", agent.card.name, agent.card.preferred_transport);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CardResolver {
    client: reqwest::Client,
    bearer: Option<String>,
}

impl CardResolver {
    /// Create a new resolver with default settings.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a new resolver with an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            bearer: None,
        }
    }

    /// Send `Authorization: Bearer {token}` with every card request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer = (!token.is_empty()).then(|| format!("Bearer {token}"));
        self
    }

    /// Discover the agent behind `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`A2AError::Discovery`] wrapping the last attempt's error when
    /// an agent ID was given or read from the locator and no candidate
    /// produced a card. Without any agent ID, a failed discovery falls back
    /// to a single-agent default.
    pub async fn resolve(&self, locator: &str, agent_id: Option<&str>) -> A2AResult<ResolvedAgent> {
        let locator = locator.trim_end_matches('/');
        let scope = AgentScope::of(locator);
        let agent_id = agent_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or(scope.agent_id)
            .unwrap_or_default();
        let base = scope.base.as_str();

        let mut candidates = Vec::with_capacity(2);
        if !agent_id.is_empty() {
            candidates.push(format!("{base}{AGENTS_SEGMENT}{agent_id}{AGENT_CARD_PATH}"));
        }
        if !candidates.iter().any(|c| c == locator) {
            candidates.push(locator.to_string());
        }

        let mut last_error = None;
        for url in &candidates {
            match self.fetch_card(url).await {
                Ok(card) => return Ok(resolved_from_card(card, url, base, &agent_id)),
                Err(e) => {
                    tracing::debug!("no agent card at {url}: {e}");
                    last_error = Some(e);
                }
            }
        }

        if agent_id.is_empty() {
            tracing::debug!("no agent card found at {base}; assuming a single-agent service");
            return Ok(ResolvedAgent {
                card: AgentCard {
                    name: DEFAULT_AGENT_ID.to_string(),
                    preferred_transport: "grpc".to_string(),
                    ..AgentCard::default()
                },
                base_url: base.to_string(),
                agent_id: DEFAULT_AGENT_ID.to_string(),
                single_agent: true,
            });
        }

        Err(A2AError::discovery(last_error.unwrap_or_else(|| {
            A2AError::Other("no discovery candidates".to_string())
        })))
    }

    /// Fetch and parse an agent card from a URL.
    pub async fn fetch_card(&self, url: &str) -> A2AResult<AgentCard> {
        tracing::debug!("resolving agent card from {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(bearer) = &self.bearer {
            request = request.header(reqwest::header::AUTHORIZATION, bearer);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                A2AError::Transport(format!("failed to connect to agent at {url}: {e}"))
            } else if e.is_timeout() {
                A2AError::Timeout(format!("timed out fetching agent card from {url}: {e}"))
            } else {
                A2AError::Transport(format!("failed to fetch agent card from {url}: {e}"))
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Transport(format!("failed to read agent card response: {e}")))?;

        let card: AgentCard = serde_json::from_slice(&bytes)
            .map_err(|e| A2AError::InvalidJson(format!("failed to parse agent card: {e}")))?;

        tracing::debug!("resolved agent card: {} v{}", card.name, card.version);

        Ok(card)
    }
}

impl Default for CardResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// What a locator says about its agent before anything is fetched.
#[derive(Debug, Clone, PartialEq)]
struct AgentScope {
    /// Service base URL: the part before `/v1/agents/`, or the whole
    /// locator when it names no agent.
    base: String,
    agent_id: Option<String>,
}

impl AgentScope {
    fn of(locator: &str) -> Self {
        match (service_base_url(locator), agent_id_from_url(locator)) {
            (Some(base), Some(agent_id)) => Self {
                base,
                agent_id: Some(agent_id),
            },
            _ => Self {
                base: locator.to_string(),
                agent_id: None,
            },
        }
    }
}

fn resolved_from_card(card: AgentCard, fetched_from: &str, base: &str, agent_id: &str) -> ResolvedAgent {
    let agent_id = if agent_id.is_empty() {
        agent_id_from_url(fetched_from).unwrap_or_default()
    } else {
        agent_id.to_string()
    };
    let base_url = service_base_url(&card.url).unwrap_or_else(|| base.to_string());

    ResolvedAgent {
        single_agent: agent_id.is_empty(),
        card,
        base_url,
        agent_id,
    }
}

/// `http://h/v1/agents/a/.well-known/agent-card.json` → `a`.
pub fn agent_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once(AGENTS_SEGMENT)?;
    rest.split('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// `http://h/v1/agents/a` → `http://h`.
pub fn service_base_url(card_url: &str) -> Option<String> {
    card_url
        .split_once(AGENTS_SEGMENT)
        .map(|(base, _)| base.to_string())
}
