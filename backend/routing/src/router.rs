/// Request routing: verify, classify, parse, look up, dispatch.
///
/// `Router::route` never fails. Every outcome, including every rejection, is a
/// [`WebhookResponse`].
use std::time::Duration;

use modbot_channels::{parse_action, SignatureVerifier};
use modbot_core::{Headers, Payload, WebhookRequest, HEADER_ACTION, HEADER_TEAM};
use tracing::{debug, error, info, warn};

use crate::response::WebhookResponse;
use crate::route_table::{RouteError, RouteTable};

pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_millis(5000);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RouterConfig {
    pub signing_secret: String,
    /// Reject requests older or newer than this. `None` disables the check.
    pub max_clock_skew: Option<Duration>,
    pub dispatch_timeout: Duration,
}

impl RouterConfig {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            max_clock_skew: None,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        }
    }

    fn verifier(&self) -> SignatureVerifier {
        let verifier = SignatureVerifier::new(self.signing_secret.clone());
        match self.max_clock_skew {
            Some(skew) => verifier.with_max_clock_skew(skew),
            None => verifier,
        }
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("signing_secret", &"***")
            .field("max_clock_skew", &self.max_clock_skew)
            .field("dispatch_timeout", &self.dispatch_timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Endpoint classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointType {
    Event,
    Command,
    Action,
}

impl EndpointType {
    pub fn from_path(segment: Option<&str>) -> Option<Self> {
        match segment? {
            "event" => Some(Self::Event),
            "command" => Some(Self::Command),
            "action" => Some(Self::Action),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Every way a request can be turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    AuthenticationFailure,
    UnsupportedEndpoint,
    UnimplementedEndpoint(EndpointType),
    MalformedPayload,
    UnroutableAction(String),
    DispatchFailure,
}

impl RouteFailure {
    pub fn status(&self) -> u16 {
        match self {
            Self::AuthenticationFailure | Self::MalformedPayload => 400,
            Self::UnsupportedEndpoint => 404,
            Self::UnimplementedEndpoint(_) | Self::UnroutableAction(_) => 501,
            Self::DispatchFailure => 500,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::AuthenticationFailure => "invalid request, check request signature".into(),
            Self::UnsupportedEndpoint => "invalid request, check endpoint type".into(),
            Self::UnimplementedEndpoint(EndpointType::Event) => {
                "events API not yet implemented".into()
            }
            Self::UnimplementedEndpoint(_) => "command API not yet implemented".into(),
            Self::MalformedPayload => "unable to parse action".into(),
            Self::UnroutableAction(kind) => format!("message action not supported: {kind}"),
            Self::DispatchFailure => "unable to handle message action".into(),
        }
    }

    pub fn into_response(self) -> WebhookResponse {
        WebhookResponse::error(&self.message(), self.status())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    verifier: SignatureVerifier,
    dispatch_timeout: Duration,
    routes: RouteTable,
}

impl Router {
    pub fn new(config: RouterConfig, routes: RouteTable) -> Result<Self, RouteError> {
        if routes.is_empty() {
            return Err(RouteError::NoRoutes);
        }
        info!(
            routes = routes.len(),
            dispatch_timeout_ms = config.dispatch_timeout.as_millis() as u64,
            freshness_check = config.max_clock_skew.is_some(),
            "Router ready"
        );
        Ok(Self {
            verifier: config.verifier(),
            dispatch_timeout: config.dispatch_timeout,
            routes,
        })
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn route(&self, req: &WebhookRequest) -> WebhookResponse {
        match self.try_route(req).await {
            Ok(()) => WebhookResponse::success(""),
            Err(failure) => failure.into_response(),
        }
    }

    async fn try_route(&self, req: &WebhookRequest) -> Result<(), RouteFailure> {
        if !self.verifier.is_valid(req) {
            warn!(endpoint = ?req.endpoint, "Request failed signature verification");
            return Err(RouteFailure::AuthenticationFailure);
        }

        match EndpointType::from_path(req.endpoint.as_deref()) {
            Some(EndpointType::Action) => {}
            Some(other) => {
                debug!(endpoint = ?other, "Endpoint not implemented");
                return Err(RouteFailure::UnimplementedEndpoint(other));
            }
            None => {
                debug!(endpoint = ?req.endpoint, "Unknown endpoint type");
                return Err(RouteFailure::UnsupportedEndpoint);
            }
        }

        let action = parse_action(&req.body).map_err(|e| {
            error!(error = %e, "Unable to parse action");
            RouteFailure::MalformedPayload
        })?;

        let team_id = action.team.id.clone();
        let kind = action.kind.clone();

        let Some(destination) = self.routes.lookup(&kind) else {
            warn!(team_id = %team_id, kind = %kind, "No route for message action");
            return Err(RouteFailure::UnroutableAction(kind));
        };

        let mut headers = Headers::new();
        headers.insert(HEADER_TEAM.to_string(), team_id.clone());
        headers.insert(HEADER_ACTION.to_string(), kind.clone());

        let payload = Payload::from(action);
        match tokio::time::timeout(self.dispatch_timeout, destination.queue(&headers, &payload))
            .await
        {
            Ok(Ok(())) => {
                info!(
                    team_id = %team_id,
                    kind = %kind,
                    destination = destination.name(),
                    "Queued message action"
                );
                Ok(())
            }
            Ok(Err(e)) => {
                error!(
                    team_id = %team_id,
                    kind = %kind,
                    destination = destination.name(),
                    error = %e,
                    "Unable to queue message action"
                );
                Err(RouteFailure::DispatchFailure)
            }
            Err(_) => {
                error!(
                    team_id = %team_id,
                    kind = %kind,
                    destination = destination.name(),
                    timeout_ms = self.dispatch_timeout.as_millis() as u64,
                    "Timed out queueing message action"
                );
                Err(RouteFailure::DispatchFailure)
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("verifier", &self.verifier)
            .field("dispatch_timeout", &self.dispatch_timeout)
            .field("routes", &self.routes)
            .finish()
    }
}
