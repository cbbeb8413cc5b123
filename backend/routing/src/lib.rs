pub mod response;
pub mod route_table;
pub mod router;

pub use response::WebhookResponse;
pub use route_table::{RouteError, RouteTable};
pub use router::{EndpointType, RouteFailure, Router, RouterConfig, DEFAULT_DISPATCH_TIMEOUT};
