pub mod gateway_headers;
pub mod request_id;

pub use gateway_headers::{gateway_headers_middleware, GatewayHeadersConfig};
pub use request_id::request_id_middleware;
