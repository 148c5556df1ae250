mod http_server;

pub use http_server::{apply_cors_headers, router, EdgeState, GeoResponse, HttpServer, Upstream};
