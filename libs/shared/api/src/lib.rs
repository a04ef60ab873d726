pub mod client;

pub use client::{encode_query_ts, PortalClient};
