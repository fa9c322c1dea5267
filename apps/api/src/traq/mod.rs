mod client;
mod links;
mod transport;

pub use client::{EarliestMessage, SearchResponse, TraqClient};
pub use links::FileLinkMatcher;
pub use transport::{
    relayed_headers, OutboundRequest, ReqwestTransport, Transport, TransportError,
    UpstreamResponse,
};
