pub mod fetcher;
pub mod graph;

pub use fetcher::ReqwestFetcher;
pub use graph::{GraphProfileClient, parse_profile_payload};
