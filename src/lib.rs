pub mod export;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod market_key;
pub mod markets;
pub mod odds;
pub mod persist;
pub mod projection;
pub mod props_fetch;
pub mod salary_fetch;
pub mod state;
