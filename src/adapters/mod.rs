// 適配層：domain ports 的具體實作

pub mod http;

pub use http::HttpMarketplaceClient;
