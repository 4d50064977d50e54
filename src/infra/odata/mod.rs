pub mod http;
pub mod query;
pub mod response;
