pub mod actions;
pub mod criteria;
pub mod pagination;
pub mod record;
pub mod schema;
