pub mod import;
pub mod odata;
