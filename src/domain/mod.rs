pub mod entities;
pub mod predicate;
pub mod value;
