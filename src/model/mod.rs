pub mod user;
pub mod order;
pub mod catalog;
pub mod apartment;
pub mod worker;
pub mod visitor;
