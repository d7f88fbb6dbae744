pub mod audit;
pub mod auth;
pub mod demo;
pub mod evaluations;
pub mod maintenance;
pub mod parameters;
pub mod reports;
pub mod scholarships;
pub mod tickets;
pub mod users;
