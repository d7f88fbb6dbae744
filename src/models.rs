pub mod audit;
pub mod auth;
pub mod demo;
pub mod evaluation;
pub mod parameters;
pub mod report;
pub mod scholarship;
pub mod support;
