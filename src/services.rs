pub mod auth;
pub use auth::AuthService;
pub mod user_service;
pub use user_service::UserService;
pub mod scholarship_service;
pub use scholarship_service::ScholarshipService;
pub mod ticket_service;
pub use ticket_service::TicketService;
pub mod maintenance_service;
pub use maintenance_service::MaintenanceService;
