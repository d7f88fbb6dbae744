pub mod user_repo;
pub use user_repo::{CareerRepository, UniversityMemberRepository, UserRepository};
pub mod scholarship_repo;
pub use scholarship_repo::ScholarshipRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod evaluation_repo;
pub use evaluation_repo::EvaluationRepository;
pub mod ticket_repo;
pub use ticket_repo::TicketRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod parameters_repo;
pub use parameters_repo::ParametersRepository;
