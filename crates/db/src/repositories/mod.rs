//! Repository layer for database operations.

mod block;
mod community;
mod content;
mod conversation;
mod feedback;
mod gym;
mod gym_request;
mod mute;
mod profile;
mod report;
mod suspension;

pub use block::BlockRepository;
pub use community::CommunityRepository;
pub use content::ContentRepository;
pub use conversation::ConversationRepository;
pub use feedback::FeedbackRepository;
pub use gym::GymRepository;
pub use gym_request::{GymRequestRepository, ReviewStamp};
pub use mute::MuteRepository;
pub use profile::ProfileRepository;
pub use report::{CloseTarget, ReportRepository};
pub use suspension::SuspensionRepository;
