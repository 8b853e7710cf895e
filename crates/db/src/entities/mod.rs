//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod community;
pub mod community_member;
pub mod content_report;
pub mod conversation;
pub mod conversation_participant;
pub mod feedback;
pub mod gym;
pub mod gym_request;
pub mod gym_request_history;
pub mod post;
pub mod profile;
pub mod user_block;
pub mod user_mute;
pub mod user_suspension;

pub use comment::Entity as Comment;
pub use community::Entity as Community;
pub use community_member::Entity as CommunityMember;
pub use content_report::Entity as ContentReport;
pub use conversation::Entity as Conversation;
pub use conversation_participant::Entity as ConversationParticipant;
pub use feedback::Entity as Feedback;
pub use gym::Entity as Gym;
pub use gym_request::Entity as GymRequest;
pub use gym_request_history::Entity as GymRequestHistory;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
pub use user_block::Entity as UserBlock;
pub use user_mute::Entity as UserMute;
pub use user_suspension::Entity as UserSuspension;
