//! Database entities.

pub mod post;
pub mod post_reply;
pub mod topic;
pub mod topic_reply;
pub mod user;
pub mod vote;

pub use post::Entity as Post;
pub use post_reply::Entity as PostReply;
pub use topic::Entity as Topic;
pub use topic_reply::Entity as TopicReply;
pub use user::Entity as User;
pub use vote::Entity as Vote;
