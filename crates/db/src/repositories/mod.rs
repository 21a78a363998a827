//! Database repositories.

mod post;
mod post_reply;
mod topic;
mod topic_reply;
mod user;
mod vote;

pub use post::{PostFilter, PostRepository, PostSort};
pub use post_reply::PostReplyRepository;
pub use topic::{TopicRepository, TrendingFilter};
pub use topic_reply::TopicReplyRepository;
pub use user::{DUPLICATE_EMAIL, UserRepository};
pub use vote::{VoteCounts, VoteRepository};
