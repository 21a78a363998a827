//! Business logic services.

#![allow(missing_docs)]

pub mod content;
pub mod post;
pub mod topic;
pub mod trending;
pub mod user;
pub mod view;
pub mod vote;

pub use content::{ContentItem, ContentService, LikedItem, ReplyItem, UserContent};
pub use post::{CreatePostInput, PostDetail, PostPage, PostQuery, PostService, PostView, UpdatePostInput};
pub use topic::{
    CreateTopicInput, DEFAULT_STATUSES, TopicDetail, TopicPage, TopicService, TopicView,
    TrendingQuery, UpdateTopicInput,
};
pub use trending::{Engagement, Ranked, TimeRange, hours_since, rank_page, score, score_at};
pub use user::{
    AuthResponse, ChangePasswordInput, LoginInput, RegisterInput, UpdateProfileInput, UserService,
};
pub use view::{AuthorSummary, MessageResponse, Pagination, ReplyInput, ReplyView};
pub use vote::{VoteService, VoteState, VoteSummary};
