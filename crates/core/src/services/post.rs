//! Category post service.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{
        post::{self, PostCategory, PostStatus},
        post_reply, user,
        vote::{VoteKind, VoteTarget},
    },
    repositories::{PostFilter, PostReplyRepository, PostRepository, PostSort, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::view::{AuthorSummary, Pagination, ReplyInput, ReplyView, load_authors};
use super::vote::{VoteService, VoteState, VoteSummary};

/// Query for the post listing.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub category: Option<PostCategory>,
    pub status: PostStatus,
    pub sort: PostSort,
    pub pagination: Pagination,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    #[serde(default)]
    pub is_sticky: bool,
}

/// Input for updating a post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    pub category: Option<String>,

    pub is_sticky: Option<bool>,

    pub status: Option<PostStatus>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub author: Option<AuthorSummary>,
    pub views: i64,
    pub is_sticky: bool,
    pub status: PostStatus,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub replies_count: u64,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl PostView {
    fn build(
        model: post::Model,
        author: Option<AuthorSummary>,
        votes: VoteSummary,
        replies_count: u64,
    ) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            category: model.category,
            author,
            views: model.views,
            is_sticky: model.is_sticky,
            status: model.status,
            votes,
            replies_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A post with its replies.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: PostView,
    pub replies: Vec<ReplyView>,
}

/// One page of posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<PostView>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_posts: u64,
}

fn parse_category(raw: &str) -> AppResult<PostCategory> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid category: {}", raw.trim())))
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    reply_repo: PostReplyRepository,
    user_repo: UserRepository,
    vote_service: VoteService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        reply_repo: PostReplyRepository,
        user_repo: UserRepository,
        vote_service: VoteService,
    ) -> Self {
        Self {
            post_repo,
            reply_repo,
            user_repo,
            vote_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// List posts.
    pub async fn list(&self, query: &PostQuery, viewer_id: Option<&str>) -> AppResult<PostPage> {
        let filter = PostFilter {
            category: query.category,
            status: query.status,
        };
        let pagination = query.pagination;

        let total = self.post_repo.count(&filter).await?;
        let posts = self
            .post_repo
            .find_page(&filter, query.sort, pagination.offset(), pagination.limit)
            .await?;
        let views = self.build_views(posts, viewer_id).await?;

        Ok(PostPage {
            posts: views,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total),
            total_posts: total,
        })
    }

    /// Get a post with its replies and count the view.
    pub async fn get(&self, id: &str, viewer_id: Option<&str>) -> AppResult<PostDetail> {
        let mut post = self.post_repo.get_by_id(id).await?;

        self.post_repo.increment_views(id).await?;
        post.views += 1;

        self.detail(post, viewer_id).await
    }

    /// Create a post. Only moderators may pin it.
    pub async fn create(&self, author: &user::Model, input: CreatePostInput) -> AppResult<PostView> {
        input.validate()?;
        let category = parse_category(&input.category)?;

        let now = Utc::now();
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            category: Set(category),
            author_id: Set(author.id.clone()),
            views: Set(0),
            is_sticky: Set(input.is_sticky && author.role.is_moderator()),
            status: Set(PostStatus::Active),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, category = ?post.category, "Created post");

        Ok(PostView::build(
            post,
            Some(AuthorSummary::from(author)),
            VoteSummary::default(),
            0,
        ))
    }

    /// Update a post. Only its author may do so.
    pub async fn update(
        &self,
        id: &str,
        actor: &user::Model,
        input: UpdatePostInput,
    ) -> AppResult<PostView> {
        input.validate()?;

        let post = self.post_repo.get_by_id(id).await?;
        if post.author_id != actor.id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let mut active: post::ActiveModel = post.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(category) = input.category {
            active.category = Set(parse_category(&category)?);
        }
        if let Some(is_sticky) = input.is_sticky {
            if actor.role.is_moderator() {
                active.is_sticky = Set(is_sticky);
            }
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.post_repo.update(active).await?;
        let mut views = self.build_views(vec![updated], Some(&actor.id)).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Post view missing".to_string()))
    }

    /// Delete a post with its replies and every vote on them.
    pub async fn delete(&self, id: &str, user_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        if post.author_id != user_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let reply_ids = self.reply_repo.find_ids_by_post(id).await?;
        let votes = self.vote_service.repository();
        votes
            .delete_for_targets(VoteTarget::PostReply, &reply_ids)
            .await?;
        votes
            .delete_for_targets(VoteTarget::Post, &[id.to_string()])
            .await?;
        self.post_repo.delete(id).await?;

        tracing::debug!(post_id = %id, replies = reply_ids.len(), "Deleted post");
        Ok(())
    }

    /// Append a reply and return the post with all replies.
    pub async fn add_reply(
        &self,
        post_id: &str,
        user_id: &str,
        input: ReplyInput,
    ) -> AppResult<PostDetail> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;

        let model = post_reply::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post_id.to_string()),
            author_id: Set(user_id.to_string()),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
        };
        self.reply_repo.create(model).await?;
        self.post_repo.touch(post_id).await?;

        self.detail(post, Some(user_id)).await
    }

    /// Toggle a like or dislike on a post.
    pub async fn toggle_vote(
        &self,
        post_id: &str,
        user_id: &str,
        kind: VoteKind,
    ) -> AppResult<VoteSummary> {
        self.post_repo.get_by_id(post_id).await?;

        let summary = self
            .vote_service
            .toggle(user_id, VoteTarget::Post, post_id, kind)
            .await?;
        self.post_repo.touch(post_id).await?;

        Ok(summary)
    }

    /// Toggle a like or dislike on a reply of a post.
    pub async fn toggle_reply_vote(
        &self,
        post_id: &str,
        reply_id: &str,
        user_id: &str,
        kind: VoteKind,
    ) -> AppResult<VoteSummary> {
        self.post_repo.get_by_id(post_id).await?;
        self.reply_repo.get_in_post(post_id, reply_id).await?;

        let summary = self
            .vote_service
            .toggle(user_id, VoteTarget::PostReply, reply_id, kind)
            .await?;
        self.post_repo.touch(post_id).await?;

        Ok(summary)
    }

    async fn detail(&self, post: post::Model, viewer_id: Option<&str>) -> AppResult<PostDetail> {
        let replies = self.reply_repo.find_by_post(&post.id).await?;
        let view = self
            .build_views(vec![post], viewer_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("Post view missing".to_string()))?;
        let replies = self.reply_views(replies, viewer_id).await?;

        Ok(PostDetail {
            post: view,
            replies,
        })
    }

    async fn build_views(
        &self,
        posts: Vec<post::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<PostView>> {
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let votes = self.vote_service.repository();
        let counts = votes.count_by_targets(VoteTarget::Post, &ids).await?;
        let replies = self.reply_repo.count_by_posts(&ids).await?;
        let own_votes = match viewer_id {
            Some(viewer) => votes.kinds_for_user(viewer, VoteTarget::Post, &ids).await?,
            None => HashMap::new(),
        };
        let authors =
            load_authors(&self.user_repo, posts.iter().map(|p| p.author_id.clone())).await?;

        Ok(posts
            .into_iter()
            .map(|p| {
                let c = counts.get(&p.id).copied().unwrap_or_default();
                let state = VoteState::from_kind(own_votes.get(&p.id).copied());
                let replies_count = replies.get(&p.id).copied().unwrap_or(0);
                let author = authors.get(&p.author_id).cloned();
                PostView::build(
                    p,
                    author,
                    VoteSummary::new(c.likes, c.dislikes, state),
                    replies_count,
                )
            })
            .collect())
    }

    async fn reply_views(
        &self,
        replies: Vec<post_reply::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<ReplyView>> {
        let ids: Vec<String> = replies.iter().map(|r| r.id.clone()).collect();
        let votes = self.vote_service.repository();
        let counts = votes.count_by_targets(VoteTarget::PostReply, &ids).await?;
        let own_votes = match viewer_id {
            Some(viewer) => {
                votes
                    .kinds_for_user(viewer, VoteTarget::PostReply, &ids)
                    .await?
            }
            None => HashMap::new(),
        };
        let authors =
            load_authors(&self.user_repo, replies.iter().map(|r| r.author_id.clone())).await?;

        Ok(replies
            .into_iter()
            .map(|r| {
                let c = counts.get(&r.id).copied().unwrap_or_default();
                let state = VoteState::from_kind(own_votes.get(&r.id).copied());
                ReplyView {
                    author: authors.get(&r.author_id).cloned(),
                    votes: VoteSummary::new(c.likes, c.dislikes, state),
                    id: r.id,
                    content: r.content,
                    created_at: r.created_at,
                }
            })
            .collect())
    }
}
