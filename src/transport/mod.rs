//! Transport Abstraction
//!
//! The REST surface of the blogging service behind one async seam. The rest
//! of the engine treats this as a black-box request/response function; the
//! production implementation is [`http::HttpTransport`], and tests swap in
//! scripted fakes.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::model::{
    Article, ArticleDraft, ArticleList, Comment, Identity, IdentityUpdate, LoginCredentials,
    Profile, RegisterCredentials,
};

/// Wire-level list parameters computed from a query descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub tag: Option<String>,
    pub author: Option<String>,
    pub favorited: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

impl PageQuery {
    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(author) = &self.author {
            pairs.push(("author", author.clone()));
        }
        if let Some(favorited) = &self.favorited {
            pairs.push(("favorited", favorited.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// Black-box request/response seam for the blogging service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, TransportError>;

    async fn register(&self, credentials: &RegisterCredentials)
        -> Result<Identity, TransportError>;

    async fn current_user(&self) -> Result<Identity, TransportError>;

    async fn update_user(&self, changes: &IdentityUpdate) -> Result<Identity, TransportError>;

    async fn list_articles(&self, query: &PageQuery) -> Result<ArticleList, TransportError>;

    /// Personal feed; requires an authenticated session.
    async fn feed_articles(&self, query: &PageQuery) -> Result<ArticleList, TransportError>;

    async fn get_article(&self, slug: &str) -> Result<Article, TransportError>;

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, TransportError>;

    async fn update_article(
        &self,
        slug: &str,
        draft: &ArticleDraft,
    ) -> Result<Article, TransportError>;

    async fn delete_article(&self, slug: &str) -> Result<(), TransportError>;

    async fn favorite(&self, slug: &str) -> Result<Article, TransportError>;

    async fn unfavorite(&self, slug: &str) -> Result<Article, TransportError>;

    async fn list_comments(&self, slug: &str) -> Result<Vec<Comment>, TransportError>;

    async fn add_comment(&self, slug: &str, body: &str) -> Result<Comment, TransportError>;

    async fn delete_comment(&self, slug: &str, id: &str) -> Result<(), TransportError>;

    async fn get_profile(&self, username: &str) -> Result<Profile, TransportError>;

    async fn follow(&self, username: &str) -> Result<Profile, TransportError>;

    async fn unfollow(&self, username: &str) -> Result<Profile, TransportError>;

    async fn list_tags(&self) -> Result<Vec<String>, TransportError>;
}
