//! HTTP implementation of the transport seam.
//!
//! Thin reqwest client: token header injection, JSON envelopes, and mapping
//! of service status codes into the crate error taxonomy. No retries and no
//! timeouts live here; recovery is user-initiated.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ErrorSet, TransportError};
use crate::model::{
    Article, ArticleDraft, ArticleList, Comment, Identity, IdentityUpdate, LoginCredentials,
    Profile, RegisterCredentials,
};
use crate::storage::TokenVault;
use crate::transport::{PageQuery, Transport};

use async_trait::async_trait;

pub struct HttpTransport {
    client: Client,
    base_url: String,
    vault: Arc<TokenVault>,
}

impl HttpTransport {
    /// `base_url` is the API root, e.g. `https://api.realworld.io/api`.
    pub fn new(base_url: impl Into<String>, vault: Arc<TokenVault>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            vault,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the session token, when one is persisted.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.vault.token() {
            Ok(Some(token)) => request.header("Authorization", format!("Token {token}")),
            Ok(None) => request,
            Err(err) => {
                warn!(%err, "token read failed; sending request unauthenticated");
                request
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, TransportError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let response = check_status(response, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn send_empty(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        check_status(response, path).await?;
        Ok(())
    }
}

async fn check_status(response: Response, path: &str) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(match status {
        StatusCode::UNAUTHORIZED => TransportError::Unauthorized,
        StatusCode::NOT_FOUND => TransportError::NotFound(path.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => {
            match response.json::<ErrorSet>().await {
                Ok(set) => TransportError::Validation(set),
                Err(e) => TransportError::Decode(format!("Unreadable validation body: {e}")),
            }
        }
        other => TransportError::Request(format!("{path} returned {other}")),
    })
}

#[derive(Serialize)]
struct UserPayload<'a, T: Serialize> {
    user: &'a T,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: Identity,
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    profile: Profile,
}

#[derive(Serialize)]
struct ArticlePayload<'a> {
    article: &'a ArticleDraft,
}

#[derive(Deserialize)]
struct ArticleEnvelope {
    article: Article,
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    comment: CommentBody<'a>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct CommentEnvelope {
    comment: Comment,
}

#[derive(Deserialize)]
struct CommentsEnvelope {
    comments: Vec<Comment>,
}

#[derive(Deserialize)]
struct TagsEnvelope {
    tags: Vec<String>,
}

#[async_trait]
impl Transport for HttpTransport {
    async fn login(&self, credentials: &LoginCredentials) -> Result<Identity, TransportError> {
        let path = "/users/login";
        let request = self
            .client
            .post(self.url(path))
            .json(&UserPayload { user: credentials });
        let envelope: UserEnvelope = self.send(request, path).await?;
        Ok(envelope.user)
    }

    async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<Identity, TransportError> {
        let path = "/users";
        let request = self
            .client
            .post(self.url(path))
            .json(&UserPayload { user: credentials });
        let envelope: UserEnvelope = self.send(request, path).await?;
        Ok(envelope.user)
    }

    async fn current_user(&self) -> Result<Identity, TransportError> {
        let path = "/user";
        let request = self.client.get(self.url(path));
        let envelope: UserEnvelope = self.send(request, path).await?;
        Ok(envelope.user)
    }

    async fn update_user(&self, changes: &IdentityUpdate) -> Result<Identity, TransportError> {
        let path = "/user";
        let request = self
            .client
            .put(self.url(path))
            .json(&UserPayload { user: changes });
        let envelope: UserEnvelope = self.send(request, path).await?;
        Ok(envelope.user)
    }

    async fn list_articles(&self, query: &PageQuery) -> Result<ArticleList, TransportError> {
        let path = "/articles";
        let request = self.client.get(self.url(path)).query(&query.to_pairs());
        self.send(request, path).await
    }

    async fn feed_articles(&self, query: &PageQuery) -> Result<ArticleList, TransportError> {
        let path = "/articles/feed";
        let request = self.client.get(self.url(path)).query(&query.to_pairs());
        self.send(request, path).await
    }

    async fn get_article(&self, slug: &str) -> Result<Article, TransportError> {
        let path = format!("/articles/{slug}");
        let request = self.client.get(self.url(&path));
        let envelope: ArticleEnvelope = self.send(request, &path).await?;
        Ok(envelope.article)
    }

    async fn create_article(&self, draft: &ArticleDraft) -> Result<Article, TransportError> {
        let path = "/articles";
        let request = self
            .client
            .post(self.url(path))
            .json(&ArticlePayload { article: draft });
        let envelope: ArticleEnvelope = self.send(request, path).await?;
        Ok(envelope.article)
    }

    async fn update_article(
        &self,
        slug: &str,
        draft: &ArticleDraft,
    ) -> Result<Article, TransportError> {
        let path = format!("/articles/{slug}");
        let request = self
            .client
            .put(self.url(&path))
            .json(&ArticlePayload { article: draft });
        let envelope: ArticleEnvelope = self.send(request, &path).await?;
        Ok(envelope.article)
    }

    async fn delete_article(&self, slug: &str) -> Result<(), TransportError> {
        let path = format!("/articles/{slug}");
        let request = self.client.delete(self.url(&path));
        self.send_empty(request, &path).await
    }

    async fn favorite(&self, slug: &str) -> Result<Article, TransportError> {
        let path = format!("/articles/{slug}/favorite");
        let request = self.client.post(self.url(&path));
        let envelope: ArticleEnvelope = self.send(request, &path).await?;
        Ok(envelope.article)
    }

    async fn unfavorite(&self, slug: &str) -> Result<Article, TransportError> {
        let path = format!("/articles/{slug}/favorite");
        let request = self.client.delete(self.url(&path));
        let envelope: ArticleEnvelope = self.send(request, &path).await?;
        Ok(envelope.article)
    }

    async fn list_comments(&self, slug: &str) -> Result<Vec<Comment>, TransportError> {
        let path = format!("/articles/{slug}/comments");
        let request = self.client.get(self.url(&path));
        let envelope: CommentsEnvelope = self.send(request, &path).await?;
        Ok(envelope.comments)
    }

    async fn add_comment(&self, slug: &str, body: &str) -> Result<Comment, TransportError> {
        let path = format!("/articles/{slug}/comments");
        let request = self
            .client
            .post(self.url(&path))
            .json(&CommentPayload {
                comment: CommentBody { body },
            });
        let envelope: CommentEnvelope = self.send(request, &path).await?;
        Ok(envelope.comment)
    }

    async fn delete_comment(&self, slug: &str, id: &str) -> Result<(), TransportError> {
        let path = format!("/articles/{slug}/comments/{id}");
        let request = self.client.delete(self.url(&path));
        self.send_empty(request, &path).await
    }

    async fn get_profile(&self, username: &str) -> Result<Profile, TransportError> {
        let path = format!("/profiles/{username}");
        let request = self.client.get(self.url(&path));
        let envelope: ProfileEnvelope = self.send(request, &path).await?;
        Ok(envelope.profile)
    }

    async fn follow(&self, username: &str) -> Result<Profile, TransportError> {
        let path = format!("/profiles/{username}/follow");
        let request = self.client.post(self.url(&path));
        let envelope: ProfileEnvelope = self.send(request, &path).await?;
        Ok(envelope.profile)
    }

    async fn unfollow(&self, username: &str) -> Result<Profile, TransportError> {
        let path = format!("/profiles/{username}/follow");
        let request = self.client.delete(self.url(&path));
        let envelope: ProfileEnvelope = self.send(request, &path).await?;
        Ok(envelope.profile)
    }

    async fn list_tags(&self) -> Result<Vec<String>, TransportError> {
        let path = "/tags";
        let request = self.client.get(self.url(path));
        let envelope: TagsEnvelope = self.send(request, path).await?;
        Ok(envelope.tags)
    }
}
