//! Local patch unions and their fold functions, one per focusable entity.

use crate::model::{Article, Comment, CommentThread, Profile};
use crate::overlay::Focused;

/// Local mutations applicable to a focused article.
#[derive(Debug, Clone)]
pub enum ArticlePatch {
    /// Favorite state flipped; the count moves by exactly one.
    FavoriteToggled { favorited: bool },
    /// The viewer's follow relation to the article's author flipped.
    AuthorFollowToggled { following: bool },
}

impl Focused for Article {
    type Patch = ArticlePatch;

    fn focus_key(&self) -> &str {
        &self.slug
    }

    fn fold(&mut self, patch: ArticlePatch) {
        match patch {
            ArticlePatch::FavoriteToggled { favorited } => {
                self.favorited = favorited;
                if favorited {
                    self.favorites_count += 1;
                } else {
                    // Not clamped: the server keeps the count consistent.
                    self.favorites_count -= 1;
                }
            }
            ArticlePatch::AuthorFollowToggled { following } => {
                self.author.following = following;
            }
        }
    }
}

/// Local mutations applicable to a focused profile.
#[derive(Debug, Clone)]
pub enum ProfilePatch {
    FollowToggled { following: bool },
}

impl Focused for Profile {
    type Patch = ProfilePatch;

    fn focus_key(&self) -> &str {
        &self.username
    }

    fn fold(&mut self, patch: ProfilePatch) {
        match patch {
            ProfilePatch::FollowToggled { following } => {
                self.following = following;
            }
        }
    }
}

/// Local mutations applicable to a focused comment thread.
#[derive(Debug, Clone)]
pub enum CommentsPatch {
    /// A freshly posted comment; prepended, newest first.
    Added(Comment),
    Removed(String),
}

impl Focused for CommentThread {
    type Patch = CommentsPatch;

    fn focus_key(&self) -> &str {
        &self.slug
    }

    fn fold(&mut self, patch: CommentsPatch) {
        match patch {
            CommentsPatch::Added(comment) => {
                self.comments.insert(0, comment);
            }
            CommentsPatch::Removed(id) => {
                self.comments.retain(|c| c.id != id);
            }
        }
    }
}
