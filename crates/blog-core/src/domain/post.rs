use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Author of a post. Both name parts are always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first_name: String,
    pub last_name: String,
}

impl Author {
    /// Create an author, rejecting blank name parts.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let author = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        };
        author.validate()?;
        Ok(author)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require("author.firstName", &self.first_name)?;
        require("author.lastName", &self.last_name)
    }

    /// Single display string, `"<first> <last>"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Post entity - a blog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created: DateTime<Utc>,
}

impl Post {
    /// Materialize a validated draft, assigning a fresh id and creation time.
    pub fn new(draft: NewPost) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            author: draft.author,
            created: Utc::now(),
        }
    }
}

/// A validated post that has not been stored yet.
///
/// The only way to obtain one is [`NewPost::new`], so stores never see a
/// draft with a missing title, content or author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    title: String,
    content: String,
    author: Author,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: Author,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let content = content.into();
        require("title", &title)?;
        require("content", &content)?;
        author.validate()?;

        Ok(Self {
            title,
            content,
            author,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &Author {
        &self.author
    }
}

/// Partial update of a post. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    title: Option<String>,
    content: Option<String>,
    author: Option<Author>,
}

impl PostChanges {
    pub fn new(
        title: Option<String>,
        content: Option<String>,
        author: Option<Author>,
    ) -> Result<Self, DomainError> {
        if let Some(title) = &title {
            require("title", title)?;
        }
        if let Some(content) = &content {
            require("content", content)?;
        }
        if let Some(author) = &author {
            author.validate()?;
        }

        Ok(Self {
            title,
            content,
            author,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }

    /// Overwrite the supplied fields on `post`. `id` and `created` are never touched.
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(author) = self.author {
            post.author = author;
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::missing_field(field));
    }
    Ok(())
}
