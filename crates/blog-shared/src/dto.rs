//! Data Transfer Objects - request/response types for the API.
//!
//! Request fields are optional at the wire level so that a missing field
//! reaches the validation step and is reported as a domain error rather than
//! as a generic deserialization failure.

use serde::{Deserialize, Serialize};

/// Structured author as accepted on input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<AuthorInput>,
}

/// Body of `PUT /posts/{id}`. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    /// When present, must match the id in the path.
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<AuthorInput>,
}

/// Public representation of a post. `author` is the joined display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created: String,
}
