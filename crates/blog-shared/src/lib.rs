//! # Blog Shared
//!
//! Wire types shared by the server and any Rust client of the posts API.

pub mod dto;
pub mod response;

pub use dto::{AuthorInput, CreatePostRequest, PostResponse, UpdatePostRequest};
pub use response::ErrorResponse;
