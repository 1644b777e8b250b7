//! Randomized post fixtures for seeding and tearing down a store.
//!
//! These take the store as an explicit handle so tests can seed before and
//! tear down after each case without any process-wide state.

use rand::Rng;
use rand::seq::SliceRandom;

use thiserror::Error;

use blog_core::domain::{Author, NewPost, Post};
use blog_core::error::{DomainError, RepoError};
use blog_core::ports::PostRepository;

/// Number of posts seeded when no size is given.
pub const DEFAULT_SEED_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Invalid fixture: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] RepoError),
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "Linus", "Radia", "Ken",
    "Frances", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Torvalds",
    "Perlman", "Thompson", "Allen", "Wirth",
];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
];

fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or("lorem")
}

fn sentence<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(4..=10);
    let mut words: Vec<&str> = (0..len).map(|_| pick(rng, WORDS)).collect();

    let first = words.remove(0);
    let mut out: String = first[..1].to_uppercase() + &first[1..];
    for word in words {
        out.push(' ');
        out.push_str(word);
    }
    out.push('.');
    out
}

fn paragraph<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(3..=6);
    (0..len)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build a random, valid post draft.
pub fn generate_post() -> Result<NewPost, DomainError> {
    let mut rng = rand::thread_rng();
    let author = Author::new(pick(&mut rng, FIRST_NAMES), pick(&mut rng, LAST_NAMES))?;

    NewPost::new(sentence(&mut rng), paragraph(&mut rng), author)
}

/// Insert `count` random posts, returning them in insertion order.
pub async fn seed_posts(
    repo: &dyn PostRepository,
    count: usize,
) -> Result<Vec<Post>, FixtureError> {
    tracing::info!(count, "Seeding posts");

    let mut posts = Vec::with_capacity(count);
    for _ in 0..count {
        posts.push(repo.create(generate_post()?).await?);
    }
    Ok(posts)
}

/// Remove every post from the store.
pub async fn tear_down(repo: &dyn PostRepository) -> Result<u64, RepoError> {
    let deleted = repo.delete_all().await?;
    tracing::warn!(deleted, "Deleted all posts");
    Ok(deleted)
}
