//! Prepare-for-persist derivations.
//!
//! Everything the original data model derived implicitly on save happens
//! here, as explicit functions the services invoke right before a write:
//! excerpt, read time, meta defaults, tag normalization and the one-shot
//! published-at transition. Keeping these free functions makes the
//! derivation order auditable and each rule testable in isolation.

use chrono::Utc;

use crate::domain::{Post, PostStatus};
use crate::error::DomainError;
use crate::ports::RenderedContent;

pub const MAX_TAGS: usize = 10;
pub const TAG_MIN_LEN: usize = 2;
pub const TAG_MAX_LEN: usize = 20;
pub const EXCERPT_SOURCE_LEN: usize = 250;
pub const EXCERPT_MAX_LEN: usize = 300;
pub const META_TITLE_MAX_LEN: usize = 70;
pub const META_DESCRIPTION_MAX_LEN: usize = 160;
const WORDS_PER_MINUTE: usize = 200;

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Lowercase, trim and deduplicate a tag list, preserving order. The tag
/// cap is a durable invariant, enforced here and not only at the edge.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, DomainError> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        let len = tag.chars().count();
        if !(TAG_MIN_LEN..=TAG_MAX_LEN).contains(&len) {
            return Err(DomainError::Validation(format!(
                "tag `{tag}` must be {TAG_MIN_LEN}-{TAG_MAX_LEN} characters"
            )));
        }
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    if normalized.len() > MAX_TAGS {
        return Err(DomainError::Validation(format!(
            "at most {MAX_TAGS} tags allowed"
        )));
    }
    Ok(normalized)
}

/// First characters of the plain text, ellipsis-terminated when cut.
pub fn derive_excerpt(plain: &str) -> String {
    let plain = plain.trim();
    if plain.chars().count() <= EXCERPT_SOURCE_LEN {
        plain.to_string()
    } else {
        format!("{}...", truncate_chars(plain, EXCERPT_SOURCE_LEN))
    }
}

/// Reading time in minutes at 200 words per minute, rounded up.
pub fn read_time_minutes(plain: &str) -> u32 {
    plain.split_whitespace().count().div_ceil(WORDS_PER_MINUTE) as u32
}

/// Apply a rendered content body to the post: sanitized HTML, read time,
/// and the excerpt when none was supplied.
pub fn apply_content(post: &mut Post, rendered: &RenderedContent) {
    post.content = rendered.html.clone();
    post.read_time = read_time_minutes(&rendered.plain);
    if post.excerpt.is_empty() {
        post.excerpt = derive_excerpt(&rendered.plain);
    }
}

/// Validate a caller-supplied excerpt against the length invariant.
pub fn validate_excerpt(excerpt: &str) -> Result<(), DomainError> {
    if excerpt.chars().count() > EXCERPT_MAX_LEN {
        return Err(DomainError::Validation(format!(
            "excerpt cannot exceed {EXCERPT_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Record the first transition to published. `published_at` is set at
/// most once and never cleared, even if the post is archived later.
pub fn apply_status(post: &mut Post, status: PostStatus) {
    post.status = status;
    if status == PostStatus::Published && post.published_at.is_none() {
        post.published_at = Some(Utc::now());
    }
}

/// Default the meta fields from title and excerpt when absent.
pub fn apply_meta_defaults(post: &mut Post) {
    if post.meta_title.is_empty() {
        post.meta_title = truncate_chars(&post.title, META_TITLE_MAX_LEN);
    }
    if post.meta_description.is_empty() && !post.excerpt.is_empty() {
        post.meta_description = truncate_chars(&post.excerpt, META_DESCRIPTION_MAX_LEN);
    }
}
