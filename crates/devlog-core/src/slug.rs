//! Slug generation.
//!
//! A slug is derived from a human-readable title/name and made unique
//! against the owning collection by suffixing `-1`, `-2`, ... until no
//! other document claims it. The probe loop is advisory: two concurrent
//! creates can race past each other's checks, which is why the store's
//! unique index on the slug field is the real guarantee. A losing writer
//! sees `StoreError::Duplicate("slug")` and surfaces it as a retryable
//! conflict.

use uuid::Uuid;

use crate::error::StoreError;

/// Normalize a title/name to its base slug: lowercase, ASCII,
/// hyphen-separated, punctuation stripped.
pub fn base_slug(source: &str) -> String {
    let slug = ::slug::slugify(source);
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Generate a unique slug for `source`.
///
/// `lookup` resolves a candidate slug to the id of the document currently
/// owning it, if any. A match on `exclude_id` (the entity being updated)
/// does not count as a conflict, so an unchanged title keeps its slug.
pub async fn unique_slug<L, Fut>(
    source: &str,
    exclude_id: Option<Uuid>,
    lookup: L,
) -> Result<String, StoreError>
where
    L: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<Uuid>, StoreError>>,
{
    let base = base_slug(source);
    let mut candidate = base.clone();
    let mut counter: u64 = 1;

    loop {
        match lookup(candidate.clone()).await? {
            None => return Ok(candidate),
            Some(owner) if Some(owner) == exclude_id => return Ok(candidate),
            Some(_) => {
                candidate = format!("{base}-{counter}");
                counter += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(
        taken: HashMap<String, Uuid>,
    ) -> impl Fn(String) -> std::future::Ready<Result<Option<Uuid>, StoreError>> {
        move |slug| std::future::ready(Ok(taken.get(&slug).copied()))
    }

    #[test]
    fn base_slug_normalizes() {
        assert_eq!(base_slug("Hello, World!"), "hello-world");
        assert_eq!(base_slug("  Rust   & async  "), "rust-async");
        assert_eq!(base_slug("???"), "untitled");
    }

    #[tokio::test]
    async fn free_base_is_returned_unsuffixed() {
        let slug = unique_slug("Hello World", None, lookup_in(HashMap::new()))
            .await
            .unwrap();
        assert_eq!(slug, "hello-world");
    }

    #[tokio::test]
    async fn collisions_append_counter() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let taken = HashMap::from([
            ("hello-world".to_string(), a),
            ("hello-world-1".to_string(), b),
        ]);
        let slug = unique_slug("Hello World", None, lookup_in(taken))
            .await
            .unwrap();
        assert_eq!(slug, "hello-world-2");
    }

    #[tokio::test]
    async fn own_slug_is_not_a_conflict() {
        let me = Uuid::new_v4();
        let taken = HashMap::from([("hello-world".to_string(), me)]);
        let slug = unique_slug("Hello World", Some(me), lookup_in(taken))
            .await
            .unwrap();
        assert_eq!(slug, "hello-world");
    }
}
