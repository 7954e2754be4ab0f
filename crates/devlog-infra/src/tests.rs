//! Service-level tests: the core services wired to the in-memory
//! adapters, exercising the full create/read/update/delete flows
//! including slug generation, caching and invalidation.

use std::sync::Arc;

use uuid::Uuid;

use devlog_core::DomainError;
use devlog_core::domain::{Role, User};
use devlog_core::ports::{Cache, PostStore, UserStore};
use devlog_core::services::{AuthService, CategoryService, PostService};
use devlog_shared::dto::{
    CategoryQuery, CreateCategoryRequest, CreatePostRequest, LoginRequest, PostQuery,
    RegisterRequest, UpdatePostRequest,
};

use crate::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use crate::cache::InMemoryCache;
use crate::render::MarkdownRenderer;
use crate::store::{MemoryCategoryStore, MemoryPostStore, MemoryUserStore};

struct Harness {
    users: Arc<MemoryUserStore>,
    post_store: Arc<MemoryPostStore>,
    cache: Arc<InMemoryCache>,
    posts: PostService,
    categories: CategoryService,
    auth: AuthService,
}

impl Harness {
    fn new() -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let post_store = Arc::new(MemoryPostStore::new());
        let category_store = Arc::new(MemoryCategoryStore::new());
        let cache = Arc::new(InMemoryCache::new());
        let renderer = Arc::new(MarkdownRenderer::new());

        let posts = PostService::new(
            post_store.clone(),
            category_store.clone(),
            users.clone(),
            renderer,
            cache.clone(),
        );
        let categories = CategoryService::new(
            category_store.clone(),
            post_store.clone(),
            users.clone(),
            cache.clone(),
        );
        let auth = AuthService::new(
            users.clone(),
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(JwtConfig {
                secret: "test-secret".into(),
                ..Default::default()
            })),
            cache.clone(),
        );

        Self {
            users,
            post_store,
            cache,
            posts,
            categories,
            auth,
        }
    }

    async fn seed_user(&self, role: Role) -> User {
        let suffix = Uuid::new_v4().simple().to_string();
        let mut user = User::new(
            format!("{suffix}@example.com"),
            format!("user-{suffix}"),
            "not-a-real-hash".into(),
        );
        user.role = role;
        self.users.insert(user).await.unwrap()
    }

    async fn seed_category(&self, creator: Uuid, name: &str) -> String {
        let created = self
            .categories
            .create_category(
                creator,
                CreateCategoryRequest {
                    name: name.into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        created.id
    }
}

fn post_request(title: &str, category_id: &str) -> CreatePostRequest {
    CreatePostRequest {
        title: title.into(),
        content: "Some *markdown* content that is long enough to publish.".into(),
        category_id: Some(category_id.parse().unwrap()),
        status: Some("published".into()),
        ..Default::default()
    }
}

// -- slug behavior ----------------------------------------------------------

#[tokio::test]
async fn slug_survives_title_unrelated_updates() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Hello World", &category))
        .await
        .unwrap();
    assert_eq!(created.slug, "hello-world");

    let updated = h
        .posts
        .update_post(
            created.id.parse().unwrap(),
            author.id,
            Role::User,
            UpdatePostRequest {
                content: Some("Entirely new body text for the very same title.".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.slug, "hello-world");
}

#[tokio::test]
async fn same_title_posts_get_suffixed_slugs() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let admin = h.seed_user(Role::Admin).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let first = h
        .posts
        .create_post(author.id, Role::User, post_request("Hello World", &category))
        .await
        .unwrap();
    let second = h
        .posts
        .create_post(admin.id, Role::Admin, post_request("Hello World", &category))
        .await
        .unwrap();

    assert_eq!(first.slug, "hello-world");
    assert_eq!(second.slug, "hello-world-1");

    // both resolve independently on the slug path
    let by_slug = h.posts.get_post_by_slug("hello-world", false).await.unwrap();
    assert_eq!(by_slug.id, first.id);
    let by_slug = h
        .posts
        .get_post_by_slug("hello-world-1", false)
        .await
        .unwrap();
    assert_eq!(by_slug.id, second.id);
}

// -- counters ---------------------------------------------------------------

#[tokio::test]
async fn view_increments_are_additive() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;
    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Counting views", &category))
        .await
        .unwrap();
    let id: Uuid = created.id.parse().unwrap();

    for _ in 0..3 {
        h.posts.get_post_by_id(id, true).await.unwrap();
    }
    let read = h.posts.get_post_by_id(id, false).await.unwrap();
    assert_eq!(read.views, 3);

    // plain reads never move the counter
    h.posts.get_post_by_id(id, false).await.unwrap();
    let read = h.posts.get_post_by_id(id, false).await.unwrap();
    assert_eq!(read.views, 3);
}

#[tokio::test]
async fn likes_require_published_status() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let mut draft = post_request("A quiet draft", &category);
    draft.status = None;
    let created = h
        .posts
        .create_post(author.id, Role::User, draft)
        .await
        .unwrap();
    assert_eq!(created.status, "draft");

    let err = h
        .posts
        .like_post(created.id.parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

// -- visibility -------------------------------------------------------------

#[tokio::test]
async fn unpublished_posts_are_invisible_on_public_reads() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let mut request = post_request("Hidden drafts stay hidden", &category);
    request.status = None;
    let created = h
        .posts
        .create_post(author.id, Role::User, request)
        .await
        .unwrap();
    let id: Uuid = created.id.parse().unwrap();

    assert!(matches!(
        h.posts.get_post_by_id(id, false).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        h.posts.get_post_by_slug(&created.slug, false).await,
        Err(DomainError::NotFound { .. })
    ));

    // but the owner sees it on the my-posts path
    let mine = h.posts.user_posts(author.id, &PostQuery::default()).await.unwrap();
    assert_eq!(mine.total, 1);
}

// -- cache behavior ---------------------------------------------------------

#[tokio::test]
async fn reads_are_served_from_cache_until_invalidated() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;
    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Cached reads", &category))
        .await
        .unwrap();
    let id: Uuid = created.id.parse().unwrap();

    // prime the cache, then bump the counter behind the service's back
    h.posts.get_post_by_id(id, false).await.unwrap();
    h.post_store.increment_views(id).await.unwrap();

    let cached = h.posts.get_post_by_id(id, false).await.unwrap();
    assert_eq!(cached.views, 0, "snapshot served while entry is live");

    // a like invalidates the id key; the next read hits the store
    h.posts.like_post(id).await.unwrap();
    let fresh = h.posts.get_post_by_id(id, false).await.unwrap();
    assert_eq!(fresh.views, 1);
    assert_eq!(fresh.likes, 1);
}

#[tokio::test]
async fn category_reassignment_moves_post_between_cached_listings() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let cat_a = h.seed_category(author.id, "Rustlang").await;
    let cat_b = h.seed_category(author.id, "Databases").await;

    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Moving house", &cat_a))
        .await
        .unwrap();

    let in_a = PostQuery {
        category: Some(cat_a.parse().unwrap()),
        ..Default::default()
    };
    let in_b = PostQuery {
        category: Some(cat_b.parse().unwrap()),
        ..Default::default()
    };

    assert_eq!(h.posts.list_posts(&in_a).await.unwrap().total, 1);
    assert_eq!(h.posts.list_posts(&in_b).await.unwrap().total, 0);

    h.posts
        .update_post(
            created.id.parse().unwrap(),
            author.id,
            Role::User,
            UpdatePostRequest {
                category_id: Some(cat_b.parse().unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // both listings were cached above; invalidation must refresh both
    assert_eq!(h.posts.list_posts(&in_a).await.unwrap().total, 0);
    assert_eq!(h.posts.list_posts(&in_b).await.unwrap().total, 1);
}

// -- categories -------------------------------------------------------------

#[tokio::test]
async fn category_names_are_unique_case_insensitively() {
    let h = Harness::new();
    let creator = h.seed_user(Role::User).await;
    h.seed_category(creator.id, "Engineering").await;

    let err = h
        .categories
        .create_category(
            creator.id,
            CreateCategoryRequest {
                name: "engineering".into(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let admin = h.seed_user(Role::Admin).await;
    let category = h.seed_category(author.id, "Engineering").await;
    let category_id: Uuid = category.parse().unwrap();

    // a draft referencing the category is enough to block deletion
    let mut request = post_request("Draft in the way", &category);
    request.status = None;
    let created = h
        .posts
        .create_post(author.id, Role::User, request)
        .await
        .unwrap();

    let err = h
        .categories
        .delete_category(category_id, admin.id, Role::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // nothing was disturbed
    let still_there = h.categories.get_category_by_id(category_id).await.unwrap();
    assert_eq!(still_there.id, category);
    let post: Uuid = created.id.parse().unwrap();
    assert!(h.post_store.find_by_id(post).await.unwrap().is_some());

    // non-admins may not delete at all
    let err = h
        .categories
        .delete_category(category_id, author.id, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn inactive_category_rejects_new_posts_but_stays_listable() {
    let h = Harness::new();
    let creator = h.seed_user(Role::User).await;
    let category = h.seed_category(creator.id, "Engineering").await;
    let category_id: Uuid = category.parse().unwrap();

    let toggled = h
        .categories
        .toggle_active(category_id, creator.id, Role::User)
        .await
        .unwrap();
    assert!(!toggled.is_active);

    let err = h
        .posts
        .create_post(
            creator.id,
            Role::User,
            post_request("No home for this", &category),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let listed = h
        .categories
        .list_categories(&Default::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
}

#[tokio::test]
async fn category_is_created_from_name_on_post_create() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;

    let request = CreatePostRequest {
        title: "Fresh category".into(),
        content: "Body content for the fresh category post.".into(),
        category_name: Some("Brand New".into()),
        status: Some("published".into()),
        ..Default::default()
    };
    let created = h
        .posts
        .create_post(author.id, Role::User, request)
        .await
        .unwrap();
    assert_eq!(created.category.name, "Brand New");
    assert_eq!(created.category.slug, "brand-new");
}

// -- authorization ----------------------------------------------------------

#[tokio::test]
async fn only_author_or_admin_may_mutate_posts() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let stranger = h.seed_user(Role::User).await;
    let admin = h.seed_user(Role::Admin).await;
    let category = h.seed_category(author.id, "Engineering").await;
    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Guarded post", &category))
        .await
        .unwrap();
    let id: Uuid = created.id.parse().unwrap();

    let patch = UpdatePostRequest {
        title: Some("Hijacked title".into()),
        ..Default::default()
    };
    let err = h
        .posts
        .update_post(id, stranger.id, Role::User, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    h.posts
        .update_post(id, admin.id, Role::Admin, patch)
        .await
        .unwrap();

    let err = h
        .posts
        .delete_post(id, stranger.id, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
    h.posts.delete_post(id, author.id, Role::User).await.unwrap();
}

// -- feeds ------------------------------------------------------------------

#[tokio::test]
async fn trending_orders_by_views_then_likes() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let quiet = h
        .posts
        .create_post(author.id, Role::User, post_request("Quiet post", &category))
        .await
        .unwrap();
    let busy = h
        .posts
        .create_post(author.id, Role::User, post_request("Busy post here", &category))
        .await
        .unwrap();

    let busy_id: Uuid = busy.id.parse().unwrap();
    for _ in 0..5 {
        h.posts.get_post_by_id(busy_id, true).await.unwrap();
    }

    let trending = h.posts.trending_posts(None).await.unwrap();
    assert_eq!(trending[0].id, busy.id);
    assert_eq!(trending[1].id, quiet.id);
}

#[tokio::test]
async fn related_posts_share_category_and_exclude_self() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let cat_a = h.seed_category(author.id, "Rustlang").await;
    let cat_b = h.seed_category(author.id, "Databases").await;

    let anchor = h
        .posts
        .create_post(author.id, Role::User, post_request("Anchor post", &cat_a))
        .await
        .unwrap();
    h.posts
        .create_post(author.id, Role::User, post_request("Sibling post", &cat_a))
        .await
        .unwrap();
    h.posts
        .create_post(author.id, Role::User, post_request("Unrelated post", &cat_b))
        .await
        .unwrap();

    let related = h
        .posts
        .related_posts(anchor.id.parse().unwrap(), None)
        .await
        .unwrap();
    assert_eq!(related.len(), 1);
    assert_eq!(related[0].title, "Sibling post");
}

// -- auth flows -------------------------------------------------------------

#[tokio::test]
async fn register_login_refresh_logout_round_trip() {
    let h = Harness::new();

    let session = h
        .auth
        .register(RegisterRequest {
            email: "Writer@Example.com".into(),
            username: "writer".into(),
            password: "long-enough-secret".into(),
            first_name: Some("Wri".into()),
            last_name: Some("Ter".into()),
        })
        .await
        .unwrap();
    assert_eq!(session.user.email, "writer@example.com");
    assert_eq!(session.user.full_name.as_deref(), Some("Wri Ter"));

    // duplicate registration conflicts
    let err = h
        .auth
        .register(RegisterRequest {
            email: "writer@example.com".into(),
            username: "writer2".into(),
            password: "long-enough-secret".into(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let session = h
        .auth
        .login(LoginRequest {
            email: "writer@example.com".into(),
            password: "long-enough-secret".into(),
        })
        .await
        .unwrap();

    let rotated = h.auth.refresh(&session.tokens.refresh_token).await.unwrap();
    assert_ne!(rotated.refresh_token, session.tokens.refresh_token);

    // the superseded token no longer refreshes
    let err = h
        .auth
        .refresh(&session.tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));

    let user_id: Uuid = session.user.id.parse().unwrap();
    h.auth.logout(user_id).await.unwrap();
    let err = h.auth.refresh(&rotated.refresh_token).await.unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let h = Harness::new();
    h.auth
        .register(RegisterRequest {
            email: "writer@example.com".into(),
            username: "writer".into(),
            password: "long-enough-secret".into(),
            first_name: None,
            last_name: None,
        })
        .await
        .unwrap();

    let err = h
        .auth
        .login(LoginRequest {
            email: "writer@example.com".into(),
            password: "wrong-password!".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Unauthorized));
}

// -- derivations ------------------------------------------------------------

#[tokio::test]
async fn content_derivations_run_on_create() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;

    let request = CreatePostRequest {
        title: "Derived fields".into(),
        content: format!("# Heading\n\n{}", "word ".repeat(450)),
        tags: vec!["Rust".into(), "rust".into(), "Async".into()],
        status: Some("published".into()),
        category_id: Some(category.parse().unwrap()),
        ..Default::default()
    };
    let created = h
        .posts
        .create_post(author.id, Role::User, request)
        .await
        .unwrap();

    assert!(created.content.contains("<h1>"));
    assert!(!created.excerpt.is_empty());
    assert!(created.excerpt.chars().count() <= 300);
    assert_eq!(created.read_time, 3);
    assert_eq!(created.tags, vec!["rust", "async"]);
    assert_eq!(created.meta_title, "Derived fields");
    assert!(created.published_at.is_some());
}

#[tokio::test]
async fn absurd_page_numbers_yield_empty_pages() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;
    h.posts
        .create_post(author.id, Role::User, post_request("Lone post", &category))
        .await
        .unwrap();

    let query = PostQuery {
        page: Some(u64::MAX),
        limit: Some(10),
        ..Default::default()
    };
    let page = h.posts.list_posts(&query).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 1);

    let query = CategoryQuery {
        page: Some(u64::MAX),
        limit: Some(10),
        ..Default::default()
    };
    let page = h.categories.list_categories(&query).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn cache_is_advisory_for_correctness() {
    let h = Harness::new();
    let author = h.seed_user(Role::User).await;
    let category = h.seed_category(author.id, "Engineering").await;
    let created = h
        .posts
        .create_post(author.id, Role::User, post_request("Sturdy reads", &category))
        .await
        .unwrap();
    let id: Uuid = created.id.parse().unwrap();

    // wipe the cache wholesale; every path must still answer correctly
    h.cache.delete_by_prefix("").await.unwrap();
    let read = h.posts.get_post_by_id(id, false).await.unwrap();
    assert_eq!(read.id, created.id);
    let listed = h.posts.list_posts(&PostQuery::default()).await.unwrap();
    assert_eq!(listed.total, 1);
}
