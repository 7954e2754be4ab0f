//! Response shaping - converts stored entities plus their resolved
//! relations into the client-facing shapes.
//!
//! Relation resolution happens in the services; a dangling reference is
//! reported there as an integrity fault before these functions run, so
//! shaping itself is infallible.

use devlog_shared::dto::{
    AuthorSummary, CategoryResponse, CategorySummary, CreatorSummary, PostResponse, UserResponse,
};

use crate::domain::{Category, Post, User};

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.full_name(),
        avatar: user.avatar.clone(),
        bio: user.bio.clone(),
        role: user.role.as_str().to_string(),
        is_verified: user.is_verified,
        last_login: user.last_login,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn author_summary(author: &User) -> AuthorSummary {
    AuthorSummary {
        id: author.id.to_string(),
        username: author.username.clone(),
        email: author.email.clone(),
        avatar: author.avatar.clone(),
        full_name: author.full_name(),
    }
}

fn category_summary(category: &Category) -> CategorySummary {
    CategorySummary {
        id: category.id.to_string(),
        name: category.name.clone(),
        slug: category.slug.clone(),
    }
}

pub fn post_response(post: &Post, author: &User, category: &Category) -> PostResponse {
    PostResponse {
        id: post.id.to_string(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        featured_image: post.featured_image.clone(),
        author: author_summary(author),
        category: category_summary(category),
        tags: post.tags.clone(),
        status: post.status.as_str().to_string(),
        is_featured: post.is_featured,
        read_time: post.read_time,
        views: post.views,
        likes: post.likes,
        published_at: post.published_at,
        meta_title: post.meta_title.clone(),
        meta_description: post.meta_description.clone(),
        keywords: post.keywords.clone(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn category_response(category: &Category, creator: &User, blog_count: u64) -> CategoryResponse {
    CategoryResponse {
        id: category.id.to_string(),
        name: category.name.clone(),
        slug: category.slug.clone(),
        description: category.description.clone(),
        created_by: CreatorSummary {
            id: creator.id.to_string(),
            username: creator.username.clone(),
            email: creator.email.clone(),
        },
        blog_count,
        is_active: category.is_active,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}
