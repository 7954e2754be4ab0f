//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/refresh-token", web::post().to(auth::refresh))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            // Blog routes
            .service(
                web::scope("/blogs")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/featured", web::get().to(posts::featured))
                    .route("/trending", web::get().to(posts::trending))
                    .route("/slug/{slug}", web::get().to(posts::get_by_slug))
                    .route("/{id}", web::get().to(posts::get_by_id))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete))
                    .route("/{id}/related", web::get().to(posts::related))
                    .route("/{id}/like", web::post().to(posts::like)),
            )
            // The caller's own posts, drafts included
            .route("/user/blogs", web::get().to(posts::my_posts))
            // Category routes
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list))
                    .route("", web::post().to(categories::create))
                    .route("/slug/{slug}", web::get().to(categories::get_by_slug))
                    .route("/{id}", web::get().to(categories::get_by_id))
                    .route("/{id}", web::put().to(categories::update))
                    .route("/{id}", web::delete().to(categories::delete))
                    .route("/{id}/toggle", web::patch().to(categories::toggle)),
            ),
    );
}
