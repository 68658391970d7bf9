mod docs;
pub mod health;
pub mod videos;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;

/// Body limit of video uploads (1 GiB)
pub const VIDEO_UPLOAD_LIMIT: usize = 1 << 30;

/// Body limit of thumbnail uploads (10 MiB)
pub const THUMBNAIL_UPLOAD_LIMIT: usize = 10 << 20;

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    let thumbnail_routes = ApiRouter::new()
        .api_route(
            "/videos/{video_id}/thumbnail",
            post(videos::upload_thumbnail),
        )
        .layer(DefaultBodyLimit::max(THUMBNAIL_UPLOAD_LIMIT));

    let video_routes = ApiRouter::new()
        .api_route("/videos/{video_id}/video", post(videos::upload_video))
        .layer(DefaultBodyLimit::max(VIDEO_UPLOAD_LIMIT));

    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/videos/{video_id}", get(videos::get_video))
        .merge(thumbnail_routes)
        .merge(video_routes)
}
