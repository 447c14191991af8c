use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/purchases", purchase_routes())
        .nest("/wallet", wallet_routes())
        .nest("/reviews", review_routes())
        .nest("/favorites", favorite_routes())
        .nest("/messages", message_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    let base = OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::update_profile));

    let picture = OpenApiRouter::new()
        .routes(routes!(handlers::auth::upload_profile_picture))
        .layer(handlers::auth::picture_body_limit());

    base.merge(picture)
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::auth::get_user_picture))
}

fn product_routes() -> OpenApiRouter<AppState> {
    // The upload limit covers the whole collection route; only the POST
    // carries a body.
    let collection = OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .layer(handlers::product::upload_body_limit());

    collection
        .routes(routes!(handlers::product::get_product))
        .routes(routes!(handlers::product::get_product_image))
        .routes(routes!(handlers::product::download_product_pdf))
        .routes(routes!(handlers::purchase::purchase_product))
        .routes(routes!(
            handlers::review::create_review,
            handlers::review::list_reviews
        ))
        .routes(routes!(
            handlers::favorite::add_favorite,
            handlers::favorite::remove_favorite
        ))
}

fn purchase_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::purchase::list_purchases))
}

fn wallet_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::wallet::deposit))
}

fn review_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::review::like_review))
}

fn favorite_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::favorite::list_favorites))
}

fn message_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::message::send_message,
            handlers::message::list_conversations
        ))
        .routes(routes!(handlers::message::get_thread))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::list_users))
        .routes(routes!(handlers::admin::list_products))
        .routes(routes!(handlers::admin::delete_user))
        .routes(routes!(
            handlers::admin::delete_product,
            handlers::admin::update_product
        ))
}
