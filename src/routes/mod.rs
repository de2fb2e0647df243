pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

use actix_web::web;

use crate::auth::{Action, PermissionGate, Resource};
use crate::error::json_error_handler;

/// Registers every resource route. Expects `TokenAuthentication` to wrap the
/// app so that each `PermissionGate` sees the resolved caller.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        // Custom user actions come before the member route.
        .service(
            web::resource("/users/register/")
                .wrap(PermissionGate::action(Resource::Users, Action::Register))
                .route(web::post().to(users::register)),
        )
        .service(
            web::resource("/users/login/")
                .wrap(PermissionGate::action(Resource::Users, Action::Login))
                .route(web::post().to(users::login)),
        )
        .service(
            web::resource("/users/")
                .wrap(PermissionGate::collection(Resource::Users))
                .route(web::get().to(users::list))
                .route(web::post().to(users::create)),
        )
        .service(
            web::resource(r"/users/{id:\d+}/")
                .wrap(PermissionGate::member(Resource::Users))
                .route(web::get().to(users::retrieve))
                .route(web::put().to(users::update))
                .route(web::patch().to(users::partial_update))
                .route(web::delete().to(users::destroy)),
        )
        .service(
            web::resource("/posts/")
                .wrap(PermissionGate::collection(Resource::Posts))
                .route(web::get().to(posts::list))
                .route(web::post().to(posts::create)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/")
                .wrap(PermissionGate::member(Resource::Posts))
                .route(web::get().to(posts::retrieve))
                .route(web::put().to(posts::update))
                .route(web::patch().to(posts::partial_update))
                .route(web::delete().to(posts::destroy)),
        )
        .service(
            web::resource("/comments/")
                .wrap(PermissionGate::collection(Resource::Comments))
                .route(web::get().to(comments::list))
                .route(web::post().to(comments::create)),
        )
        .service(
            web::resource(r"/comments/{id:\d+}/")
                .wrap(PermissionGate::member(Resource::Comments))
                .route(web::get().to(comments::retrieve))
                .route(web::put().to(comments::update))
                .route(web::patch().to(comments::partial_update))
                .route(web::delete().to(comments::destroy)),
        );
}
