// web-server/src/api/mod.rs
pub mod agents;
pub mod auth;
pub mod debug;
pub mod pages;

use actix_web::web;

use crate::middleware::{RateLimiter, TokenGate};

/// Bind every verb + path to its gate and handler chain
pub fn configure(cfg: &mut web::ServiceConfig, gate: &TokenGate, limiter: &RateLimiter) {
    cfg.route("/", web::get().to(pages::login_page))
        .route("/register", web::get().to(pages::register_page))
        .service(
            web::scope("/agent")
                .service(
                    web::resource("/register")
                        .wrap(limiter.clone())
                        .route(web::post().to(auth::register)),
                )
                .service(
                    web::resource("/login")
                        .wrap(limiter.clone())
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout")
                        .wrap(gate.clone())
                        .route(web::post().to(auth::logout)),
                )
                .service(
                    web::resource("/upload")
                        .wrap(gate.clone())
                        .route(web::get().to(pages::upload_page))
                        .route(web::post().to(agents::upload_agents_from_excel)),
                )
                .service(
                    web::resource("/report")
                        .wrap(gate.clone())
                        .route(web::get().to(agents::get_all_agents)),
                )
                .service(
                    web::resource("/agents")
                        .wrap(gate.clone())
                        .route(web::get().to(agents::get_filtered_results)),
                ),
        );
}
