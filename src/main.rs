use crate::middlewares::content_type::ContentTypeBootstrap;
use crate::state::{AppState, new_app_state};
use actix_web::dev::{ServiceFactory, ServiceRequest};
use actix_web::{App, Error, HttpServer, web};
use dotenvy::dotenv;
use utoipa_actix_web::AppExt;
use utoipa_actix_web::scope::Scope;
use utoipa_rapidoc::RapiDoc;

mod middlewares;
mod routes;
mod state;
mod utility;

pub fn get_api_scope<
    I: Into<Scope<T>>,
    T: ServiceFactory<ServiceRequest, Config = (), Error = Error, InitError = ()>,
>(
    scope: I,
) -> Scope<T> {
    let import_scope = utoipa_actix_web::scope("/import")
        .service(routes::import::groups)
        .service(routes::import::schedule);

    utoipa_actix_web::scope(scope).service(import_scope)
}

fn init_sentry() -> sentry::ClientInitGuard {
    sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ))
}

async fn run() -> std::io::Result<()> {
    let app_state = new_app_state();
    let server = app_state.get_env().server.clone();
    let payload_limit = server.payload_limit;

    log::info!(
        "Listening on {}:{} with {} workers.",
        server.bind_address,
        server.port,
        server.workers
    );

    HttpServer::new(move || {
        let (app, api) = App::new()
            .into_utoipa_app()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .service(get_api_scope("/api/v1").wrap(ContentTypeBootstrap))
            .split_for_parts();

        let rapidoc_service = RapiDoc::with_openapi("/api-docs-json", api).path("/api-docs");

        // Because CORS error on non-localhost
        let patched_rapidoc_html = rapidoc_service.to_html().replace(
            "https://unpkg.com/rapidoc/dist/rapidoc-min.js",
            "https://cdn.jsdelivr.net/npm/rapidoc/dist/rapidoc-min.min.js",
        );

        app.wrap(sentry_actix::Sentry::new())
            .service(rapidoc_service.custom_html(patched_rapidoc_html))
    })
    .workers(server.workers)
    .bind((server.bind_address.as_str(), server.port))?
    .run()
    .await
}

fn main() -> std::io::Result<()> {
    dotenv().ok();

    if std::env::var_os("RUST_LOG").is_none() {
        unsafe { std::env::set_var("RUST_LOG", "info") };
    }
    env_logger::init();

    let _sentry = init_sentry();

    actix_web::rt::System::new().block_on(run())
}
