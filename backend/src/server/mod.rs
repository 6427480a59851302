//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{ForumState, build_forum_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use qanda::Trace;
#[cfg(debug_assertions)]
use qanda::doc::ApiDoc;
use qanda::inbound::http::configure;
use qanda::inbound::http::health::{HealthState, health_check, live, ready};
use qanda::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(health_check)
        .configure(configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Running server plus the background notification dispatcher.
pub struct RunningServer {
    pub server: Server,
    pub dispatcher: JoinHandle<()>,
    pub shutdown: watch::Sender<bool>,
}

/// Construct the Actix HTTP server and spawn the notification dispatcher.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: pre-built [`ServerConfig`] with adapters and the bind address.
///
/// # Returns
/// A [`RunningServer`]; the caller awaits `server` and signals `shutdown` to
/// stop the dispatcher.
///
/// # Errors
/// Propagates [`std::io::Error`] when building state or binding the socket
/// fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<RunningServer> {
    let server_health_state = health_state.clone();
    let ForumState {
        http_state,
        dispatcher,
    } = build_forum_state(&config)?;

    let (shutdown, shutdown_rx) = watch::channel(false);
    let dispatcher = actix_web::rt::spawn(async move { dispatcher.run(shutdown_rx).await });

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    info!(addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    Ok(RunningServer {
        server,
        dispatcher,
        shutdown,
    })
}
