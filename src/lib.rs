mod authorization;
mod consts;
mod endpoints;
mod handler_error;
mod id_token;
mod saml;
mod telemetry;
mod token_exchange;
mod user_metadata;
mod webhook;

pub mod config;
pub mod profiles;
pub mod state;

use axum::{body::Body, http::Response, routing::{get, post}, Router};
use endpoints::{get_user_profile, method_not_allowed, oidc_callback_body, oidc_callback_query, oidc_login, preflight, saml_callback, saml_login, validate_user};
use tower_service::Service;
use tracing::error;
use worker::{event, Context, Env, HttpRequest};

pub use config::Config;
pub use state::AppState;

// Program entrypoint. Essentially the `main` function.
#[event(fetch)]
async fn fetch(req: HttpRequest, env: Env, _: Context) -> worker::Result<Response<Body>> {
  console_error_panic_hook::set_once();

  // refuse to route anything on missing or invalid configuration
  let config = match Config::from_env(&env) {
    Ok(config) => config,
    Err(e) => {
      telemetry::init(consts::DEFAULT_LOG_LEVEL);
      error!("{e}");
      return Err(worker::Error::RustError(e.to_string()))
    }
  };

  telemetry::init(&config.log_level);

  Ok(
    router(AppState::new(config))
      .call(req)
      .await?
  )
}

/// Every endpoint, in the order they're hit during the login flow.
/// Each answers `OPTIONS` as a CORS preflight and any other
/// unsupported method with a JSON 405.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route(
      "/oidc-login",
      get(oidc_login)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    .route(
      "/oidc-callback",
      get(oidc_callback_query)
        .post(oidc_callback_body)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    .route(
      "/validate-user",
      post(validate_user)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    .route(
      "/get-user-profile",
      get(get_user_profile)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    // legacy SAML path
    .route(
      "/saml-login",
      get(saml_login)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    .route(
      "/saml-callback",
      post(saml_callback)
        .options(preflight)
        .fallback(method_not_allowed)
    )
    .with_state(state)
}
