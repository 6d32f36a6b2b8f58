use axum::http::{header, HeaderName};

// ---------- IDENTITY ----------

/// Institutional email domain stripped from usernames to form the kerberos id
pub const KERBEROS_SUFFIX: &str = "@mit.edu";

/// Scopes requested on every authorization redirect
pub const OIDC_SCOPES: &str = "openid profile email";

// Okta style endpoint paths, relative to the issuer
pub const AUTHORIZE_PATH: &str = "/v1/authorize";
pub const TOKEN_PATH: &str = "/v1/token";

// ---------- DEFAULTS ----------

pub const DEFAULT_CHATBOT_URL: &str = "/chatbot.html";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 5;

// ---------- HEADERS ----------

/// Attached to every JSON response and preflight
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
  (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
  (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
  (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type")
];

/// Responses carrying identity data or one-time redirects must not be cached.
/// Source: https://www.rfc-editor.org/rfc/rfc6749#section-5.1
pub const NO_STORE_HEADERS: [(HeaderName, &str); 2] = [
  (header::CACHE_CONTROL, "no-store"),
  (header::PRAGMA, "no-cache")
];
