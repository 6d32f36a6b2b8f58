mod callback;
mod cors;
mod login;
mod saml;
mod user_profile;
mod validate_user;

pub use callback::{oidc_callback_body, oidc_callback_query};
pub use cors::{method_not_allowed, preflight};
pub use login::oidc_login;
pub use saml::{saml_callback, saml_login};
pub use user_profile::get_user_profile;
pub use validate_user::validate_user;
