//! Authentication with an encrypted token cookie.
//!
//! Log-in flows live in another service. This module verifies the cookie that
//! service issues and exposes [set_auth_cookie] so the cookie can be minted
//! with the shared secret.

mod cookie;
mod middleware;
mod token;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed, get_token_from_cookies,
    set_auth_cookie,
};
pub use middleware::auth_guard;
pub use token::Token;
