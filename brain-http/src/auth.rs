//! Bearer-token authentication middleware (SPEC_FULL.md §4.10).
//!
//! Every route except `GET /ping` requires `Authorization: Bearer <token>`,
//! compared with [`subtle::ConstantTimeEq`] to avoid a timing oracle. No
//! hashing, no rate limiting — the spec asks only for
//! `constant_time_equals`, unlike the richer per-IP lockout scheme this is
//! grounded on.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Axum middleware enforcing the bearer token on [`AppState`].
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match extract_bearer(&req) {
        Some(token) if constant_time_equals(token, state.bearer_token()) => next.run(req).await,
        _ => (StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
    }
}

/// Constant-time string comparison, per §4.10.
pub fn constant_time_equals(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn extract_bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_tokens_compare_equal() {
        assert!(constant_time_equals("sekret-token", "sekret-token"));
    }

    #[test]
    fn different_length_tokens_are_unequal() {
        assert!(!constant_time_equals("short", "a-lot-longer-token"));
    }

    #[test]
    fn same_length_different_tokens_are_unequal() {
        assert!(!constant_time_equals("aaaaaaaa", "bbbbbbbb"));
    }
}
