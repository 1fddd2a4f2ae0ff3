//! The route for logging out the current user.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{AuthState, invalidate_auth_cookie},
    endpoints,
};

/// Invalidate the auth cookie and redirect the client to the log in page.
pub async fn get_log_out(State(_state): State<AuthState>, jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
