//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input,
        text_input,
    },
    user::{User, get_user_by_username},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

fn log_in_form(username: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input(
                "Username",
                "username",
                "text",
                "Enter your username",
                username,
                true,
                None,
            ))
            (password_input(
                "Password",
                "password",
                "Enter your password",
                error_message,
            ))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log In"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? "
                (link(endpoints::SIGN_UP_VIEW, "Sign up here"))
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    let form = log_in_form("", None);
    let content = log_in_register("Log in to your account", &form);
    base("Log In", &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// The username and password are stored as plain strings. There is no need for validation here
/// since they will be compared against the username and password in the database, which have been
/// verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is redirected to the
/// transactions page. Otherwise, the form is returned with an error message explaining the
/// problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return log_in_form(
                    &user_data.username,
                    Some("An internal error occurred. Please try again later."),
                )
                .into_response();
            }
        };

        match get_user_by_username(&user_data.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return log_in_form(&user_data.username, Some(INVALID_CREDENTIALS_ERROR_MSG))
                    .into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return log_in_form(
                    &user_data.username,
                    Some("An internal error occurred. Please try again later."),
                )
                .into_response();
            }
        }
    };

    let is_password_valid = match user.password_hash.verify(&user_data.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.username,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    if !is_password_valid {
        return log_in_form(&user_data.username, Some(INVALID_CREDENTIALS_ERROR_MSG))
            .into_response();
    }

    set_auth_cookie(jar.clone(), user.id, state.cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}


#[cfg(test)]
mod post_log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{
        PasswordHash,
        auth::COOKIE_USER_ID,
        db::initialize,
        endpoints,
        user::{NewUser, create_user},
    };

    use super::{INVALID_CREDENTIALS_ERROR_MSG, LogInData, LoginState, post_log_in};

    const TEST_PASSWORD: &str = "Test@123";

    fn get_test_state() -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        create_user(
            NewUser {
                first_name: "Tester".to_owned(),
                last_name: "Last".to_owned(),
                username: "test".to_owned(),
                email: "test@email.com".parse().unwrap(),
                password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
            },
            &connection,
        )
        .expect("Could not create test user");

        let hash = Sha512::digest("42");

        LoginState {
            cookie_key: Key::from(&hash),
            cookie_duration: Duration::minutes(5),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(get_test_state());

        TestServer::new(app)
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&LogInData {
                username: "test".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::TRANSACTIONS_VIEW);
        assert!(!response.cookie(COOKIE_USER_ID).value().is_empty());
    }

    #[track_caller]
    fn assert_invalid_credentials_message(text: &str) {
        let fragment = Html::parse_fragment(text);
        let p_selector = Selector::parse("p.text-red-500").unwrap();
        let paragraphs = fragment.select(&p_selector).collect::<Vec<_>>();
        assert_eq!(paragraphs.len(), 1, "want 1 p, got {}", paragraphs.len());
        let text = paragraphs[0].text().collect::<String>();
        assert_eq!(text.trim(), INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&LogInData {
                username: "nobody".to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;

        response.assert_status_ok();
        assert_invalid_credentials_message(&response.text());
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server();

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&LogInData {
                username: "test".to_string(),
                password: "thewrongpassword".to_string(),
            })
            .await;

        response.assert_status_ok();
        assert_invalid_credentials_message(&response.text());
    }
}
