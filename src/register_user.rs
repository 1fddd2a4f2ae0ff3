//! The sign up page for creating a new user.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword, endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, link, loading_spinner, log_in_register, password_input, text_input},
    internal_server_error::get_internal_server_error_redirect,
    user::{NewUser, create_user, email_exists, parse_email, username_exists},
};

const REQUIRED_ERROR_MSG: &str = "This field is required.";
const REPEAT_PASSWORD_REQUIRED_ERROR_MSG: &str = "You need to repeat your password";
const INVALID_EMAIL_ERROR_MSG: &str = "Enter a valid email address.";
const DUPLICATE_EMAIL_ERROR_MSG: &str = "This email is already in use.";
const DUPLICATE_USERNAME_ERROR_MSG: &str = "This username is already taken.";
const PASSWORD_MISMATCH_ERROR_MSG: &str = "Password and password repeat must be equal.";

/// The error messages to display under each sign up form field.
///
/// A `None` means the field passed validation. Errors are collected for every
/// field before the form is re-rendered so the user sees all problems at once.
#[derive(Debug, Default, PartialEq)]
struct SignupErrors {
    first_name: Option<String>,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    repeat_password: Option<String>,
}

impl SignupErrors {
    fn any(&self) -> bool {
        self.first_name.is_some()
            || self.username.is_some()
            || self.email.is_some()
            || self.password.is_some()
            || self.repeat_password.is_some()
    }
}

fn signup_form(values: &RegisterForm, errors: &SignupErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input(
                "First name",
                "first_name",
                "text",
                "Enter your first name",
                &values.first_name,
                true,
                errors.first_name.as_deref(),
            ))
            (text_input(
                "Last name",
                "last_name",
                "text",
                "Enter your last name",
                &values.last_name,
                false,
                None,
            ))
            (text_input(
                "Username",
                "username",
                "text",
                "Enter a username",
                &values.username,
                true,
                errors.username.as_deref(),
            ))
            (text_input(
                "Email",
                "email",
                "email",
                "Enter your best email",
                &values.email,
                true,
                errors.email.as_deref(),
            ))
            (password_input(
                "Password",
                "password",
                "Enter a secure password",
                errors.password.as_deref(),
            ))
            (password_input(
                "Repeat your password",
                "repeat_password",
                "Enter your password again",
                errors.repeat_password.as_deref(),
            ))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Sign Up"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    }
}

/// Display the sign up page.
pub async fn get_sign_up_page() -> Response {
    let form = signup_form(&RegisterForm::default(), &SignupErrors::default());
    let content = log_in_register("Create an account", &form);
    base("Sign Up", &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered by the user in the sign up form.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub repeat_password: String,
}

/// A route handler for creating a new user.
///
/// On success the client is redirected to the log in page. On validation
/// failure the form is re-rendered with an error message under each invalid
/// field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let mut errors = SignupErrors::default();

    if form.first_name.trim().is_empty() {
        errors.first_name = Some(REQUIRED_ERROR_MSG.to_owned());
    }

    let username = form.username.trim();
    let email = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        if username.is_empty() {
            errors.username = Some(REQUIRED_ERROR_MSG.to_owned());
        } else {
            match username_exists(username, &connection) {
                Ok(false) => {}
                Ok(true) => errors.username = Some(DUPLICATE_USERNAME_ERROR_MSG.to_owned()),
                Err(error) => {
                    tracing::error!("Could not check for an existing username: {error}");
                    return get_internal_server_error_redirect();
                }
            }
        }

        if form.email.trim().is_empty() {
            errors.email = Some(REQUIRED_ERROR_MSG.to_owned());
            None
        } else {
            match parse_email(&form.email) {
                Err(_) => {
                    errors.email = Some(INVALID_EMAIL_ERROR_MSG.to_owned());
                    None
                }
                Ok(email) => match email_exists(&email, &connection) {
                    Ok(false) => Some(email),
                    Ok(true) => {
                        errors.email = Some(DUPLICATE_EMAIL_ERROR_MSG.to_owned());
                        None
                    }
                    Err(error) => {
                        tracing::error!("Could not check for an existing email: {error}");
                        return get_internal_server_error_redirect();
                    }
                },
            }
        }
    };

    let validated_password = if form.password.is_empty() {
        errors.password = Some(REQUIRED_ERROR_MSG.to_owned());
        None
    } else {
        match ValidatedPassword::new(&form.password) {
            Ok(password) => Some(password),
            Err(error) => {
                errors.password = Some(error.to_string());
                None
            }
        }
    };

    if form.repeat_password.is_empty() {
        errors.repeat_password = Some(REPEAT_PASSWORD_REQUIRED_ERROR_MSG.to_owned());
    } else if form.password != form.repeat_password {
        errors.repeat_password = Some(PASSWORD_MISMATCH_ERROR_MSG.to_owned());
    }

    if errors.any() {
        return signup_form(&form, &errors).into_response();
    }

    // The checks above guarantee both are set when there are no errors.
    let (Some(email), Some(validated_password)) = (email, validated_password) else {
        return get_internal_server_error_redirect();
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let new_user = NewUser {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        username: username.to_owned(),
        email,
        password_hash,
    };

    let result = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(new_user, &connection)
    };

    match result {
        Ok(_) => (
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        // Another sign up may have claimed the email or username between the
        // uniqueness check and the insert. The constraint violation is
        // reported the same way as the check.
        Err(Error::DuplicateEmail) => {
            errors.email = Some(DUPLICATE_EMAIL_ERROR_MSG.to_owned());
            signup_form(&form, &errors).into_response()
        }
        Err(Error::DuplicateUsername) => {
            errors.username = Some(DUPLICATE_USERNAME_ERROR_MSG.to_owned());
            signup_form(&form, &errors).into_response()
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_sign_up_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_sign_up_page;

    #[tokio::test]
    async fn render_sign_up_page() {
        let response = get_sign_up_page().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html");

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");

        assert_form_input(&form, "first_name", "text");
        assert_form_input(&form, "last_name", "text");
        assert_form_input(&form, "username", "text");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "repeat_password", "password");
    }
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{db::initialize, endpoints, user::get_user_by_username};

    use super::{RegisterForm, RegistrationState, register_user};

    fn get_test_state() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn get_test_server(state: RegistrationState) -> TestServer {
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state);

        TestServer::new(app)
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            first_name: "Tester".to_string(),
            last_name: "Last".to_string(),
            username: "test".to_string(),
            email: "test@email.com".to_string(),
            password: "Test@123".to_string(),
            repeat_password: "Test@123".to_string(),
        }
    }

    #[track_caller]
    fn error_messages(fragment: &Html) -> Vec<String> {
        let p_selector = Selector::parse("p.text-red-500").unwrap();
        fragment
            .select(&p_selector)
            .map(|p| p.text().collect::<String>().trim().to_string())
            .collect()
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server.post(endpoints::USERS).form(&valid_form()).await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::LOG_IN_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("test", &connection).expect("User was not created");
        assert_eq!(user.email.to_string(), "test@email.com");
        // Only the bcrypt hash is stored, never the plain text password.
        assert!(user.password_hash.as_ref().starts_with("$2"));
        assert!(user.password_hash.verify("Test@123").unwrap());
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_email() {
        let state = get_test_state();
        let server = get_test_server(state);

        server
            .post(endpoints::USERS)
            .form(&valid_form())
            .await
            .assert_status(StatusCode::SEE_OTHER);

        // Same email, every other field valid and different.
        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                username: "different".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_eq!(
            error_messages(&fragment),
            vec!["This email is already in use."]
        );
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_username() {
        let state = get_test_state();
        let server = get_test_server(state);

        server
            .post(endpoints::USERS)
            .form(&valid_form())
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                email: "different@email.com".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_eq!(
            error_messages(&fragment),
            vec!["This username is already taken."]
        );
    }

    #[tokio::test]
    async fn create_user_fails_when_passwords_do_not_match() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                repeat_password: "Different@123".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_eq!(
            error_messages(&fragment),
            vec!["Password and password repeat must be equal."]
        );

        // The error is attached to the repeat password field.
        let input_selector = Selector::parse("input#repeat_password").unwrap();
        let repeat_input = fragment
            .select(&input_selector)
            .next()
            .expect("No repeat password input found");
        assert!(
            repeat_input.value().attr("autofocus").is_some(),
            "want the repeat password input to be focused when its validation fails"
        );

        // Nothing was inserted.
        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let state = get_test_state();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                password: "foo".to_string(),
                repeat_password: "foo".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        let messages = error_messages(&fragment);
        assert_eq!(messages.len(), 1, "want 1 error, got {messages:?}");
        assert!(
            messages[0].contains("password is too weak"),
            "'{}' does not contain the text 'password is too weak'",
            messages[0]
        );
    }

    #[tokio::test]
    async fn create_user_reports_all_missing_fields() {
        let state = get_test_state();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm::default())
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        let messages = error_messages(&fragment);

        assert_eq!(messages.len(), 5, "want 5 errors, got {messages:?}");
        assert!(messages.contains(&"This field is required.".to_string()));
        assert!(messages.contains(&"You need to repeat your password".to_string()));
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let state = get_test_state();
        let server = get_test_server(state);

        let response = server
            .post(endpoints::USERS)
            .form(&RegisterForm {
                email: "not an email".to_string(),
                ..valid_form()
            })
            .await;

        response.assert_status_ok();
        let fragment = Html::parse_fragment(&response.text());
        assert_eq!(
            error_messages(&fragment),
            vec!["Enter a valid email address."]
        );
    }
}
