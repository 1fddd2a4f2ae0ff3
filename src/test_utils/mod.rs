//! Assertion helpers and fixtures shared between test modules.

use axum::{body::Body, http::Response, http::header::CONTENT_TYPE};
use rusqlite::Connection;
use scraper::{ElementRef, Html, Selector};

use crate::{
    PasswordHash,
    account::AccountId,
    user::{NewUser, User, UserId, create_user},
};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let text = response_text(response).await;

    Html::parse_document(&text)
}

async fn response_text(response: Response<Body>) -> String {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    String::from_utf8_lossy(&body).to_string()
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, want: &str) {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .expect("response has no content-type header")
        .to_str()
        .expect("content-type header is not valid ASCII");

    assert!(
        content_type.starts_with(want),
        "want content type {want}, got {content_type}"
    );
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let hx_post = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        hx_post, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {hx_post:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Insert a user suitable for tests directly into the database.
///
/// The password hash is a stub, tests that verify passwords should create
/// their own user.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, username: &str, email: &str) -> User {
    create_user(
        NewUser {
            first_name: "Tester".to_owned(),
            last_name: "Last".to_owned(),
            username: username.to_owned(),
            email: email.parse().expect("invalid test email"),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .expect("Could not insert test user")
}

/// Insert an account for `user_id` directly into the database and return its ID.
#[track_caller]
pub(crate) fn insert_test_account(
    connection: &Connection,
    user_id: UserId,
    name: &str,
    balance: &str,
) -> AccountId {
    connection
        .execute(
            "INSERT INTO account (user_id, name, balance) VALUES (?1, ?2, ?3)",
            (user_id.as_i64(), name, balance),
        )
        .expect("Could not insert test account");

    connection.last_insert_rowid()
}
