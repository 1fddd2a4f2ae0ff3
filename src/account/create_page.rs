//! Defines the route handler for the page for creating an account.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// Renders the page for creating an account.
pub async fn get_create_account_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "New Account" }

            form
                hx-post=(endpoints::ACCOUNTS_API)
                class="space-y-4 md:space-y-6 w-full"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Account name" }

                    input
                        type="text"
                        name="name"
                        id="name"
                        placeholder="Enter account name"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                    input
                        type="number"
                        name="balance"
                        id="balance"
                        step="0.01"
                        placeholder="Enter account balance"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Create"
                }
            }
        }
    );

    base("New Account", &content).into_response()
}
