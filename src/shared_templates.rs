/*! Helpers shared between views. */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::Render;

#[inline]
pub fn render(status_code: StatusCode, template: impl Render) -> Response {
    (status_code, template.render()).into_response()
}
