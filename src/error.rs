use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("invalid document: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("malformed item id: {0}")]
    BadItemId(#[from] mongodb::bson::oid::Error),

    #[error("not signed in")]
    Unauthenticated,

    #[error("no list named {0}")]
    ListNotFound(String),

    #[error("store returned no document after upsert")]
    UpsertMissing,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // The auth gate: any unauthenticated access to a list route
            // lands on the sign-in page, never a mutation.
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::ListNotFound(name) => {
                log::warn!("no list named {name}");
                error_page(StatusCode::NOT_FOUND, &format!("No list named {name}."))
            }
            AppError::BadItemId(err) => {
                log::warn!("malformed item id: {err}");
                error_page(StatusCode::BAD_REQUEST, "That item id is not valid.")
            }
            other => {
                log::error!("request failed: {other}");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.",
                )
            }
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!(
        "<!DOCTYPE html><html><head><title>Error</title>\
         <link rel=\"stylesheet\" href=\"/static/styles.css\"></head>\
         <body><div class=\"box\"><h1>{}</h1><p>{}</p>\
         <p><a href=\"/\">Back to home</a></p></div></body></html>",
        status.as_u16(),
        message
    );
    (status, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn unauthenticated_redirects_to_login() {
        let response = AppError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }

    #[test]
    fn missing_list_is_not_found() {
        let response = AppError::ListNotFound("Groceries".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
