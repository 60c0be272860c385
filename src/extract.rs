//! `Json` and `Query` extractors whose rejections go through `AppError`, so a
//! malformed body or query string still answers 400 with a `{"detail"}` body.

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(rejected_json(rejection)),
        }
    }
}

pub struct AppQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(rejected_query(rejection)),
        }
    }
}

fn rejected_json(rejection: JsonRejection) -> AppError {
    let reason = rejection.body_text();
    warn!(%reason, "rejected request body");
    AppError::BadRequest(reason)
}

fn rejected_query(rejection: QueryRejection) -> AppError {
    let reason = rejection.body_text();
    warn!(%reason, "rejected query string");
    AppError::BadRequest(reason)
}
