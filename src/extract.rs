//! Request extractors that reject bad input with the app's JSON error body.
//!
//! The stock axum extractors reply with plain text rejections. These wrappers
//! turn the rejections into [Error::Validation] so that every non-2xx
//! response has the shape `{"error": "..."}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters, e.g. the ID in `/api/transactions/{transaction_id}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);
