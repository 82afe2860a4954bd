use axum::extract::FromRequest;

use crate::problem::ProblemResponse;

/// `Json` extractor whose rejections are all answered with a 400 problem body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ProblemResponse))]
pub struct JsonBody<T>(pub T);
