use lambda_http::http::StatusCode;
use lambda_http::{Error, Response};
use serde::Serialize;

/// JSON response with the conditional CORS grant. Every response on the
/// checkout path, success or error, goes through here so the grant is
/// never dropped on an error branch.
pub fn json_response(
    status: &StatusCode,
    body: &impl Serialize,
    cors_origin: Option<&str>,
) -> Result<Response<String>, Error> {
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "application/json");
    if let Some(origin) = cors_origin {
        builder = builder.header("access-control-allow-origin", origin);
    }
    let response = builder.body(serde_json::to_string(body)?).map_err(Box::new)?;

    Ok(response)
}

/// Empty preflight reply. The grant headers are all-or-nothing: an origin
/// outside the allow-list gets none of them, which denies the
/// cross-origin read.
pub fn preflight_response(cors_origin: Option<&str>) -> Result<Response<String>, Error> {
    let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
    if let Some(origin) = cors_origin {
        builder = builder
            .header("access-control-allow-origin", origin)
            .header("access-control-allow-methods", "POST, OPTIONS")
            .header("access-control-allow-headers", "content-type");
    }
    let response = builder.body(String::new()).map_err(Box::new)?;

    Ok(response)
}
