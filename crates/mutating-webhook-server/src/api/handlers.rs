use std::sync::Arc;

use axum::{
    body::Bytes,
    extract,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use pod_mutator::handler::AdmissionHandler;
use tracing::error;

use crate::api::{
    api_error::ApiError,
    gateway::{Gateway, GatewayError},
};

#[tracing::instrument(
    name = "pod_mutation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        name=tracing::field::Empty,
        namespace=tracing::field::Empty,
        operation=tracing::field::Empty,
        kind_group=tracing::field::Empty,
        kind_version=tracing::field::Empty,
        kind=tracing::field::Empty,
        allowed=tracing::field::Empty,
        mutated=tracing::field::Empty,
        response_code=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
/// Mutate the Pod carried by an AdmissionReview.
pub(crate) async fn pod_mutating_handler<H: AdmissionHandler>(
    extract::State(gateway): extract::State<Arc<Gateway<H>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, (StatusCode, ApiError)> {
    let payload = match check_content_type(&headers) {
        Ok(()) => gateway.serve(&body).await,
        Err(e) => gateway.reject(&e),
    }
    .map_err(handle_gateway_error)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())],
        payload,
    )
        .into_response())
}

pub(crate) async fn readiness_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub(crate) async fn liveness_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

fn check_content_type(headers: &HeaderMap) -> Result<(), GatewayError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match content_type.parse::<mime::Mime>() {
        Ok(mime) if mime.essence_str() == mime::APPLICATION_JSON.essence_str() => Ok(()),
        _ => Err(GatewayError::UnsupportedContentType(content_type.to_owned())),
    }
}

fn handle_gateway_error(error: GatewayError) -> (StatusCode, ApiError) {
    error!("{}", error);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Something went wrong".to_owned(),
        },
    )
}
