//! The generic request adapter: turns an API Gateway event into a typed
//! handler call and normalizes whatever comes back into a wire response.
//!
//! Stages, in order: parse event, establish the request span, bind the body
//! model, bind the query parameters, invoke the handler, normalize the
//! result, attach CORS headers. Every path ends in a wire envelope.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, info_span};

use avatar_prompt_core::prompt::ValidationError;

use crate::adapters::store::StorageError;
use crate::apigw::casing::{camelize_keys, underscore_keys};
use crate::apigw::event::{ApiRequest, AuthContext};
use crate::apigw::response::Response;

/// Adapter-level configuration, resolved once at the composition root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub cors_domain: String,
}

/// A body from the wire did not match the model's shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request body: {message}")]
pub struct BindError {
    message: String,
}

impl BindError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The query string did not match the handler's declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request parameters: {message}")]
pub struct ParameterShapeError {
    message: String,
}

/// Failures a handler can surface. All of them map to a 500 through the
/// generic path; the cause is logged, never leaked into the response body.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("failed to serialize response payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What a handler hands back to the adapter.
#[derive(Debug)]
pub enum ApiResult {
    /// Nothing to return; becomes a 404 with an empty body.
    None,
    /// A serialized record; becomes a 200 with top-level keys camelized.
    Record(Value),
    /// A fully built response, passed through unchanged.
    Response(Response),
}

impl ApiResult {
    pub fn record(value: &impl serde::Serialize) -> Result<Self, HandlerError> {
        Ok(Self::Record(serde_json::to_value(value)?))
    }
}

/// A typed model bound from the request body.
pub trait BindModel: Sized {
    fn model_name() -> &'static str;
    fn bind(body: Option<&str>) -> Result<Self, BindError>;
}

/// Marker for handlers that take no request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoModel;

impl BindModel for NoModel {
    fn model_name() -> &'static str {
        "request"
    }

    fn bind(_body: Option<&str>) -> Result<Self, BindError> {
        Ok(NoModel)
    }
}

/// Declared parameter set for handlers that accept no query parameters.
/// Any supplied parameter is a shape mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

/// Parses a JSON body, snake-cases its top-level keys, and deserializes the
/// model. Every failure mode is a shape mismatch.
pub fn bind_json<T: DeserializeOwned>(body: Option<&str>) -> Result<T, BindError> {
    let raw = body.ok_or_else(|| BindError::new("missing request body"))?;
    let value: Value =
        serde_json::from_str(raw).map_err(|error| BindError::new(error.to_string()))?;
    if !value.is_object() {
        return Err(BindError::new("request body must be a JSON object"));
    }

    serde_json::from_value(underscore_keys(value))
        .map_err(|error| BindError::new(error.to_string()))
}

fn bind_query<Q: DeserializeOwned>(
    query: &BTreeMap<String, String>,
) -> Result<Q, ParameterShapeError> {
    let value = serde_json::to_value(query).map_err(|error| ParameterShapeError {
        message: error.to_string(),
    })?;
    serde_json::from_value(value).map_err(|error| ParameterShapeError {
        message: error.to_string(),
    })
}

/// Runs one API invocation end to end and returns the wire envelope.
pub fn handle_api_event<M, Q, F>(
    config: &ApiConfig,
    request_id: &str,
    event: &Value,
    handler: F,
) -> Value
where
    M: BindModel,
    Q: DeserializeOwned,
    F: FnOnce(M, Q, Option<&AuthContext>) -> Result<ApiResult, HandlerError>,
{
    let request = ApiRequest::from_event(event);
    let span = info_span!(
        "api_request",
        request_id,
        method = %request.method,
        resource = %request.resource,
    );
    let _entered = span.enter();

    if let Some(auth) = &request.auth {
        info!(principal = %auth.principal_id, "authenticated request");
    }

    let model = match M::bind(request.body.as_deref()) {
        Ok(model) => model,
        Err(bind_error) => {
            error!(
                model = M::model_name(),
                body = request.body.as_deref().unwrap_or_default(),
                %bind_error,
                "invalid model",
            );
            let message = format!("Invalid {}", M::model_name());
            return finalize(config, Response::message(400, message));
        }
    };

    let params: Q = match bind_query(&request.query) {
        Ok(params) => params,
        Err(parameter_error) => {
            error!(query = ?request.query, %parameter_error, "invalid request parameters");
            return finalize(config, Response::message(400, "Invalid request parameters"));
        }
    };

    let response = match handler(model, params, request.auth.as_ref()) {
        Ok(ApiResult::None) => Response::new(404),
        Ok(ApiResult::Record(value)) => {
            Response::with_body(200, camelize_keys(value).to_string())
        }
        Ok(ApiResult::Response(response)) => response,
        Err(handler_error) => {
            error!(%handler_error, "unexpected error");
            Response::message(500, "Internal Server Error")
        }
    };

    finalize(config, response)
}

/// Attaches CORS headers, emits the outcome log line, and serializes the
/// wire envelope. Applied to every response, success or failure.
pub fn finalize(config: &ApiConfig, response: Response) -> Value {
    let response = response
        .header("Access-Control-Allow-Origin", config.cors_domain.clone())
        .header("Access-Control-Allow-Headers", "Authorization");

    if response.is_success() {
        info!(status = response.status_code, "success");
    } else {
        info!(status = response.status_code, "failure");
    }

    response.to_wire().into_value()
}
