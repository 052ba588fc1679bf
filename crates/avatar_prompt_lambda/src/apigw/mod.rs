//! API Gateway request handling: event parsing, typed binding, response
//! normalization, and the staged adapter that ties them together.

pub mod adapter;
pub mod casing;
pub mod event;
pub mod response;

pub use adapter::{
    bind_json, finalize, handle_api_event, ApiConfig, ApiResult, BindError, BindModel,
    HandlerError, NoModel, NoParams, ParameterShapeError,
};
pub use event::{ApiRequest, AuthContext};
pub use response::{Response, WireResponse};
