use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

use avatar_prompt_core::prompt::PromptDraft;
use avatar_prompt_lambda::adapters::dynamo::DynamoPromptStore;
use avatar_prompt_lambda::apigw::{
    finalize, handle_api_event, ApiConfig, NoModel, NoParams, Response,
};
use avatar_prompt_lambda::config::AppConfig;
use avatar_prompt_lambda::handlers::api::{
    get_prompt, latest_prompts, save_prompt, GetPromptParams,
};
use avatar_prompt_lambda::telemetry;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoPromptStore::connect(
        &sdk_config,
        config.table_name.clone(),
        config.dynamo_endpoint.as_deref(),
    );
    let api = ApiConfig {
        cors_domain: config.cors_domain.clone(),
    };

    let request_id = event.context.request_id.clone();
    let payload = event.payload;
    let method = payload.get("httpMethod").and_then(Value::as_str).unwrap_or_default();
    let resource = payload.get("resource").and_then(Value::as_str).unwrap_or_default();

    let wire = match (method, resource) {
        ("POST", "/prompt") => handle_api_event::<PromptDraft, NoParams, _>(
            &api,
            &request_id,
            &payload,
            |draft, _, auth| save_prompt(&store, &config.alias, draft, auth),
        ),
        ("GET", "/prompt") => handle_api_event::<NoModel, GetPromptParams, _>(
            &api,
            &request_id,
            &payload,
            |_, params, _| get_prompt(&store, params),
        ),
        ("GET", "/prompt/latest") => handle_api_event::<NoModel, NoParams, _>(
            &api,
            &request_id,
            &payload,
            |_, _, _| latest_prompts(&store),
        ),
        _ => finalize(&api, Response::message(404, "Not Found")),
    };

    Ok(wire)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
