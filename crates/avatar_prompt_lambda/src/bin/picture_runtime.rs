use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

use avatar_prompt_lambda::adapters::dynamo::DynamoPromptStore;
use avatar_prompt_lambda::config::AppConfig;
use avatar_prompt_lambda::handlers::picture::{decode_queue_records, update_picture};
use avatar_prompt_lambda::telemetry;

/// Queue entry point for generated pictures. Any failure crashes the
/// invocation so the queue redelivers the batch.
async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = AppConfig::from_env()?;
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoPromptStore::connect(
        &sdk_config,
        config.table_name.clone(),
        config.dynamo_endpoint.as_deref(),
    );

    let ids = decode_queue_records(&event.payload)?;
    for id in &ids {
        update_picture(&store, id)?;
    }

    Ok(json!({"status": "ok", "updated": ids.len()}))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
