use aws_sdk_lambda::types::InvocationType;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};

use avatar_prompt_core::prompt::Prompt;
use avatar_prompt_lambda::adapters::dynamo::DynamoPromptStore;
use avatar_prompt_lambda::adapters::generate::AvatarGenerator;
use avatar_prompt_lambda::config::AppConfig;
use avatar_prompt_lambda::handlers::pick::pick_prompt;
use avatar_prompt_lambda::telemetry;

struct LambdaAvatarGenerator {
    lambda_client: aws_sdk_lambda::Client,
    function_name: String,
}

impl AvatarGenerator for LambdaAvatarGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<(), String> {
        let payload = json!({"id": prompt.id, "prompt": prompt.prompt})
            .to_string()
            .into_bytes();
        let client = self.lambda_client.clone();
        let function_name = self.function_name.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .invoke()
                    .function_name(function_name)
                    .invocation_type(InvocationType::Event)
                    .set_payload(Some(payload.into()))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to invoke generator lambda: {error}"))
            })
        })
    }
}

/// Scheduled entry point. A failed pick (including an empty candidate pool)
/// crashes the invocation so the trigger layer decides on redelivery.
async fn handle_request(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = AppConfig::from_env()?;
    let function_name = std::env::var("GENERATOR_FUNCTION_ARN")
        .map_err(|_| Error::from("GENERATOR_FUNCTION_ARN must be configured"))?;

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoPromptStore::connect(
        &sdk_config,
        config.table_name.clone(),
        config.dynamo_endpoint.as_deref(),
    );
    let generator = LambdaAvatarGenerator {
        lambda_client: aws_sdk_lambda::Client::new(&sdk_config),
        function_name,
    };

    let prompt = pick_prompt(&store, &generator, &mut rand::thread_rng())?;
    Ok(json!({"status": "ok", "id": prompt.id}))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();
    lambda_runtime::run(service_fn(handle_request)).await
}
