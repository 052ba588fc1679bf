//! DynamoDB-backed prompt store.
//!
//! The table is keyed by `id` with two secondary indexes: `created_at-index`
//! over every item and `used_at-index`, which is sparse because `used_at` is
//! written only once a prompt has been used. "Find unused" scans the dense
//! index and filters on attribute absence; "find recently used" scans the
//! sparse index directly.

use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Datelike, Local, LocalResult, TimeZone};

use avatar_prompt_core::prompt::Prompt;

use crate::adapters::store::{PromptStore, StorageError};

const CREATED_AT_INDEX: &str = "created_at-index";
const USED_AT_INDEX: &str = "used_at-index";

type Item = HashMap<String, AttributeValue>;

pub struct DynamoPromptStore {
    client: Client,
    table_name: String,
}

impl DynamoPromptStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Builds a store from the shared SDK config, optionally pointed at a
    /// local DynamoDB endpoint. Other service clients are unaffected.
    pub fn connect(
        sdk_config: &aws_config::SdkConfig,
        table_name: impl Into<String>,
        endpoint_url: Option<&str>,
    ) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }
        Self::new(Client::from_conf(builder.build()), table_name)
    }

    fn scan_index(
        &self,
        index_name: &str,
        filter: &str,
        value: Option<(&str, AttributeValue)>,
    ) -> Result<Vec<Item>, StorageError> {
        block_on_aws(async {
            let mut items = Vec::new();
            let mut exclusive_start_key: Option<Item> = None;

            loop {
                let mut request = self
                    .client
                    .scan()
                    .table_name(&self.table_name)
                    .index_name(index_name)
                    .filter_expression(filter)
                    .set_exclusive_start_key(exclusive_start_key.take());
                if let Some((name, value)) = &value {
                    request = request.expression_attribute_values(*name, value.clone());
                }

                let output = request.send().await.map_err(|error| {
                    StorageError::new(format!("failed to scan {index_name}: {error}"))
                })?;

                items.extend(output.items.unwrap_or_default());
                exclusive_start_key = output.last_evaluated_key;
                if exclusive_start_key.is_none() {
                    return Ok(items);
                }
            }
        })
    }
}

impl PromptStore for DynamoPromptStore {
    fn save(&self, prompt: &Prompt) -> Result<(), StorageError> {
        let (expression, values) = update_expression_parts(prompt);

        let mut request = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(prompt.id.clone()))
            .update_expression(expression);
        for (name, value) in values {
            request = request.expression_attribute_values(name, value);
        }

        block_on_aws(request.send())
            .map(|_| ())
            .map_err(|error| {
                StorageError::new(format!("failed to save prompt {}: {error}", prompt.id))
            })
    }

    fn from_id(&self, id: &str) -> Result<Option<Prompt>, StorageError> {
        let output = block_on_aws(
            self.client
                .get_item()
                .table_name(&self.table_name)
                .key("id", AttributeValue::S(id.to_string()))
                .send(),
        )
        .map_err(|error| StorageError::new(format!("failed to read prompt {id}: {error}")))?;

        output.item.as_ref().map(prompt_from_item).transpose()
    }

    fn unused_ids(&self) -> Result<Vec<String>, StorageError> {
        let items = self.scan_index(CREATED_AT_INDEX, "attribute_not_exists(used_at)", None)?;
        sorted_unused_ids(&items)
    }

    fn latest(&self) -> Result<Vec<Prompt>, StorageError> {
        let cutoff = month_start_timestamp(Local::now());
        let items = self.scan_index(
            USED_AT_INDEX,
            "used_at >= :cutoff",
            Some((":cutoff", AttributeValue::N(cutoff.to_string()))),
        )?;
        latest_from_items(&items, cutoff)
    }
}

fn block_on_aws<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds the upsert expression. Every field except `id` is written;
/// `used_at` is omitted entirely while unset so the used-at index stays
/// sparse.
fn update_expression_parts(prompt: &Prompt) -> (String, Vec<(&'static str, AttributeValue)>) {
    let mut clauses = vec!["prompt = :prompt", "created_at = :created_at"];
    let mut values = vec![
        (":prompt", AttributeValue::S(prompt.prompt.clone())),
        (
            ":created_at",
            AttributeValue::N(prompt.created_at.to_string()),
        ),
    ];

    if let Some(used_at) = prompt.used_at {
        clauses.push("used_at = :used_at");
        values.push((":used_at", AttributeValue::N(used_at.to_string())));
    }

    (format!("SET {}", clauses.join(", ")), values)
}

fn prompt_from_item(item: &Item) -> Result<Prompt, StorageError> {
    Ok(Prompt {
        id: string_attribute(item, "id")?,
        prompt: string_attribute(item, "prompt")?,
        created_at: number_attribute(item, "created_at")?,
        used_at: match item.get("used_at") {
            Some(_) => Some(number_attribute(item, "used_at")?),
            None => None,
        },
    })
}

fn string_attribute(item: &Item, name: &str) -> Result<String, StorageError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| StorageError::new(format!("stored prompt is missing attribute {name}")))
}

fn number_attribute(item: &Item, name: &str) -> Result<i64, StorageError> {
    item.get(name)
        .and_then(|value| value.as_n().ok())
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| {
            StorageError::new(format!("stored prompt has a malformed attribute {name}"))
        })
}

/// Filters a dense-index scan down to unused prompts and orders their ids
/// most recent first.
fn sorted_unused_ids(items: &[Item]) -> Result<Vec<String>, StorageError> {
    let mut entries = Vec::new();
    for item in items {
        if item.contains_key("used_at") {
            continue;
        }
        entries.push((number_attribute(item, "created_at")?, string_attribute(item, "id")?));
    }

    entries.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(entries.into_iter().map(|(_, id)| id).collect())
}

/// Keeps prompts used at or after the cutoff, ordered by `used_at`
/// descending.
fn latest_from_items(items: &[Item], cutoff: i64) -> Result<Vec<Prompt>, StorageError> {
    let mut prompts = Vec::new();
    for item in items {
        let prompt = prompt_from_item(item)?;
        if prompt.used_at.is_some_and(|used_at| used_at >= cutoff) {
            prompts.push(prompt);
        }
    }

    prompts.sort_by(|a, b| b.used_at.cmp(&a.used_at));
    Ok(prompts)
}

/// Epoch seconds of the first moment of `now`'s calendar month.
pub fn month_start_timestamp<Tz: TimeZone>(now: DateTime<Tz>) -> i64 {
    let first = now
        .date_naive()
        .with_day(1)
        .expect("every month has a first day")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time");

    match now.timezone().from_local_datetime(&first) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => start.timestamp(),
        LocalResult::None => first.and_utc().timestamp(),
    }
}
