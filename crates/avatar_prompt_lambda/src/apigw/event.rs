use std::collections::BTreeMap;

use serde_json::Value;

/// Sentinel principal id meaning "no real identity".
const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// The authenticated identity extracted from the event's authorizer context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: String,
    pub claims: BTreeMap<String, Value>,
}

/// An inbound API Gateway proxy event, parsed tolerantly: absent pieces
/// become empty defaults rather than errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub resource: String,
    pub query: BTreeMap<String, String>,
    pub auth: Option<AuthContext>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn from_event(event: &Value) -> Self {
        Self {
            method: string_field(event, "httpMethod"),
            resource: string_field(event, "resource"),
            query: query_parameters(event),
            auth: auth_context(event),
            body: event
                .get("body")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

fn string_field(event: &Value, name: &str) -> String {
    event
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn query_parameters(event: &Value) -> BTreeMap<String, String> {
    event
        .get("queryStringParameters")
        .and_then(Value::as_object)
        .map(|parameters| {
            parameters
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .as_str()
                        .map(|value| (name.clone(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn auth_context(event: &Value) -> Option<AuthContext> {
    let authorizer = event
        .get("requestContext")
        .and_then(|context| context.get("authorizer"))
        .and_then(Value::as_object)?;

    let principal_id = authorizer.get("principalId").and_then(Value::as_str)?;
    if principal_id == ANONYMOUS_PRINCIPAL {
        return None;
    }

    let claims = authorizer
        .iter()
        .filter(|(name, _)| name.as_str() != "principalId")
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    Some(AuthContext {
        principal_id: principal_id.to_string(),
        claims,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_method_resource_and_body() {
        let request = ApiRequest::from_event(&json!({
            "httpMethod": "POST",
            "resource": "/prompt",
            "body": "{\"prompt\": \"x\"}",
        }));

        assert_eq!(request.method, "POST");
        assert_eq!(request.resource, "/prompt");
        assert_eq!(request.body.as_deref(), Some("{\"prompt\": \"x\"}"));
    }

    #[test]
    fn missing_query_parameters_become_empty() {
        let request = ApiRequest::from_event(&json!({"httpMethod": "GET"}));
        assert!(request.query.is_empty());

        let request = ApiRequest::from_event(&json!({
            "httpMethod": "GET",
            "queryStringParameters": null,
        }));
        assert!(request.query.is_empty());
    }

    #[test]
    fn collects_string_query_parameters() {
        let request = ApiRequest::from_event(&json!({
            "queryStringParameters": {"id": "prompt-1", "limit": "5"},
        }));

        assert_eq!(request.query.get("id").map(String::as_str), Some("prompt-1"));
        assert_eq!(request.query.get("limit").map(String::as_str), Some("5"));
    }

    #[test]
    fn extracts_authenticated_principal() {
        let request = ApiRequest::from_event(&json!({
            "requestContext": {
                "authorizer": {"principalId": "some-principal", "scope": "admin"},
            },
        }));

        let auth = request.auth.expect("authorizer should be extracted");
        assert_eq!(auth.principal_id, "some-principal");
        assert_eq!(auth.claims.get("scope"), Some(&json!("admin")));
    }

    #[test]
    fn anonymous_principal_yields_no_auth_context() {
        let request = ApiRequest::from_event(&json!({
            "requestContext": {"authorizer": {"principalId": "anonymous"}},
        }));

        assert_eq!(request.auth, None);
    }

    #[test]
    fn missing_authorizer_yields_no_auth_context() {
        let request = ApiRequest::from_event(&json!({"requestContext": {}}));
        assert_eq!(request.auth, None);
    }
}
