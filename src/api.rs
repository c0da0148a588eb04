use crate::identity::Author;
use crate::resource::{ResourceKind, ResourceRef, Snapshot};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::time::Duration;

/// the remote side of an edit session
pub trait Backend {
    /// fetch the current server state of a resource
    fn fetch(&self, resource: &ResourceRef) -> Result<Snapshot>;

    /// replace the resource's data with `data` in a single mutation
    fn update(
        &self,
        resource: &ResourceRef,
        data: &BTreeMap<String, String>,
        author: &Author,
    ) -> Result<()>;
}

/// GraphQL documents and field names for one resource kind
struct Operations {
    query: &'static str,
    mutation: &'static str,
    query_field: &'static str,
    mutation_field: &'static str,
    data_argument: &'static str,
}

fn operations(kind: ResourceKind) -> Operations {
    match kind {
        ResourceKind::Secret => Operations {
            query: r"query Secret($name: String!, $namespace: String!) {
  secret(name: $name, namespace: $namespace) { name namespace stringData }
}",
            mutation: r"mutation UpdateSecret($name: String!, $namespace: String!, $stringData: Map!, $author: AuthorInput) {
  updateSecret(name: $name, namespace: $namespace, stringData: $stringData, author: $author) { name }
}",
            query_field: "secret",
            mutation_field: "updateSecret",
            data_argument: "stringData",
        },
        ResourceKind::Config => Operations {
            query: r"query Config($name: String!, $namespace: String!) {
  config(name: $name, namespace: $namespace) { name namespace data }
}",
            mutation: r"mutation UpdateConfig($name: String!, $namespace: String!, $data: Map!, $author: AuthorInput) {
  updateConfig(name: $name, namespace: $namespace, data: $data, author: $author) { name }
}",
            query_field: "config",
            mutation_field: "updateConfig",
            data_argument: "data",
        },
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RemoteResource {
    #[serde(alias = "stringData")]
    data: Option<BTreeMap<String, String>>,
}

/// decode a GraphQL http response into its `data` member
fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let parsed = serde_json::from_str::<GraphqlResponse<T>>(body);

    // error responses may still carry a GraphQL error list
    if let Ok(response) = &parsed
        && !response.errors.is_empty()
    {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        bail!("server rejected request: {}", messages.join("; "));
    }
    if !(200..300).contains(&status) {
        bail!("server returned status {status}: {}", body.trim());
    }

    parsed
        .context("invalid GraphQL response")?
        .data
        .ok_or_else(|| anyhow!("GraphQL response contains no data"))
}

/// pull the resource out of a query's `data` member
fn snapshot_from_data(resource: &ResourceRef, mut data: BTreeMap<String, Value>) -> Result<Snapshot> {
    let field = operations(resource.kind).query_field;
    let remote = match data.remove(field) {
        Some(Value::Null) | None => bail!("{resource} not found"),
        Some(value) => serde_json::from_value::<RemoteResource>(value)
            .with_context(|| format!("unexpected shape for {field}"))?,
    };
    Ok(Snapshot::new(
        resource.clone(),
        remote.data.unwrap_or_default(),
    ))
}

fn update_variables(
    resource: &ResourceRef,
    data: &BTreeMap<String, String>,
    author: &Author,
) -> Value {
    let ops = operations(resource.kind);
    let mut variables = json!({
        "name": resource.name,
        "namespace": resource.namespace,
        "author": author,
    });
    variables[ops.data_argument] = json!(data);
    variables
}

/// backend talking to the platform's GraphQL endpoint over http
pub struct GraphqlBackend {
    agent: ureq::Agent,
    endpoint: String,
    token: Option<String>,
    show_request: bool,
    show_response: bool,
}

impl GraphqlBackend {
    pub fn new(endpoint: &str, token: Option<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            endpoint: endpoint.to_string(),
            token,
            show_request: false,
            show_response: false,
        }
    }

    /// print request and/or response bodies as they go over the wire
    pub fn with_debug(mut self, show_request: bool, show_response: bool) -> Self {
        self.show_request = show_request;
        self.show_response = show_response;
        self
    }

    fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let body = json!({ "query": query, "variables": variables });
        if self.show_request {
            print_debug("request", &body);
        }

        let mut request = self.agent.post(self.endpoint.as_str());
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let mut response = request
            .send_json(&body)
            .with_context(|| format!("failed to reach {}", self.endpoint))?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .context("failed to read response body")?;
        if self.show_response {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => print_debug("response", &value),
                Err(_) => print_debug("response", &Value::String(text.clone())),
            }
        }

        decode_response(status, &text)
    }
}

impl Backend for GraphqlBackend {
    fn fetch(&self, resource: &ResourceRef) -> Result<Snapshot> {
        let ops = operations(resource.kind);
        let variables = json!({ "name": resource.name, "namespace": resource.namespace });
        let data: BTreeMap<String, Value> = self.execute(ops.query, variables)?;
        snapshot_from_data(resource, data)
    }

    fn update(
        &self,
        resource: &ResourceRef,
        data: &BTreeMap<String, String>,
        author: &Author,
    ) -> Result<()> {
        let ops = operations(resource.kind);
        let variables = update_variables(resource, data, author);
        let result: BTreeMap<String, Value> = self.execute(ops.mutation, variables)?;
        match result.get(ops.mutation_field) {
            Some(Value::Null) | None => bail!("{} returned nothing", ops.mutation_field),
            Some(_) => Ok(()),
        }
    }
}

fn print_debug(label: &str, value: &Value) {
    use colored::Colorize;
    use std::io::Write;
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    let _ = writeln!(std::io::stdout(), "\n{}", format!("{label}:\n{pretty}").dimmed());
}

#[cfg(test)]
pub mod memory;

#[cfg(test)]
mod tests;
