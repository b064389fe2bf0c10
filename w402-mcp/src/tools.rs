//! MCP tools backed by the paid resource server.

use std::fmt;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;
use url::Url;
use w402_http::PaymentExecutor;

use crate::envelope::{RequestEnvelope, ResultEnvelope, Source, render};

const GET_WEATHER: &str = "get-weather";
const GET_DATA: &str = "get-data-from-resource-server";

const INSTRUCTIONS: &str = "Fetches data from a paid resource server. Payments requested by the \
server are made automatically with the configured wallet. Every tool returns a JSON envelope \
with `ok`, `upstream.status` and `upstream.data`.";

/// Arguments of `get-weather`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WeatherArgs {
    /// City to get the weather for.
    #[schemars(length(min = 1))]
    pub city: String,
    /// Optional date, passed to the resource server as given.
    #[serde(default)]
    pub date: Option<String>,
}

/// The MCP server exposing the paid endpoint as tools.
#[derive(Clone)]
pub struct WeatherTools {
    executor: PaymentExecutor,
    endpoint: Url,
    source: Source,
    tool_router: ToolRouter<Self>,
}

impl fmt::Debug for WeatherTools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherTools")
            .field("endpoint", &self.endpoint.as_str())
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[tool_router]
impl WeatherTools {
    /// Creates the server for `endpoint`, described by `source` in envelopes.
    #[must_use]
    pub fn new(executor: PaymentExecutor, endpoint: Url, source: Source) -> Self {
        Self {
            executor,
            endpoint,
            source,
            tool_router: Self::tool_router(),
        }
    }

    /// Returns the URL every tool fetches.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[tool(
        name = "get-weather",
        description = "Get the weather for a city, optionally for a given date, from the paid resource server."
    )]
    async fn get_weather(
        &self,
        Parameters(args): Parameters<WeatherArgs>,
    ) -> Result<CallToolResult, McpError> {
        let city = args.city.trim();
        if city.is_empty() {
            return Err(McpError::invalid_params("`city` must not be empty", None));
        }
        let date = args.date.as_deref().map(str::trim).filter(|d| !d.is_empty());

        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("city", city);
            if let Some(date) = date {
                query.append_pair("date", date);
            }
        }

        let request = RequestEnvelope::new(GET_WEATHER)
            .param("city", Some(city))
            .param("date", date);
        Ok(self.fetch(url, request).await)
    }

    #[tool(
        name = "get-data-from-resource-server",
        description = "Get data from the paid resource server endpoint."
    )]
    async fn get_data_from_resource_server(&self) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(self.endpoint.clone(), RequestEnvelope::new(GET_DATA))
            .await)
    }
}

impl WeatherTools {
    /// Executes one request and wraps the outcome into a text result.
    async fn fetch(&self, url: Url, request: RequestEnvelope) -> CallToolResult {
        let tool = request.tool;
        let outcome = self.executor.get(url).await;
        let envelope = ResultEnvelope::from_outcome(self.source.clone(), request, outcome);
        info!(
            tool,
            ok = envelope.ok,
            status = ?envelope.upstream.status,
            "Tool call finished"
        );
        CallToolResult::success(vec![Content::text(render(&envelope))])
    }
}

#[tool_handler]
impl ServerHandler for WeatherTools {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
