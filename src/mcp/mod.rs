use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    schemars::JsonSchema,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::CardListParams;
use crate::CardService;

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    cards: CardService,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCardsRequest {
    #[schemars(description = "Maximum number of cards to return (default 100)")]
    pub limit: Option<i64>,
    #[schemars(description = "Number of cards to skip")]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCardRequest {
    #[schemars(description = "The card ID")]
    pub card_id: i64,
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn internal(err: crate::Error) -> McpError {
    McpError::internal_error(err.to_string(), None)
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            cards: CardService::new(db.clone()),
            db,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "List cards, newest first, with their root route settings and menu items")]
    async fn list_cards(
        &self,
        params: Parameters<ListCardsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let defaults = CardListParams::default();
        let cards = self
            .cards
            .get_all(CardListParams {
                limit: req.limit.unwrap_or(defaults.limit),
                offset: req.offset.unwrap_or(defaults.offset),
            })
            .map_err(internal)?;

        to_json(&cards)
    }

    #[tool(description = "Get a single card with its menu items")]
    async fn get_card(
        &self,
        params: Parameters<GetCardRequest>,
    ) -> Result<CallToolResult, McpError> {
        let card_id = params.0.card_id;
        let card = self
            .cards
            .get_by_id(card_id)
            .map_err(internal)?
            .ok_or_else(|| McpError::invalid_params(format!("Card {card_id} not found"), None))?;

        to_json(&card)
    }

    #[tool(description = "Get the full navigation route tree, siblings in menu order")]
    async fn get_route_tree(&self) -> Result<CallToolResult, McpError> {
        let tree = self.db.get_routes_nested().map_err(internal)?;
        to_json(&tree)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "RouteDeck MCP server: read cards and the navigation route tree".into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
