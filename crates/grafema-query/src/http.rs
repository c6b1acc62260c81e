//! Minimal HTTP exposure of the Query Surface (§4.8): an axum `Router`
//! over a shared state, JSON responses, a permissive CORS layer. No
//! GraphQL schema, no MCP handshake, no browser GUI — those are named
//! external collaborators (§1) that consume this same surface from
//! outside the workspace.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use grafema_core::{Connection, EdgeType, GraphNode, NodeFilter, NodeId, Stats};

use crate::backend::Backend;

pub struct AppState {
    pub backend: Arc<dyn Backend>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/graph/stats", get(get_stats))
        .route("/api/graph/nodes", get(list_nodes))
        .route("/api/graph/bfs", post(bfs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<Stats>, StatusCode> {
    state.backend.get_stats().await.map(Json).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Debug, Deserialize)]
struct NodesQuery {
    #[serde(rename = "nodeType")]
    node_type: Option<String>,
    file: Option<String>,
    first: Option<usize>,
    after: Option<String>,
}

/// `GET /api/graph/nodes` — `queryNodes`/`getAllNodes` filtered, then
/// Relay-paginated exactly as `paginate(items, first, after, idOf)`
/// (§4.8, §8 Pagination law).
async fn list_nodes(State(state): State<Arc<AppState>>, Query(params): Query<NodesQuery>) -> Result<Json<Connection<GraphNode>>, StatusCode> {
    let filter = NodeFilter { node_type: params.node_type.map(grafema_core::NodeType), file: params.file, ..Default::default() };
    let nodes = state.backend.get_all_nodes(filter).await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let page = grafema_core::paginate(&nodes, params.first, params.after.as_deref(), |n| n.id.0.clone());
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
struct BfsRequest {
    #[serde(rename = "startIds")]
    start_ids: Vec<String>,
    #[serde(rename = "maxDepth", default = "default_max_depth")]
    max_depth: usize,
    #[serde(rename = "edgeTypes", default)]
    edge_types: Vec<String>,
}

fn default_max_depth() -> usize {
    5
}

/// `POST /api/graph/bfs` — `bfs(startIds, maxDepth, edgeTypes[])`
/// (§4.8).
async fn bfs(State(state): State<Arc<AppState>>, Json(request): Json<BfsRequest>) -> Result<Json<Vec<NodeId>>, StatusCode> {
    let start_ids = request.start_ids.into_iter().map(NodeId).collect();
    let edge_types = request.edge_types.into_iter().map(EdgeType).collect();
    state
        .backend
        .bfs(start_ids, request.max_depth, edge_types)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InProcessBackend;
    use axum::body::Body;
    use axum::http::Request;
    use grafema_core::{Graph, NodeType};
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    fn state_with_one_node() -> Arc<AppState> {
        let graph = Graph::new();
        let mut graph = graph;
        graph.add_node(GraphNode::new(NodeId::new("MODULE|a.ts"), NodeType::module(), "a.ts", "a.ts"));
        let backend = InProcessBackend::new(Arc::new(RwLock::new(graph)));
        Arc::new(AppState { backend: Arc::new(backend) })
    }

    #[tokio::test]
    async fn health_check_returns_ok() {
        let router = create_router(state_with_one_node());
        let response = router.oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stats_reflect_the_backing_graph() {
        let router = create_router(state_with_one_node());
        let response = router.oneshot(Request::builder().uri("/api/graph/stats").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stats: Stats = serde_json::from_slice(&body).unwrap();
        assert_eq!(stats.node_count, 1);
    }

    #[tokio::test]
    async fn nodes_endpoint_paginates() {
        let router = create_router(state_with_one_node());
        let response = router.oneshot(Request::builder().uri("/api/graph/nodes").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page: Connection<GraphNode> = serde_json::from_slice(&body).unwrap();
        assert_eq!(page.total_count, 1);
    }
}
