//! ENRICHMENT plugins: rewire/augment already-committed node attributes
//! and edges (§4.5). Grounded on §4.6 Resolution Heuristics:
//! "`EXTERNAL_FUNCTION` records `isBuiltin=true` and a security
//! category if known."

use crate::metadata::{Phase, PluginMetadata};
use crate::plugin::{Plugin, PluginContext, PluginOutcome};
use async_trait::async_trait;
use grafema_core::NodeType;
use std::collections::HashMap;

/// Not an exhaustive taint-analysis ruleset — just the handful of
/// well-known dangerous globals that justify flagging a security
/// category at all.
const DANGEROUS_FUNCTIONS: &[(&str, &str)] = &[
    ("eval", "code-injection"),
    ("exec", "command-injection"),
    ("execSync", "command-injection"),
    ("spawn", "command-injection"),
];

pub struct SecurityCategoryEnrichmentPlugin;

#[async_trait]
impl Plugin for SecurityCategoryEnrichmentPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("security-category-enrichment", Phase::Enrichment)
            .consumes(["EXTERNAL_FUNCTION"])
            .produces(["EXTERNAL_FUNCTION"])
    }

    async fn execute(&self, ctx: &PluginContext<'_>) -> anyhow::Result<PluginOutcome> {
        let mut graph = ctx.graph.lock().unwrap();
        let matches: Vec<_> = graph
            .all_nodes()
            .filter(|n| n.node_type == NodeType::external_function())
            .filter_map(|n| DANGEROUS_FUNCTIONS.iter().find(|(name, _)| *name == n.name).map(|(_, category)| (n.clone(), *category)))
            .collect();

        let mut enriched = 0usize;
        for (mut node, category) in matches {
            node.attributes.insert("isBuiltin".to_string(), serde_json::json!(true));
            node.attributes.insert("securityCategory".to_string(), serde_json::json!(category));
            graph.add_node(node);
            enriched += 1;
        }

        let mut counts = HashMap::new();
        counts.insert("enriched".to_string(), enriched);
        Ok(PluginOutcome { success: true, counts, ..Default::default() })
    }
}
