//! Deterministic id computation (§4.1).
//!
//! Two identity schemes coexist: the legacy line-based `computeId`, joining
//! its parts with `|`, and the scope-semantic `computeSemanticId`, derived
//! from the current `ScopeTracker` context. Both must be byte-for-byte
//! reproducible given identical inputs.

use crate::scope::ScopeContext;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Reversal failure for [`parse_id`]: the id did not split into the
/// five `|`-joined legacy parts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("bad id format: expected 5 `|`-joined parts, got {0}")]
pub struct BadIdFormat(pub usize);

/// The five components of a legacy line-based id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    pub node_type: String,
    pub scope: String,
    pub file: String,
    pub identifier: String,
    pub line: u32,
    pub column: u32,
}

/// `TYPE|scope|file|identifier|line:column`.
pub fn compute_id(
    node_type: &str,
    scope: &str,
    file: &str,
    identifier: &str,
    line: u32,
    column: u32,
) -> String {
    format!("{node_type}|{scope}|{file}|{identifier}|{line}:{column}")
}

/// Inverse of [`compute_id`]. Fails with [`BadIdFormat`] when the part
/// count is wrong.
pub fn parse_id(id: &str) -> Result<ParsedId, BadIdFormat> {
    let parts: Vec<&str> = id.splitn(5, '|').collect();
    if parts.len() != 5 {
        return Err(BadIdFormat(parts.len()));
    }
    let (line, column) = parts[4]
        .split_once(':')
        .and_then(|(l, c)| Some((l.parse().ok()?, c.parse().ok()?)))
        .ok_or(BadIdFormat(parts.len()))?;
    Ok(ParsedId {
        node_type: parts[0].to_string(),
        scope: parts[1].to_string(),
        file: parts[2].to_string(),
        identifier: parts[3].to_string(),
        line,
        column,
    })
}

/// `file->scopePath->TYPE->name[#discriminator]`, computed from the
/// current scope path.
pub fn compute_semantic_id(
    node_type: &str,
    name: &str,
    ctx: &ScopeContext,
    discriminator: Option<u32>,
) -> String {
    let base = format!("{}->{}->{}->{}", ctx.file, ctx.scope_path, node_type, name);
    match discriminator {
        Some(d) => format!("{base}#{d}"),
        None => base,
    }
}

/// 128-bit integer derived from the first 16 bytes of the id's hash,
/// used to key the storage engine. We take two independent 64-bit
/// xxHash digests (seeds 0 and 1) over the id bytes and concatenate
/// them; xxHash is not cryptographic but is deterministic and fast,
/// matching the "collision-resistant hash" assumption in §8.
pub fn compute_numeric_id(id: &str) -> u128 {
    let mut low = XxHash64::with_seed(0);
    low.write(id.as_bytes());
    let mut high = XxHash64::with_seed(1);
    high.write(id.as_bytes());
    ((high.finish() as u128) << 64) | (low.finish() as u128)
}

/// Fixed singleton ids (§3 Singletons, §4.1).
pub mod singletons {
    /// The stdio sink: `net:stdio#__stdio__`.
    pub const STDIO: &str = "net:stdio#__stdio__";
    /// The network sink: `net:request#__network__`.
    pub const NETWORK: &str = "net:request#__network__";

    /// External API per domain: `EXTERNAL#{domain}`.
    pub fn external_api(domain: &str) -> String {
        format!("EXTERNAL#{domain}")
    }

    /// External module per package, `node:` prefix normalized away:
    /// `EXTERNAL_MODULE:{name}`.
    pub fn external_module(name: &str) -> String {
        let normalized = name.strip_prefix("node:").unwrap_or(name);
        format!("EXTERNAL_MODULE:{normalized}")
    }

    /// Database connection singleton per name.
    pub fn db_connection(name: &str) -> String {
        format!("db:connection:{name}")
    }

    /// Database table singleton per name.
    pub fn db_table(name: &str) -> String {
        format!("db:table:{name}")
    }

    /// HTTP route id, stable across mount-point reformatting.
    pub fn http_route(method: &str, path: &str, file: &str) -> String {
        format!("http:route:{method}:{path}:{file}")
    }

    /// Guarantee node id: namespace `guarantee:{kind}#{name}`.
    pub fn guarantee(kind: &str, name: &str) -> String {
        format!("guarantee:{kind}#{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeContext;

    #[test]
    fn round_trips_legacy_id() {
        let id = compute_id("FUNCTION", "module.greet", "a.ts", "greet", 3, 12);
        let parsed = parse_id(&id).unwrap();
        assert_eq!(parsed.node_type, "FUNCTION");
        assert_eq!(parsed.scope, "module.greet");
        assert_eq!(parsed.file, "a.ts");
        assert_eq!(parsed.identifier, "greet");
        assert_eq!(parsed.line, 3);
        assert_eq!(parsed.column, 12);
    }

    #[test]
    fn bad_format_on_missing_parts() {
        assert_eq!(parse_id("TYPE|scope|file"), Err(BadIdFormat(3)));
    }

    #[test]
    fn deterministic_given_identical_inputs() {
        let a = compute_id("CALL", "s", "f.ts", "foo", 1, 1);
        let b = compute_id("CALL", "s", "f.ts", "foo", 1, 1);
        assert_eq!(a, b);
        assert_eq!(compute_numeric_id(&a), compute_numeric_id(&b));
    }

    #[test]
    fn numeric_id_differs_for_different_inputs() {
        let a = compute_numeric_id("a");
        let b = compute_numeric_id("b");
        assert_ne!(a, b);
    }

    #[test]
    fn semantic_id_uses_scope_path_and_discriminator() {
        let ctx = ScopeContext {
            file: "a.ts".to_string(),
            scope_path: "module.greet".to_string(),
        };
        let id = compute_semantic_id("CALL", "log", &ctx, Some(2));
        assert_eq!(id, "a.ts->module.greet->CALL->log#2");
        let id_no_disc = compute_semantic_id("CALL", "log", &ctx, None);
        assert_eq!(id_no_disc, "a.ts->module.greet->CALL->log");
    }

    #[test]
    fn external_module_normalizes_node_prefix() {
        assert_eq!(singletons::external_module("node:fs"), "EXTERNAL_MODULE:fs");
        assert_eq!(singletons::external_module("lodash"), "EXTERNAL_MODULE:lodash");
    }
}
