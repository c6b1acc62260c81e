//! Relay-style cursors for the Query Surface (§4.8).

use base64::Engine;
use serde::{Deserialize, Serialize};

const CURSOR_PREFIX: &str = "cursor:";
const DEFAULT_FIRST: usize = 50;
const MAX_FIRST: usize = 250;

/// `cursor = base64("cursor:" + id)`.
pub fn encode_cursor(id: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("{CURSOR_PREFIX}{id}"))
}

/// Inverse of [`encode_cursor`]. Malformed cursors decode to `None`.
pub fn decode_cursor(cursor: &str) -> Option<String> {
    let decoded = base64::engine::general_purpose::STANDARD.decode(cursor).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    text.strip_prefix(CURSOR_PREFIX).map(|s| s.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<T> {
    pub cursor: String,
    pub node: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    pub total_count: usize,
}

/// `paginate(items, first?, after?, idOf)`: default `first=50`, max 250.
pub fn paginate<T: Clone>(
    items: &[T],
    first: Option<usize>,
    after: Option<&str>,
    id_of: impl Fn(&T) -> String,
) -> Connection<T> {
    let total_count = items.len();
    let limit = first.unwrap_or(DEFAULT_FIRST).min(MAX_FIRST);

    let start_index = match after.and_then(decode_cursor) {
        Some(after_id) => items
            .iter()
            .position(|item| id_of(item) == after_id)
            .map(|idx| idx + 1)
            .unwrap_or(total_count),
        None => 0,
    };

    let end_index = (start_index + limit).min(total_count);
    let page: Vec<T> = items[start_index.min(total_count)..end_index].to_vec();

    let edges: Vec<Edge<T>> = page
        .into_iter()
        .map(|item| {
            let cursor = encode_cursor(&id_of(&item));
            Edge { cursor, node: item }
        })
        .collect();

    let page_info = PageInfo {
        has_next_page: start_index + limit < total_count,
        has_previous_page: start_index > 0,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection {
        edges,
        page_info,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_cursor() {
        let cursor = encode_cursor("FUNCTION|m|f.ts|greet|1:1");
        assert_eq!(decode_cursor(&cursor).as_deref(), Some("FUNCTION|m|f.ts|greet|1:1"));
    }

    #[test]
    fn malformed_cursor_decodes_to_none() {
        assert_eq!(decode_cursor("not-base64!!"), None);
        let wrong_prefix = base64::engine::general_purpose::STANDARD.encode("nope:x");
        assert_eq!(decode_cursor(&wrong_prefix), None);
    }

    #[test]
    fn paginate_respects_default_and_max_first() {
        let items: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        let page = paginate(&items, None, None, |s| s.clone());
        assert_eq!(page.total_count, 300);
        assert_eq!(page.edges.len(), 50);
        assert!(page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);

        let page = paginate(&items, Some(1000), None, |s| s.clone());
        assert_eq!(page.edges.len(), 250);
    }

    #[test]
    fn paginate_after_cursor_advances() {
        let items: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let first_page = paginate(&items, Some(3), None, |s| s.clone());
        let after = first_page.page_info.end_cursor.clone().unwrap();
        let second_page = paginate(&items, Some(3), Some(&after), |s| s.clone());
        assert_eq!(second_page.edges[0].node, "3");
        assert!(second_page.page_info.has_previous_page);
    }

    #[test]
    fn has_next_page_law() {
        let items: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let page = paginate(&items, Some(5), None, |s| s.clone());
        assert!(!page.page_info.has_next_page);
        let page = paginate(&items, Some(4), None, |s| s.clone());
        assert!(page.page_info.has_next_page);
    }
}
