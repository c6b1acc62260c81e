//! Thread-safe parser pool for tree-sitter parsers.
//!
//! tree-sitter parsers are not `Send`, so this uses a channel-based
//! approach with dedicated parser threads to work around that.
//! Suspension points stay at backend/file-system operations, not
//! parsing itself.

use anyhow::Result;
use std::path::PathBuf;
use tree_sitter::{Language, Parser};

/// The two languages the walker understands — only JS/TS source is
/// semantically walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    JavaScript,
    TypeScript,
}

impl FileType {
    pub fn from_path(path: &PathBuf) -> Option<Self> {
        match path.extension()?.to_str()? {
            "js" | "jsx" | "mjs" | "cjs" => Some(FileType::JavaScript),
            "ts" | "tsx" => Some(FileType::TypeScript),
            _ => None,
        }
    }

    pub fn get_language(&self) -> Language {
        match self {
            FileType::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            FileType::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

#[derive(Debug)]
pub struct ParseRequest {
    pub file_type: FileType,
    pub content: String,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug)]
struct WorkerRequest {
    request: ParseRequest,
    response_sender: std::sync::mpsc::Sender<Result<ParseResult>>,
}

/// A pool of dedicated OS threads, each owning its own `Parser`.
pub struct ParserPool {
    sender: std::sync::mpsc::Sender<WorkerRequest>,
}

impl ParserPool {
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel::<WorkerRequest>();
        let receiver = std::sync::Arc::new(std::sync::Mutex::new(receiver));

        for i in 0..num_workers {
            let receiver = receiver.clone();
            std::thread::spawn(move || Self::worker_thread(i, receiver));
        }

        Self { sender }
    }

    fn worker_thread(
        worker_id: usize,
        receiver: std::sync::Arc<std::sync::Mutex<std::sync::mpsc::Receiver<WorkerRequest>>>,
    ) {
        tracing::debug!(worker_id, "parser worker started");
        let mut parser = Parser::new();

        loop {
            let WorkerRequest { request, response_sender } = match receiver.lock().unwrap().recv() {
                Ok(req) => req,
                Err(_) => {
                    tracing::debug!(worker_id, "parser worker shutting down");
                    break;
                }
            };

            if let Err(e) = parser.set_language(&request.file_type.get_language()) {
                let _ = response_sender.send(Err(anyhow::anyhow!("failed to set language: {e}")));
                continue;
            }

            let result = match parser.parse(&request.content, None) {
                Some(tree) => Ok(ParseResult {
                    tree,
                    path: request.path,
                    content: request.content,
                }),
                None => Err(anyhow::anyhow!("failed to parse content")),
            };

            if response_sender.send(result).is_err() {
                tracing::warn!(worker_id, "caller dropped before receiving parse result");
            }
        }
    }

    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseResult> {
        let (response_sender, response_receiver) = std::sync::mpsc::channel();
        self.sender
            .send(WorkerRequest { request, response_sender })
            .map_err(|_| anyhow::anyhow!("parser pool is shut down"))?;
        response_receiver.recv().map_err(|_| anyhow::anyhow!("parser worker died"))?
    }

    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResult> {
        let sender = self.sender.clone();
        tokio::task::spawn_blocking(move || {
            let (response_sender, response_receiver) = std::sync::mpsc::channel();
            sender
                .send(WorkerRequest { request, response_sender })
                .map_err(|_| anyhow::anyhow!("parser pool is shut down"))?;
            response_receiver.recv().map_err(|_| anyhow::anyhow!("parser worker died"))?
        })
        .await
        .map_err(|e| anyhow::anyhow!("task join error: {e}"))?
    }
}

impl Clone for ParserPool {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

/// One worker per available core, at least 2.
pub fn create_parser_pool() -> ParserPool {
    let num_workers = std::thread::available_parallelism().map(|n| n.get().max(2)).unwrap_or(2);
    ParserPool::new(num_workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_javascript_source() {
        let pool = create_parser_pool();
        let request = ParseRequest {
            file_type: FileType::JavaScript,
            content: "function greet() { console.log(\"hi\"); }".to_string(),
            path: PathBuf::from("a.js"),
        };
        let result = pool.parse(request).await.unwrap();
        assert_eq!(result.tree.root_node().kind(), "program");
    }

    #[tokio::test]
    async fn parses_typescript_source() {
        let pool = create_parser_pool();
        let request = ParseRequest {
            file_type: FileType::TypeScript,
            content: "class C { method(): void {} }".to_string(),
            path: PathBuf::from("a.ts"),
        };
        let result = pool.parse(request).await.unwrap();
        assert_eq!(result.tree.root_node().kind(), "program");
    }

    #[test]
    fn from_path_classifies_known_extensions() {
        assert_eq!(FileType::from_path(&PathBuf::from("a.ts")), Some(FileType::TypeScript));
        assert_eq!(FileType::from_path(&PathBuf::from("a.js")), Some(FileType::JavaScript));
        assert_eq!(FileType::from_path(&PathBuf::from("a.rs")), None);
    }
}
