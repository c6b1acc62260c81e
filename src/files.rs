//! Filesystem crawling (§1/§6: an explicit CLI-collaborator
//! responsibility, not the orchestrator's). Walks the project tree,
//! skipping VCS/build/cache directories, and applies the config's
//! `include`/`exclude` glob lists.

use grafema_query::Config;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const SKIPPED_DIRS: &[&str] = &["node_modules", "target", ".git", ".grafema"];

pub fn collect_files(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        let Ok(entries) = std::fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if name.starts_with('.') && path != *root {
                continue;
            }
            if path.is_dir() {
                if SKIPPED_DIRS.contains(&name.as_ref()) {
                    continue;
                }
                queue.push_back(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.retain(|f| matches_globs(f, root, &config.include) && !matches_globs(f, root, &config.exclude));
    files
}

/// Empty pattern lists match everything — `include: []` means "no
/// include filter", not "include nothing" (§6: "missing sections
/// inherit defaults").
fn matches_globs(file: &Path, root: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let relative = file.strip_prefix(root).unwrap_or(file).to_string_lossy().replace('\\', "/");
    patterns.iter().any(|pattern| glob_matches(pattern, &relative))
}

/// Minimal glob matcher: `**` matches any number of path segments,
/// `*` matches within one segment. Sufficient for `include`/`exclude`
/// patterns like `src/**/*.ts`; not a general-purpose glob engine.
fn glob_matches(pattern: &str, text: &str) -> bool {
    let regex_str = regex::escape(pattern).replace(r"\*\*", ".*").replace(r"\*", "[^/]*");
    regex::Regex::new(&format!("^{regex_str}$")).map(|re| re.is_match(text)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_list_matches_everything() {
        assert!(matches_globs(Path::new("/root/a.ts"), Path::new("/root"), &[]));
    }

    #[test]
    fn double_star_matches_nested_paths() {
        assert!(glob_matches("src/**/*.ts", "src/lib/a.ts"));
        assert!(!glob_matches("src/**/*.ts", "docs/a.ts"));
    }

    #[test]
    fn collect_files_skips_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/dep.js"), "").unwrap();
        std::fs::write(dir.path().join("a.js"), "").unwrap();

        let files = collect_files(dir.path(), &Config::default());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.js"));
    }
}
