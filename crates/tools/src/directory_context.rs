//! Directory context — a text summary of a project directory for the prompt.
//!
//! Produces a tree view (bounded depth) followed by the contents of up to
//! `max_files` small text files. Hidden entries and build output are skipped.

use codewright_config::FileSystemConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

const SKIPPED_NAMES: &[&str] = &["target", "build", "node_modules", "dist", "out"];
const SKIPPED_SUFFIXES: &[&str] = &[".class", ".jar", ".war"];
const TEXT_EXTENSIONS: &[&str] = &[
    "java", "xml", "yml", "yaml", "properties", "txt", "md", "json", "js", "ts", "py", "sh",
    "sql", "html", "css", "kt", "gradle", "rs", "toml",
];

/// Build the context block for `directory_path`.
///
/// An empty path yields an empty string; a missing path or a non-directory
/// yields a one-line explanation instead of an error.
pub fn build_directory_context(directory_path: &str, limits: &FileSystemConfig) -> String {
    if directory_path.trim().is_empty() {
        return String::new();
    }

    let root = Path::new(directory_path);
    if !root.exists() {
        warn!(path = %directory_path, "Directory does not exist");
        return format!("Directory does not exist: {directory_path}");
    }
    if !root.is_dir() {
        warn!(path = %directory_path, "Path is not a directory");
        return format!("Path is not a directory: {directory_path}");
    }

    let mut context = format!("Directory Context: {directory_path}\n\n");

    context.push_str("Directory Structure:\n");
    match directory_tree(root, 0, limits.max_depth) {
        Ok(tree) => context.push_str(&tree),
        Err(e) => {
            error!(path = %directory_path, error = %e, "Error reading directory");
            context.push_str(&format!("Error reading directory: {e}"));
            return context;
        }
    }
    context.push_str("\n\n");

    context.push_str("File Contents:\n");
    let mut files = Vec::new();
    if let Err(e) = collect_text_files(root, &mut files) {
        error!(path = %directory_path, error = %e, "Error reading directory");
        context.push_str(&format!("Error reading directory: {e}"));
        return context;
    }

    let mut included = 0;
    for file in files {
        if included >= limits.max_files {
            context.push_str("\n[Additional files omitted - limit reached]\n");
            break;
        }
        let Some(content) = read_small_file(&file, limits.max_file_size) else {
            continue;
        };
        let relative = file.strip_prefix(root).unwrap_or(&file);
        context.push_str(&format!("--- File: {} ---\n", relative.display()));
        context.push_str(&content);
        context.push_str("\n\n");
        included += 1;
    }

    debug!(path = %directory_path, files = included, "Built directory context");
    context
}

fn should_skip(name: &str) -> bool {
    name.starts_with('.')
        || SKIPPED_NAMES.contains(&name)
        || SKIPPED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Entries of `dir` that survive the skip rules, sorted by path.
fn visible_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !should_skip(&entry.file_name().to_string_lossy()) {
            entries.push(entry.path());
        }
    }
    entries.sort();
    Ok(entries)
}

fn directory_tree(dir: &Path, depth: usize, max_depth: usize) -> std::io::Result<String> {
    if depth > max_depth {
        return Ok(String::new());
    }

    let indent = "  ".repeat(depth);
    let mut tree = String::new();
    for path in visible_entries(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tree.push_str(&format!("{indent}├── {name}"));
        if path.is_dir() {
            tree.push_str("/\n");
            tree.push_str(&directory_tree(&path, depth + 1, max_depth)?);
        } else {
            tree.push('\n');
        }
    }
    Ok(tree)
}

/// Depth-first, sorted; skipped directories are not descended into.
fn collect_text_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for path in visible_entries(dir)? {
        if path.is_dir() {
            collect_text_files(&path, out)?;
        } else if path.is_file() && is_text_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn read_small_file(file: &Path, max_file_size: u64) -> Option<String> {
    let size = match std::fs::metadata(file) {
        Ok(m) => m.len(),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "Could not read file");
            return None;
        }
    };
    if size > max_file_size {
        debug!(path = %file.display(), size, "Skipping large file");
        return None;
    }
    match std::fs::read_to_string(file) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "Could not read file");
            None
        }
    }
}
