//! Workspace model — the project file tree and chat transcript.
//!
//! DESIGN
//! ======
//! `FileNode` is tree-shaped: folders own children, files own text content.
//! The active file is tracked by id on the side, never as an embedded flag,
//! so at most one node can be active and a dangling id is detectable.

use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// FILE TREE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    Js,
}

/// One node of the project tree. Mirrors the editor's file explorer model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    /// Milliseconds since Unix epoch.
    pub date_created: i64,
}

// =============================================================================
// CHAT TRANSCRIPT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One turn of the conversation. Immutable once resolved; a pending turn is
/// filled in place by the client when its network call settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub role: MessageRole,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_suggestion: Option<String>,
}

// =============================================================================
// TREE HELPERS
// =============================================================================

/// Depth-first lookup of a node by id.
#[must_use]
pub fn find_node(nodes: &[FileNode], id: Uuid) -> Option<&FileNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(children) = &node.children {
            if let Some(found) = find_node(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Whether an id references any node in the tree.
#[must_use]
pub fn contains_node(nodes: &[FileNode], id: Uuid) -> bool {
    find_node(nodes, id).is_some()
}

/// Current wall-clock time in milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// EXPORT FLATTENING
// =============================================================================

/// A file ready for export: full path plus content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFile {
    pub name: String,
    pub content: String,
}

/// Flatten the tree into exportable files. Folder names become `dir/` path
/// prefixes; folders themselves and empty files contribute no entries.
#[must_use]
pub fn flatten_files(nodes: &[FileNode]) -> Vec<ExportFile> {
    let mut out = Vec::new();
    flatten_into(nodes, "", &mut out);
    out
}

fn flatten_into(nodes: &[FileNode], prefix: &str, out: &mut Vec<ExportFile>) {
    for node in nodes {
        match node.kind {
            NodeKind::Folder => {
                if let Some(children) = &node.children {
                    let folder_prefix = format!("{prefix}{}/", node.name);
                    flatten_into(children, &folder_prefix, out);
                }
            }
            NodeKind::File => {
                if let Some(content) = &node.content {
                    if !content.is_empty() {
                        out.push(ExportFile { name: format!("{prefix}{}", node.name), content: content.clone() });
                    }
                }
            }
        }
    }
}

// =============================================================================
// FILE RELATIONSHIPS
// =============================================================================

/// CSS/JS files an HTML document links to, restricted to project files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRelationship {
    pub html_file: String,
    pub linked_css_files: Vec<String>,
    pub linked_js_files: Vec<String>,
}

static LINK_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)<link[^>]*href="([^"]+)""#).unwrap());
static SCRIPT_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)<script[^>]*src="([^"]+)""#).unwrap());

/// For each HTML file in the tree, find the project CSS/JS files it
/// references via `<link href>` / `<script src>`. References to files that
/// are not part of the project (CDNs, absolute URLs) are ignored.
#[must_use]
pub fn file_relationships(nodes: &[FileNode]) -> Vec<FileRelationship> {
    let files = flatten_files(nodes);
    let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

    let mut relationships = Vec::new();
    for file in &files {
        if !file.name.ends_with(".html") {
            continue;
        }
        let css = referenced_names(&LINK_HREF, &file.content, &names, ".css");
        let js = referenced_names(&SCRIPT_SRC, &file.content, &names, ".js");
        if !css.is_empty() || !js.is_empty() {
            relationships.push(FileRelationship {
                html_file: file.name.clone(),
                linked_css_files: css,
                linked_js_files: js,
            });
        }
    }
    relationships
}

fn referenced_names(pattern: &Regex, html: &str, project_names: &[&str], extension: &str) -> Vec<String> {
    let mut out = Vec::new();
    for caps in pattern.captures_iter(html) {
        let raw = &caps[1];
        let basename = raw.rsplit('/').next().unwrap_or(raw);
        if !basename.ends_with(extension) {
            continue;
        }
        if let Some(name) = project_names
            .iter()
            .find(|&&n| n == basename || n.ends_with(&format!("/{basename}")))
        {
            let name = (*name).to_string();
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Build a file node, inferring the language from the extension.
    #[must_use]
    pub fn file(name: &str, content: &str) -> FileNode {
        let language = if name.ends_with(".html") {
            Some(Language::Html)
        } else if name.ends_with(".css") {
            Some(Language::Css)
        } else if name.ends_with(".js") {
            Some(Language::Js)
        } else {
            None
        };
        FileNode {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: NodeKind::File,
            content: Some(content.to_string()),
            language,
            children: None,
            date_created: 1_700_000_000_000,
        }
    }

    /// Build a folder node owning the given children.
    #[must_use]
    pub fn folder(name: &str, children: Vec<FileNode>) -> FileNode {
        FileNode {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: NodeKind::Folder,
            content: None,
            language: None,
            children: Some(children),
            date_created: 1_700_000_000_000,
        }
    }
}

#[cfg(test)]
#[path = "workspace_test.rs"]
mod tests;
