//! Markdown renderers for tool output
//!
//! All functions here are pure; they only turn values into text.

use super::collection::CollectionContent;
use super::keywords::KeywordExpansion;
use super::result::SearchResult;
use super::search::MergedResultSet;
use super::session::SessionContext;
use super::tree::{DatasetTree, TreeNode};
use crate::remote::types::NodeKind;

/// Shown in place of any absent optional field
pub const NOT_AVAILABLE: &str = "not available";

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn score(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `1234567` -> `1,234,567`
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percent-encode what a markdown link cannot carry verbatim
fn link_target(link: &str) -> String {
    url::Url::parse(link)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| link.replace(' ', "%20"))
}

/// Source block shared by search results and collection views
fn source_block(
    out: &mut String,
    filename: &str,
    document_id: &str,
    download_link: Option<&str>,
    document_type: Option<&str>,
    text_length: Option<u64>,
    dataset_id: Option<&str>,
) {
    let download = match download_link.filter(|l| !l.is_empty()) {
        Some(link) => format!("[{}]({})", filename, link_target(link)),
        None => NOT_AVAILABLE.to_string(),
    };
    let size = text_length
        .map(|n| format!("{} characters", thousands(n)))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    out.push_str(&format!(
        "### 📄 Source\n\n**📁 Filename:** {}\n**🔗 Document ID:** `{}`\n**⬇️ Download:** {}\n**📋 Document type:** {}\n**📏 Size:** {}\n**🗂️ Dataset ID:** `{}`\n",
        filename,
        document_id,
        download,
        or_na(document_type),
        size,
        or_na(dataset_id)
    ));
}

/// Render results as numbered markdown blocks
pub fn format_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "## Result {}\n\n**Content:**\n{}\n\n",
            i + 1,
            r.content.trim()
        ));
        if let Some(answer) = &r.answer {
            out.push_str(&format!("**Answer:**\n{}\n\n", answer.trim()));
        }
        out.push_str(&format!(
            "**Relevance:**\n- embedding: {}\n- rerank: {}\n\n**Tokens:** {}\n\n",
            score(r.embedding_score),
            score(r.rerank_score),
            r.token_count
        ));
        source_block(
            &mut out,
            &r.source_filename,
            &r.source_document_id,
            r.download_link.as_deref(),
            r.document_type.as_deref(),
            r.text_length,
            Some(&r.source_dataset_id),
        );
        out.push_str("\n---\n\n");
    }
    out
}

/// Single-dataset search output
pub fn format_search_report(dataset_id: &str, query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!(
            "🔍 No results for \"{}\" in dataset `{}`.\n\nTry fewer or broader keywords, or expand the query with `expand_search_keywords`.\n",
            query, dataset_id
        );
    }
    let mut out = format!(
        "# 🔍 Search results\n\n**Query:** {}\n**Dataset:** `{}`\n**Results:** {}\n\n",
        query,
        dataset_id,
        results.len()
    );
    out.push_str(&format_results(results));
    out
}

/// Multi-dataset search output with statistics and failures
pub fn format_multi_search_report(query: &str, set: &MergedResultSet) -> String {
    let mut out = format!(
        "# 🔍 Multi-dataset search\n\n> {}\n\n## 📊 Statistics\n- **Datasets searched:** {}\n- **Succeeded:** {}\n- **Results:** {}\n",
        query,
        set.datasets_searched,
        set.succeeded(),
        set.results.len()
    );
    if set.sub_queries.len() > 1 {
        out.push_str(&format!("- **Sub-queries:** {}\n", set.sub_queries.join(" | ")));
    }
    out.push('\n');

    if !set.failures.is_empty() {
        out.push_str("## ⚠️ Failed datasets\n");
        for f in &set.failures {
            out.push_str(&format!("- `{}`: {}\n", f.dataset_id, f.reason));
        }
        out.push('\n');
    }

    if set.results.is_empty() {
        out.push_str("No results found in any dataset.\n");
        return out;
    }

    out.push_str("## 🎯 Results\n\n");
    out.push_str(&format_results(&set.results));
    out
}

fn tree_lines(out: &mut String, nodes: &[TreeNode], depth: usize) {
    for n in nodes {
        let indent = "  ".repeat(depth);
        let icon = match n.node.kind {
            NodeKind::Dataset => "📚",
            _ => "📁",
        };
        out.push_str(&format!(
            "{indent}- {} **{}**\n{indent}  - ID: `{}`\n{indent}  - Type: {}\n",
            icon,
            n.node.name,
            n.node.id,
            n.node.kind,
            indent = indent
        ));
        if let Some(intro) = n.node.intro.as_deref().filter(|i| !i.trim().is_empty()) {
            out.push_str(&format!("{}  - Description: {}\n", indent, intro.trim()));
        }
        tree_lines(out, &n.children, depth + 1);
    }
}

pub fn format_tree(tree: &DatasetTree) -> String {
    let filter = if tree.filter.is_empty() {
        "none"
    } else {
        tree.filter.as_str()
    };
    let mut out = format!(
        "# 📁 Dataset tree\n\n**Root:** `{}`\n**Filter:** {}\n**Max depth:** {}\n**Total nodes:** {}\n\n",
        tree.root_id,
        filter,
        tree.max_depth,
        tree.total_nodes()
    );
    if tree.nodes.is_empty() {
        out.push_str("*Nothing found*\n");
        return out;
    }
    tree_lines(&mut out, &tree.nodes, 0);
    out
}

pub fn format_collection(content: &CollectionContent) -> String {
    let mut out = format!("# 📖 {}\n\n", content.name());

    let detail = content.detail.as_ref();
    let dataset_id = detail
        .and_then(|d| d.dataset_id.as_deref())
        .or_else(|| content.chunks.first().map(|c| c.dataset_id.as_str()));
    source_block(
        &mut out,
        content.name(),
        &content.collection_id,
        content.download_link.as_deref(),
        detail.map(|d| d.kind.as_str()),
        detail.and_then(|d| d.raw_text_length),
        dataset_id,
    );
    out.push_str(&format!("**Chunks:** {}\n\n---\n\n", content.chunks.len()));

    if content.chunks.is_empty() {
        out.push_str("*This document has no content.*\n");
        return out;
    }

    for (i, chunk) in content.chunks.iter().enumerate() {
        out.push_str(&format!("### Chunk {} (index {})\n\n", i + 1, chunk.chunk_index));
        if !chunk.q.trim().is_empty() {
            out.push_str(&format!("{}\n\n", chunk.q.trim()));
        }
        if !chunk.a.trim().is_empty() {
            out.push_str(&format!("**Answer:**\n\n{}\n\n", chunk.a.trim()));
        }
        out.push_str("---\n\n");
    }
    out
}

fn word_list(out: &mut String, title: &str, words: &[String]) {
    let listed = if words.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        words.join(" | ")
    };
    out.push_str(&format!("{} ({}):\n{}\n\n", title, words.len(), listed));
}

pub fn format_expansion(x: &KeywordExpansion) -> String {
    let mut out = format!(
        "# 🎯 Keyword expansion\n\n**Query:** \"{}\"\n**Mode:** {}\n",
        x.original_query, x.mode
    );
    if !x.domains.is_empty() {
        out.push_str(&format!("**Domains:** {}\n", x.domains.join(" | ")));
    }
    out.push('\n');

    word_list(&mut out, "🎯 **Core words**", &x.core_words);
    word_list(&mut out, "🔄 **Synonyms**", &x.synonyms);
    word_list(&mut out, "🔗 **Related words**", &x.related_words);
    word_list(&mut out, "🌐 **Context words**", &x.context_words);

    let [precise, widened, full] = x.search_combinations();
    out.push_str(&format!(
        "💡 **Suggested searches**\n1. Precise: {}\n2. Widened: {}\n3. Full: {}\n",
        precise, widened, full
    ));
    out
}

pub fn format_context_set(session: &SessionContext) -> String {
    let user = session.user_id();
    let scope = session.scope();
    format!(
        "✅ Context updated\n\n• User: {}\n• Scope: {}\n• Session: `{}`\n• Since: {}\n",
        or_na(user.as_deref()),
        or_na(scope.as_deref()),
        session.id(),
        session.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

pub fn format_context_cleared(session_id: &str) -> String {
    format!(
        "✅ Context cleared\n\n• User: cleared\n• Scope: cleared\n• Session: `{}`\n\n💡 Call set_user_context or set_scope before the next search.\n",
        session_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DatasetFailure;
    use crate::core::result::tests::result;
    use crate::core::testing::{chunk, node};
    use crate::remote::types::CollectionDetail;

    #[test]
    fn test_missing_link_renders_marker() {
        let r = result("doc-1", Some(0.9), None);
        let out = format_results(&[r]);
        assert!(out.contains("**⬇️ Download:** not available"));
        assert!(out.contains("- rerank: 0.9000"));
        assert!(out.contains("- embedding: not available"));
        assert!(out.contains("**📋 Document type:** not available"));
        assert!(out.contains("**📏 Size:** not available"));
    }

    #[test]
    fn test_result_block_contents() {
        let mut r = result("doc-2", Some(0.87654), Some(0.12345));
        r.answer = Some("the answer".to_string());
        r.download_link = Some("http://kb.local/files/Travel Policy.pdf".to_string());
        r.document_type = Some("file".to_string());
        r.text_length = Some(1234567);

        let out = format_results(&[r]);
        assert!(out.starts_with("## Result 1"));
        assert!(out.contains("content of doc-2"));
        assert!(out.contains("**Answer:**\nthe answer"));
        assert!(out.contains("- rerank: 0.8765"));
        assert!(out.contains("- embedding: 0.1235"));
        assert!(out.contains("**Tokens:** 10"));
        assert!(out.contains("[doc-2.pdf](http://kb.local/files/Travel%20Policy.pdf)"));
        assert!(out.contains("1,234,567 characters"));
        assert!(out.contains("**🗂️ Dataset ID:** `ds`"));
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(12345678), "12,345,678");
    }

    #[test]
    fn test_empty_search_report() {
        let out = format_search_report("ds-1", "nothing", &[]);
        assert!(out.contains("No results for \"nothing\""));
    }

    #[test]
    fn test_multi_search_report_lists_failures() {
        let set = MergedResultSet {
            results: vec![result("a", Some(0.5), None)],
            failures: vec![DatasetFailure {
                dataset_id: "broken".to_string(),
                reason: "HTTP 500".to_string(),
            }],
            datasets_searched: 2,
            sub_queries: vec!["x".to_string(), "y".to_string()],
        };
        let out = format_multi_search_report("x y", &set);
        assert!(out.contains("**Datasets searched:** 2"));
        assert!(out.contains("**Succeeded:** 1"));
        assert!(out.contains("- `broken`: HTTP 500"));
        assert!(out.contains("**Sub-queries:** x | y"));
        assert!(out.contains("## Result 1"));
    }

    #[test]
    fn test_tree_rendering() {
        let mut folder = node("f1", "Finance", NodeKind::Folder);
        folder.intro = Some("money matters".to_string());
        let tree = DatasetTree {
            root_id: "root".to_string(),
            filter: String::new(),
            max_depth: 3,
            nodes: vec![TreeNode {
                node: folder,
                children: vec![TreeNode {
                    node: node("d1", "Invoices", NodeKind::Dataset),
                    children: vec![],
                }],
            }],
        };
        let out = format_tree(&tree);
        assert!(out.contains("**Filter:** none"));
        assert!(out.contains("**Total nodes:** 2"));
        assert!(out.contains("- 📁 **Finance**"));
        assert!(out.contains("  - Description: money matters"));
        assert!(out.contains("  - 📚 **Invoices**"));
        assert!(out.contains("    - ID: `d1`"));
    }

    #[test]
    fn test_collection_rendering() {
        let content = CollectionContent {
            collection_id: "c1".to_string(),
            detail: Some(CollectionDetail {
                id: "c1".to_string(),
                parent_id: None,
                dataset_id: None,
                kind: "file".to_string(),
                name: "Handbook.docx".to_string(),
                file_id: None,
                raw_text_length: Some(42),
            }),
            download_link: None,
            chunks: vec![chunk("c1", 0, "first"), chunk("c1", 1, "second")],
            pages: 1,
        };
        let out = format_collection(&content);
        assert!(out.starts_with("# 📖 Handbook.docx"));
        assert!(out.contains("**Chunks:** 2"));
        assert!(out.contains("### Chunk 2 (index 1)\n\nsecond"));
        assert!(out.contains("**⬇️ Download:** not available"));
        assert!(out.contains("**🗂️ Dataset ID:** `ds-1`"));
    }

    #[test]
    fn test_context_rendering() {
        let session = SessionContext::with_id("mcp-1", None);
        session.set_scope("root-9");
        let out = format_context_set(&session);
        assert!(out.contains("• User: not available"));
        assert!(out.contains("• Scope: root-9"));
        assert!(format_context_cleared("mcp-1").contains("`mcp-1`"));
    }
}
