//! Markdown rendering for exported discussions.
//!
//! A discussion becomes a single document: an H1 title, optional `Tool:` and
//! `Subcategory:` lines, then a `## Conversation` section with one H3 per turn.
//! Text is emitted verbatim; nothing is escaped.

use ghdataset_shared::{ConversationTurn, DiscussionRecord};

/// Heading that introduces the turn list.
const CONVERSATION_HEADING: &str = "## Conversation";

/// Render one discussion to Markdown.
///
/// Output layout:
/// ```text
/// # {title}
///
/// Tool: {tool}               (only when present)
///
/// Subcategory: {subcategory} (only when present)
///
/// ## Conversation
///
/// ### {role}
/// {message}
///
/// ```
pub fn render_discussion(
    title: &str,
    tool: Option<&str>,
    subcategory: Option<&str>,
    conversation: &[ConversationTurn],
) -> String {
    let mut md = format!("# {title}\n\n");

    if let Some(tool) = tool {
        md.push_str(&format!("Tool: {tool}\n\n"));
    }
    if let Some(subcategory) = subcategory {
        md.push_str(&format!("Subcategory: {subcategory}\n\n"));
    }

    md.push_str(CONVERSATION_HEADING);
    md.push_str("\n\n");

    for turn in conversation {
        push_turn(&mut md, turn);
    }

    md
}

/// Render a parsed record; shorthand for [`render_discussion`] over its fields.
pub fn render_record(record: &DiscussionRecord) -> String {
    render_discussion(
        &record.title,
        record.tool.as_deref(),
        record.subcategory.as_deref(),
        &record.content,
    )
}

fn push_turn(md: &mut String, turn: &ConversationTurn) {
    md.push_str("### ");
    md.push_str(&turn.role);
    md.push('\n');
    md.push_str(&turn.message);
    md.push_str("\n\n");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
