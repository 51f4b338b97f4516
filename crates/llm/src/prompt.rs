//! Prompt construction for policy-aligned contract revision.

use std::collections::HashSet;

use redline_core::KnowledgeEntry;

use crate::provider::Message;

pub const SYSTEM_PROMPT: &str = "\
You are a contract analysis assistant. You identify clauses in a contract that \
conflict with company policies or interests, as described by the provided \
knowledge base entries, and revise them.

Revise the contract so it aligns with the company's policies and interests. \
Keep the original structure and format of the contract.

Always answer in the same language as the input contract. Do not translate or \
switch languages.

Return only the full revised contract as plain text. Do not include summaries, \
explanations, comments, or any other content.";

/// Knowledge entries deduplicated by content, first occurrence wins, each
/// preceded by its metadata line when it has one.
pub fn format_knowledge(entries: &[Vec<KnowledgeEntry>]) -> String {
    let mut seen = HashSet::new();
    let mut text = String::new();
    for entry in entries.iter().flatten() {
        if entry.content.is_empty() || !seen.insert(entry.content.as_str()) {
            continue;
        }
        if let Some(meta) = entry.meta_info.as_deref().filter(|m| !m.is_empty()) {
            text.push_str(&format!("--- Metadata: {meta} ---\n"));
        }
        text.push_str(&entry.content);
        text.push_str("\n\n");
    }
    text
}

/// System and user messages asking for a revision of `chunks` against the
/// retrieved policy `entries` (one list per chunk).
pub fn build_revision_messages(chunks: &[String], entries: &[Vec<KnowledgeEntry>]) -> Vec<Message> {
    let contract_text = chunks.join("\n\n");
    let knowledge_text = format_knowledge(entries);

    let user_message = format!(
        "\nPlease review and revise the following contract based on our company policies and interests.\n\
         \n\
         --- CONTRACT TEXT ---\n\
         {contract_text}\n\
         \n\
         --- COMPANY POLICIES AND KNOWLEDGE BASE ---\n\
         {knowledge_text}\n\
         \n\
         Please provide a revised version of the contract that aligns with our company policies and interests.\n\
         Make changes only to clauses that conflict with our policies or interests.\n\
         Maintain the original structure and format of the contract.\n"
    );

    vec![Message::system(SYSTEM_PROMPT), Message::user(user_message)]
}
