use crate::types::AggregatedTicket;

/// Conversation bodies are cut to this many characters in the summary.
pub const MAX_BODY_CHARS: usize = 120;

const NO_SUBJECT: &str = "(No subject)";

/// Renders a fixed-layout, human-readable summary of an aggregated ticket.
pub fn format_summary(ticket: &AggregatedTicket) -> String {
    let subject = ticket
        .subject
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_SUBJECT);
    let issue = ticket.description.as_deref().unwrap_or_default().trim();

    let conversations = ticket
        .conversations
        .iter()
        .map(|c| {
            let visibility = if c.private { "PRIVATE" } else { "PUBLIC" };
            let body = truncate(c.body.as_deref().unwrap_or_default(), MAX_BODY_CHARS);
            format!("- [{visibility}] {}: {body}...", c.from)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nTicket Summary:\n\
         - Subject: {subject}\n\
         - Requester: {}\n\
         - Priority: {}\n\
         - Status: {}\n\
         - Issue: {issue}\n\
         \n\
         Conversations:\n\
         {conversations}\n",
        ticket.requester, ticket.priority, ticket.status,
    )
}

/// Wraps summary text in a `<pre>` block for fixed-width display in a browser.
pub fn render_summary_page(summary: &str) -> String {
    let mut page = String::with_capacity(summary.len() + 11);
    page.push_str("<pre>");
    for ch in summary.chars() {
        match ch {
            '&' => page.push_str("&amp;"),
            '<' => page.push_str("&lt;"),
            '>' => page.push_str("&gt;"),
            _ => page.push(ch),
        }
    }
    page.push_str("</pre>");
    page
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
