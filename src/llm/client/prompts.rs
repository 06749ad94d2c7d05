//! Prompt construction for ABAP review.

use crate::models::{Agent, OutputFormat, UploadedFile};

const SYSTEM_PREAMBLE: &str = r#"You are a senior SAP ABAP reviewer. You receive one or more ABAP source files and review them through the lenses listed below. Report only problems you can point to in the code; do not invent findings for code you were not given. Reference files by the exact name shown in the file header and give 1-based line numbers."#;

const JSON_CONTRACT: &str = r#"Respond with ONLY a JSON object, no prose and no code fences, shaped like:
{
  "summary": "2-3 sentence overview of the code and its main risks",
  "findings": [
    {
      "file": "ZREPORT.abap",
      "line": 42,
      "severity": "critical | high | medium | low | info",
      "agent": "id of the lens that produced the finding",
      "title": "short title",
      "description": "what is wrong and why it matters",
      "recommendation": "how to fix it"
    }
  ]
}
Use an empty findings array when nothing is wrong."#;

const MARKDOWN_CONTRACT: &str = r###"Respond in Markdown. Start with a "## Summary" section of 2-3 sentences, then one "## <Lens>" section per lens listing findings as bullets in the form "**severity** `file:line` title - explanation and fix". Write "No findings." under a lens with nothing to report."###;

/// Build the system prompt for the selected agents and output format.
pub fn build_system_prompt(agents: &[&Agent], format: OutputFormat) -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);
    prompt.push_str("\n\nReview lenses:\n");
    for agent in agents {
        prompt.push_str(&format!(
            "- {} ({}): {}\n",
            agent.title, agent.id, agent.instruction
        ));
    }
    prompt.push('\n');
    prompt.push_str(match format {
        OutputFormat::Json => JSON_CONTRACT,
        OutputFormat::Markdown => MARKDOWN_CONTRACT,
    });
    prompt
}

/// The user prompt plus a note of whether sources were cut to fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPrompt {
    pub text: String,
    pub truncated: bool,
}

/// Build the user prompt containing every file, within `max_chars` bytes
/// of source text.
///
/// A file that does not fit is cut at a UTF-8 boundary; files after the
/// budget is spent are listed but not included.
pub fn build_user_prompt(files: &[UploadedFile], max_chars: usize) -> UserPrompt {
    let mut text = format!("Review the following {} ABAP file(s).\n", files.len());
    let mut remaining = max_chars;
    let mut truncated = false;

    for file in files {
        let source = file.text();
        if remaining == 0 {
            truncated = true;
            text.push_str(&format!(
                "\n### File: {} (omitted, size limit reached)\n",
                file.name
            ));
            continue;
        }

        let body = truncate_content(&source, remaining);
        let cut = body.len() < source.len();
        remaining = if cut { 0 } else { remaining - body.len() };

        let fence = fence_for(body);
        text.push_str(&format!("\n### File: {}\n{}abap\n{}", file.name, fence, body));
        if !body.ends_with('\n') {
            text.push('\n');
        }
        if cut {
            truncated = true;
            text.push_str("* ... (truncated)\n");
        }
        text.push_str(&fence);
        text.push('\n');
    }

    UserPrompt { text, truncated }
}

/// A backtick fence longer than any backtick run inside `body`.
fn fence_for(body: &str) -> String {
    let longest = body
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Truncate content to at most `max` bytes (UTF-8 safe).
fn truncate_content(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{find_agent, AGENTS};

    #[test]
    fn test_system_prompt_lists_selected_agents() {
        let security = find_agent("security").unwrap();
        let prompt = build_system_prompt(&[security], OutputFormat::Json);
        assert!(prompt.contains("Security (security)"));
        assert!(prompt.contains("AUTHORITY-CHECK"));
        assert!(!prompt.contains("(performance)"));
        assert!(prompt.contains("\"findings\""));
    }

    #[test]
    fn test_system_prompt_markdown_contract() {
        let agents: Vec<&Agent> = AGENTS.iter().collect();
        let prompt = build_system_prompt(&agents, OutputFormat::Markdown);
        assert!(prompt.contains("## Summary"));
        assert!(!prompt.contains("\"findings\""));
        for agent in AGENTS {
            assert!(prompt.contains(agent.id));
        }
    }

    #[test]
    fn test_user_prompt_includes_each_file() {
        let files = vec![
            UploadedFile::new("ZA.abap", "REPORT za.\nWRITE 'a'.\n"),
            UploadedFile::new("ZB.abap", "REPORT zb."),
        ];
        let prompt = build_user_prompt(&files, 10_000);
        assert!(!prompt.truncated);
        assert!(prompt.text.contains("2 ABAP file(s)"));
        assert!(prompt.text.contains("### File: ZA.abap\n```abap\nREPORT za.\nWRITE 'a'.\n```"));
        assert!(prompt.text.contains("### File: ZB.abap\n```abap\nREPORT zb.\n```"));
    }

    #[test]
    fn test_user_prompt_respects_budget() {
        let files = vec![
            UploadedFile::new("ZA.abap", "0123456789"),
            UploadedFile::new("ZB.abap", "abcdefghij"),
            UploadedFile::new("ZC.abap", "never sent"),
        ];
        let prompt = build_user_prompt(&files, 15);
        assert!(prompt.truncated);
        assert!(prompt.text.contains("0123456789"));
        assert!(prompt.text.contains("abcde\n* ... (truncated)"));
        assert!(!prompt.text.contains("abcdef"));
        assert!(prompt.text.contains("### File: ZC.abap (omitted, size limit reached)"));
        assert!(!prompt.text.contains("never sent"));
    }

    #[test]
    fn test_budget_spent_inside_multibyte_char_omits_rest() {
        let files = vec![
            UploadedFile::new("ZA.abap", "0123"),
            UploadedFile::new("ZB.abap", "ä"),
            UploadedFile::new("ZC.abap", "never sent"),
        ];
        let prompt = build_user_prompt(&files, 5);
        assert!(prompt.truncated);
        assert!(prompt.text.contains("### File: ZB.abap\n```abap\n\n* ... (truncated)"));
        assert!(prompt.text.contains("### File: ZC.abap (omitted, size limit reached)"));
        assert!(!prompt.text.contains("### File: ZC.abap\n"));
    }

    #[test]
    fn test_fence_outgrows_backticks_in_source() {
        let source = "* ```\nWRITE '````'.\n";
        let files = vec![UploadedFile::new("ZFENCE.abap", source)];
        let prompt = build_user_prompt(&files, 10_000);
        assert!(prompt
            .text
            .contains("### File: ZFENCE.abap\n`````abap\n* ```\nWRITE '````'.\n`````\n"));
        assert_eq!(fence_for("REPORT z."), "```");
    }

    #[test]
    fn test_truncate_content_utf8_safe() {
        let text = "äöü";
        assert_eq!(truncate_content(text, 3), "ä");
        assert_eq!(truncate_content(text, 100), "äöü");
        assert_eq!(truncate_content(text, 1), "");
    }
}
