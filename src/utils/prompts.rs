use crate::models::SearchResult;
use crate::utils::truncate_chars;

const PROMPT_SNIPPET_CHARS: usize = 400;

const SOURCE_INSTRUCTIONS: &[&str] = &[
    "- The web sources above contain CURRENT, UP-TO-DATE information",
    "- For questions about recent events, news, or current information: USE THE WEB SOURCES PROVIDED",
    "- Trust the sources - they are from reliable websites and contain factual current information",
    "- Answer directly based on what the sources say",
    "- Cite sources using [1], [2], [3] etc.",
    "- If sources have dates/timelines, include them in your answer",
];

/// Builds the single-string tutoring prompt. Sources are numbered from 1 in
/// the order given, which is the order citations in the answer refer to.
pub fn generate_answer_prompt(question: &str, sources: &[SearchResult]) -> String {
    let mut lines: Vec<String> = Vec::new();

    if !sources.is_empty() {
        lines.push("=== CURRENT WEB SOURCES (Use this information to answer) ===".to_string());
        for (index, source) in sources.iter().enumerate() {
            lines.push(format!("\n[{}] {}", index + 1, source.title));
            lines.push(format!("URL: {}", source.url));
            let snippet = source.snippet.trim();
            if !snippet.is_empty() {
                lines.push(format!(
                    "Content: {}",
                    truncate_chars(snippet, PROMPT_SNIPPET_CHARS)
                ));
            }
        }
        lines.push("\n=== END OF SOURCES ===\n".to_string());
    }

    let mut instructions = vec![
        "IMPORTANT INSTRUCTIONS:",
        "- You are a helpful AI tutor answering questions for students",
    ];
    if !sources.is_empty() {
        instructions.extend_from_slice(SOURCE_INSTRUCTIONS);
    }
    instructions.push("- Be clear, educational, and step-by-step");
    if !sources.is_empty() {
        instructions.push(
            "- If the question is about current events or recent news, prioritize the web sources over general knowledge",
        );
    }
    lines.push(format!("{}\n", instructions.join("\n")));

    lines.push(format!("\nStudent Question: {}\n", question));
    lines.push("Your Answer:".to_string());
    lines.join("\n")
}
