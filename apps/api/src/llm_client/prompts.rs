// Shared prompt fragments and the Ollama prompt framing.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that asks for a bare JSON object.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations before or after the JSON.";

/// Frames a system and user prompt into the single `prompt` string Ollama expects.
pub fn format_prompt(system: &str, user: &str) -> String {
    format!("<<SYS>>\n{system}\n<</SYS>>\n\n{user}")
}
