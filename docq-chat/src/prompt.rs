//! Prompt assembly for the completion call.

/// Grounding directive appended to the caller's persona instructions.
const GROUNDED_DIRECTIVE: &str = "Use the provided context to answer questions accurately. \
     Prefer document content over web results when both cover the question. \
     If the context doesn't contain relevant information, say so honestly.";

/// Directive used when no evidence grounded the query.
const UNGROUNDED_DIRECTIVE: &str = "No uploaded documents or web results matched this \
     question. Answer from general knowledge and make clear that the answer is not \
     grounded in the user's documents.";

/// Build the system prompt from persona instructions and grounding state.
pub fn system_prompt(persona: &str, grounded: bool) -> String {
    let directive = if grounded { GROUNDED_DIRECTIVE } else { UNGROUNDED_DIRECTIVE };
    if persona.is_empty() {
        directive.to_string()
    } else {
        format!("{persona}\n\n{directive}")
    }
}

/// Build the final user turn: assembled context (when any) plus the question.
pub fn user_prompt(context: &str, question: &str) -> String {
    if context.is_empty() {
        question.to_string()
    } else {
        format!("Context:\n{context}\n\nQuestion: {question}")
    }
}
