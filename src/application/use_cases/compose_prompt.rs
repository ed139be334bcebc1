/// Builds the single user message sent to the model: the reference block
/// followed by the labelled question. Nothing is truncated.
pub fn compose_prompt(reference: &str, question: &str) -> String {
    format!("Reference text:\n{reference}\n\nQuestion: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_prompt_exact_template() {
        assert_eq!(
            compose_prompt("X is Y", "What is X?"),
            "Reference text:\nX is Y\n\nQuestion: What is X?"
        );
    }

    #[test]
    fn test_compose_prompt_keeps_reference_before_question() {
        let samples = [
            ("", ""),
            ("", "What is X?"),
            ("X is Y", ""),
            ("line one\nline two\n\nQuestion: fake", "real question"),
            ("unicode: café ✅", "¿qué?"),
        ];

        for (reference, question) in samples {
            let prompt = compose_prompt(reference, question);
            let reference_at = prompt.find(reference).expect("reference missing");
            let question_at = prompt.rfind(question).expect("question missing");
            assert!(reference_at <= question_at, "order broken for {reference:?}");
        }
    }

    #[test]
    fn test_compose_prompt_does_not_truncate() {
        let reference = "fact. ".repeat(100_000);
        let prompt = compose_prompt(&reference, "q");
        assert!(prompt.contains(&reference));
        assert!(prompt.len() > reference.len());
    }
}
