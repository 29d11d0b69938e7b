//! Linearizes the conversation into the single text blob sent to the model.
//!
//! The format is positional: the fixed system preamble, one labeled line per
//! recognized turn, the new utterance, and a trailing "Assistente:" cue the
//! model is expected to continue from. Content is passed through unmodified:
//! no escaping, no truncation, no cap on history length.

use super::Message;

pub const SYSTEM_PREAMBLE: &str = "\
Você é um especialista em testes automatizados. Ajude o usuário a criar testes unitários robustos.
O usuário irá entrar com uma ou mais funções em qualquer liguagem de programação e você deve ajudá-lo a criar vários testes para essas funções.
Os testes que deverão ser criados são:
- Positivos
- Negativos
- Limites
- Partição por equivalência
";

pub fn build_prompt(messages: &[Message], new_prompt: &str) -> String {
    let mut full_prompt = String::from(SYSTEM_PREAMBLE);

    for message in messages {
        match message.role.as_str() {
            "user" => {
                full_prompt.push_str("Usuário: ");
                full_prompt.push_str(&message.content);
                full_prompt.push('\n');
            }
            "assistant" => {
                full_prompt.push_str("Assistente: ");
                full_prompt.push_str(&message.content);
                full_prompt.push('\n');
            }
            // Unrecognized roles are tolerated and left out of the prompt.
            _ => {}
        }
    }

    full_prompt.push_str("Usuário: ");
    full_prompt.push_str(new_prompt);
    full_prompt.push_str("\nAssistente:");
    full_prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str, content: &str) -> Message {
        Message {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn prompt_contains_the_four_test_categories() {
        let prompt = build_prompt(&[], "Pergunta de teste");
        for category in [
            "Positivos",
            "Negativos",
            "Limites",
            "Partição por equivalência",
        ] {
            assert!(prompt.contains(category), "missing category: {category}");
        }
    }

    #[test]
    fn prompt_ends_with_the_completion_anchor() {
        let prompt = build_prompt(&[message("user", "Primeira pergunta")], "Segunda pergunta");
        assert!(prompt.ends_with("Assistente:"));
    }

    #[test]
    fn prompt_preserves_conversation_order() {
        let history = [message("user", "A"), message("assistant", "B")];
        let prompt = build_prompt(&history, "C");

        let first = prompt.find("Usuário: A").expect("user turn present");
        let second = prompt.find("Assistente: B").expect("assistant turn present");
        let third = prompt.rfind("Usuário: C").expect("new utterance present");
        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn empty_conversation_still_yields_a_well_formed_prompt() {
        let prompt = build_prompt(&[], "Primeira pergunta");
        assert!(prompt.starts_with(SYSTEM_PREAMBLE));
        assert!(prompt.contains("Usuário: Primeira pergunta"));
        assert!(prompt.ends_with("Assistente:"));
    }

    #[test]
    fn unknown_roles_are_silently_skipped() {
        let history = [
            message("user", "Pergunta do usuário"),
            message("system", "instrução interna"),
            message("tool", "saída de ferramenta"),
        ];
        let prompt = build_prompt(&history, "Nova pergunta");

        assert!(prompt.contains("Usuário: Pergunta do usuário"));
        assert!(!prompt.contains("instrução interna"));
        assert!(!prompt.contains("saída de ferramenta"));
    }

    #[test]
    fn long_history_is_fully_included() {
        let mut history = Vec::new();
        for i in 0..50 {
            history.push(message("user", &format!("Pergunta {i}")));
            history.push(message("assistant", &format!("Resposta {i}")));
        }
        let prompt = build_prompt(&history, "Pergunta final");

        assert!(prompt.contains("Pergunta 0"));
        assert!(prompt.contains("Resposta 49"));
        assert!(prompt.contains("Usuário: Pergunta final"));
        // 50 history turns plus the new utterance.
        assert_eq!(prompt.matches("Usuário: ").count(), 51);
        assert_eq!(prompt.matches("Assistente: ").count(), 50);
    }

    #[test]
    fn special_characters_pass_through_unmodified() {
        let history = [
            message("user", "Pergunta com @#$%^&*()"),
            message("assistant", "Resposta com çãõáéí"),
        ];
        let prompt = build_prompt(&history, "Nova pergunta com émojis 🤖🔥");

        assert!(prompt.contains("@#$%^&*()"));
        assert!(prompt.contains("çãõáéí"));
        assert!(prompt.contains("🤖🔥"));
    }

    #[test]
    fn empty_content_still_contributes_a_labeled_line() {
        let history = [message("user", "")];
        let prompt = build_prompt(&history, "Pergunta normal");
        assert!(prompt.contains("Usuário: \n"));
    }
}
