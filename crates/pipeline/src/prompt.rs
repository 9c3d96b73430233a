//! Prompt assembly.
//!
//! Pure construction, no I/O: one system entry carrying the persona, then a
//! user/assistant pair per past exchange in chronological order, then the new
//! user message. Output length is always `1 + 2n + 1` for n history entries.

use chatrelay_core::exchange::Exchange;
use chatrelay_core::message::PromptMessage;

/// Build the ordered message sequence for one completion call.
///
/// `history` must already be in chronological order (oldest first).
pub fn assemble(persona: &str, history: &[Exchange], new_message: &str) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(2 + history.len() * 2);
    messages.push(PromptMessage::system(persona));

    for exchange in history {
        messages.push(PromptMessage::user(&exchange.user_message));
        messages.push(PromptMessage::assistant(&exchange.bot_response));
    }

    messages.push(PromptMessage::user(new_message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_core::message::Role;
    use chatrelay_core::profile::ProfileId;

    fn exchange(user: &str, bot: &str) -> Exchange {
        Exchange::new(ProfileId::from("p1"), user, bot)
    }

    #[test]
    fn empty_history_is_persona_plus_message() {
        let messages = assemble("be nice", &[], "hi");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "be nice");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "hi");
    }

    #[test]
    fn history_expands_to_alternating_pairs() {
        let history = vec![exchange("hi", "hello"), exchange("how are you", "fine")];
        let messages = assemble("persona", &history, "bye");

        assert_eq!(messages.len(), 1 + 2 * history.len() + 1);

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant, Role::User]
        );

        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[2].content, "hello");
        assert_eq!(messages[3].content, "how are you");
        assert_eq!(messages[4].content, "fine");
        assert_eq!(messages[5].content, "bye");
    }

    #[test]
    fn length_invariant_holds_for_any_history_size() {
        for n in 0..8 {
            let history: Vec<Exchange> =
                (0..n).map(|i| exchange(&format!("q{i}"), &format!("a{i}"))).collect();
            let messages = assemble("p", &history, "msg");
            assert_eq!(messages.len(), 1 + 2 * n + 1);
        }
    }

    #[test]
    fn inputs_are_not_mutated() {
        let history = vec![exchange("hi", "hello")];
        let before = history.clone();
        let _ = assemble("p", &history, "again");
        assert_eq!(history, before);
    }
}
