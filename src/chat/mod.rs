use crate::client::{ChatReply, ChatRequest};
use crate::model::{ChatMessage, ChatRole, ChatSource};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const ERROR_PREFIX: &str = "Sorry, I encountered an error: ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEntry {
    pub message: ChatMessage,
    pub sources: Vec<ChatSource>,
    pub failed: bool,
}

#[derive(Clone, Debug)]
pub struct ChatSession {
    entries: Vec<ChatEntry>,
    company_filter: Option<String>,
    history_limit: usize,
    typing: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChatSession {
    pub fn new(history_limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            company_filter: None,
            history_limit,
            typing: false,
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn company_filter(&self) -> Option<&str> {
        self.company_filter.as_deref()
    }

    pub fn set_company_filter(&mut self, company_id: Option<String>) {
        self.company_filter = company_id.filter(|id| !id.trim().is_empty());
    }

    pub fn begin(&mut self, question: &str) -> Option<ChatRequest> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let start = self.entries.len().saturating_sub(self.history_limit);
        let history = self.entries[start..]
            .iter()
            .map(|e| e.message.clone())
            .collect();
        self.entries.push(ChatEntry {
            message: ChatMessage::user(question),
            sources: Vec::new(),
            failed: false,
        });
        self.typing = true;
        Some(ChatRequest {
            question: question.to_string(),
            company_id: self.company_filter.clone(),
            history,
        })
    }

    pub fn resolve(&mut self, reply: ChatReply) {
        self.typing = false;
        self.entries.push(ChatEntry {
            message: ChatMessage::assistant(&reply.response),
            sources: reply.sources.unwrap_or_default(),
            failed: false,
        });
    }

    pub fn fail(&mut self, message: &str) {
        self.typing = false;
        self.entries.push(ChatEntry {
            message: ChatMessage::assistant(&format!("{ERROR_PREFIX}{message}")),
            sources: Vec::new(),
            failed: true,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.typing = false;
    }

    pub fn last_assistant(&self) -> Option<&ChatEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.message.role == ChatRole::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            response: text.to_string(),
            sources: None,
        }
    }

    #[test]
    fn blank_questions_are_ignored() {
        let mut session = ChatSession::default();
        assert!(session.begin("   ").is_none());
        assert!(session.entries().is_empty());
        assert!(!session.is_typing());
    }

    #[test]
    fn history_is_capped_to_last_entries_before_the_question() {
        let mut session = ChatSession::default();
        for n in 1..=7 {
            let request = session.begin(&format!("q{n}")).unwrap();
            let prior = 2 * (n - 1);
            assert_eq!(request.history.len(), prior.min(10));
            session.resolve(reply(&format!("a{n}")));
        }
        let request = session.begin("q8").unwrap();
        assert_eq!(request.history.first().unwrap().content, "q3");
        assert_eq!(request.history.last().unwrap().content, "a7");
    }

    #[test]
    fn failure_keeps_question_and_appends_error() {
        let mut session = ChatSession::default();
        session.begin("what about cookies?").unwrap();
        session.fail("timeout");
        let entries = session.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message.content, "what about cookies?");
        assert!(entries[1].failed);
        assert!(entries[1].message.content.starts_with(ERROR_PREFIX));
    }

    #[test]
    fn filter_is_forwarded() {
        let mut session = ChatSession::default();
        session.set_company_filter(Some("42".to_string()));
        let request = session.begin("hi").unwrap();
        assert_eq!(request.company_id.as_deref(), Some("42"));
        session.set_company_filter(Some(" ".to_string()));
        assert!(session.company_filter().is_none());
    }
}
