use eventplan_common::ConversationEntry;

use crate::prompt::render_transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    PlanGenerated,
    Chatting,
}

/// Ordered transcript for one chat pane, optionally anchored on a plan.
///
/// Entries are only ever appended in (user, assistant) pairs, or replaced
/// wholesale by `start_plan` and `reset`.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    context: Option<String>,
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (self.context.is_some(), self.entries.len()) {
            (_, 0) => Phase::Empty,
            (true, 1) => Phase::PlanGenerated,
            _ => Phase::Chatting,
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Entries after the plan itself, i.e. the follow-up exchanges.
    pub fn follow_ups(&self) -> &[ConversationEntry] {
        match self.context {
            Some(_) => self.entries.get(1..).unwrap_or_default(),
            None => &self.entries,
        }
    }

    /// Replace everything with a freshly generated plan as the first assistant turn.
    pub fn start_plan(&mut self, plan: String) {
        self.entries = vec![ConversationEntry::assistant(plan.clone())];
        self.context = Some(plan);
    }

    /// Transcript as it will be sent, including a user message not yet recorded.
    pub fn transcript_with(&self, pending_user: &str) -> String {
        render_transcript(&self.entries, Some(pending_user))
    }

    pub fn record_exchange(&mut self, user: String, reply: String) {
        self.entries.push(ConversationEntry::user(user));
        self.entries.push(ConversationEntry::assistant(reply));
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.context = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
