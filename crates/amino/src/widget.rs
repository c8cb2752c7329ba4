use log::warn;
use tokio_util::sync::CancellationToken;

use crate::message::{Message, Role};
use crate::relay::Relay;
use crate::reply::Failure;

/// Greeting seeded into every fresh widget session.
pub const GREETING: &str = "👋 Hi there! I'm **AI Amino**, Mohamed Amine's virtual assistant. \n\nI'm here to help you learn about Mohamed Amine Ezzaouia - a **Computer and Financial Technology Engineer** specializing in **FinTech development**, **AI automation**, and **quantitative finance**.\n\nAsk me about his experience, projects, skills, or anything else you'd like to know! 🚀";

/// Canned questions offered next to the input box. Submitting one follows
/// the exact same path as typed input.
pub const QUICK_QUESTIONS: [&str; 7] = [
    "Tell me about Mohamed Amine's background and education",
    "What is Mohamed Amine's experience in FinTech and AI?",
    "What are his technical skills and programming languages?",
    "What professional certifications does he have?",
    "Tell me about his leadership experience in IEEE and Rotaract",
    "What are his current work achievements at Vermeg?",
    "How can I contact Mohamed Amine for opportunities?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Awaiting,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("a request is already in flight")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The relay answered; an assistant turn was appended.
    Answered,
    /// The relay failed; the fallback turn was appended instead.
    Fallback,
    /// The widget's token was cancelled; no turn was appended.
    Cancelled,
}

/// Client conversational state machine. Holds the ordered turn list and a
/// two-phase lifecycle: `Idle`, or `Awaiting` exactly one in-flight relay
/// call. Submissions while `Awaiting` are rejected rather than raced.
pub struct ChatWidget<R: Relay> {
    relay: R,
    messages: Vec<Message>,
    phase: Phase,
    cancel: CancellationToken,
}

impl<R: Relay> ChatWidget<R> {
    pub fn new(relay: R) -> Self {
        Self {
            relay,
            messages: vec![Message::new(Role::Assistant, GREETING)],
            phase: Phase::Idle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Token observed by in-flight submissions. Cancel it on teardown to
    /// abandon the pending relay call; the widget returns to `Idle` without
    /// appending a turn.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drop the whole history and reseed the greeting, whatever the phase.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.messages.push(Message::new(Role::Assistant, GREETING));
        self.phase = Phase::Idle;
    }

    /// Submit one message: append the user turn, await the relay, append
    /// the assistant (or fallback) turn. The single entry point shared by
    /// the input box, the quick questions and any external trigger.
    pub async fn submit(&mut self, text: &str) -> Result<Outcome, SubmitError> {
        let text = self.begin(text)?;

        let outcome = tokio::select! {
            _ = self.cancel.cancelled() => None,
            reply = self.relay.send(&text) => Some(reply),
        };

        self.phase = Phase::Idle;

        match outcome {
            None => Ok(Outcome::Cancelled),
            Some(Ok(reply)) => {
                self.messages.push(Message::new(Role::Assistant, &reply));
                Ok(Outcome::Answered)
            }
            Some(Err(err)) => {
                warn!("relay call failed: {err:#}");
                self.messages.push(Message::new(
                    Role::Assistant,
                    Failure::RelayUnavailable.user_message(),
                ));
                Ok(Outcome::Fallback)
            }
        }
    }

    fn begin(&mut self, text: &str) -> Result<String, SubmitError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.phase == Phase::Awaiting {
            return Err(SubmitError::Busy);
        }

        self.messages.push(Message::new(Role::User, text));
        self.phase = Phase::Awaiting;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};

    use super::*;

    struct FixedRelay(&'static str);

    #[async_trait::async_trait]
    impl Relay for FixedRelay {
        async fn send(&self, _message: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRelay;

    #[async_trait::async_trait]
    impl Relay for FailingRelay {
        async fn send(&self, _message: &str) -> Result<String> {
            bail!("connection reset by peer");
        }
    }

    struct PendingRelay;

    #[async_trait::async_trait]
    impl Relay for PendingRelay {
        async fn send(&self, _message: &str) -> Result<String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn starts_with_the_seeded_greeting() {
        let widget = ChatWidget::new(FixedRelay("unused"));

        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].role, Role::Assistant);
        assert_eq!(widget.messages()[0].content, GREETING);
        assert_eq!(widget.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn submit_appends_user_and_assistant_turns() {
        let mut widget = ChatWidget::new(FixedRelay("mohamedamineezzaouia3@gmail.com"));

        let outcome = widget.submit("What is your email?").await.unwrap();

        assert_eq!(outcome, Outcome::Answered);
        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "What is your email?");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "mohamedamineezzaouia3@gmail.com");
        assert_eq!(widget.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn relay_failure_appends_the_fallback_turn() {
        let mut widget = ChatWidget::new(FailingRelay);

        let outcome = widget.submit("anything at all").await.unwrap();

        assert_eq!(outcome, Outcome::Fallback);
        let messages = widget.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2]
            .content
            .contains("mohamedamineezzaouia3@gmail.com"));
        assert!(!messages[2].content.contains("Failed to generate response"));
    }

    #[tokio::test]
    async fn blank_input_appends_nothing_and_sends_nothing() {
        let mut widget = ChatWidget::new(FailingRelay);

        assert_eq!(widget.submit("").await, Err(SubmitError::Empty));
        assert_eq!(widget.submit("   \n\t").await, Err(SubmitError::Empty));
        assert_eq!(widget.messages().len(), 1);
    }

    #[tokio::test]
    async fn submissions_are_rejected_while_awaiting() {
        let mut widget = ChatWidget::new(FixedRelay("unused"));

        widget.begin("first question").unwrap();
        assert_eq!(widget.phase(), Phase::Awaiting);
        assert_eq!(widget.begin("second question"), Err(SubmitError::Busy));
        assert_eq!(widget.submit("third question").await, Err(SubmitError::Busy));
    }

    #[tokio::test]
    async fn reset_restores_exactly_the_greeting() {
        let mut widget = ChatWidget::new(FixedRelay("hello"));
        widget.submit("one").await.unwrap();
        widget.submit("two").await.unwrap();
        assert_eq!(widget.messages().len(), 5);

        widget.reset();

        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.messages()[0].content, GREETING);
        assert_eq!(widget.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn cancellation_abandons_the_inflight_call() {
        let mut widget = ChatWidget::new(PendingRelay);
        let token = widget.cancellation_token();

        tokio::spawn(async move {
            token.cancel();
        });

        let outcome = widget.submit("hello?").await.unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        // The user turn stays; no assistant turn was appended.
        assert_eq!(widget.messages().len(), 2);
        assert_eq!(widget.phase(), Phase::Idle);
    }
}
