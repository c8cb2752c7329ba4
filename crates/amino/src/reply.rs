//! Assistant-voice wording for the failure classes a visitor can hit. The
//! relay layer and the chat widget both pull from this mapping, so the two
//! sides never diverge on what the user is told.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The completion service answered successfully but with no content.
    EmptyCompletion,
    /// The relay endpoint could not be reached or reported an error.
    RelayUnavailable,
}

impl Failure {
    pub fn user_message(self) -> &'static str {
        match self {
            Failure::EmptyCompletion => {
                "I'm sorry, I couldn't generate a response. Please try again."
            }
            Failure::RelayUnavailable => {
                "I apologize, but I'm experiencing some technical difficulties. \
                 Please try asking your question again, or feel free to contact \
                 Mohamed Amine directly at mohamedamineezzaouia3@gmail.com"
            }
        }
    }
}
