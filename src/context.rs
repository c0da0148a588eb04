use crate::identity::Author;
use crate::staging::EditSession;

/// state held for the lifetime of an interactive edit
pub struct AppContext {
    /// the staged draft of the resource being edited
    pub session: EditSession,

    /// author attached to every save
    pub author: Author,

    /// whether values are hidden in listings
    pub masked: bool,
}

impl AppContext {
    pub fn new(session: EditSession, author: Author, masked: bool) -> Self {
        Self {
            session,
            author,
            masked,
        }
    }
}
