#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpOutcome {
    Created,
    /// The pair was already recorded; nothing changed.
    AlreadyExists,
}
