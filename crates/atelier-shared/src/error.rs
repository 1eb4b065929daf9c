use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// One or more of name, email, message is blank. The display text is
    /// the user-facing message; the payload lists the offending fields.
    #[error("Name, E-Mail und Nachricht sind erforderlich")]
    MissingFields(Vec<&'static str>),
}
