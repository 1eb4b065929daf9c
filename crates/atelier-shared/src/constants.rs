/// Studio name shown in the info endpoint and outbound mail
pub const STUDIO_NAME: &str = "Atelier";

/// Every contact submission is delivered to this mailbox
pub const DEFAULT_RECIPIENT: &str = "kontakt@atelier.example";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default SMTP port (implicit TLS)
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Number of curated gallery items returned by the featured listing
pub const DEFAULT_FEATURED_LIMIT: usize = 12;

/// File extensions accepted by the gallery directory scan (lowercase)
pub const GALLERY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "avif"];

// User-facing status messages (German, surfaced verbatim)

pub const MSG_MISSING_FIELDS: &str = "Name, E-Mail und Nachricht sind erforderlich";
pub const MSG_SMTP_VERIFY_FAILED: &str =
    "SMTP-Verbindung fehlgeschlagen. Bitte überprüfen Sie die Serverkonfiguration.";
pub const MSG_SEND_FAILED: &str = "Fehler beim Senden der E-Mail";
pub const MSG_SENT: &str = "E-Mail erfolgreich gesendet";
pub const MSG_INVALID_REQUEST: &str = "Ungültige Anfrage";

pub const MSG_FORM_SUBMITTING: &str = "Wird gesendet...";
pub const MSG_FORM_SUCCESS: &str = "Vielen Dank! Ihre Nachricht wurde gesendet.";
pub const MSG_FORM_HANDOFF: &str = "Ihr E-Mail-Programm wurde geöffnet.";
pub const MSG_FORM_RETRY: &str =
    "Etwas ist schiefgelaufen. Bitte versuchen Sie es später erneut.";
