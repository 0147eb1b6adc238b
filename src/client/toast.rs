//! Shared error channel for the client stores.
//!
//! Every failed action funnels through one `Notifier`, which drives a
//! single toast in the demo UI. The channel stores the *kind* of failure,
//! not a rendered string, so the visible message follows the active
//! language when the user switches it after the toast appeared.

use std::cell::RefCell;

/// What went wrong, independent of display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKey {
    NotFound,
    ActionFailed,
}

/// Injected into the store registry at construction so tests can capture
/// reports instead of toasting.
pub trait Notifier {
    fn report(&self, key: ToastKey);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    Nl,
    #[default]
    En,
    Fr,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Nl => write!(f, "nl"),
            Language::En => write!(f, "en"),
            Language::Fr => write!(f, "fr"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nl" => Ok(Language::Nl),
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            _ => Err(format!("Invalid language: {}", s)),
        }
    }
}

fn text(language: Language, key: ToastKey) -> &'static str {
    match (language, key) {
        (Language::Nl, ToastKey::NotFound) => "Niet gevonden",
        (Language::Nl, ToastKey::ActionFailed) => "Er is iets fout gegaan",
        (Language::En, ToastKey::NotFound) => "Not found",
        (Language::En, ToastKey::ActionFailed) => "Something went wrong",
        (Language::Fr, ToastKey::NotFound) => "Non trouvé",
        (Language::Fr, ToastKey::ActionFailed) => "Une erreur s'est produite",
    }
}

#[derive(Debug, Default)]
struct ToastState {
    language: Language,
    last: Option<ToastKey>,
}

/// The demo's toast message store.
#[derive(Debug, Default)]
pub struct ToastChannel {
    state: RefCell<ToastState>,
}

impl ToastChannel {
    pub fn new(language: Language) -> Self {
        Self {
            state: RefCell::new(ToastState {
                language,
                last: None,
            }),
        }
    }

    pub fn language(&self) -> Language {
        self.state.borrow().language
    }

    pub fn set_language(&self, language: Language) {
        self.state.borrow_mut().language = language;
    }

    /// The message for the last reported failure, rendered in the current
    /// language at call time.
    pub fn message(&self) -> Option<String> {
        let state = self.state.borrow();
        state.last.map(|key| text(state.language, key).to_string())
    }

    pub fn clear(&self) {
        self.state.borrow_mut().last = None;
    }
}

impl Notifier for ToastChannel {
    fn report(&self, key: ToastKey) {
        self.state.borrow_mut().last = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_message_before_first_report() {
        let channel = ToastChannel::new(Language::En);
        assert_eq!(channel.message(), None);
    }

    #[test]
    fn test_message_follows_language_switch() {
        let channel = ToastChannel::new(Language::En);
        channel.report(ToastKey::ActionFailed);
        assert_eq!(channel.message().unwrap(), "Something went wrong");

        channel.set_language(Language::Nl);
        assert_eq!(channel.message().unwrap(), "Er is iets fout gegaan");

        channel.set_language(Language::Fr);
        assert_eq!(channel.message().unwrap(), "Une erreur s'est produite");
    }

    #[test]
    fn test_clear_removes_standing_toast() {
        let channel = ToastChannel::new(Language::En);
        channel.report(ToastKey::NotFound);
        channel.clear();
        assert_eq!(channel.message(), None);
    }
}
