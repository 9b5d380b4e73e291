use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_GUEST_COUNT: u32 = 10;
pub const MIN_BUDGET: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Wedding,
    Birthday,
    Corporate,
    Festival,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Wedding,
        EventType::Birthday,
        EventType::Corporate,
        EventType::Festival,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Wedding => "Wedding",
            EventType::Birthday => "Birthday",
            EventType::Corporate => "Corporate",
            EventType::Festival => "Festival",
        }
    }
}

/// Planning style chosen on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Economical,
    Balanced,
    Premium,
}

impl Preference {
    pub const ALL: [Preference; 3] = [
        Preference::Economical,
        Preference::Balanced,
        Preference::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Economical => "economical",
            Preference::Balanced => "balanced",
            Preference::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Gujarati,
    Tamil,
    Telugu,
    Kannada,
    Bengali,
    Punjabi,
    Malayalam,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::English,
        Language::Hindi,
        Language::Marathi,
        Language::Gujarati,
        Language::Tamil,
        Language::Telugu,
        Language::Kannada,
        Language::Bengali,
        Language::Punjabi,
        Language::Malayalam,
    ];

    /// Label shown in the language selector.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Tamil => "Tamil",
            Language::Telugu => "Telugu",
            Language::Kannada => "Kannada",
            Language::Bengali => "Bengali",
            Language::Punjabi => "Punjabi",
            Language::Malayalam => "Malayalam",
        }
    }

    /// Name the model is asked to reply in. Currently identical to the label.
    pub fn prompt_name(&self) -> &'static str {
        self.label()
    }
}

macro_rules! impl_label_parsing {
    ($ty:ty, $label:ident, $what:literal) => {
        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .iter()
                    .copied()
                    .find(|v| v.$label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| anyhow!("unknown {}: {}", $what, wanted))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.$label())
            }
        }
    };
}

impl_label_parsing!(EventType, as_str, "event type");
impl_label_parsing!(Preference, as_str, "preference");
impl_label_parsing!(Language, label, "language");

/// Event parameters submitted from the planning form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub event_type: EventType,
    pub guest_count: u32,
    pub location: String,
    pub budget: u64,
    pub preference: Preference,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when replaying a transcript into a prompt.
    pub fn speaker(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Planner",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub text: String,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_case_insensitive() {
        assert_eq!("wedding".parse::<EventType>().unwrap(), EventType::Wedding);
        assert_eq!(" Premium ".parse::<Preference>().unwrap(), Preference::Premium);
        assert_eq!("TAMIL".parse::<Language>().unwrap(), Language::Tamil);
        assert!("Picnic".parse::<EventType>().is_err());
    }

    #[test]
    fn test_supported_languages() {
        assert_eq!(Language::ALL.len(), 10);
        assert_eq!(Language::default(), Language::English);
        assert_eq!(Language::Malayalam.prompt_name(), "Malayalam");
    }

    #[test]
    fn test_plan_request_serde_labels() {
        let request = PlanRequest {
            event_type: EventType::Festival,
            guest_count: 120,
            location: "Surat".to_string(),
            budget: 150_000,
            preference: Preference::Economical,
            language: Language::Gujarati,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["event_type"], "Festival");
        assert_eq!(json["preference"], "economical");
        assert_eq!(json["language"], "Gujarati");
    }

    #[test]
    fn test_role_speakers() {
        assert_eq!(ConversationEntry::user("hi").role.speaker(), "User");
        assert_eq!(ConversationEntry::assistant("hello").role.speaker(), "Planner");
    }
}
