//! Identifier and value types shared by stories and player state

use serde::{Deserialize, Serialize};

/// Implements the conversions and display every string identifier needs
macro_rules! string_id {
    ($(#[$meta:meta])* $type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $type(String);

        impl $type {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl From<String> for $type {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $type {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a story
    StoryId
);
string_id!(
    /// Passage identifier, unique within a story
    PassageId
);
string_id!(
    /// Choice identifier, unique within a passage
    ChoiceId
);
string_id!(
    /// Inventory item identifier
    ItemId
);
string_id!(
    /// Name of a boolean story flag
    FlagName
);
string_id!(
    /// Name of a story variable
    VarName
);
string_id!(
    /// Logical sound cue forwarded to the audio collaborator
    SoundCue
);
string_id!(
    /// Key under which a session is persisted
    SessionKey
);

/// Value held by a story variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryValue {
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl std::fmt::Display for StoryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoryValue::Boolean(b) => write!(f, "{b}"),
            StoryValue::Integer(i) => write!(f, "{i}"),
            StoryValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for StoryValue {
    fn from(i: i64) -> Self {
        StoryValue::Integer(i)
    }
}

impl From<bool> for StoryValue {
    fn from(b: bool) -> Self {
        StoryValue::Boolean(b)
    }
}

impl From<String> for StoryValue {
    fn from(s: String) -> Self {
        StoryValue::Text(s)
    }
}

impl From<&str> for StoryValue {
    fn from(s: &str) -> Self {
        StoryValue::Text(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let id = PassageId::from("cellar");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"cellar\"");
        assert_eq!(id.to_string(), "cellar");
    }

    #[test]
    fn whitespace_identifier_counts_as_empty() {
        assert!(ChoiceId::new("  ").is_empty());
        assert!(!ChoiceId::new("a").is_empty());
    }

    #[test]
    fn story_values_deserialize_untagged() {
        let values: Vec<StoryValue> = serde_json::from_str(r#"[true, 7, "lantern"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                StoryValue::Boolean(true),
                StoryValue::Integer(7),
                StoryValue::Text("lantern".to_string()),
            ]
        );
    }
}
