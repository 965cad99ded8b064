use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of step kinds a conversation node can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Text,
    Image,
    Video,
    Audio,
    File,
    Location,
    #[serde(rename = "youtube_link")]
    YouTubeLink,
    QuickReply,
    ListMenu,
    TextInput,
    NumberInput,
    EmailInput,
    PhoneInput,
    DateInput,
    TimeInput,
    Link,
    Condition,
    SubflowJump,
    Webhook,
}

impl StepKind {
    pub const ALL: [StepKind; 19] = [
        StepKind::Text,
        StepKind::Image,
        StepKind::Video,
        StepKind::Audio,
        StepKind::File,
        StepKind::Location,
        StepKind::YouTubeLink,
        StepKind::QuickReply,
        StepKind::ListMenu,
        StepKind::TextInput,
        StepKind::NumberInput,
        StepKind::EmailInput,
        StepKind::PhoneInput,
        StepKind::DateInput,
        StepKind::TimeInput,
        StepKind::Link,
        StepKind::Condition,
        StepKind::SubflowJump,
        StepKind::Webhook,
    ];

    /// Steps with one outgoing port per option plus a `default` port.
    pub fn is_multi_outcome(self) -> bool {
        matches!(self, StepKind::QuickReply | StepKind::ListMenu)
    }

    /// Steps that wait for the contact to send a value and store it in a variable.
    pub fn is_input(self) -> bool {
        matches!(
            self,
            StepKind::TextInput
                | StepKind::NumberInput
                | StepKind::EmailInput
                | StepKind::PhoneInput
                | StepKind::DateInput
                | StepKind::TimeInput
        )
    }

    /// The label the visual editor uses for this kind.
    pub fn editor_label(self) -> &'static str {
        match self {
            StepKind::Text => "Text",
            StepKind::Image => "Image",
            StepKind::Video => "Video",
            StepKind::Audio => "Audio",
            StepKind::File => "File",
            StepKind::Location => "Location",
            StepKind::YouTubeLink => "YouTube",
            StepKind::QuickReply => "Quick Reply",
            StepKind::ListMenu => "List",
            StepKind::TextInput => "Text Input",
            StepKind::NumberInput => "Number Input",
            StepKind::EmailInput => "Email Input",
            StepKind::PhoneInput => "Phone Input",
            StepKind::DateInput => "Date Input",
            StepKind::TimeInput => "Time Input",
            StepKind::Link => "Link",
            StepKind::Condition => "Condition",
            StepKind::SubflowJump => "Chatbot",
            StepKind::Webhook => "Webhook",
        }
    }

    /// Resolves an editor label back to a kind. `"Text Message"` is an older
    /// alias for `Text`.
    pub fn from_editor_label(label: &str) -> Option<Self> {
        if label == "Text Message" {
            return Some(StepKind::Text);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.editor_label() == label)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
