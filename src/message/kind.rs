use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which message of an operation a structure describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Request,
    Response,
    Fault,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [
        MessageKind::Request,
        MessageKind::Response,
        MessageKind::Fault,
    ];

    /// Tag-name fragments identifying elements that belong to this message kind.
    pub fn patterns(self) -> &'static [&'static str] {
        match self {
            MessageKind::Request => &["_Req_", "Request", "Input", "input"],
            MessageKind::Response => &["_Resp_", "Response", "Output", "output"],
            MessageKind::Fault => &["Fault", "fault", "Error", "error", "Exception"],
        }
    }

    /// Whether a tag name contains one of this kind's patterns, compared either
    /// case-sensitively or case-insensitively.
    pub fn matches(self, tag_name: &str) -> bool {
        let lowered = tag_name.to_lowercase();
        self.patterns()
            .iter()
            .any(|p| tag_name.contains(p) || lowered.contains(&p.to_lowercase()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::Response => "response",
            MessageKind::Fault => "fault",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "request" => Ok(MessageKind::Request),
            "response" => Ok(MessageKind::Response),
            "fault" => Ok(MessageKind::Fault),
            other => Err(format!("unknown message kind '{}'", other)),
        }
    }
}
