//! Status categories reported by the telephony platform, and the timer buckets
//! they accrue into.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an agent status event.
///
/// The discriminants are the numeric status codes sent by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusKind {
    Available = 1,
    Meeting = 2,
    DoNotDisturb = 3,
    Break = 4,
    OutToLunch = 5,
    Logout = 6,
    Login = 7,
    CallBegin = 8,
    CallEnd = 9,
}

impl StatusKind {
    /// Every category, in code order.
    pub const ALL: [Self; 9] = [
        Self::Available,
        Self::Meeting,
        Self::DoNotDisturb,
        Self::Break,
        Self::OutToLunch,
        Self::Logout,
        Self::Login,
        Self::CallBegin,
        Self::CallEnd,
    ];

    /// Resolves a platform status code. Unknown codes yield `None`.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Available),
            2 => Some(Self::Meeting),
            3 => Some(Self::DoNotDisturb),
            4 => Some(Self::Break),
            5 => Some(Self::OutToLunch),
            6 => Some(Self::Logout),
            7 => Some(Self::Login),
            8 => Some(Self::CallBegin),
            9 => Some(Self::CallEnd),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Canonical lower-case name, as used for counter keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Meeting => "meeting",
            Self::DoNotDisturb => "do not disturb",
            Self::Break => "break",
            Self::OutToLunch => "out to lunch",
            Self::Logout => "logout",
            Self::Login => "login",
            Self::CallBegin => "in call begin",
            Self::CallEnd => "in call end",
        }
    }

    /// Available, Meeting, DoNotDisturb, Break and OutToLunch.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(
            self,
            Self::Available | Self::Meeting | Self::DoNotDisturb | Self::Break | Self::OutToLunch
        )
    }

    /// The timer bucket time spent in this status accrues into.
    ///
    /// Login and CallEnd are instantaneous and never accrue time.
    #[must_use]
    pub const fn bucket(self) -> Option<Bucket> {
        match self {
            Self::Available => Some(Bucket::Available),
            Self::Meeting => Some(Bucket::Meeting),
            Self::DoNotDisturb => Some(Bucket::DoNotDisturb),
            Self::Break => Some(Bucket::Break),
            Self::OutToLunch => Some(Bucket::OutToLunch),
            Self::Logout => Some(Bucket::Logout),
            Self::CallBegin => Some(Bucket::InCall),
            Self::Login | Self::CallEnd => None,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "meeting" => Ok(Self::Meeting),
            "do not disturb" => Ok(Self::DoNotDisturb),
            "break" => Ok(Self::Break),
            "out to lunch" => Ok(Self::OutToLunch),
            "logout" => Ok(Self::Logout),
            "login" => Ok(Self::Login),
            "in call begin" | "call begin" => Ok(Self::CallBegin),
            "in call end" | "call end" => Ok(Self::CallEnd),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for StatusKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown status names.
#[derive(Debug, Clone)]
pub struct UnknownStatus(String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// A named duration accumulator.
///
/// Call time accrues into `in call`, which is distinct from the
/// `in call begin` / `in call end` event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bucket {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "meeting")]
    Meeting,
    #[serde(rename = "do not disturb")]
    DoNotDisturb,
    #[serde(rename = "break")]
    Break,
    #[serde(rename = "out to lunch")]
    OutToLunch,
    #[serde(rename = "logout")]
    Logout,
    #[serde(rename = "in call")]
    InCall,
}

impl Bucket {
    pub const ALL: [Self; 7] = [
        Self::Available,
        Self::Meeting,
        Self::DoNotDisturb,
        Self::Break,
        Self::OutToLunch,
        Self::Logout,
        Self::InCall,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Meeting => "meeting",
            Self::DoNotDisturb => "do not disturb",
            Self::Break => "break",
            Self::OutToLunch => "out to lunch",
            Self::Logout => "logout",
            Self::InCall => "in call",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved status: what the agent is doing and since when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    /// Lower-cased status name as reported.
    pub name: String,
    /// Epoch milliseconds.
    pub time: i64,
}

impl Status {
    pub fn new(kind: StatusKind, name: impl Into<String>, time: i64) -> Self {
        Self {
            kind,
            name: name.into(),
            time,
        }
    }

    /// The fallback status used whenever nothing else is known.
    #[must_use]
    pub fn available(time: i64) -> Self {
        Self::new(StatusKind::Available, StatusKind::Available.as_str(), time)
    }

    /// Same status, moved forward to `time`.
    #[must_use]
    pub fn advanced_to(mut self, time: i64) -> Self {
        self.time = time;
        self
    }
}
