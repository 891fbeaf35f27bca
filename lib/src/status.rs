/// Outcome of a peer identity verification
///
/// A `Status` is an owned value. When a verification completes asynchronously the whole
/// value is moved into the completion channel, so the diagnostic text that was produced on
/// the worker is exactly the text the handshake observes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The peer identity is acceptable
    Verified,
    /// The peer identity was rejected. The diagnostic may be empty.
    Rejected(String),
}

impl Status {
    /// Construct a rejection with a diagnostic message
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// `true` if the peer identity was accepted
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Verified)
    }

    /// Diagnostic message of a rejection, `None` if verified
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Verified => None,
            Self::Rejected(msg) => Some(msg.as_str()),
        }
    }

    /// Logical AND of two statuses.
    ///
    /// When both are rejections, the messages are joined as `"<self>; <other>"`.
    pub fn and(self, other: Status) -> Status {
        match (self, other) {
            (Self::Verified, other) => other,
            (rejected, Self::Verified) => rejected,
            (Self::Rejected(first), Self::Rejected(second)) => {
                Self::Rejected(format!("{first}; {second}"))
            }
        }
    }

    /// Convert into a `Result`, mapping rejections to [`crate::Error`]
    pub fn into_result(self) -> Result<(), crate::Error> {
        match self {
            Self::Verified => Ok(()),
            Self::Rejected(msg) => Err(crate::Error::rejected(msg)),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        // an unwritten result slot must never read as success
        Self::Rejected(String::new())
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Verified => f.write_str("verified"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
        }
    }
}
