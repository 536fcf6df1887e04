/// Process health reported to the collector through the exit status.
///
/// Follows the Sensu/Nagios plugin convention: 0 ok, 3 unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Ok,
    Unknown,
}

impl Health {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Unknown => 3,
        }
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
