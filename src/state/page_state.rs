/// Page status definitions for stored comic pages
///
/// Every stored page carries a status saying how its walk ended, so a genuine
/// last page can be told apart from a page whose successor simply could not
/// be reached.
use std::fmt;

/// How the walk left a stored page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// A next-page link was found on the page
    Linked,

    /// No next-page link was found, but the page was not judged the last one
    Unlinked,

    /// The site's last-page predicate fired for this page
    Last,
}

impl PageStatus {
    /// Returns true if the walk stopped at this page on purpose
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Last)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::Last => "last",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "linked" => Some(Self::Linked),
            "unlinked" => Some(Self::Unlinked),
            "last" => Some(Self::Last),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![Self::Linked, Self::Unlinked, Self::Last]
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
