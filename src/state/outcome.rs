use std::fmt;

/// How a single category's pagination loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// The source ran out of pages
    Complete,

    /// Some pages were collected before a page failed
    PartialFailure {
        /// The page number that failed (always > 1)
        failed_page: u32,
        /// Error description
        reason: String,
    },

    /// The first page failed; nothing was collected
    TotalFailure {
        /// Error description
        reason: String,
    },
}

impl CategoryOutcome {
    /// Builds the outcome for a failure on page `page`
    ///
    /// Page 1 failing means nothing was collected, anything later keeps the
    /// pages already fetched.
    pub fn failed_at(page: u32, reason: impl Into<String>) -> Self {
        if page <= 1 {
            Self::TotalFailure {
                reason: reason.into(),
            }
        } else {
            Self::PartialFailure {
                failed_page: page,
                reason: reason.into(),
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }

    pub fn is_total_failure(&self) -> bool {
        matches!(self, Self::TotalFailure { .. })
    }

    /// Error description, if the category failed
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Complete => None,
            Self::PartialFailure { reason, .. } | Self::TotalFailure { reason } => Some(reason),
        }
    }
}

impl fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::PartialFailure {
                failed_page,
                reason,
            } => write!(f, "partial failure at page {}: {}", failed_page, reason),
            Self::TotalFailure { reason } => write!(f, "total failure: {}", reason),
        }
    }
}
