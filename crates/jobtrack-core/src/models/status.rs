//! Record status lifecycle.
//!
//! The lifecycle is a fixed ordered set: `new -> contacted -> cv_sent |
//! interview -> closed`. `cv_sent` and `interview` share a rank; whether a
//! transition may move backwards is a configurable policy, not a guess.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    New,
    Contacted,
    CvSent,
    Interview,
    Closed,
}

impl Status {
    /// Position along the lifecycle. `CvSent` and `Interview` are parallel
    /// branches at the same depth.
    pub fn rank(&self) -> u8 {
        match self {
            Status::New => 0,
            Status::Contacted => 1,
            Status::CvSent | Status::Interview => 2,
            Status::Closed => 3,
        }
    }

    pub fn all() -> &'static [Status] {
        &[
            Status::New,
            Status::Contacted,
            Status::CvSent,
            Status::Interview,
            Status::Closed,
        ]
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Status::New => write!(f, "new"),
            Status::Contacted => write!(f, "contacted"),
            Status::CvSent => write!(f, "cv_sent"),
            Status::Interview => write!(f, "interview"),
            Status::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Status::New),
            "contacted" => Ok(Status::Contacted),
            "cv_sent" => Ok(Status::CvSent),
            "interview" => Ok(Status::Interview),
            "closed" => Ok(Status::Closed),
            other => Err(anyhow::anyhow!("Invalid status: {}", other)),
        }
    }
}

/// Policy governing which status transitions are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any transition between two distinct statuses is allowed. This matches
    /// the observed behavior of the original tracker.
    #[default]
    Permissive,
    /// The lifecycle rank must not decrease, so `closed -> new` is rejected.
    ForwardOnly,
}

impl FromStr for TransitionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(TransitionPolicy::Permissive),
            "forward_only" => Ok(TransitionPolicy::ForwardOnly),
            other => Err(anyhow::anyhow!("Invalid transition policy: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in Status::all() {
            let parsed: Status = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
        assert!("archived".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Status::CvSent).unwrap(),
            "\"cv_sent\""
        );
        let parsed: Status = serde_json::from_str("\"interview\"").unwrap();
        assert_eq!(parsed, Status::Interview);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(Status::New.rank() < Status::Contacted.rank());
        assert!(Status::Contacted.rank() < Status::Closed.rank());
        assert_eq!(Status::CvSent.rank(), Status::Interview.rank());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "forward_only".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::ForwardOnly
        );
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }
}
