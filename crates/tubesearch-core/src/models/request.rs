use std::fmt::{Display, Formatter};

use crate::models::SearchRequest;

/// Sequence number of an issued search. Later searches always get larger values.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RequestSeq(pub u64);

impl Display for RequestSeq {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A search the view has committed to. Only the outcome carrying the same
/// `seq` as the view's outstanding ticket is ever applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchTicket {
    pub seq: RequestSeq,
    pub request: SearchRequest,
}

/// Identifies one sign-in attempt. A cancelled attempt may still report back
/// after a newer one has started; only the current attempt's events apply.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SignInAttempt(pub u64);

impl Display for SignInAttempt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sign-in #{}", self.0)
    }
}
