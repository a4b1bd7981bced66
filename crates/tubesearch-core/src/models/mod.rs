pub mod backend;
pub mod error;
pub mod request;
pub mod search;
pub mod session;

pub use backend::{BackendDescriptor, BackendVariant, Operation};
pub use error::{CoreError, CoreErrorKind};
pub use request::{RequestSeq, SearchTicket, SignInAttempt};
pub use search::{DEFAULT_MAX_RESULTS, ResultList, SearchRequest, SearchResultItem, is_blank_query};
pub use session::{Session, SessionUser};
