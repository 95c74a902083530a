//! Stateless pagination over large or lazily produced result sets.
//!
//! All resumption state lives in the opaque page token handed back to the
//! client; nothing is kept server-side between requests.
//!
//! - [`SearchPaginator`] - pages of discrete objects from a [`CandidateSource`]
//! - [`SequenceRangePager`] - chunks of a contiguous byte range
//! - [`ResponseBudget`] - serialized-size cap shared by both
//! - [`Cursor`] - the versioned token encoding

mod budget;
mod search;
mod sequence;
mod token;

pub use budget::ResponseBudget;
pub use search::{CandidateSource, Page, SearchPaginator, Sequential};
pub use sequence::{RangePage, SequenceRangePager};
pub use token::{Cursor, SearchScope, TokenError};
