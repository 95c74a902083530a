use serde::Serialize;

use super::{Cursor, ResponseBudget, SearchScope, TokenError};
use crate::Result;

/// Ordered, resumable supply of candidate objects for one search.
///
/// Each candidate comes with the cursor that resumes at it. Cursors strictly
/// increase along the iteration, so a source free to choose its own cursor
/// (a genomic position, say) can resume without regenerating earlier pages.
pub trait CandidateSource {
    type Item: Serialize;

    /// Candidates whose cursor is at least `offset`, in natural order.
    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)>;
}

/// Adapts any iterator into a source whose cursor is the item index.
/// Resuming skips, so it suits short in-memory lists.
pub struct Sequential<I>(pub I);

impl<I> CandidateSource for Sequential<I>
where
    I: Iterator,
    I::Item: Serialize,
{
    type Item = I::Item;

    fn resume_at(self, offset: u64) -> impl Iterator<Item = (u64, Self::Item)> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        self.0
            .enumerate()
            .skip(skip)
            .map(|(index, item)| (index as u64, item))
    }
}

/// One page of results and the token resuming after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: String,
}

/// Slices candidate sources into pages bounded by object count and
/// serialized size.
#[derive(Debug, Clone, Copy)]
pub struct SearchPaginator {
    max_response_length: usize,
}

impl SearchPaginator {
    pub fn new(max_response_length: usize) -> Self {
        Self {
            max_response_length,
        }
    }

    pub fn max_response_length(&self) -> usize {
        self.max_response_length
    }

    /// Produces the page addressed by `page_token`. `page_size` must already
    /// be validated as positive.
    pub fn paginate<S>(
        &self,
        source: S,
        page_size: usize,
        page_token: &str,
        scope: &SearchScope,
    ) -> Result<Page<S::Item>>
    where
        S: CandidateSource,
    {
        let fingerprint = scope.fingerprint();
        let offset = match Cursor::decode(page_token)? {
            Cursor::Start => 0,
            Cursor::Index { offset, scope } if scope == fingerprint => offset,
            Cursor::Index { .. } => return Err(TokenError::ScopeMismatch.into()),
            Cursor::Range { .. } => return Err(TokenError::WrongShape.into()),
        };

        let mut budget = ResponseBudget::new(self.max_response_length);
        let mut candidates = source.resume_at(offset).peekable();
        let mut items = Vec::new();

        while items.len() < page_size {
            let Some((_, candidate)) = candidates.peek() else {
                break;
            };
            let size = serde_json::to_vec(candidate)?.len();
            if !budget.admit(size) {
                break;
            }
            items.extend(candidates.next().map(|(_, item)| item));
        }

        let next_page_token = match candidates.peek() {
            Some(&(cursor, _)) => Cursor::Index {
                offset: cursor,
                scope: fingerprint,
            }
            .encode(),
            None => String::new(),
        };

        tracing::trace!(
            offset,
            returned = items.len(),
            bytes = budget.used(),
            more = !next_page_token.is_empty(),
            "paginated search"
        );

        Ok(Page {
            items,
            next_page_token,
        })
    }
}
