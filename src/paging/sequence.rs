use super::{Cursor, ResponseBudget, TokenError};
use crate::{Error, Result};

/// One chunk of a contiguous byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePage {
    /// Half-open `[offset, offset + len)` slice of the underlying sequence.
    pub offset: u64,
    pub len: u64,
    pub next_page_token: String,
}

/// Pages through `[start, end)` of a sequence of known length, one
/// budget-sized chunk per request.
#[derive(Debug, Clone, Copy)]
pub struct SequenceRangePager {
    max_response_length: usize,
}

impl SequenceRangePager {
    pub fn new(max_response_length: usize) -> Self {
        Self {
            max_response_length,
        }
    }

    /// Plans the chunk addressed by `page_token` within `[start, end)`.
    ///
    /// The range is checked against `length` before the token is looked at,
    /// so an out-of-bounds request fails the same way with or without one.
    pub fn page(&self, start: i64, end: i64, length: u64, page_token: &str) -> Result<RangePage> {
        let out_of_bounds = || Error::RangeOutOfBounds { start, end, length };
        let (start, end) = match (u64::try_from(start), u64::try_from(end)) {
            (Ok(s), Ok(e)) if s <= e && e <= length => (s, e),
            _ => return Err(out_of_bounds()),
        };

        let offset = match Cursor::decode(page_token)? {
            Cursor::Start => start,
            Cursor::Range {
                offset,
                start: token_start,
                end: token_end,
            } => {
                if token_start != start || token_end != end {
                    return Err(TokenError::RangeMismatch {
                        start: token_start,
                        end: token_end,
                    }
                    .into());
                }
                // Tokens are only minted for offsets strictly inside the range.
                if offset <= start || offset >= end {
                    return Err(TokenError::Malformed.into());
                }
                offset
            }
            Cursor::Index { .. } => return Err(TokenError::WrongShape.into()),
        };

        let wanted = usize::try_from(end - offset).unwrap_or(usize::MAX);
        let len = ResponseBudget::new(self.max_response_length).take(wanted) as u64;

        let next = offset + len;
        let next_page_token = if next < end {
            Cursor::Range {
                offset: next,
                start,
                end,
            }
            .encode()
        } else {
            String::new()
        };

        Ok(RangePage {
            offset,
            len,
            next_page_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENCE: &[u8] = b"ACGTTGCAAC";

    fn fetch_all(budget: usize, start: i64, end: i64) -> Vec<u8> {
        let pager = SequenceRangePager::new(budget);
        let mut token = String::new();
        let mut out = Vec::new();
        let mut expected_offset = start as u64;
        loop {
            let page = pager.page(start, end, SEQUENCE.len() as u64, &token).unwrap();
            assert_eq!(page.offset, expected_offset);
            let from = page.offset as usize;
            out.extend_from_slice(&SEQUENCE[from..from + page.len as usize]);
            expected_offset += page.len;
            if page.next_page_token.is_empty() {
                return out;
            }
            assert!(page.len > 0);
            token = page.next_page_token;
        }
    }

    #[test]
    fn test_concatenation_reproduces_range() {
        let length = SEQUENCE.len();
        for budget in [1, 2, length - 1, length, 1000] {
            assert_eq!(fetch_all(budget, 0, length as i64), SEQUENCE);
            assert_eq!(fetch_all(budget, 5, 10), &SEQUENCE[5..10]);
            assert_eq!(fetch_all(budget, 5, 6), &SEQUENCE[5..6]);
        }
    }

    #[test]
    fn test_first_page_is_budget_prefix() {
        let page = SequenceRangePager::new(2).page(3, 10, 10, "").unwrap();
        assert_eq!(page.offset, 3);
        assert_eq!(page.len, 2);
        assert!(!page.next_page_token.is_empty());
    }

    #[test]
    fn test_zero_width_range() {
        let page = SequenceRangePager::new(5).page(4, 4, 10, "").unwrap();
        assert_eq!(page.len, 0);
        assert_eq!(page.offset, 4);
        assert_eq!(page.next_page_token, "");

        let page = SequenceRangePager::new(5).page(10, 10, 10, "").unwrap();
        assert_eq!(page.len, 0);
    }

    #[test]
    fn test_bounds_rejected() {
        let pager = SequenceRangePager::new(5);
        for (start, end) in [(-1, 0), (-1, -1), (10, 0), (0, 11), (3, 2)] {
            let err = pager.page(start, end, 10, "").unwrap_err();
            assert!(
                matches!(err, Error::RangeOutOfBounds { .. }),
                "[{start}, {end}) gave {err:?}"
            );
        }
    }

    #[test]
    fn test_token_range_must_match_request() {
        let pager = SequenceRangePager::new(2);
        let first = pager.page(0, 10, 10, "").unwrap();
        let err = pager.page(0, 9, 10, &first.next_page_token).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidPageToken(TokenError::RangeMismatch { start: 0, end: 10 })
        ));
    }

    #[test]
    fn test_foreign_tokens_rejected() {
        let pager = SequenceRangePager::new(2);
        let index = Cursor::Index { offset: 2, scope: 7 }.encode();
        assert!(matches!(
            pager.page(0, 10, 10, &index),
            Err(Error::InvalidPageToken(TokenError::WrongShape))
        ));

        let outside = Cursor::Range { offset: 10, start: 0, end: 10 }.encode();
        assert!(matches!(
            pager.page(0, 10, 10, &outside),
            Err(Error::InvalidPageToken(TokenError::Malformed))
        ));

        assert!(matches!(
            pager.page(0, 10, 10, "not a token"),
            Err(Error::InvalidPageToken(_))
        ));
    }
}
