/// Serialized-size accounting for one response page.
///
/// The first admission always succeeds, even when it alone exceeds the
/// limit, so a page over a non-empty source is never empty.
#[derive(Debug, Clone)]
pub struct ResponseBudget {
    limit: usize,
    used: usize,
    admitted: usize,
}

impl ResponseBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            used: 0,
            admitted: 0,
        }
    }

    /// Admits one indivisible object of `size` bytes if it fits.
    pub fn admit(&mut self, size: usize) -> bool {
        if self.admitted > 0 && self.used.saturating_add(size) > self.limit {
            return false;
        }
        self.used = self.used.saturating_add(size);
        self.admitted += 1;
        true
    }

    /// Grants the largest prefix of `wanted` divisible bytes that fits.
    /// An empty page always gets at least one byte when any are wanted.
    pub fn take(&mut self, wanted: usize) -> usize {
        let mut granted = wanted.min(self.remaining());
        if granted == 0 && self.admitted == 0 {
            granted = wanted.min(1);
        }
        if granted > 0 {
            self.used = self.used.saturating_add(granted);
            self.admitted += 1;
        }
        granted
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.used)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
