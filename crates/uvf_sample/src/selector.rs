/// Index into a fixed-length list that wraps in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclicSelector {
    index: usize,
    len: usize,
}

impl CyclicSelector {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn len(self) -> usize {
        self.len
    }

    /// Index after the current one, wrapping to 0. Stays at 0 when empty.
    pub fn next(self) -> usize {
        if self.len == 0 {
            return 0;
        }
        (self.index + 1) % self.len
    }

    /// Index before the current one, wrapping to `len - 1`.
    pub fn previous(self) -> usize {
        if self.len == 0 {
            return 0;
        }
        (self.index + self.len - 1) % self.len
    }

    /// Jump to `index`, reduced modulo the length.
    pub fn select(&mut self, index: usize) {
        self.index = if self.len == 0 { 0 } else { index % self.len };
    }
}
