/// Byte cursor over a text run, used by the delimiter scanners.
///
/// Positions are byte offsets into `s`. Callers only stop on ASCII
/// delimiters, so slices taken between stops stay on char boundaries.
#[derive(Clone)]
pub struct Cursor<'a> {
    pub s: &'a str,
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.peek_at(self.i)
    }

    pub fn peek_at(&self, at: usize) -> Option<u8> {
        self.s.as_bytes().get(at).copied()
    }

    /// Advances by one char (not one byte), returning it.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.s.get(self.i..)?.chars().next()?;
        self.i += c.len_utf8();
        Some(c)
    }

    pub fn seek(&mut self, at: usize) {
        self.i = at.min(self.s.len());
    }

    /// Number of consecutive backslashes immediately before `at`.
    pub fn backslashes_before(&self, at: usize) -> usize {
        self.s.as_bytes()[..at.min(self.s.len())]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count()
    }

    /// A byte is escaped when an odd number of backslashes precede it.
    pub fn is_escaped(&self, at: usize) -> bool {
        self.backslashes_before(at) % 2 == 1
    }

    /// First unescaped occurrence of `byte` at or after `from` for which
    /// `accept` holds.
    pub fn find_unescaped(
        &self,
        byte: u8,
        from: usize,
        mut accept: impl FnMut(usize) -> bool,
    ) -> Option<usize> {
        let bytes = self.s.as_bytes();
        (from..bytes.len()).find(|&at| bytes[at] == byte && !self.is_escaped(at) && accept(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hé$");
        assert_eq!(cur.pos(), 0);
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.bump_char(), Some('h'));
        assert_eq!(cur.bump_char(), Some('é'));
        assert_eq!(cur.pos(), 3);
        assert_eq!(cur.peek(), Some(b'$'));
        assert_eq!(cur.bump_char(), Some('$'));
        assert!(cur.eof());
        assert_eq!(cur.bump_char(), None);
    }

    #[test]
    fn empty_string_input() {
        let cur = Cursor::new("");
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.backslashes_before(0), 0);
    }

    #[test]
    fn counts_preceding_backslashes() {
        let cur = Cursor::new(r"a\$ b\\$ c\\\$");
        assert!(cur.is_escaped(2));
        assert!(!cur.is_escaped(7));
        assert_eq!(cur.backslashes_before(13), 3);
        assert!(cur.is_escaped(13));
    }

    #[test]
    fn find_unescaped_skips_escaped_and_rejected_bytes() {
        let cur = Cursor::new(r"\$ $$ $");
        assert_eq!(cur.find_unescaped(b'$', 0, |_| true), Some(3));
        assert_eq!(cur.find_unescaped(b'$', 0, |at| at > 4), Some(6));
        assert_eq!(cur.find_unescaped(b'#', 0, |_| true), None);
    }

    #[test]
    fn seek_clamps_to_end() {
        let mut cur = Cursor::new("hi");
        cur.seek(10);
        assert!(cur.eof());
        assert_eq!(cur.pos(), 2);
    }
}
