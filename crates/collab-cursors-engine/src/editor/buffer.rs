//! Shadow copy of the host text.

use std::borrow::Cow;
use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

/// Rope-backed text addressed in character offsets.
///
/// The rope measures bytes; every public offset here counts `char`s and is
/// converted at the edge.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from(text),
        }
    }

    pub fn len_chars(&self) -> usize {
        self.as_cow().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len() == 0
    }

    pub fn as_cow(&self) -> Cow<'_, str> {
        self.rope.slice_to_cow(0..self.rope.len())
    }

    pub fn insert(&mut self, index: usize, text: &str) {
        let at = self.byte_offset(index);
        self.edit(at..at, Some(text));
    }

    pub fn delete(&mut self, index: usize, length: usize) {
        let bytes = self.byte_range(index..index + length);
        self.edit(bytes, None);
    }

    /// Replace the whole buffer
    pub fn set(&mut self, text: &str) {
        self.rope = Rope::from(text);
    }

    fn edit(&mut self, bytes: Range<usize>, text: Option<&str>) {
        let mut builder = Builder::new(self.rope.len());
        match text {
            Some(text) => builder.replace(bytes, Rope::from(text)),
            None => builder.delete(bytes),
        }
        let delta = builder.build();
        self.rope = delta.apply(&self.rope);
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.byte_range(index..index).start
    }

    fn byte_range(&self, chars: Range<usize>) -> Range<usize> {
        let text = self.as_cow();
        let mut offsets = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()));
        let start = offsets.nth(chars.start).unwrap_or(text.len());
        let end = if chars.end > chars.start {
            offsets
                .nth(chars.end - chars.start - 1)
                .unwrap_or(text.len())
        } else {
            start
        };
        start..end
    }
}

impl std::fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_cow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_delete_by_character() {
        let mut buffer = TextBuffer::new("hello world");
        buffer.insert(0, "X ");
        assert_eq!(buffer.to_string(), "X hello world");

        buffer.delete(0, 2);
        assert_eq!(buffer.to_string(), "hello world");
    }

    #[test]
    fn test_multibyte_offsets_count_characters() {
        let mut buffer = TextBuffer::new("héllo wörld");
        assert_eq!(buffer.len_chars(), 11);

        buffer.delete(1, 4);
        assert_eq!(buffer.to_string(), "h wörld");

        buffer.insert(3, "ö");
        assert_eq!(buffer.to_string(), "h wöörld");
    }

    #[test]
    fn test_insert_at_end() {
        let mut buffer = TextBuffer::new("ab");
        buffer.insert(2, "c");
        assert_eq!(buffer.to_string(), "abc");
    }

    #[test]
    fn test_set_replaces_everything() {
        let mut buffer = TextBuffer::new("old");
        buffer.set("");
        assert!(buffer.is_empty());
        buffer.set("new text");
        assert_eq!(buffer.len_chars(), 8);
    }
}
