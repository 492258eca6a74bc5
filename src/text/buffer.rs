//! The mutable styled text buffer.

use std::fmt;
use std::ops::Range;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::attributes::Attributes;

/// A maximal range of text sharing one attribute set.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    len: usize,
    attributes: Attributes,
}

/// A borrowed view of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledRun<'a> {
    /// Byte range in the buffer
    pub range: Range<usize>,
    /// Text covered by the run
    pub text: &'a str,
    /// Attributes of every character in the run
    pub attributes: &'a Attributes,
}

/// Text with per-range presentation attributes.
///
/// Runs always cover the whole text: their lengths sum to `len()`, none is
/// empty, every boundary falls on a char boundary and neighbouring runs never
/// carry equal attributes. Offsets are byte offsets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    text: String,
    runs: Vec<Run>,
}

impl StyledText {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer carrying default attributes.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::with_attributes(text, Attributes::default())
    }

    /// Create a buffer with one attribute set over all of `text`.
    pub fn with_attributes(text: impl Into<String>, attributes: Attributes) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![Run {
                len: text.len(),
                attributes,
            }]
        };
        Self { text, runs }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub const fn len(&self) -> usize {
        self.text.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Attributes of the character containing byte `offset`.
    pub fn attributes_at(&self, offset: usize) -> Option<&Attributes> {
        self.runs()
            .find(|run| run.range.contains(&offset))
            .map(|run| run.attributes)
    }

    /// Iterate over all runs in order.
    pub fn runs(&self) -> impl Iterator<Item = StyledRun<'_>> {
        let mut start = 0;
        self.runs.iter().map(move |run| {
            let range = start..start + run.len;
            start = range.end;
            StyledRun {
                text: &self.text[range.clone()],
                range,
                attributes: &run.attributes,
            }
        })
    }

    /// Iterate over the runs overlapping `range`, clipped to it.
    pub fn runs_in(&self, range: Range<usize>) -> impl Iterator<Item = StyledRun<'_>> {
        self.runs().filter_map(move |run| {
            let start = run.range.start.max(range.start);
            let end = run.range.end.min(range.end);
            (start < end).then(|| StyledRun {
                text: &self.text[start..end],
                range: start..end,
                attributes: run.attributes,
            })
        })
    }

    /// Replace the text in `range` with `replacement`.
    ///
    /// The new text takes the attributes of the first replaced character. An
    /// empty range takes those of the character before it (or after it at
    /// offset 0).
    ///
    /// # Panics
    /// Panics if `range` is out of bounds or not on char boundaries.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &str) {
        assert!(
            range.start <= range.end
                && self.text.is_char_boundary(range.start)
                && self.text.is_char_boundary(range.end),
            "replace_range: {range:?} is not a valid range of a {} byte buffer",
            self.text.len()
        );
        let sample_at = if range.is_empty() && range.start > 0 {
            range.start - 1
        } else {
            range.start
        };
        let attributes = self.attributes_at(sample_at).cloned().unwrap_or_default();

        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        let inserted = (!replacement.is_empty()).then(|| Run {
            len: replacement.len(),
            attributes,
        });
        self.runs.splice(first..last, inserted);
        self.text.replace_range(range, replacement);
        self.coalesce();
    }

    /// Overwrite every attribute over `range`.
    pub fn set_attributes(&mut self, range: Range<usize>, attributes: &Attributes) {
        self.update_attributes(range, |attrs| attrs.clone_from(attributes));
    }

    /// Mutate the attributes of every run over `range`.
    ///
    /// # Panics
    /// Panics if `range` is out of bounds or not on char boundaries.
    pub fn update_attributes(&mut self, range: Range<usize>, mut f: impl FnMut(&mut Attributes)) {
        if range.is_empty() {
            return;
        }
        assert!(
            range.end <= self.text.len()
                && self.text.is_char_boundary(range.start)
                && self.text.is_char_boundary(range.end),
            "update_attributes: {range:?} is not a valid range of a {} byte buffer",
            self.text.len()
        );
        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        for run in &mut self.runs[first..last] {
            f(&mut run.attributes);
        }
        self.coalesce();
    }

    /// Mutate the attributes of the whole buffer.
    pub fn update_all(&mut self, f: impl FnMut(&mut Attributes)) {
        self.update_attributes(0..self.text.len(), f);
    }

    /// True when the run list satisfies the buffer invariants.
    pub fn is_well_formed(&self) -> bool {
        let mut offset = 0;
        let mut previous: Option<&Attributes> = None;
        for run in &self.runs {
            if run.len == 0 || previous == Some(&run.attributes) {
                return false;
            }
            offset += run.len;
            if !self.text.is_char_boundary(offset) {
                return false;
            }
            previous = Some(&run.attributes);
        }
        offset == self.text.len()
    }

    /// Ensure a run starts at `offset`; returns the index of that run (or
    /// the run count when `offset` is the end of the text).
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for index in 0..self.runs.len() {
            let len = self.runs[index].len;
            if offset == start {
                return index;
            }
            if offset < start + len {
                let head = offset - start;
                let tail = Run {
                    len: len - head,
                    attributes: self.runs[index].attributes.clone(),
                };
                self.runs[index].len = head;
                self.runs.insert(index + 1, tail);
                return index + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    fn coalesce(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..).filter(|run| run.len > 0) {
            match merged.last_mut() {
                Some(last) if last.attributes == run.attributes => last.len += run.len,
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

impl From<&str> for StyledText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for StyledText {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for StyledText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let runs: Vec<StyledRun<'_>> = self.runs().collect();
        let mut state = serializer.serialize_struct("StyledText", 2)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("runs", &runs)?;
        state.end()
    }
}
