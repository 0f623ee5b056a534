//! Splitting source text into segments and pages.
//!
//! Lines are grouped into segments of `segment_size` lines. A full segment is
//! joined (each line followed by `\n`) and cut into pages of `page_size`
//! characters. The trailing short segment is, by default, paginated one line
//! at a time without line terminators; [`TailPagination::Joined`] treats it
//! like a full segment instead.

use std::num::NonZeroUsize;

use serde::Deserialize;

/// How the trailing partial segment is paginated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TailPagination {
    /// Each line is paginated on its own and the pages concatenated
    #[default]
    PerLine,
    /// Lines are joined like a full segment first
    Joined,
}

/// Lazy iterator over fixed-size chunks of a text block.
///
/// Chunks are measured in characters, so a page never splits a multi-byte
/// character. Only the last chunk may be shorter than the page size.
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    rest: &'a str,
    page_size: usize,
}

impl<'a> Pages<'a> {
    pub fn new(text: &'a str, page_size: NonZeroUsize) -> Self {
        Pages {
            rest: text,
            page_size: page_size.get(),
        }
    }
}

impl<'a> Iterator for Pages<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .nth(self.page_size)
            .map_or(self.rest.len(), |(i, _)| i);
        let (page, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(page)
    }
}

/// Cut `text` into pages of `page_size` characters. Empty text has no pages.
pub fn paginate(text: &str, page_size: NonZeroUsize) -> Vec<String> {
    Pages::new(text, page_size).map(str::to_owned).collect()
}

/// An ordered group of pages carved from consecutive source lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pages: Vec<String>,
}

impl Segment {
    pub fn new(pages: Vec<String>) -> Self {
        Segment { pages }
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Group `lines` into segments and paginate each one.
///
/// Yields `floor(N / segment_size)` full segments plus one trailing segment
/// when `N % segment_size != 0`. An empty source yields no segments.
pub fn segment_lines<S: AsRef<str>>(
    lines: &[S],
    segment_size: NonZeroUsize,
    page_size: NonZeroUsize,
    tail: TailPagination,
) -> Vec<Segment> {
    lines
        .chunks(segment_size.get())
        .map(|chunk| {
            if chunk.len() == segment_size.get() || tail == TailPagination::Joined {
                paginate_joined(chunk, page_size)
            } else {
                paginate_per_line(chunk, page_size)
            }
        })
        .collect()
}

fn paginate_joined<S: AsRef<str>>(lines: &[S], page_size: NonZeroUsize) -> Segment {
    let mut block = String::new();
    for line in lines {
        block.push_str(line.as_ref());
        block.push('\n');
    }
    Segment::new(paginate(&block, page_size))
}

fn paginate_per_line<S: AsRef<str>>(lines: &[S], page_size: NonZeroUsize) -> Segment {
    let pages = lines
        .iter()
        .flat_map(|line| Pages::new(line.as_ref(), page_size))
        .map(str::to_owned)
        .collect();
    Segment::new(pages)
}
