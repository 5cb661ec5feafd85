//! Rich-text run extraction
//!
//! Flattens the inline tree of a text box into one string plus the offsets at
//! which the font changes. Adjacent chunks that resolve to the same font share
//! a run, so the output is the minimal run list for the text.

use tabex_core::{FontSpec, MAX_CELL_TEXT_CHARS};

use crate::diagnostics::{Degradation, Diagnostics};
use crate::layout::{BoxContent, ContentBox, FontOverride, InlineBox, InlineKind, RawValue};
use crate::palette::ColorResolver;

/// A font change at a character offset
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub offset: usize,
    pub font: FontSpec,
}

/// Text with at least two runs
#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    pub text: String,
    pub runs: Vec<StyledRun>,
}

/// Result of extracting a box's content
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Empty,
    Plain(String),
    Rich(StyledText),
    /// Non-text content, untouched
    Raw(RawValue),
}

/// Extract the cell value of a content box
pub fn extract(
    content: &ContentBox,
    palette: &mut dyn ColorResolver,
    diagnostics: &mut Diagnostics,
) -> Extracted {
    match &content.content {
        BoxContent::Empty => Extracted::Empty,
        BoxContent::Raw(RawValue::Text(text)) => {
            let text = limit_length(text, diagnostics);
            if text.is_empty() {
                Extracted::Empty
            } else {
                Extracted::Plain(text.to_string())
            }
        }
        BoxContent::Raw(raw) => Extracted::Raw(raw.clone()),
        BoxContent::Text(inline) => {
            let mut builder = RunBuilder::new(palette);
            for child in inline {
                builder.visit(child, &content.style.font);
            }
            builder.finish(diagnostics)
        }
    }
}

/// Cut text to at most `max_chars` characters
///
/// Applying it twice gives the same result as applying it once.
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn limit_length<'a>(text: &'a str, diagnostics: &mut Diagnostics) -> &'a str {
    let cut = truncate(text, MAX_CELL_TEXT_CHARS);
    if cut.len() < text.len() {
        diagnostics.record(
            Degradation::TextTruncated,
            format_args!("cell text cut to {MAX_CELL_TEXT_CHARS} characters"),
        );
    }
    cut
}

struct RunBuilder<'p> {
    palette: &'p mut dyn ColorResolver,
    text: String,
    chars: usize,
    runs: Vec<StyledRun>,
}

impl<'p> RunBuilder<'p> {
    fn new(palette: &'p mut dyn ColorResolver) -> Self {
        Self {
            palette,
            text: String::new(),
            chars: 0,
            runs: Vec::new(),
        }
    }

    fn visit(&mut self, node: &InlineBox, inherited: &FontOverride) {
        if !node.visible {
            return;
        }
        let font = node.font.over(inherited);
        match &node.kind {
            InlineKind::Text { chunks } => {
                for chunk in chunks {
                    if chunk.text.is_empty() {
                        continue;
                    }
                    let spec = chunk.font.over(&font).to_spec(self.palette);
                    self.push(&chunk.text, spec);
                }
            }
            InlineKind::Span { children } => {
                for child in children {
                    self.visit(child, &font);
                }
            }
            InlineKind::LineBreak => {
                if self.runs.is_empty() {
                    let spec = font.to_spec(self.palette);
                    self.push("\n", spec);
                } else {
                    self.text.push('\n');
                    self.chars += 1;
                }
            }
        }
    }

    fn push(&mut self, text: &str, font: FontSpec) {
        if self.runs.last().map_or(true, |run| run.font != font) {
            self.runs.push(StyledRun {
                offset: self.chars,
                font,
            });
        }
        self.text.push_str(text);
        self.chars += text.chars().count();
    }

    fn finish(self, diagnostics: &mut Diagnostics) -> Extracted {
        let RunBuilder {
            text, chars, mut runs, ..
        } = self;

        let text = if chars > MAX_CELL_TEXT_CHARS {
            let cut = limit_length(&text, diagnostics).to_string();
            runs.retain(|run| run.offset < MAX_CELL_TEXT_CHARS);
            cut
        } else {
            text
        };

        if text.is_empty() {
            Extracted::Empty
        } else if runs.len() <= 1 {
            Extracted::Plain(text)
        } else {
            Extracted::Rich(StyledText { text, runs })
        }
    }
}
