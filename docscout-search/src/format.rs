//! Budgeted formatting of search results and page content for LLM prompts.
//!
//! Every block produced here is at most `budget` characters long (Unicode
//! scalar values, not bytes). Sections are written in rank order; the
//! remaining budget is shared evenly among the sections still to come, so
//! a long first page cannot starve the others.

use crate::config::FormatConfig;
use crate::types::{FetchedContent, FormattedBlock, SearchResult};

/// Marker appended to section text cut to fit its share of the budget.
pub const TRUNCATED_MARKER: &str = " [content truncated]";

/// Separator between entries of a plain result list.
const LIST_SEPARATOR: &str = "----------------------------------------";

/// Cut `text` to at most `max_chars` characters, ending with `marker`.
///
/// The cut falls on the last whitespace before the limit, so words are not
/// split; text with no whitespace at all is hard-cut. When not even one
/// word fits next to the marker, the result is the marker alone (without
/// its leading space), or an empty string if that does not fit either.
/// Returns the kept text and whether anything was removed.
pub(crate) fn truncate_at_boundary(text: &str, max_chars: usize, marker: &str) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_owned(), false);
    }

    let marker_chars = marker.chars().count();
    if max_chars > marker_chars {
        let keep = max_chars - marker_chars;
        let end = text
            .char_indices()
            .nth(keep)
            .map_or(text.len(), |(idx, _)| idx);
        let prefix = &text[..end];

        let cut = match prefix.rfind(char::is_whitespace) {
            Some(idx) if idx > 0 => &prefix[..idx],
            // Already on a word boundary.
            _ if text[end..].starts_with(char::is_whitespace) => prefix,
            // Text without any whitespace can only be hard-cut.
            _ if !text.contains(char::is_whitespace) => prefix,
            _ => "",
        };
        let cut = cut.trim_end();
        if !cut.is_empty() {
            return (format!("{cut}{marker}"), true);
        }
    }

    let bare = marker.trim_start();
    if bare.chars().count() <= max_chars {
        (bare.to_owned(), true)
    } else {
        (String::new(), true)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Formats ranked results and fetched pages into bounded text blocks.
#[derive(Debug, Clone, Default)]
pub struct ContentFormatter {
    config: FormatConfig,
}

struct EmittedSource<'a> {
    title: &'a str,
    url: &'a str,
    length: usize,
    truncated: bool,
}

impl ContentFormatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    /// Default budget from configuration.
    pub fn budget(&self) -> usize {
        self.config.budget_chars
    }

    /// Format result/content pairs into one block of at most `budget`
    /// characters.
    ///
    /// `heading`, if given, is written first and counts against the budget.
    /// Each pair becomes a section headed `## {rank}. {title}` followed by
    /// its source URL and extracted text. Pairs whose fetch failed keep
    /// their section with an unavailable marker in place of text.
    /// Formatting stops at the first section that no longer fits.
    pub fn format(
        &self,
        heading: Option<&str>,
        results: &[(SearchResult, FetchedContent)],
        budget: usize,
    ) -> FormattedBlock {
        let mut out = String::new();
        let mut used = 0usize;

        if let Some(heading) = heading {
            let line = format!("{heading}\n\n");
            let len = char_len(&line);
            if len <= budget {
                out.push_str(&line);
                used += len;
            }
        }

        let mut ordered: Vec<&(SearchResult, FetchedContent)> = results.iter().collect();
        ordered.sort_by_key(|(result, _)| result.rank);

        let total = ordered.len();
        let mut emitted: Vec<EmittedSource<'_>> = Vec::with_capacity(total);
        let mut truncated = false;

        for (i, (result, content)) in ordered.iter().enumerate() {
            let remaining = budget - used;
            let share = remaining / (total - i);

            let header = format!(
                "## {}. {}\nSource: {}\n",
                result.rank,
                section_title(result, content),
                result.url
            );
            let overhead = char_len(&header) + 2;
            let body_budget = share.saturating_sub(overhead);

            let (body, cut) = if content.is_ok() {
                match truncate_at_boundary(content.extracted_text(), body_budget, TRUNCATED_MARKER) {
                    // No room left in this share; a bare marker still beats an empty body.
                    (body, true) if body.is_empty() => {
                        (TRUNCATED_MARKER.trim_start().to_owned(), true)
                    }
                    kept => kept,
                }
            } else {
                (
                    format!("[content unavailable: {}]", content.fetch_status()),
                    false,
                )
            };

            let section = format!("{header}{body}\n\n");
            let section_len = char_len(&section);
            if section_len > remaining {
                truncated = true;
                break;
            }

            out.push_str(&section);
            used += section_len;
            truncated |= cut;
            emitted.push(EmittedSource {
                title: section_title(result, content),
                url: &result.url,
                length: char_len(content.extracted_text()),
                truncated: cut,
            });
        }

        if self.config.sources_summary && !emitted.is_empty() {
            let summary = sources_summary(&emitted);
            let len = char_len(&summary);
            if len <= budget - used {
                out.push_str(&summary);
            }
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);

        FormattedBlock {
            text: out,
            sections: emitted.len(),
            truncated,
        }
    }

    /// Format search results (without page content) as a numbered markdown
    /// list of at most `budget` characters.
    pub fn format_result_list(
        &self,
        query: &str,
        results: &[SearchResult],
        budget: usize,
    ) -> FormattedBlock {
        let mut out = String::new();
        let heading = format!("# Search Results for: {query}\n\n");
        if char_len(&heading) <= budget {
            out.push_str(&heading);
        }
        let mut used = char_len(&out);
        let mut sections = 0;
        let mut truncated = false;

        for result in results {
            let mut entry = format!(
                "{}. {}\nURL: {}\nDescription: {}\n",
                result.rank, result.title, result.url, result.snippet
            );
            if let Some(age) = &result.age {
                entry.push_str(&format!("Age: {age}\n"));
            }
            entry.push_str(LIST_SEPARATOR);
            entry.push_str("\n\n");

            let len = char_len(&entry);
            if used + len > budget {
                truncated = true;
                break;
            }
            out.push_str(&entry);
            used += len;
            sections += 1;
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);

        FormattedBlock {
            text: out,
            sections,
            truncated,
        }
    }
}

/// Page title when extraction found one, otherwise the provider's title.
fn section_title<'a>(result: &'a SearchResult, content: &'a FetchedContent) -> &'a str {
    if content.title().trim().is_empty() {
        &result.title
    } else {
        content.title()
    }
}

fn sources_summary(emitted: &[EmittedSource<'_>]) -> String {
    let mut summary = String::from("## Sources Summary\n");
    for (i, source) in emitted.iter().enumerate() {
        summary.push_str(&format!(
            "{}. [{}]({}) - {} chars{}\n",
            i + 1,
            source.title,
            source.url,
            source.length,
            if source.truncated { " (truncated)" } else { "" }
        ));
    }
    summary
}
