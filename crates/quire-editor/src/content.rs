//! Note content ⇄ blocks.
//!
//! Notes are stored as plain text, one block per line, with a marker prefix
//! for anything that is not a plain text paragraph:
//!
//! ```text
//! A text paragraph
//! ::card:: boxed text
//! ::: second line of the card
//! ::grid-card:: left half
//! ::grid-card:: right half
//! ::image:: file:///photos/cat.jpg
//! \::literal colons in a text block
//! ```
//!
//! Ids, formats and grid group ids are not stored; parsing regenerates
//! them. What survives a round trip is the ordered `(kind, content)`
//! sequence. Consecutive grid-cards are re-paired left/right.
//!
//! Lines end in `\n`, or in `\r\n` when every line break in the note is
//! CRLF. Any other `\r` is block content.

use quire_types::{Block, BlockKind, GridSide, GroupId, Placement};

use crate::error::ContentError;

const CONTINUATION: &str = ":::";
const ESCAPE: char = '\\';

fn marker_for(kind: BlockKind) -> Option<&'static str> {
    match kind {
        BlockKind::Text => None,
        BlockKind::Card => Some("::card::"),
        BlockKind::GridCard => Some("::grid-card::"),
        BlockKind::Image => Some("::image::"),
    }
}

/// One classified input line.
enum Line<'a> {
    Block(BlockKind, &'a str),
    Continuation(&'a str),
    Unknown { marker: &'a str },
}

fn strip_one_space(s: &str) -> &str {
    s.strip_prefix(' ').unwrap_or(s)
}

fn classify(line: &str) -> Line<'_> {
    if let Some(rest) = line.strip_prefix(ESCAPE) {
        return Line::Block(BlockKind::Text, rest);
    }
    if let Some(rest) = line.strip_prefix(CONTINUATION) {
        return Line::Continuation(strip_one_space(rest));
    }
    if let Some(rest) = line.strip_prefix("::")
        && let Some(end) = rest.find("::")
    {
        let marker = &rest[..end];
        let body = strip_one_space(&rest[end + 2..]);
        return match BlockKind::from_str(marker) {
            Some(BlockKind::Text) | None => Line::Unknown { marker },
            Some(kind) => Line::Block(kind, body),
        };
    }
    Line::Block(BlockKind::Text, line)
}

const LF: &str = "\n";
const CRLF: &str = "\r\n";

/// CRLF only when every line break in `raw` is one.
fn line_ending(raw: &str) -> &'static str {
    let breaks = raw.matches('\n').count();
    if breaks > 0 && raw.matches(CRLF).count() == breaks { CRLF } else { LF }
}

fn parse(raw: &str, strict: bool) -> Result<Vec<Block>, ContentError> {
    let mut blocks: Vec<Block> = Vec::new();

    for (ix, line) in raw.split(line_ending(raw)).enumerate() {
        match classify(line) {
            Line::Block(kind, body) => blocks.push(Block::new(kind, body)),
            Line::Continuation(body) => match blocks.last_mut() {
                Some(last) => {
                    last.content.push('\n');
                    last.content.push_str(body);
                }
                None if strict => return Err(ContentError::OrphanContinuation { line: ix + 1 }),
                None => blocks.push(Block::text(body)),
            },
            Line::Unknown { marker } => {
                if strict {
                    return Err(ContentError::UnknownMarker {
                        line: ix + 1,
                        marker: marker.to_string(),
                    });
                }
                tracing::debug!("line {}: unknown marker '::{marker}::', keeping as text", ix + 1);
                blocks.push(Block::text(line));
            }
        }
    }

    pair_grid_cards(&mut blocks);
    if blocks.is_empty() {
        blocks.push(Block::empty_text());
    }
    Ok(blocks)
}

/// Assign left/right placements to runs of consecutive grid-cards.
/// A run of odd length leaves its last card full width.
fn pair_grid_cards(blocks: &mut [Block]) {
    let mut ix = 0;
    while ix + 1 < blocks.len() {
        if blocks[ix].kind == BlockKind::GridCard && blocks[ix + 1].kind == BlockKind::GridCard {
            let group = GroupId::new();
            blocks[ix].placement = Placement::Grid {
                side: GridSide::Left,
                group,
            };
            blocks[ix + 1].placement = Placement::Grid {
                side: GridSide::Right,
                group,
            };
            ix += 2;
        } else {
            ix += 1;
        }
    }
}

/// Parse stored content. Never fails: unknown markers are kept as text.
///
/// Empty input yields a single empty text block.
pub fn parse_content(raw: &str) -> Vec<Block> {
    match parse(raw, false) {
        Ok(blocks) => blocks,
        Err(e) => {
            tracing::warn!("lenient content parse failed: {e}");
            vec![Block::empty_text()]
        }
    }
}

/// Parse stored content, rejecting unknown markers and orphan continuations.
pub fn parse_content_strict(raw: &str) -> Result<Vec<Block>, ContentError> {
    parse(raw, true)
}

/// Serialize blocks to stored content.
pub fn blocks_to_content(blocks: &[Block]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(blocks.len());

    for block in blocks {
        let mut parts = block.content.split('\n');
        let first = parts.next().unwrap_or_default();

        let head = match marker_for(block.kind) {
            Some(marker) => format!("{marker} {first}"),
            None if first.starts_with("::") || first.starts_with(ESCAPE) => format!("{ESCAPE}{first}"),
            None => first.to_string(),
        };
        lines.push(head);
        lines.extend(parts.map(|rest| format!("{CONTINUATION} {rest}")));
    }

    // Lines that all end in `\r` would read back as a CRLF note.
    let crlf_shaped = lines.len() > 1 && lines[..lines.len() - 1].iter().all(|l| l.ends_with('\r'));
    lines.join(if crlf_shaped { CRLF } else { LF })
}
