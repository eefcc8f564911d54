//! Disassembly listing parser.
//!
//! Turns the text of one listing (objdump output or assembler source) into
//! ordered code blocks of the configured executable sections. Lines that do
//! not parse are skipped and counted; a listing with no code section yields
//! no blocks at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::{CodeBlock, Instruction};

/// Section directives recognized when they appear alone on a line.
const SECTION_DIRECTIVES: &[&str] =
    &[".text", ".data", ".bss", ".rodata", ".init", ".fini", ".plt", ".got"];

/// Counters describing one parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Total lines in the input.
    pub lines: usize,
    /// Instructions kept.
    pub instructions: usize,
    /// Lines inside a code section that were not recognized.
    pub skipped_lines: usize,
    /// Non-empty blocks produced.
    pub blocks: usize,
}

/// Result of parsing one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub blocks: Vec<CodeBlock>,
    pub stats: ParseStats,
}

impl Listing {
    pub fn instruction_count(&self) -> usize {
        self.stats.instructions
    }
}

/// Parser restricted to a set of executable section names.
#[derive(Debug, Clone)]
pub struct ListingParser {
    code_sections: Vec<String>,
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new(vec![".text".to_string()])
    }
}

/// Mutable state for a single parse pass.
struct ParseState<'a> {
    parser: &'a ListingParser,
    /// Current section, when it is one of the code sections.
    section: Option<String>,
    block: Option<CodeBlock>,
    /// Labels of empty blocks, handed to the next block that gets an instruction.
    pending_labels: Vec<String>,
    next_index: HashMap<String, usize>,
    listing: Listing,
}

impl<'a> ParseState<'a> {
    fn new(parser: &'a ListingParser) -> Self {
        Self {
            parser,
            section: None,
            block: None,
            pending_labels: Vec::new(),
            next_index: HashMap::new(),
            listing: Listing::default(),
        }
    }

    fn close_block(&mut self) {
        let Some(mut block) = self.block.take() else {
            return;
        };
        if block.is_empty() {
            self.pending_labels.extend(block.aliases);
            self.pending_labels.extend(block.label);
            return;
        }
        let index = self.next_index.entry(block.section.clone()).or_insert(0);
        block.block_index = *index;
        *index += 1;
        self.listing.stats.blocks += 1;
        self.listing.blocks.push(block);
    }

    fn enter_section(&mut self, name: &str) {
        self.close_block();
        self.pending_labels.clear();
        self.section = self.parser.is_code_section(name).then(|| name.to_string());
    }

    fn open_block(&mut self, label: Option<String>) {
        self.close_block();
        if let Some(section) = &self.section {
            let mut block = CodeBlock::new(section.clone(), 0, label);
            block.aliases = std::mem::take(&mut self.pending_labels);
            self.block = Some(block);
        }
    }

    fn push(&mut self, parsed: ParsedInstruction) {
        if self.block.is_none() {
            self.open_block(None);
        }
        if let Some(block) = self.block.as_mut() {
            let position_in_block = block.instructions.len();
            block.instructions.push(Instruction {
                mnemonic: parsed.mnemonic,
                operands: parsed.operands,
                position_in_block,
                address: parsed.address,
            });
            self.listing.stats.instructions += 1;
        }
    }

    fn finish(mut self) -> Listing {
        self.close_block();
        self.listing
    }
}

impl ListingParser {
    pub fn new(code_sections: Vec<String>) -> Self {
        Self { code_sections }
    }

    pub fn code_sections(&self) -> &[String] {
        &self.code_sections
    }

    fn is_code_section(&self, name: &str) -> bool {
        self.code_sections.iter().any(|s| s == name)
    }

    /// Parse a whole listing.
    pub fn parse(&self, text: &str) -> Listing {
        let mut state = ParseState::new(self);

        for (line_no, raw) in text.lines().enumerate() {
            state.listing.stats.lines += 1;
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(section) = self.section_marker(line) {
                state.enter_section(section);
                continue;
            }

            if state.section.is_none() {
                continue;
            }

            if let Some((label, rest)) = split_label(line) {
                state.open_block(Some(label.to_string()));
                let rest = rest.trim();
                if rest.is_empty() {
                    continue;
                }
                match parse_instruction(rest) {
                    Some(parsed) => state.push(parsed),
                    None => skip(&mut state.listing.stats, line_no, raw),
                }
                continue;
            }

            match parse_instruction(line) {
                Some(parsed) => state.push(parsed),
                None => skip(&mut state.listing.stats, line_no, raw),
            }
        }

        state.finish()
    }

    fn section_marker<'l>(&self, line: &'l str) -> Option<&'l str> {
        if let Some(rest) = line.strip_prefix("Disassembly of section ") {
            return rest.strip_suffix(':').map(str::trim);
        }
        let mut tokens = line.split_whitespace();
        let first = tokens.next()?;
        if first == ".section" {
            return tokens.next().and_then(|name| name.split(',').next());
        }
        if tokens.next().is_none()
            && first.starts_with('.')
            && (SECTION_DIRECTIVES.contains(&first) || self.is_code_section(first))
        {
            return Some(first);
        }
        None
    }
}

/// Parse `text` with the default code section (`.text`).
pub fn parse_listing(text: &str) -> Listing {
    ListingParser::default().parse(text)
}

fn skip(stats: &mut ParseStats, line_no: usize, raw: &str) {
    stats.skipped_lines += 1;
    trace!(line = line_no + 1, text = raw.trim(), "skipping unrecognized line");
}

#[derive(Debug)]
struct ParsedInstruction {
    address: Option<u64>,
    mnemonic: String,
    operands: Vec<String>,
}

/// Drop `;`, `//`, and whitespace-preceded `@` comments.
fn strip_comment(line: &str) -> &str {
    let mut end = line.len();
    if let Some(i) = line.find(';') {
        end = end.min(i);
    }
    if let Some(i) = line.find("//") {
        end = end.min(i);
    }
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'@' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            end = end.min(i);
            break;
        }
    }
    &line[..end]
}

fn is_hex(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// A byte-encoding column: whitespace-separated even-length hex groups.
fn is_encoding(field: &str) -> bool {
    let mut tokens = field.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| is_hex(t) && t.len() % 2 == 0)
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))
}

/// Recognize `<hex> <name>:` symbol lines and `name:` labels.
///
/// Returns the label and whatever follows it on the same line.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let mut tokens = line.splitn(2, char::is_whitespace);
    let first = tokens.next()?;
    let rest = tokens.next().unwrap_or("").trim();

    if is_hex(first) && rest.starts_with('<') && rest.ends_with(">:") {
        let name = &rest[1..rest.len() - 2];
        return (!name.is_empty()).then_some((name, ""));
    }

    let name = first.strip_suffix(':')?;
    // `8000:\t...` is an address column, not a label.
    if is_hex(name) && looks_like_objdump_body(line, rest) {
        return None;
    }
    if !is_identifier(name) || name.starts_with('.') && name.len() == 1 {
        return None;
    }
    Some((name, rest))
}

/// Tab-separated columns, or a leading byte-encoding group.
fn looks_like_objdump_body(line: &str, rest: &str) -> bool {
    line.contains('\t') || rest.split_whitespace().next().is_some_and(|t| is_encoding(t))
}

fn parse_instruction(line: &str) -> Option<ParsedInstruction> {
    let (address, rest) = match line.split_once(':') {
        Some((head, tail)) if is_hex(head.trim()) && !head.trim().is_empty() => {
            (u64::from_str_radix(head.trim(), 16).ok(), tail.trim())
        }
        _ => (None, line),
    };

    let assembly = if address.is_some() { strip_encoding(rest)? } else { rest.to_string() };
    let assembly = assembly.trim();

    let (head, operand_text) = match assembly.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (assembly, ""),
    };

    let mnemonic = normalize_mnemonic(head)?;
    Some(ParsedInstruction { address, mnemonic, operands: split_operands(operand_text) })
}

/// Remove the byte-encoding column that follows an address column.
fn strip_encoding(rest: &str) -> Option<String> {
    if rest.contains('\t') {
        let fields: Vec<&str> = rest.split('\t').map(str::trim).filter(|f| !f.is_empty()).collect();
        let start = usize::from(fields.first().map_or(false, |f| is_encoding(f)));
        if start >= fields.len() {
            return None;
        }
        return Some(fields[start..].join(" "));
    }

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let start = tokens.iter().take_while(|t| is_hex(t) && t.len() % 2 == 0).count();
    if start >= tokens.len() {
        return None;
    }
    Some(tokens[start..].join(" "))
}

/// Lowercase and drop width/qualifier suffixes (`bl.w` -> `bl`).
fn normalize_mnemonic(head: &str) -> Option<String> {
    let mut chars = head.chars();
    if !matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) {
        return None;
    }
    if !head.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_')) {
        return None;
    }
    let base = head.split('.').next().unwrap_or(head);
    Some(base.to_ascii_lowercase())
}

/// Split operands on commas that are not nested inside brackets.
fn split_operands(text: &str) -> Vec<String> {
    let mut operands = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '[' | '{' | '(' | '<' => depth += 1,
            ']' | '}' | ')' | '>' => depth -= 1,
            ',' if depth <= 0 => {
                let op = current.trim();
                if !op.is_empty() {
                    operands.push(op.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    let op = current.trim();
    if !op.is_empty() {
        operands.push(op.to_string());
    }
    operands
}
