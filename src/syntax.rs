use tree_sitter::Language;

/// Highlight class attached to every rendered byte of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    MlComment,
    Keyword1,
    Keyword2,
    String,
    Number,
    Match,
}

/// Tree-sitter grammars bundled with the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    C,
    Python,
}

impl Grammar {
    pub fn language(self) -> Language {
        match self {
            Grammar::C => tree_sitter_c::language(),
            Grammar::Python => tree_sitter_python::language(),
        }
    }
}

/// How the rows of a buffer get their highlight classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightStrategy {
    /// Per-line scanner driven by keyword lists and comment tokens
    Scanner,
    /// Walk of the tree produced by the profile's grammar
    ParseTree(Grammar),
}

#[derive(Debug)]
pub struct SyntaxProfile {
    pub filetype: &'static str,
    /// Entries starting with '.' match the extension, others match anywhere in the name
    pub filematch: &'static [&'static str],
    /// Keywords ending in '|' belong to the secondary class (type names)
    pub keywords: &'static [&'static str],
    pub singleline_comment_start: Option<&'static str>,
    pub multiline_comment_start: Option<&'static str>,
    pub multiline_comment_end: Option<&'static str>,
    pub highlight_numbers: bool,
    pub highlight_strings: bool,
    pub grammar: Option<Grammar>,
}

impl SyntaxProfile {
    pub fn strategy(&self, tree_sitter_enabled: bool) -> HighlightStrategy {
        match self.grammar {
            Some(grammar) if tree_sitter_enabled => HighlightStrategy::ParseTree(grammar),
            _ => HighlightStrategy::Scanner,
        }
    }

    fn matches(&self, filename: &str) -> bool {
        let ext = filename.rfind('.').map(|i| &filename[i..]);
        self.filematch.iter().any(|pattern| {
            if pattern.starts_with('.') {
                ext == Some(*pattern)
            } else {
                filename.contains(pattern)
            }
        })
    }
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|", "#define", "#include",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda",
    "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with", "yield", "True",
    "False", "None", "int|", "float|", "str|", "bool|", "list|", "dict|", "tuple|", "set|",
    "frozenset|", "bytes|", "bytearray|", "range|", "object|", "type|", "len|", "print|",
    "input|", "open|",
];

pub static PROFILES: &[SyntaxProfile] = &[
    SyntaxProfile {
        filetype: "c",
        filematch: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        singleline_comment_start: Some("//"),
        multiline_comment_start: Some("/*"),
        multiline_comment_end: Some("*/"),
        highlight_numbers: true,
        highlight_strings: true,
        grammar: Some(Grammar::C),
    },
    SyntaxProfile {
        filetype: "python",
        filematch: &[".py"],
        keywords: PYTHON_KEYWORDS,
        singleline_comment_start: Some("#"),
        multiline_comment_start: Some("\"\"\""),
        multiline_comment_end: Some("\"\"\""),
        highlight_numbers: true,
        highlight_strings: true,
        grammar: Some(Grammar::Python),
    },
];

/// First profile in table order with a pattern matching `filename`.
pub fn select_profile(filename: &str) -> Option<&'static SyntaxProfile> {
    PROFILES.iter().find(|profile| profile.matches(filename))
}

pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

pub fn is_separator(c: u8) -> bool {
    is_space(c) || c == 0 || b",.()+-/*=~%<>[];".contains(&c)
}

/// Highlights one rendered line. `in_comment` is the block-comment state
/// carried over from the previous line; the return value is the state at the
/// end of this one.
pub fn scan_line(
    profile: &SyntaxProfile,
    render: &[u8],
    mut in_comment: bool,
    hl: &mut Vec<Highlight>,
) -> bool {
    hl.clear();
    hl.resize(render.len(), Highlight::Normal);

    let scs = profile.singleline_comment_start.unwrap_or("").as_bytes();
    let mcs = profile.multiline_comment_start.unwrap_or("").as_bytes();
    let mce = profile.multiline_comment_end.unwrap_or("").as_bytes();

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut i = 0;

    while i < render.len() {
        let c = render[i];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if !scs.is_empty() && in_string.is_none() && !in_comment && render[i..].starts_with(scs) {
            hl[i..].fill(Highlight::Comment);
            break;
        }

        if !mcs.is_empty() && !mce.is_empty() && in_string.is_none() {
            if in_comment {
                hl[i] = Highlight::Comment;
                if render[i..].starts_with(mce) {
                    hl[i..i + mce.len()].fill(Highlight::MlComment);
                    i += mce.len();
                    in_comment = false;
                    prev_sep = true;
                } else {
                    i += 1;
                }
                continue;
            } else if render[i..].starts_with(mcs) {
                hl[i..i + mcs.len()].fill(Highlight::Comment);
                i += mcs.len();
                in_comment = true;
                continue;
            }
        }

        if profile.highlight_strings {
            if let Some(quote) = in_string {
                hl[i] = Highlight::String;
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                hl[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if profile.highlight_numbers
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, class)) = match_keyword(profile.keywords, &render[i..]) {
                hl[i..i + len].fill(class);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }

    in_comment
}

fn match_keyword(keywords: &[&str], text: &[u8]) -> Option<(usize, Highlight)> {
    keywords.iter().find_map(|keyword| {
        let (word, class) = match keyword.strip_suffix('|') {
            Some(word) => (word, Highlight::Keyword2),
            None => (*keyword, Highlight::Keyword1),
        };
        let word = word.as_bytes();
        let next = text.get(word.len()).copied().unwrap_or(0);
        (text.starts_with(word) && is_separator(next)).then_some((word.len(), class))
    })
}
