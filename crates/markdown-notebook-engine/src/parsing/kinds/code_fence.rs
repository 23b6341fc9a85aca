use super::strip_indent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    pub fn delimiter(self) -> u8 {
        match self {
            FenceKind::Backticks => b'`',
            FenceKind::Tildes => b'~',
        }
    }
}

/// The delimiter run at the start of a fence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceSig {
    pub kind: FenceKind,
    /// Number of delimiter characters in the run.
    pub len: usize,
}

pub struct CodeFence;

impl CodeFence {
    pub const MIN_RUN: usize = 3;

    /// Returns the fence signature if `line` opens (or closes) a fence.
    pub fn sig(line: &str) -> Option<FenceSig> {
        let rest = strip_indent(line)?;
        let kind = match rest.as_bytes().first()? {
            b'`' => FenceKind::Backticks,
            b'~' => FenceKind::Tildes,
            _ => return None,
        };
        let len = rest
            .bytes()
            .take_while(|&b| b == kind.delimiter())
            .count();
        (len >= Self::MIN_RUN).then_some(FenceSig { kind, len })
    }

    /// A line closes a fence when it starts with the opening run: same
    /// character, at least as long.
    pub fn closes(open: FenceSig, sig: Option<FenceSig>) -> bool {
        matches!(sig, Some(s) if s.kind == open.kind && s.len >= open.len)
    }
}
