//! Output file naming schemes.
//!
//! A naming scheme maps `(base, shard index)` to the file name a shard is
//! written under. Names must be distinct per shard and identical across runs,
//! so outputs can be found again and re-runs overwrite rather than duplicate.
//! Schemes also parse names back, which is how a source discovers the shards
//! a target wrote.
//!
//! # Schemes
//!
//! - [`SequentialNamingScheme`] (default): `part-00000`, `part-00001`, ...
//! - [`ClassicNamingScheme`]: `part-m-00000` / `part-r-00000`, tagged by the
//!   kind of task that produced the shard

use std::fmt;

/// Default base name for shard files.
pub const DEFAULT_SHARD_BASE: &str = "part";

/// Default zero-padding width for shard indices (covers 100,000 shards).
pub const DEFAULT_SHARD_DIGITS: usize = 5;

/// Deterministic shard-index-to-file-name function.
///
/// Implementations must be pure: the same inputs always produce the same
/// name, and distinct shard indices never share a name.
pub trait NamingScheme: Send + Sync + fmt::Debug {
    /// File name for shard `shard` of an output called `base`.
    fn name(&self, base: &str, shard: u32) -> String;

    /// Shard index encoded in `file_name`, or `None` if this scheme did not
    /// produce that name for `base`.
    fn shard_index(&self, base: &str, file_name: &str) -> Option<u32>;

    /// Short identifier used in logs.
    fn scheme_id(&self) -> &str;
}

/// Parse a zero-padded decimal suffix and confirm it is in canonical form.
fn parse_padded(digits: &str, width: usize) -> Option<u32> {
    if digits.len() < width || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u32 = digits.parse().ok()?;
    if format!("{:0width$}", index, width = width) == digits {
        Some(index)
    } else {
        None
    }
}

/// Sequential scheme: `{base}-{index}` with the index zero-padded.
///
/// With the default width of 5 the names of shards `0..100_000` sort
/// lexicographically in shard order. Larger indices still get unique names,
/// but they are wider than the padding and break that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialNamingScheme {
    digits: usize,
}

impl SequentialNamingScheme {
    /// Scheme with a custom padding width.
    pub fn with_digits(digits: usize) -> Self {
        SequentialNamingScheme {
            digits: digits.max(1),
        }
    }

    /// Padding width.
    pub fn digits(&self) -> usize {
        self.digits
    }
}

impl Default for SequentialNamingScheme {
    fn default() -> Self {
        SequentialNamingScheme {
            digits: DEFAULT_SHARD_DIGITS,
        }
    }
}

impl NamingScheme for SequentialNamingScheme {
    fn name(&self, base: &str, shard: u32) -> String {
        format!("{}-{:0width$}", base, shard, width = self.digits)
    }

    fn shard_index(&self, base: &str, file_name: &str) -> Option<u32> {
        let digits = file_name.strip_prefix(base)?.strip_prefix('-')?;
        parse_padded(digits, self.digits)
    }

    fn scheme_id(&self) -> &str {
        "sequential"
    }
}

/// Kind of task that produced a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Element-wise transform output
    Map,
    /// Post-grouping output
    Reduce,
}

impl TaskKind {
    fn tag(self) -> char {
        match self {
            TaskKind::Map => 'm',
            TaskKind::Reduce => 'r',
        }
    }
}

/// Classic scheme: `{base}-{m|r}-{index:05}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassicNamingScheme {
    kind: TaskKind,
}

impl ClassicNamingScheme {
    /// Scheme for shards produced by `kind` tasks.
    pub fn new(kind: TaskKind) -> Self {
        ClassicNamingScheme { kind }
    }

    /// Task kind encoded in every name.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }
}

impl NamingScheme for ClassicNamingScheme {
    fn name(&self, base: &str, shard: u32) -> String {
        format!(
            "{}-{}-{:0width$}",
            base,
            self.kind.tag(),
            shard,
            width = DEFAULT_SHARD_DIGITS
        )
    }

    fn shard_index(&self, base: &str, file_name: &str) -> Option<u32> {
        let rest = file_name.strip_prefix(base)?.strip_prefix('-')?;
        let mut chars = rest.chars();
        if chars.next()? != self.kind.tag() {
            return None;
        }
        let digits = chars.as_str().strip_prefix('-')?;
        parse_padded(digits, DEFAULT_SHARD_DIGITS)
    }

    fn scheme_id(&self) -> &str {
        match self.kind {
            TaskKind::Map => "classic-map",
            TaskKind::Reduce => "classic-reduce",
        }
    }
}
