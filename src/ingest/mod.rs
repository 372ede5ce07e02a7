pub mod delimited;
pub mod manual;

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{ParseFailure, SourceError};

pub const CATEGORY_COLUMN: &str = "Category";
pub const SENTIMENT_COLUMN: &str = "Sentiment";
pub const DATE_COLUMN: &str = "Date";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub category: Option<String>,
    pub sentiment: Option<String>,
    pub date: Option<String>,
}

impl RawRecord {
    pub fn from_fields(category: Option<&str>, sentiment: Option<&str>, date: Option<&str>) -> Self {
        Self {
            category: non_blank(category),
            sentiment: non_blank(sentiment),
            date: non_blank(date),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub category: bool,
    pub sentiment: bool,
    pub date: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: ColumnPresence,
    pub rows: Vec<RawRecord>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub category: Option<usize>,
    pub sentiment: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnLayout {
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut layout = ColumnLayout::default();
        for (idx, name) in headers.into_iter().enumerate() {
            match name {
                CATEGORY_COLUMN if layout.category.is_none() => layout.category = Some(idx),
                SENTIMENT_COLUMN if layout.sentiment.is_none() => layout.sentiment = Some(idx),
                DATE_COLUMN if layout.date.is_none() => layout.date = Some(idx),
                _ => {}
            }
        }
        layout
    }

    pub fn positional() -> Self {
        Self {
            category: Some(0),
            sentiment: Some(1),
            date: Some(2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.sentiment.is_none() && self.date.is_none()
    }

    pub fn max_index(&self) -> usize {
        [self.category, self.sentiment, self.date]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(0)
    }

    pub fn presence(&self) -> ColumnPresence {
        ColumnPresence {
            category: self.category.is_some(),
            sentiment: self.sentiment.is_some(),
            date: self.date.is_some(),
        }
    }

    pub fn extract<'a>(&self, field: impl Fn(usize) -> Option<&'a str>) -> RawRecord {
        RawRecord::from_fields(
            self.category.and_then(&field),
            self.sentiment.and_then(&field),
            self.date.and_then(&field),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseTier {
    Strict,
    Lenient,
    Manual,
}

impl ParseTier {
    pub const ALL: [ParseTier; 3] = [ParseTier::Strict, ParseTier::Lenient, ParseTier::Manual];

    pub fn label(self) -> &'static str {
        match self {
            ParseTier::Strict => "strict",
            ParseTier::Lenient => "lenient",
            ParseTier::Manual => "manual recovery",
        }
    }

    pub fn parse(self, bytes: &[u8], delimiter: char) -> Result<RawTable, ParseFailure> {
        match self {
            ParseTier::Strict => delimited::parse(bytes, delimiter, false),
            ParseTier::Lenient => delimited::parse(bytes, delimiter, true),
            ParseTier::Manual => Ok(manual::parse(bytes, delimiter)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceFingerprint([u8; 32]);

impl SourceFingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    pub fn seed(&self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(bytes)
    }

    pub fn hex(&self) -> String {
        self.0.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub table: RawTable,
    pub tier: ParseTier,
    pub failures: Vec<(ParseTier, ParseFailure)>,
}

impl ParsedTable {
    pub fn is_degraded(&self) -> bool {
        self.tier == ParseTier::Manual
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Parsed {
        parsed: ParsedTable,
        fingerprint: SourceFingerprint,
    },
    Unavailable(SourceError),
}

impl LoadOutcome {
    pub fn source_error(&self) -> Option<&SourceError> {
        match self {
            LoadOutcome::Unavailable(err) => Some(err),
            LoadOutcome::Parsed { .. } => None,
        }
    }

    pub fn into_table(self) -> RawTable {
        match self {
            LoadOutcome::Parsed { parsed, .. } => parsed.table,
            LoadOutcome::Unavailable(_) => RawTable::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TieredLoader {
    delimiter: char,
}

impl Default for TieredLoader {
    fn default() -> Self {
        Self::new(',')
    }
}

impl TieredLoader {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn load_path(&self, path: &Path) -> LoadOutcome {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                error!(path = %path.display(), "feedback source not found");
                return LoadOutcome::Unavailable(SourceError::SourceNotFound(PathBuf::from(path)));
            }
            Err(source) => {
                error!(path = %path.display(), error = %source, "feedback source unreadable");
                return LoadOutcome::Unavailable(SourceError::SourceUnreadable {
                    path: PathBuf::from(path),
                    source,
                });
            }
        };

        let fingerprint = SourceFingerprint::of(&bytes);
        let parsed = self.load_bytes(&bytes);
        info!(
            path = %path.display(),
            tier = parsed.tier.label(),
            rows = parsed.table.len(),
            "loaded feedback source"
        );
        LoadOutcome::Parsed { parsed, fingerprint }
    }

    pub fn load_bytes(&self, bytes: &[u8]) -> ParsedTable {
        let mut failures = Vec::new();
        for tier in ParseTier::ALL {
            match tier.parse(bytes, self.delimiter) {
                Ok(table) => {
                    if tier == ParseTier::Manual {
                        warn!(
                            failures = ?failures,
                            "structured parsing failed, recovered rows positionally"
                        );
                    }
                    return ParsedTable {
                        table,
                        tier,
                        failures,
                    };
                }
                Err(failure) => {
                    debug!(tier = tier.label(), %failure, "parse tier failed");
                    failures.push((tier, failure));
                }
            }
        }

        ParsedTable {
            table: RawTable::default(),
            tier: ParseTier::Manual,
            failures,
        }
    }
}
