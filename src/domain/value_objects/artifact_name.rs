use crate::domain::errors::CodecError;

/// Separator between the numeric index and the payload
pub const SEPARATOR: char = '_';

/// Default zero-padding width of the index
pub const DEFAULT_INDEX_WIDTH: usize = 8;

/// Name of one zero-length artifact: `{index:0width}_{payload}`
///
/// The index is parsed from the leading digits rather than from a fixed
/// number of characters, so names whose index outgrew the padding width
/// still parse and sort correctly. A name with an empty payload is the end
/// marker that closes an artifact set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    index: u64,
    payload: String,
}

impl ArtifactName {
    pub fn new(index: u64, payload: impl Into<String>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }

    /// Parse a name into index and payload
    pub fn parse(name: &str) -> Result<Self, CodecError> {
        let (digits, payload) = name.split_once(SEPARATOR).ok_or_else(|| {
            CodecError::MalformedName(format!("{name:?} has no '{SEPARATOR}' separator"))
        })?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::MalformedName(format!(
                "{name:?} does not start with a numeric index"
            )));
        }

        let index = digits.parse::<u64>().map_err(|_| {
            CodecError::MalformedName(format!("{name:?} has an out-of-range index"))
        })?;

        Ok(Self::new(index, payload))
    }

    /// Marker written after the last chunk of a set
    pub fn end_marker(index: u64) -> Self {
        Self::new(index, String::new())
    }

    pub fn is_end_marker(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Render the name with the index zero-padded to `width` digits
    pub fn format(&self, width: usize) -> String {
        format!(
            "{:0width$}{}{}",
            self.index,
            SEPARATOR,
            self.payload,
            width = width
        )
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(DEFAULT_INDEX_WIDTH))
    }
}

impl std::str::FromStr for ArtifactName {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
