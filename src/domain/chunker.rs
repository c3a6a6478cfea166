//! Splitting encoded text into artifact names and putting it back together

use crate::domain::errors::CodecError;
use crate::domain::value_objects::ArtifactName;

/// One length-bounded slice of a segment's encoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: u64,
    pub payload: &'a str,
}

impl Chunk<'_> {
    pub fn to_artifact_name(&self) -> ArtifactName {
        ArtifactName::new(self.index, self.payload)
    }
}

/// Cuts encoded text into chunks of at most `chunk_size` symbols
pub struct Chunker;

impl Chunker {
    /// Split `text` into chunks indexed from `start_index`. Sizes count
    /// symbols (characters), not UTF-8 bytes.
    pub fn split(
        text: &str,
        chunk_size: usize,
        start_index: u64,
    ) -> Result<ChunkIter<'_>, CodecError> {
        if chunk_size == 0 {
            return Err(CodecError::InvalidChunkSize(chunk_size));
        }
        Ok(ChunkIter {
            rest: text,
            chunk_size,
            next_index: start_index,
        })
    }
}

/// Iterator returned by [`Chunker::split`]
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    rest: &'a str,
    chunk_size: usize,
    next_index: u64,
}

impl<'a> ChunkIter<'a> {
    /// Index the next chunk will carry
    pub fn next_index(&self) -> u64 {
        self.next_index
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let cut = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(offset, _)| offset)
            .unwrap_or(self.rest.len());
        let (payload, rest) = self.rest.split_at(cut);
        self.rest = rest;

        let chunk = Chunk {
            index: self.next_index,
            payload,
        };
        self.next_index += 1;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for ChunkIter<'_> {}

/// Rebuilds encoded text from an unordered set of artifact names
pub struct Reassembler;

impl Reassembler {
    /// Parse, order and concatenate artifact names.
    ///
    /// Indices must form the contiguous range `0..n`. Ordering is numeric,
    /// never lexicographic.
    pub fn combine<I, S>(names: I) -> Result<String, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = names
            .into_iter()
            .map(|name| ArtifactName::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::combine_parsed(&mut parsed)
    }

    /// Like [`Reassembler::combine`], but the set must be closed by an end
    /// marker at the highest index.
    ///
    /// Losing the marker, or the marker together with any number of trailing
    /// chunks, fails with `TruncatedData`. A marker below the highest index
    /// means two sets were mixed and fails with `MalformedName`.
    pub fn combine_terminated<I, S>(names: I) -> Result<String, CodecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = names
            .into_iter()
            .map(|name| ArtifactName::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let text = Self::combine_parsed(&mut parsed)?;

        match parsed.split_last() {
            Some((last, body)) if last.is_end_marker() => {
                if let Some(early) = body.iter().find(|name| name.is_end_marker()) {
                    return Err(CodecError::MalformedName(format!(
                        "end marker at index {} precedes index {}",
                        early.index(),
                        last.index()
                    )));
                }
                Ok(text)
            }
            Some((last, _)) => Err(CodecError::TruncatedData(format!(
                "no end marker after index {}",
                last.index()
            ))),
            None => Err(CodecError::TruncatedData("no end marker".to_string())),
        }
    }

    /// Same as [`Reassembler::combine`] for names that are already parsed
    pub fn combine_parsed(names: &mut [ArtifactName]) -> Result<String, CodecError> {
        names.sort_unstable_by_key(ArtifactName::index);

        let mut text = String::with_capacity(names.iter().map(|n| n.payload().len()).sum());
        for (expected, name) in (0u64..).zip(names.iter()) {
            match name.index() {
                index if index == expected => text.push_str(name.payload()),
                index if index < expected => return Err(CodecError::DuplicateIndex(index)),
                _ => return Err(CodecError::MissingIndex(expected)),
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str, chunk_size: usize) -> Vec<String> {
        Chunker::split(text, chunk_size, 0)
            .unwrap()
            .map(|c| c.to_artifact_name().to_string())
            .collect()
    }

    #[test]
    fn test_split_rejects_zero_chunk_size() {
        assert_eq!(
            Chunker::split("abc", 0, 0).err(),
            Some(CodecError::InvalidChunkSize(0))
        );
    }

    #[test]
    fn test_split_lengths_and_indices() {
        let chunks: Vec<Chunk> = Chunker::split("abcdefghijklm", 5, 10).unwrap().collect();
        assert_eq!(
            chunks.iter().map(|c| c.payload).collect::<Vec<_>>(),
            vec!["abcde", "fghij", "klm"]
        );
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![10, 11, 12]
        );
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "ĀāĂăĄąĆ";
        let chunks: Vec<Chunk> = Chunker::split(text, 3, 0).unwrap().collect();
        assert_eq!(
            chunks.iter().map(|c| c.payload.chars().count()).collect::<Vec<_>>(),
            vec![3, 3, 1]
        );
        assert_eq!(chunks.iter().map(|c| c.payload).collect::<String>(), text);
    }

    #[test]
    fn test_split_empty_text() {
        let mut chunks = Chunker::split("", 4, 3).unwrap();
        assert!(chunks.next().is_none());
        assert_eq!(chunks.next_index(), 3);
    }

    #[test]
    fn test_split_reports_next_index() {
        let mut chunks = Chunker::split("abcdefg", 2, 5).unwrap();
        chunks.by_ref().for_each(drop);
        assert_eq!(chunks.next_index(), 9);
    }

    #[test]
    fn test_combine_round_trip() {
        let text = "the quick brown fox";
        assert_eq!(Reassembler::combine(names(text, 4)).unwrap(), text);
    }

    #[test]
    fn test_combine_is_order_independent() {
        let text = "0123456789abcdefghij";
        let mut shuffled = names(text, 3);
        shuffled.reverse();
        shuffled.swap(1, 4);
        assert_eq!(Reassembler::combine(shuffled).unwrap(), text);
    }

    #[test]
    fn test_combine_sorts_numerically_past_padding_width() {
        let names: Vec<String> = (0..12u64)
            .map(|i| ArtifactName::new(i, format!("<{i}>")).format(1))
            .collect();
        let text = Reassembler::combine(&names).unwrap();
        assert!(text.starts_with("<0><1><2>"));
        assert!(text.ends_with("<9><10><11>"));
    }

    #[test]
    fn test_combine_detects_gap() {
        let mut all = names("abcdef", 1);
        all.remove(3);
        assert_eq!(
            Reassembler::combine(all).unwrap_err(),
            CodecError::MissingIndex(3)
        );
    }

    #[test]
    fn test_combine_detects_missing_start() {
        let mut all = names("abcdef", 1);
        all.remove(0);
        assert_eq!(
            Reassembler::combine(all).unwrap_err(),
            CodecError::MissingIndex(0)
        );
    }

    #[test]
    fn test_combine_detects_duplicate() {
        let mut all = names("abcdef", 1);
        all.push(ArtifactName::new(2, "z").to_string());
        assert_eq!(
            Reassembler::combine(all).unwrap_err(),
            CodecError::DuplicateIndex(2)
        );
    }

    #[test]
    fn test_combine_rejects_malformed_name() {
        let mut all = names("abc", 1);
        all.push("notes.txt".to_string());
        assert!(matches!(
            Reassembler::combine(all).unwrap_err(),
            CodecError::MalformedName(_)
        ));
    }

    fn terminated(text: &str, chunk_size: usize) -> Vec<String> {
        let mut all = names(text, chunk_size);
        all.push(ArtifactName::end_marker(all.len() as u64).to_string());
        all
    }

    #[test]
    fn test_combine_terminated_round_trip() {
        let mut all = terminated("hello world", 4);
        all.reverse();
        assert_eq!(Reassembler::combine_terminated(all).unwrap(), "hello world");
    }

    #[test]
    fn test_combine_terminated_empty_text() {
        let all = terminated("", 4);
        assert_eq!(all, vec!["00000000_".to_string()]);
        assert_eq!(Reassembler::combine_terminated(all).unwrap(), "");
    }

    #[test]
    fn test_combine_terminated_detects_lost_tail() {
        let mut all = terminated("abcdef", 2);

        // Marker gone
        all.pop();
        assert!(matches!(
            Reassembler::combine_terminated(&all).unwrap_err(),
            CodecError::TruncatedData(_)
        ));

        // Marker and the last chunk gone
        all.pop();
        assert!(matches!(
            Reassembler::combine_terminated(&all).unwrap_err(),
            CodecError::TruncatedData(_)
        ));
    }

    #[test]
    fn test_combine_terminated_detects_lost_last_chunk() {
        let mut all = terminated("abcdef", 2);
        all.remove(2);
        assert_eq!(
            Reassembler::combine_terminated(all).unwrap_err(),
            CodecError::MissingIndex(2)
        );
    }

    #[test]
    fn test_combine_terminated_rejects_early_marker() {
        let mut all = names("abcdef", 2);
        all[1] = ArtifactName::end_marker(1).to_string();
        all.push(ArtifactName::end_marker(3).to_string());
        assert!(matches!(
            Reassembler::combine_terminated(all).unwrap_err(),
            CodecError::MalformedName(_)
        ));
    }

    #[test]
    fn test_combine_empty() {
        assert_eq!(Reassembler::combine(Vec::<String>::new()).unwrap(), "");
    }
}
