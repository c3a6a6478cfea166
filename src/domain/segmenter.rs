use std::io::{self, ErrorKind, Read};

use crate::domain::errors::CodecError;

/// A bounded window of the original byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub ordinal: u64,
    pub data: Vec<u8>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Splits a reader into segments of at most `segment_size` bytes
pub struct Segmenter;

impl Segmenter {
    /// Lazily split `reader`. Every segment but the last is exactly
    /// `segment_size` bytes; an empty reader yields no segments.
    pub fn split<R: Read>(reader: R, segment_size: usize) -> Result<Segments<R>, CodecError> {
        if segment_size == 0 {
            return Err(CodecError::InvalidSegmentSize(segment_size));
        }
        Ok(Segments {
            reader,
            segment_size,
            next_ordinal: 0,
            done: false,
        })
    }
}

/// Iterator returned by [`Segmenter::split`]. Not restartable: segments are
/// pulled from the reader as they are requested.
pub struct Segments<R> {
    reader: R,
    segment_size: usize,
    next_ordinal: u64,
    done: bool,
}

impl<R: Read> Segments<R> {
    /// Fill one window, coalescing short reads
    fn fill(&mut self) -> io::Result<Vec<u8>> {
        let mut data = vec![0u8; self.segment_size];
        let mut filled = 0;

        while filled < self.segment_size {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        data.truncate(filled);
        Ok(data)
    }
}

impl<R: Read> Iterator for Segments<R> {
    type Item = io::Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.fill() {
            Ok(data) if data.is_empty() => None,
            Ok(data) => {
                let ordinal = self.next_ordinal;
                self.next_ordinal += 1;
                Some(Ok(Segment { ordinal, data }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Segments<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out at most `step` bytes per call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn test_split_rejects_zero_size() {
        let err = Segmenter::split(Cursor::new(vec![1u8]), 0).err().unwrap();
        assert_eq!(err, CodecError::InvalidSegmentSize(0));
    }

    #[test]
    fn test_split_empty_reader_yields_nothing() {
        let segments: Vec<_> = Segmenter::split(Cursor::new(Vec::<u8>::new()), 10)
            .unwrap()
            .collect();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_split_sizes_and_ordinals() {
        let data: Vec<u8> = (0..25u8).collect();
        let segments: Vec<Segment> = Segmenter::split(Cursor::new(data.clone()), 10)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments.iter().map(Segment::len).collect::<Vec<_>>(),
            vec![10, 10, 5]
        );
        assert_eq!(
            segments.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        let joined: Vec<u8> = segments.into_iter().flat_map(|s| s.data).collect();
        assert_eq!(joined, data);
    }

    #[test]
    fn test_split_exact_multiple() {
        let segments: Vec<Segment> = Segmenter::split(Cursor::new(vec![7u8; 20]), 10)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_split_coalesces_short_reads() {
        let data: Vec<u8> = (0..100u8).collect();
        let reader = Trickle {
            data: data.clone(),
            pos: 0,
            step: 3,
        };
        let segments: Vec<Segment> = Segmenter::split(reader, 32)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            segments.iter().map(Segment::len).collect::<Vec<_>>(),
            vec![32, 32, 32, 4]
        );
    }

    #[test]
    fn test_split_stops_after_error() {
        let mut segments = Segmenter::split(Failing, 8).unwrap();
        assert!(segments.next().unwrap().is_err());
        assert!(segments.next().is_none());
    }
}
