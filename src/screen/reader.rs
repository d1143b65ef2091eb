//! Async reader that turns a raw byte stream into styled segments

use super::ansi::SgrDecoder;
use super::segment::Segment;
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_CHUNK_SIZE: usize = 8192;

/// Pulls bytes from `R` on demand and yields decoded segments.
///
/// UTF-8 sequences cut by a read boundary are carried over to the next read;
/// bytes that can never form valid UTF-8 are replaced with U+FFFD.
pub struct SegmentReader<R> {
    reader: R,
    decoder: SgrDecoder,
    ready: VecDeque<Segment>,
    carry: Vec<u8>,
    buf: Vec<u8>,
    eof: bool,
}

impl<R> SegmentReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: SgrDecoder::new(),
            ready: VecDeque::new(),
            carry: Vec::new(),
            buf: vec![0; READ_CHUNK_SIZE],
            eof: false,
        }
    }

    /// Next segment, or `None` once the source is exhausted
    pub async fn next_segment(&mut self) -> std::io::Result<Option<Segment>> {
        loop {
            if let Some(segment) = self.ready.pop_front() {
                return Ok(Some(segment));
            }
            if self.eof {
                return Ok(None);
            }

            let n = self.reader.read(&mut self.buf).await?;
            if n == 0 {
                self.eof = true;
                if !self.carry.is_empty() {
                    let rest = String::from_utf8_lossy(&self.carry).into_owned();
                    self.carry.clear();
                    self.decoder.feed(&rest, &mut self.ready);
                }
                self.decoder.finish(&mut self.ready);
                continue;
            }

            self.carry.extend_from_slice(&self.buf[..n]);
            let text = drain_utf8(&mut self.carry);
            self.decoder.feed(&text, &mut self.ready);
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Remove the longest decodable prefix of `bytes` and return it as text.
/// An incomplete trailing sequence stays in `bytes` for the next read.
fn drain_utf8(bytes: &mut Vec<u8>) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut start = 0;

    loop {
        match std::str::from_utf8(&bytes[start..]) {
            Ok(valid) => {
                text.push_str(valid);
                start = bytes.len();
                break;
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                text.push_str(std::str::from_utf8(&bytes[start..valid_end]).unwrap_or_default());
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + len;
                    }
                    None => {
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }

    bytes.drain(..start);
    text
}
