//! Newline-delimited JSON framing for shortest-path progress streams.

use std::pin::pin;

use futures::{Stream, StreamExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiGraphError};

/// One progress record of a shortest-path search. Each record replaces the
/// previous one; the record carrying `paths` is the final result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamData {
	/// Pages visited so far.
	pub visited: u64,
	/// Search time so far, in milliseconds.
	pub elapsed_ms: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	/// Shortest paths found, as page titles from start to end. Only on the last record.
	pub paths: Option<Vec<Vec<String>>>,
}

impl StreamData {
	/// True for the record carrying the result.
	pub fn is_final(&self) -> bool {
		self.paths.is_some()
	}

	/// Number of pages on the shortest path found, including both ends.
	pub fn path_len(&self) -> Option<usize> {
		self.paths.as_ref()?.first().map(Vec::len)
	}
}

/// Incremental decoder. Bytes are buffered until a newline completes a record,
/// so records and multi-byte characters may be split across chunks freely.
#[derive(Debug, Default)]
pub struct LineDecoder {
	buf: Vec<u8>,
	line: usize,
	last: Option<StreamData>,
}

impl LineDecoder {
	/// Decoder with an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Feeds one chunk and returns the records it completed, in order.
	/// Malformed lines are logged and skipped.
	pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamData> {
		self.buf.extend_from_slice(chunk);
		let mut records = Vec::new();
		while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
			let line: Vec<u8> = self.buf.drain(..=pos).collect();
			if let Some(record) = self.decode(&line[..pos]) {
				records.push(record);
			}
		}
		records
	}

	/// The most recent valid record.
	pub fn last(&self) -> Option<&StreamData> {
		self.last.as_ref()
	}

	/// Parses an unterminated trailing line, if any.
	pub fn flush(&mut self) -> Option<StreamData> {
		if self.buf.is_empty() {
			return None;
		}
		let rest = std::mem::take(&mut self.buf);
		self.decode(&rest)
	}

	/// Ends the stream and returns the final record, or
	/// [`WikiGraphError::EmptyStream`] when none was valid.
	pub fn finish(mut self) -> Result<StreamData> {
		self.flush();
		self.last.ok_or(WikiGraphError::EmptyStream)
	}

	fn decode(&mut self, line: &[u8]) -> Option<StreamData> {
		self.line += 1;
		match parse_line(line, self.line) {
			Ok(Some(record)) => {
				self.last = Some(record.clone());
				Some(record)
			}
			Ok(None) => None,
			Err(e) => {
				warn!("wiki-graph: skipping stream record: {e}");
				None
			}
		}
	}
}

fn parse_line(line: &[u8], number: usize) -> Result<Option<StreamData>> {
	let malformed = |reason: String| WikiGraphError::MalformedRecord { line: number, reason };
	let text = std::str::from_utf8(line).map_err(|e| malformed(e.to_string()))?;
	let text = text.trim();
	if text.is_empty() {
		return Ok(None);
	}
	serde_json::from_str(text)
		.map(Some)
		.map_err(|e| malformed(e.to_string()))
}

/// Drains a byte stream, calling `on_update` for every record, and returns the
/// last one. A transport error ends the stream with that error.
pub async fn consume_stream<S, B, E>(stream: S, mut on_update: impl FnMut(&StreamData)) -> Result<StreamData>
where
	S: Stream<Item = std::result::Result<B, E>>,
	B: AsRef<[u8]>,
	E: Into<WikiGraphError>,
{
	let mut stream = pin!(stream);
	let mut decoder = LineDecoder::new();
	while let Some(chunk) = stream.next().await {
		let chunk = chunk.map_err(Into::<WikiGraphError>::into)?;
		for record in decoder.push(chunk.as_ref()) {
			debug!("wiki-graph: path search visited {} pages", record.visited);
			on_update(&record);
		}
	}
	if let Some(record) = decoder.flush() {
		on_update(&record);
	}
	decoder.finish()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_utf8_survives_chunking() {
		let line = "{\"visited\":3,\"elapsed_ms\":1,\"paths\":[[\"Köln\",\"Düsseldorf\"]]}\n".as_bytes();
		let split = line.iter().position(|b| *b == 0xc3).unwrap() + 1;
		let mut decoder = LineDecoder::new();
		assert!(decoder.push(&line[..split]).is_empty());
		let records = decoder.push(&line[split..]);
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].paths.as_ref().unwrap()[0][0], "Köln");
		assert_eq!(records[0].path_len(), Some(2));
	}

	#[test]
	fn malformed_lines_are_skipped() {
		let mut decoder = LineDecoder::new();
		let records = decoder.push(b"{\"visited\":1,\"elapsed_ms\":2}\nnot json\n\r\n{\"visited\":4,\"elapsed_ms\":8}\r\n");
		assert_eq!(records.iter().map(|r| r.visited).collect::<Vec<_>>(), vec![1, 4]);
		assert_eq!(decoder.finish().unwrap().visited, 4);

		match parse_line(b"not json", 2) {
			Err(WikiGraphError::MalformedRecord { line, reason }) => {
				assert_eq!(line, 2);
				assert!(!reason.is_empty());
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn trailing_line_without_newline_counts() {
		let mut decoder = LineDecoder::new();
		decoder.push(b"{\"visited\":9,\"elapsed_ms\":2,\"paths\":[]}");
		let last = decoder.finish().unwrap();
		assert!(last.is_final());
		assert_eq!(last.path_len(), None);
	}

	#[test]
	fn nothing_valid_is_an_empty_stream() {
		let mut decoder = LineDecoder::new();
		decoder.push(b"garbage\n");
		assert!(matches!(decoder.finish(), Err(WikiGraphError::EmptyStream)));
		assert!(matches!(LineDecoder::new().finish(), Err(WikiGraphError::EmptyStream)));
	}
}
