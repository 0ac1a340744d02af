//! Incremental decoder for the `text/event-stream` body of the chat endpoint.

use log::warn;

use super::types::StreamEvent;

const DATA_PREFIX: &str = "data:";

/// Splits arbitrary byte chunks into `data:` lines and parses each payload.
/// Bytes after the last newline wait for the next chunk.
#[derive(Debug, Default)]
pub struct SseDecoder {
	buffer: Vec<u8>,
}

impl SseDecoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
		self.buffer.extend_from_slice(chunk);
		let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
			return Vec::new();
		};
		let rest = self.buffer.split_off(last_newline + 1);
		let complete = std::mem::replace(&mut self.buffer, rest);
		String::from_utf8_lossy(&complete)
			.lines()
			.filter_map(parse_line)
			.collect()
	}

	/// Flushes a final line that was not newline-terminated.
	pub fn finish(&mut self) -> Option<StreamEvent> {
		let tail = std::mem::take(&mut self.buffer);
		parse_line(String::from_utf8_lossy(&tail).trim_end())
	}
}

fn parse_line(line: &str) -> Option<StreamEvent> {
	let payload = line.strip_prefix(DATA_PREFIX)?.trim_start();
	if payload.is_empty() {
		return None;
	}
	match serde_json::from_str(payload) {
		Ok(event) => Some(event),
		Err(err) => {
			warn!("skipping malformed stream event ({err}): {payload}");
			None
		}
	}
}
