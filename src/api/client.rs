use futures::StreamExt;
use log::{debug, info};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::sse::SseDecoder;
use super::types::{ChatRequest, ChatResponse, HealthStatus, StreamEvent};
use crate::config::AppConfig;
use crate::conversation::StreamReply;

/// HTTP client for the conversation backend.
#[derive(Clone, Debug)]
pub struct ConversationClient {
	base_url: String,
	http: reqwest::Client,
}

impl ConversationClient {
	pub fn new(config: &AppConfig) -> Self {
		Self {
			base_url: config.api_base_url.clone(),
			http: reqwest::Client::new(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{path}", self.base_url)
	}

	/// One-shot request: the whole reply and graph arrive in one body.
	pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
		let response = self.http.post(self.url("/api/chat")).json(request).send().await?;
		decode(check(response)?).await
	}

	/// Streams the reply, handing each event to `on_event` as it arrives.
	/// Returns once a `done` event is seen or the body ends.
	pub async fn stream_chat<F>(
		&self,
		request: &ChatRequest,
		mut on_event: F,
	) -> Result<StreamReply, ApiError>
	where
		F: FnMut(&StreamEvent),
	{
		let response = self
			.http
			.post(self.url("/api/chat/stream"))
			.json(request)
			.send()
			.await?;
		let mut body = check(response)?.bytes_stream();
		let mut decoder = SseDecoder::new();
		let mut reply = StreamReply::default();

		while let Some(chunk) = body.next().await {
			for event in decoder.push(&chunk?) {
				on_event(&event);
				if !reply.apply(event) {
					debug!("stream finished with {} chars", reply.content.len());
					return Ok(reply);
				}
			}
		}
		if let Some(event) = decoder.finish() {
			on_event(&event);
			reply.apply(event);
		}
		Ok(reply)
	}

	pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
		let response = self.http.get(self.url("/")).send().await?;
		let health: HealthStatus = decode(check(response)?).await?;
		info!("conversation service: {} {}", health.status, health.message);
		Ok(health)
	}
}

fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
	if response.status().is_success() {
		Ok(response)
	} else {
		Err(ApiError::status(response.status()))
	}
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
	let text = response.text().await?;
	Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_join_base_and_path() {
		let client = ConversationClient::new(&AppConfig::new("http://api.test/"));
		assert_eq!(client.url("/api/chat"), "http://api.test/api/chat");
		assert_eq!(client.url("/"), "http://api.test/");
	}
}
