use thiserror::Error;

/// Failure talking to the conversation service.
#[derive(Debug, Error)]
pub enum ApiError {
	#[error("request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("API error: {status} {reason}")]
	Status { status: u16, reason: String },
	#[error("malformed response: {0}")]
	Decode(#[from] serde_json::Error),
}

impl ApiError {
	pub fn status(status: reqwest::StatusCode) -> Self {
		Self::Status {
			status: status.as_u16(),
			reason: status.canonical_reason().unwrap_or("unknown").to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_error_reads_like_the_response_line() {
		let err = ApiError::status(reqwest::StatusCode::BAD_GATEWAY);
		assert_eq!(err.to_string(), "API error: 502 Bad Gateway");
	}

	#[test]
	fn decode_error_converts() {
		let err: ApiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
		assert!(matches!(err, ApiError::Decode(_)));
	}
}
