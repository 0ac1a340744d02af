//! Runtime settings baked in at build time.

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
	/// Conversation service root, without a trailing slash.
	pub api_base_url: String,
}

impl AppConfig {
	pub fn new(api_base_url: &str) -> Self {
		let trimmed = api_base_url.trim().trim_end_matches('/');
		Self {
			api_base_url: if trimmed.is_empty() {
				DEFAULT_API_URL.to_string()
			} else {
				trimmed.to_string()
			},
		}
	}

	/// Reads `TASK_GRAPH_API_URL` from the build environment.
	pub fn from_env() -> Self {
		Self::new(option_env!("TASK_GRAPH_API_URL").unwrap_or(DEFAULT_API_URL))
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		Self::new(DEFAULT_API_URL)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trailing_slashes_are_trimmed() {
		assert_eq!(AppConfig::new("https://tasks.test//").api_base_url, "https://tasks.test");
	}

	#[test]
	fn blank_falls_back_to_localhost() {
		assert_eq!(AppConfig::new("  ").api_base_url, DEFAULT_API_URL);
		assert_eq!(AppConfig::default().api_base_url, DEFAULT_API_URL);
	}
}
