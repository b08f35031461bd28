/// Backend route configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Create a new ApiConfig from the API_BASE_URL environment variable
    pub fn new() -> Result<Self, &'static str> {
        if let Some(url) = option_env!("API_BASE_URL") {
            Ok(Self::from_url(url))
        } else {
            Err("API_BASE_URL environment variable is not set")
        }
    }

    /// Create a new ApiConfig from a URL string. An empty string means same origin.
    pub fn from_url(url: &str) -> Self {
        Self {
            base_url: url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `/prompt_translate`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
