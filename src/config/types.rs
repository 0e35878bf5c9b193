use serde::Deserialize;

/// Default system prompt handed to the extraction oracle
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert at extracting company information from web content.
Your task is to identify company names and their addresses from the provided text.

Extract ONLY companies that have BOTH a clear company name AND a physical address.
Return the results as a JSON array with this exact structure:
[
  {
    \"company_name\": \"exact company name\",
    \"address\": \"complete address including street, city, state, zip if available\"
  }
]

Rules:
- Only include companies with both name AND address clearly stated
- Include full addresses with as much detail as available
- If a company is mentioned multiple times with the same address, include it only once
- If no companies with addresses are found, return an empty array: []
- Return ONLY valid JSON, no markdown formatting or explanations";

/// Main configuration structure for SiteScout
///
/// Every section is optional in the TOML file; missing sections fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl budget and content limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Default maximum depth from the seed URL (0-3)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Default maximum number of pages per run (1-50)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum same-domain links kept per page
    #[serde(rename = "max-links-per-page")]
    pub max_links_per_page: usize,

    /// Maximum characters of page text handed to the oracle
    #[serde(rename = "max-text-chars")]
    pub max_text_chars: usize,

    /// Whether `www.example.com` and `example.com` count as the same domain
    #[serde(rename = "treat-www-as-same-domain")]
    pub treat_www_as_same_domain: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 20,
            max_links_per_page: 5,
            max_text_chars: 100_000,
            treat_www_as_same_domain: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the identifying header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`, with the
    /// parenthesised part shrinking to whatever contact details are configured.
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// HTTP fetch settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 10,
        }
    }
}

/// Extraction oracle (LLM) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Messages API endpoint
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Model identifier
    pub model: String,

    /// Upper bound on response tokens
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Per-call timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Replaces the built-in extraction instructions
    #[serde(rename = "system-prompt")]
    pub system_prompt: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            timeout_secs: 120,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            system_prompt: None,
        }
    }
}

impl OracleConfig {
    /// Returns the configured system prompt or the built-in one
    pub fn effective_system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database used to persist runs
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
