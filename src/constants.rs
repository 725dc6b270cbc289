pub mod falcon {
    pub const DEFAULT_BASE_URL: &str = "https://api.crowdstrike.com";
    pub const TOKEN_PATH: &str = "/oauth2/token";
    /// A cached token is only reused while `now < expires_at - TOKEN_EXPIRY_SKEW_MS`.
    pub const TOKEN_EXPIRY_SKEW_MS: i64 = 60_000;
    pub const RETRY_AFTER_HEADER: &str = "X-RateLimit-RetryAfter";
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;
    pub const USER_AGENT: &str = concat!("falcon-mcp/", env!("CARGO_PKG_VERSION"));

    pub const REGIONS: &[(&str, &str)] = &[
        ("us-1", "https://api.crowdstrike.com"),
        ("us-2", "https://api.us-2.crowdstrike.com"),
        ("eu-1", "https://api.eu-1.crowdstrike.com"),
        ("us-gov-1", "https://api.laggar.gcw.crowdstrike.com"),
    ];
}

pub mod env {
    pub const CLIENT_ID: &str = "FALCON_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "FALCON_CLIENT_SECRET";
    pub const BASE_URL: &str = "FALCON_BASE_URL";
    pub const HTTP_ADDR: &str = "FALCON_MCP_HTTP_ADDR";
}

pub mod headers {
    pub const CLIENT_ID: &str = "x-cs-client-id";
    pub const CLIENT_SECRET: &str = "x-cs-client-secret";
    pub const BASE_URL: &str = "x-cs-base-url";
}

pub mod network {
    pub const HTTP_DEFAULT_ADDR: &str = "127.0.0.1:8787";
}

pub mod limits {
    pub const LOG_ARGS_MAX_STRING: usize = 256;
}
