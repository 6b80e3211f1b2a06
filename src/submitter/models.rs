use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationType {
    #[default]
    NoAuth,
    ApiKey(ApiKeyType),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyType {
    Basic,
    Bearer,
    Custom,
}

/// Authorization sent with every submission.
///
/// For `api_key = "basic"` the key is either `user:password`, which is
/// base64-encoded here, or an already encoded credential (no `:`), which is
/// sent as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationConfig {
    #[serde(default)]
    pub auth_type: AuthorizationType,
    pub api_key: Option<String>,
    /// header name, defaults to `Authorization`
    pub header: Option<String>,
}
