use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::process::{run_command, which};

const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";
const KEYCHAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct CredentialsPayload {
    #[serde(rename = "claudeAiOauth")]
    claude_ai_oauth: Option<OAuthEntry>,
}

#[derive(Deserialize)]
struct OAuthEntry {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// Bearer token for the quota endpoint, or None when every source comes up
/// empty. Sources are tried in order: the credentials file on disk, then the
/// `security` keychain CLI. Not-found is a normal outcome, never an error.
pub async fn get_oauth_token() -> Option<String> {
    if let Some(token) = token_from_credentials_file() {
        return Some(token);
    }
    token_from_keychain_cli().await
}

fn token_from_credentials_file() -> Option<String> {
    let content = std::fs::read_to_string(credentials_path()).ok()?;
    extract_token(&content)
}

async fn token_from_keychain_cli() -> Option<String> {
    which("security")?;
    let payload = run_command(
        "security",
        &["find-generic-password", "-s", KEYCHAIN_SERVICE, "-w"],
        KEYCHAIN_TIMEOUT,
    )
    .await
    .ok()?;
    extract_token(&payload)
}

fn extract_token(payload: &str) -> Option<String> {
    let parsed: CredentialsPayload = serde_json::from_str(payload).ok()?;
    let token = parsed.claude_ai_oauth?.access_token?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn credentials_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("~"))
        .join(".claude")
        .join(".credentials.json")
}
