//! Oracle provider wiring from environment variables.
//!
//! The fast tier reads `AI_PROVIDER`, `AI_API_URL`, `AI_API_KEY`, and
//! `AI_MODEL`. The expert tier reads the same names with an `EXPERT_` prefix
//! and falls back to the fast tier's values, so a single-model setup needs no
//! extra configuration.

use anyhow::{bail, Context, Result};
use menuforge::providers::ai::gemini::GeminiProvider;
use menuforge::providers::ai::local::LocalAiProvider;
use menuforge::OracleProvider;
use std::env;

fn env_or(prefix: &str, name: &str) -> Option<String> {
    env::var(format!("{prefix}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| env::var(name).ok().filter(|v| !v.is_empty()))
}

fn build_tier(prefix: &str) -> Result<Box<dyn OracleProvider>> {
    let kind = env_or(prefix, "AI_PROVIDER").unwrap_or_else(|| "gemini".to_string());
    let api_url = env_or(prefix, "AI_API_URL").context("AI_API_URL is not set")?;

    match kind.as_str() {
        "gemini" => {
            let api_key = env_or(prefix, "AI_API_KEY").unwrap_or_default();
            Ok(Box::new(GeminiProvider::new(api_url, api_key)?))
        }
        "local" => Ok(Box::new(LocalAiProvider::new(
            api_url,
            env_or(prefix, "AI_API_KEY"),
            env_or(prefix, "AI_MODEL"),
        )?)),
        other => bail!("Unknown AI provider '{other}'. Expected 'gemini' or 'local'."),
    }
}

/// Builds the (fast, expert) oracle pair from the environment.
pub fn build_oracles() -> Result<(Box<dyn OracleProvider>, Box<dyn OracleProvider>)> {
    Ok((build_tier("")?, build_tier("EXPERT_")?))
}
