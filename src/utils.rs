use std::fs::read_to_string;

use anyhow::Context;
use tracing::debug;

pub async fn shutdown_signal() {
    let signal = ::utils::wait_for_stop_signal().await;
    debug!("Received signal: {}", signal);
}

/// Reads `<name>.toml` (or `path`), then `/etc/camsync/<name>.toml`. Missing
/// files leave every field at its default; a malformed one is an error.
pub fn load<T>(name: &str, path: Option<String>) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_to_string(path.unwrap_or(format!("{name}.toml")))
        .or(read_to_string(format!("/etc/camsync/{name}.toml")))
        .unwrap_or_default();
    toml::from_str(&content).with_context(|| format!("invalid {name} configuration"))
}
