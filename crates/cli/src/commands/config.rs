use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "storage.backend",
        config.storage.backend.as_str(),
        source("storage.backend", &["TRIPLINE_STORAGE_BACKEND"]),
    ));
    lines.push(render_line(
        "storage.path",
        &config.storage.path.display().to_string(),
        source("storage.path", &["TRIPLINE_STORAGE_PATH"]),
    ));
    lines.push(render_line(
        "storage.database_url",
        &config.storage.database_url,
        source("storage.database_url", &["TRIPLINE_STORAGE_DATABASE_URL", "TRIPLINE_DATABASE_URL"]),
    ));
    lines.push(render_line(
        "storage.max_connections",
        &config.storage.max_connections.to_string(),
        source("storage.max_connections", &["TRIPLINE_STORAGE_MAX_CONNECTIONS"]),
    ));
    lines.push(render_line(
        "storage.timeout_secs",
        &config.storage.timeout_secs.to_string(),
        source("storage.timeout_secs", &["TRIPLINE_STORAGE_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "search.result_limit",
        &config.search.result_limit.to_string(),
        source("search.result_limit", &["TRIPLINE_SEARCH_RESULT_LIMIT"]),
    ));
    lines.push(render_line(
        "search.currency",
        &config.search.currency,
        source("search.currency", &["TRIPLINE_SEARCH_CURRENCY"]),
    ));
    lines.push(render_line(
        "search.deep_link_base_url",
        &config.search.deep_link_base_url,
        source("search.deep_link_base_url", &["TRIPLINE_SEARCH_DEEP_LINK_BASE_URL"]),
    ));
    lines.push(render_line(
        "search.timeout_secs",
        &config.search.timeout_secs.to_string(),
        source("search.timeout_secs", &["TRIPLINE_SEARCH_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["TRIPLINE_LOGGING_LEVEL", "TRIPLINE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        source("logging.format", &["TRIPLINE_LOGGING_FORMAT", "TRIPLINE_LOG_FORMAT"]),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    ["tripline.toml", "config/tripline.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_the_config_document() {
        let doc: toml::Value =
            "[search]\ncurrency = \"USD\"\n".parse().expect("valid toml document");

        assert!(contains_path(&doc, "search.currency"));
        assert!(!contains_path(&doc, "search.result_limit"));
        assert!(!contains_path(&doc, "storage.path"));
    }
}
