//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    /// A configuration with no sections; every lookup falls back to its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[database]
backend = sqlite

[sqlite]
path = /var/lib/cryptoingest/crypto_data.db

[provider]
base_url = https://api.coingecko.com/api/v3
top_n = 50
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("database", "backend"),
            Some("sqlite".to_string())
        );
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/var/lib/cryptoingest/crypto_data.db".to_string())
        );
        assert_eq!(adapter.get_int("provider", "top_n", 100), 50);
    }

    #[test]
    fn empty_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("sqlite", "path"), None);
        assert_eq!(adapter.get_int("provider", "top_n", 100), 100);
        assert_eq!(adapter.get_int("pipeline", "pace_secs", 60), 60);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[provider]\ntop_n = 100\n").unwrap();
        assert_eq!(adapter.get_string("provider", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[provider]\ntop_n = lots\n").unwrap();
        assert_eq!(adapter.get_int("provider", "top_n", 100), 100);
    }

    #[test]
    fn get_secs_reads_whole_seconds() {
        let adapter =
            FileConfigAdapter::from_string("[pipeline]\npace_secs = 90\n").unwrap();
        assert_eq!(
            adapter.get_secs("pipeline", "pace_secs", 60),
            std::time::Duration::from_secs(90)
        );
        assert_eq!(
            adapter.get_secs("provider", "timeout_secs", 30),
            std::time::Duration::from_secs(30)
        );
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[postgres]\nconnection_string = host=db user=ingest\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("postgres", "connection_string"),
            Some("host=db user=ingest".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/cryptoingest.ini");
        assert!(result.is_err());
    }
}
