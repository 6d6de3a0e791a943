use serde::{Deserialize, Serialize};

/// File name looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Pretty-print JSON written to stdout or files.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    pub level: String, // "error" | "warn" | "info" | "debug" | "trace"
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ValidationConfig {
    /// Reject unknown component types when loading documents.
    pub strict: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompileConfig {
    /// Validate compiled IR before writing it out.
    pub verify: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self { verify: true }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TesseraConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub compile: CompileConfig,
}

impl TesseraConfig {
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: TesseraConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: TesseraConfig = toml::from_str("[validation]\nstrict = true\n").unwrap();
        assert!(config.validation.strict);
        assert!(config.output.pretty);
        assert!(config.compile.verify);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_empty_config() {
        let config: TesseraConfig = toml::from_str("").unwrap();
        assert!(!config.validation.strict);
    }
}
