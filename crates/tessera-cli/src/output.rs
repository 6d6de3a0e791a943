use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Writes command results as JSON to a file or stdout.
pub struct Output {
    pretty: bool,
}

impl Output {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    /// Write `value` to `path`, or to stdout when no path is given.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, path: Option<&Path>) -> Result<()> {
        let text = self.render(value)?;
        match path {
            Some(path) => {
                std::fs::write(path, format!("{}\n", text))
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("wrote {}", path.display());
            }
            None => println!("{}", text),
        }
        Ok(())
    }
}
