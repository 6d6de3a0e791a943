//! Versioned migrations for saved documents and operations.
//!
//! Each subject has its own ordered chain of steps. A step only has to
//! return an object; the caller validates the result of the whole chain.

mod document;
mod operation;

use serde_json::{Map, Value};
use tessera_core::{TesseraError, TesseraResult};

pub use document::{document_migrations, migrate_document, migrate_document_with};
pub use operation::{migrate_operation, operation_migrations};

/// One step of a migration chain, producing `target_version`.
#[derive(Debug, Clone)]
pub struct Migration {
    pub target_version: u32,
    pub description: &'static str,
    pub transform: fn(Map<String, Value>) -> Result<Value, String>,
}

/// An ordered chain of migrations for one versioned subject.
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
    subject: &'static str,
    version_field: &'static str,
    current_version: u32,
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new(subject: &'static str, version_field: &'static str, current_version: u32) -> Self {
        Self {
            subject,
            version_field,
            current_version,
            migrations: Vec::new(),
        }
    }

    /// Builder: register a step. Steps are kept sorted by target version.
    pub fn with(
        mut self,
        target_version: u32,
        description: &'static str,
        transform: fn(Map<String, Value>) -> Result<Value, String>,
    ) -> Self {
        self.migrations.push(Migration {
            target_version,
            description,
            transform,
        });
        self.migrations.sort_by_key(|m| m.target_version);
        self
    }

    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Read the version of a raw value without migrating it.
    pub fn version_of(&self, raw: &Value) -> TesseraResult<u32> {
        let obj = raw.as_object().ok_or_else(|| {
            TesseraError::Migration(format!("{} must be a JSON object", self.subject))
        })?;
        let version = obj.get(self.version_field).ok_or_else(|| {
            TesseraError::Migration(format!(
                "{} has no '{}' field",
                self.subject, self.version_field
            ))
        })?;
        version
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                TesseraError::Migration(format!(
                    "{} '{}' must be a non-negative integer, found {}",
                    self.subject, self.version_field, version
                ))
            })
    }

    /// Run every step newer than `raw`'s version, in ascending order.
    ///
    /// Each applied step logs a warning naming the transition. A value that
    /// is already current comes back untouched.
    pub fn migrate(&self, raw: Value) -> TesseraResult<Value> {
        let mut version = self.version_of(&raw)?;
        if version > self.current_version {
            return Err(TesseraError::Migration(format!(
                "{} version {} is newer than supported version {}",
                self.subject, version, self.current_version
            )));
        }

        let start = version;
        let mut value = raw;
        for step in self
            .migrations
            .iter()
            .filter(|m| m.target_version > start)
        {
            let Value::Object(obj) = value else {
                return Err(TesseraError::Migration(format!(
                    "{} is not an object before migrating to v{}",
                    self.subject, step.target_version
                )));
            };
            tracing::warn!(
                "migrating {} from v{} to v{}: {}",
                self.subject,
                version,
                step.target_version,
                step.description
            );
            value = (step.transform)(obj).map_err(|e| {
                TesseraError::Migration(format!(
                    "{} v{} -> v{}: {}",
                    self.subject, version, step.target_version, e
                ))
            })?;
            let Some(obj) = value.as_object_mut() else {
                return Err(TesseraError::Migration(format!(
                    "{} migration to v{} did not return an object",
                    self.subject, step.target_version
                )));
            };
            obj.insert(self.version_field.to_string(), Value::from(step.target_version));
            version = step.target_version;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> MigrationRegistry {
        MigrationRegistry::new("widget", "v", 2)
            .with(2, "add size", |mut obj| {
                obj.insert("size".into(), json!(1));
                Ok(Value::Object(obj))
            })
            .with(1, "rename label", |mut obj| {
                if let Some(label) = obj.remove("label") {
                    obj.insert("title".into(), label);
                }
                Ok(Value::Object(obj))
            })
    }

    #[test]
    fn test_steps_run_in_order() {
        let out = registry().migrate(json!({ "v": 0, "label": "x" })).unwrap();
        assert_eq!(out, json!({ "v": 2, "title": "x", "size": 1 }));
    }

    #[test]
    fn test_chain_starts_after_input_version() {
        let out = registry().migrate(json!({ "v": 1, "label": "kept" })).unwrap();
        assert_eq!(out, json!({ "v": 2, "label": "kept", "size": 1 }));
    }

    #[test]
    fn test_each_step_sees_the_previous_version() {
        let chain = MigrationRegistry::new("widget", "v", 3)
            .with(1, "one", |mut obj| {
                obj.insert("seen1".into(), obj["v"].clone());
                Ok(Value::Object(obj))
            })
            .with(2, "two", |mut obj| {
                obj.insert("seen2".into(), obj["v"].clone());
                Ok(Value::Object(obj))
            })
            .with(3, "three", |mut obj| {
                obj.insert("seen3".into(), obj["v"].clone());
                Ok(Value::Object(obj))
            });
        let out = chain.migrate(json!({ "v": 0 })).unwrap();
        assert_eq!(
            out,
            json!({ "v": 3, "seen1": 0, "seen2": 1, "seen3": 2 })
        );
    }

    #[test]
    fn test_current_is_untouched() {
        let input = json!({ "v": 2, "label": "kept" });
        assert_eq!(registry().migrate(input.clone()).unwrap(), input);
    }

    #[test]
    fn test_missing_version_is_fatal() {
        assert!(matches!(
            registry().migrate(json!({ "label": "x" })),
            Err(TesseraError::Migration(_))
        ));
        assert!(matches!(
            registry().migrate(json!(null)),
            Err(TesseraError::Migration(_))
        ));
        assert!(matches!(
            registry().migrate(json!({ "v": "1" })),
            Err(TesseraError::Migration(_))
        ));
    }

    #[test]
    fn test_newer_version_rejected() {
        assert!(registry().migrate(json!({ "v": 9 })).is_err());
    }

    #[test]
    fn test_non_object_step_output_is_fatal() {
        let broken = MigrationRegistry::new("widget", "v", 1).with(1, "break", |_| Ok(json!([])));
        assert!(matches!(
            broken.migrate(json!({ "v": 0 })),
            Err(TesseraError::Migration(_))
        ));
    }
}
