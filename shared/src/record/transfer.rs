use std::collections::{BTreeMap, HashMap, HashSet};

use crate::record::{error::RecordError, FieldKind, Record};

/// Receives `(wire key, wire value)` pairs from an export
pub trait RecordSink {
    fn put(&mut self, key: &str, value: String);
}

impl RecordSink for Vec<(String, String)> {
    fn put(&mut self, key: &str, value: String) {
        self.push((key.to_string(), value));
    }
}

impl RecordSink for BTreeMap<String, String> {
    fn put(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

impl RecordSink for HashMap<String, String> {
    fn put(&mut self, key: &str, value: String) {
        self.insert(key.to_string(), value);
    }
}

/// Supplies wire values to an import. `Ok(None)` means the key is absent.
pub trait RecordSource {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError>;
}

impl RecordSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
        Ok(BTreeMap::get(self, key).cloned())
    }
}

impl RecordSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
        Ok(HashMap::get(self, key).cloned())
    }
}

impl RecordSource for Vec<(String, String)> {
    fn get(&self, key: &str) -> Result<Option<String>, RecordError> {
        Ok(self
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.clone()))
    }
}

/// The wire key of field `name` under an optional prefix
pub fn wire_key(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, name),
        _ => name.to_string(),
    }
}

/// Flattens `record` into `sink`, one call per present scalar, in field
/// declaration order. Nested records are flattened under their own prefix.
pub fn export_record<R: Record>(record: &R, prefix: Option<&str>, sink: &mut dyn RecordSink) {
    for field in R::fields() {
        match &field.kind {
            FieldKind::Scalar { read, .. } => {
                if let Some(value) = read(record) {
                    sink.put(&wire_key(prefix, field.name), value);
                }
            }
            FieldKind::Nested { export, .. } => {
                export(record, &wire_key(prefix, field.name), sink);
            }
            FieldKind::Ignored => {}
        }
    }
}

/// Rebuilds a record from `source`. Absent keys leave their field at its
/// default; any decode failure fails the whole import.
pub fn import_record<R: Record>(
    prefix: Option<&str>,
    source: &dyn RecordSource,
) -> Result<R, RecordError> {
    let mut record = R::default();

    for field in R::fields() {
        match &field.kind {
            FieldKind::Scalar { write, .. } => {
                let key = wire_key(prefix, field.name);
                let Some(value) = source.get(&key)? else {
                    continue;
                };
                write(&mut record, &value).map_err(|source| RecordError::Decode {
                    record: R::NAME,
                    key,
                    source,
                })?;
            }
            FieldKind::Nested { import, .. } => {
                import(&mut record, &wire_key(prefix, field.name), source)?;
            }
            FieldKind::Ignored => {}
        }
    }

    Ok(record)
}

/// Every wire key `R` can produce under `prefix`, in export order
pub fn record_wire_keys<R: Record>(prefix: Option<&str>) -> Vec<String> {
    let mut keys = Vec::new();
    for field in R::fields() {
        match &field.kind {
            FieldKind::Scalar { .. } => keys.push(wire_key(prefix, field.name)),
            FieldKind::Nested { keys: nested_keys, .. } => {
                keys.extend(nested_keys(&wire_key(prefix, field.name)));
            }
            FieldKind::Ignored => {}
        }
    }
    keys
}

/// Fails if two fields of `R` flatten to the same wire key
pub fn check_unique_wire_keys<R: Record>(prefix: Option<&str>) -> Result<(), RecordError> {
    let mut seen = HashSet::new();
    for key in record_wire_keys::<R>(prefix) {
        if !seen.insert(key.clone()) {
            return Err(RecordError::DuplicateWireKey {
                record: R::NAME,
                key,
            });
        }
    }
    Ok(())
}
