//! Hierarchical group storage backed by a directory tree.
//!
//! A [`Group`] is a directory. Nested groups are sub-directories,
//! scalar attributes live in a `.attrs.json` file inside the group and
//! datasets are plain files holding opaque bytes.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

const ATTRS_FILE: &str = ".attrs.json";

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    path: PathBuf,
}

impl Group {
    /// Create the root group at `path`, including missing parents.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Open an existing root group.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(AgentError::MissingGroup(path));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn create_group(&self, name: &str) -> Result<Group> {
        let path = self.child(name)?;
        fs::create_dir_all(&path)?;
        Ok(Group { path })
    }

    pub fn group(&self, name: &str) -> Result<Group> {
        let path = self.child(name)?;
        if !path.is_dir() {
            return Err(AgentError::MissingGroup(path));
        }
        Ok(Group { path })
    }

    pub fn attrs(&self) -> Result<BTreeMap<String, AttrValue>> {
        let path = self.path.join(ATTRS_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn set_attr(&self, key: &str, value: impl Into<AttrValue>) -> Result<()> {
        validate_name(key)?;
        let mut attrs = self.attrs()?;
        attrs.insert(key.to_string(), value.into());
        fs::write(self.path.join(ATTRS_FILE), serde_json::to_string_pretty(&attrs)?)?;
        Ok(())
    }

    pub fn attr(&self, key: &str) -> Result<AttrValue> {
        self.attrs()?
            .remove(key)
            .ok_or_else(|| AgentError::MissingAttribute {
                group: self.path.clone(),
                key: key.to_string(),
            })
    }

    pub fn attr_str(&self, key: &str) -> Result<String> {
        match self.attr(key)? {
            AttrValue::Str(value) => Ok(value),
            _ => Err(AgentError::AttributeType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    pub fn attr_int(&self, key: &str) -> Result<i64> {
        match self.attr(key)? {
            AttrValue::Int(value) => Ok(value),
            _ => Err(AgentError::AttributeType {
                key: key.to_string(),
                expected: "integer",
            }),
        }
    }

    pub fn write_dataset(&self, name: &str, bytes: &[u8]) -> Result<()> {
        fs::write(self.child(name)?, bytes)?;
        Ok(())
    }

    pub fn read_dataset(&self, name: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.child(name)?)?)
    }

    fn child(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.path.join(name))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(AgentError::InvalidName(name.to_string()));
    }
    Ok(())
}
