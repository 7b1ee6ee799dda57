//! Interface to the directory service that stores UDM objects.
//!
//! The importer only talks to the service through [`Directory`]. The crate
//! ships [`JsonDirectory`], which keeps the objects in a JSON snapshot.

pub mod store;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::udm::import::model::StructuralField;

pub use store::{JsonDirectory, Snapshot};

/// Failure signals raised by the directory service.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The module name does not denote a known object type.
    #[error("Could not load UDM module {0:?}: unknown module type.")]
    UnknownModule(String),

    /// A property name is not declared by the module.
    #[error("Unknown property {property:?} for module {module:?}. Use \"udm {module}\" to see known attributes.")]
    UnknownProperty { module: String, property: String },

    /// The object could not be created.
    #[error("Error creating {module} object: {reason}")]
    Create { module: String, reason: String },

    /// The object could not be modified.
    #[error("Error modifying {dn:?}: {reason}")]
    Modify { dn: String, reason: String },

    /// No object matched the lookup.
    #[error("No {module} object found with {lookup}.")]
    NoObject { module: String, lookup: String },

    /// The module needs a superordinate object that was not supplied.
    #[error("Module {0:?} requires a superordinate.")]
    NoSuperordinate(String),

    /// Backing store could not be read or written.
    #[error("directory store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing store is not valid JSON.
    #[error("directory store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema information for one UDM module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMeta {
    /// Property that uniquely names an object when no locator is given.
    pub identifying_property: String,
    /// RDN attribute used when building locators. Defaults to the
    /// identifying property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_attribute: Option<String>,
    /// Settable properties.
    #[serde(default)]
    pub properties: BTreeSet<String>,
    /// Container new objects land in when the row has no `position`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_position: Option<String>,
    /// Objects only exist below a superordinate object.
    #[serde(default)]
    pub superordinate_required: bool,
}

impl ModuleMeta {
    pub fn naming_attribute(&self) -> &str {
        self.naming_attribute
            .as_deref()
            .unwrap_or(&self.identifying_property)
    }
}

/// A directory record of one module type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UdmObject {
    pub module: String,
    /// Locator. `None` until a new object has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superordinate: Option<String>,
    #[serde(
        rename = "entryUUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_uuid: Option<String>,
    #[serde(default)]
    props: BTreeMap<String, String>,
}

impl UdmObject {
    /// Blank, unsaved object of `module`.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    /// Sets an attribute of the object itself.
    pub fn set_structural(&mut self, field: StructuralField, value: &str) {
        let slot = match field {
            StructuralField::Dn => &mut self.dn,
            StructuralField::Options => &mut self.options,
            StructuralField::Policies => &mut self.policies,
            StructuralField::Position => &mut self.position,
            StructuralField::Superordinate => &mut self.superordinate,
        };
        *slot = Some(value.to_string());
    }

    pub fn structural(&self, field: StructuralField) -> Option<&str> {
        match field {
            StructuralField::Dn => self.dn.as_deref(),
            StructuralField::Options => self.options.as_deref(),
            StructuralField::Policies => self.policies.as_deref(),
            StructuralField::Position => self.position.as_deref(),
            StructuralField::Superordinate => self.superordinate.as_deref(),
        }
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    /// Property bag. Writes go through [`Directory::set_property`].
    pub fn props(&self) -> &BTreeMap<String, String> {
        &self.props
    }

    pub(crate) fn insert_prop(&mut self, name: &str, value: &str) {
        self.props.insert(name.to_string(), value.to_string());
    }
}

/// Operations the importer needs from the directory service.
pub trait Directory {
    /// Schema of `module`.
    fn module(&self, module: &str) -> Result<ModuleMeta, DirectoryError>;

    /// Names of the settable properties, as seen on a bare new instance.
    ///
    /// Fails with [`DirectoryError::NoSuperordinate`] when a bare instance
    /// cannot exist without a superordinate.
    fn property_names(&self, module: &str) -> Result<BTreeSet<String>, DirectoryError>;

    /// Blank, unsaved object of `module`.
    fn new_object(&self, module: &str) -> Result<UdmObject, DirectoryError>;

    /// Resolves an object by locator.
    fn get(&self, module: &str, dn: &str) -> Result<UdmObject, DirectoryError>;

    /// Resolves an object by the value of the module's identifying property.
    fn get_by_id(&self, module: &str, id: &str) -> Result<UdmObject, DirectoryError>;

    /// Sets the property `name` on `object` to the text `value`.
    fn set_property(
        &self,
        object: &mut UdmObject,
        name: &str,
        value: &str,
    ) -> Result<(), DirectoryError>;

    /// Creates or updates `object` and returns its locator.
    fn save(&mut self, object: &mut UdmObject) -> Result<String, DirectoryError>;

    /// Deletes `object` and returns the locator it had.
    fn delete(&mut self, object: UdmObject) -> Result<String, DirectoryError>;
}
