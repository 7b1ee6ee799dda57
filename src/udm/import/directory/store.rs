use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::udm::import::directory::{Directory, DirectoryError, ModuleMeta, UdmObject};

/// Serialised state of a [`JsonDirectory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Suffix for positions when neither row nor module supply one.
    pub base_dn: String,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleMeta>,
    #[serde(default)]
    pub objects: Vec<UdmObject>,
}

/// Directory service backed by a JSON snapshot.
///
/// Every successful save or delete rewrites the snapshot file when the
/// directory was opened from one.
#[derive(Debug, Clone)]
pub struct JsonDirectory {
    snapshot: Snapshot,
    path: Option<PathBuf>,
}

impl JsonDirectory {
    /// Loads the snapshot stored at `path`.
    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        let source = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&source)?;
        debug!(
            path = %path.display(),
            modules = snapshot.modules.len(),
            objects = snapshot.objects.len(),
            "loaded directory snapshot"
        );
        Ok(Self {
            snapshot,
            path: Some(path.to_path_buf()),
        })
    }

    /// Directory that is never written to disk.
    pub fn in_memory(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            path: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn meta(&self, module: &str) -> Result<&ModuleMeta, DirectoryError> {
        self.snapshot
            .modules
            .get(module)
            .ok_or_else(|| DirectoryError::UnknownModule(module.to_string()))
    }

    fn find(&self, predicate: impl Fn(&UdmObject) -> bool) -> Option<usize> {
        self.snapshot.objects.iter().position(predicate)
    }

    fn persist(&self) -> Result<(), DirectoryError> {
        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&self.snapshot)?;
            fs::write(path, json)?;
        }
        Ok(())
    }

    fn insert(&mut self, object: &mut UdmObject, meta: &ModuleMeta) -> Result<String, DirectoryError> {
        let create_error = |reason: String| DirectoryError::Create {
            module: object.module.clone(),
            reason,
        };
        let id_property = &meta.identifying_property;
        let id_value = object.prop(id_property).unwrap_or_default();
        if id_value.is_empty() {
            return Err(create_error(format!("property {id_property:?} is required")));
        }

        let position = object
            .position
            .clone()
            .filter(|position| !position.is_empty())
            .or_else(|| meta.default_position.clone())
            .unwrap_or_else(|| self.snapshot.base_dn.clone());
        let dn = format!("{}={},{}", meta.naming_attribute(), id_value, position);

        if self.find(|other| other.dn.as_deref() == Some(dn.as_str())).is_some() {
            return Err(create_error(format!("Object exists: {dn}")));
        }
        if self
            .find(|other| other.module == object.module && other.prop(id_property) == Some(id_value))
            .is_some()
        {
            return Err(create_error(format!(
                "{id_property} {id_value:?} is already in use"
            )));
        }

        object.dn = Some(dn.clone());
        object.position = Some(position);
        object.entry_uuid = Some(Uuid::new_v4().to_string());
        self.snapshot.objects.push(object.clone());
        Ok(dn)
    }

    fn update(&mut self, object: &mut UdmObject, meta: &ModuleMeta) -> Result<String, DirectoryError> {
        let index = self
            .find(|other| other.entry_uuid.is_some() && other.entry_uuid == object.entry_uuid)
            .ok_or_else(|| DirectoryError::NoObject {
                module: object.module.clone(),
                lookup: format!("entryUUID {:?}", object.entry_uuid.as_deref().unwrap_or_default()),
            })?;
        let stored_dn = self.snapshot.objects[index].dn.clone().unwrap_or_default();
        let modify_error = |reason: String| DirectoryError::Modify {
            dn: stored_dn.clone(),
            reason,
        };

        if object.dn.as_deref() != Some(stored_dn.as_str()) {
            return Err(modify_error("moving or renaming objects is not supported".into()));
        }
        let stored_position = self.snapshot.objects[index].position.clone();
        match object.position.clone().filter(|position| !position.is_empty()) {
            None => object.position = stored_position,
            Some(position) if Some(&position) != stored_position.as_ref() => {
                return Err(modify_error(format!(
                    "moving objects to {position:?} is not supported"
                )));
            }
            Some(_) => {}
        }
        let id_property = &meta.identifying_property;
        let id_value = object.prop(id_property).unwrap_or_default();
        if id_value.is_empty() {
            return Err(modify_error(format!("property {id_property:?} is required")));
        }
        let clash = self.snapshot.objects.iter().enumerate().any(|(other_index, other)| {
            other_index != index
                && other.module == object.module
                && other.prop(id_property) == Some(id_value)
        });
        if clash {
            return Err(modify_error(format!(
                "{id_property} {id_value:?} is already in use"
            )));
        }

        self.snapshot.objects[index] = object.clone();
        Ok(stored_dn)
    }
}

impl Directory for JsonDirectory {
    fn module(&self, module: &str) -> Result<ModuleMeta, DirectoryError> {
        self.meta(module).cloned()
    }

    fn property_names(&self, module: &str) -> Result<BTreeSet<String>, DirectoryError> {
        let meta = self.meta(module)?;
        if meta.superordinate_required {
            return Err(DirectoryError::NoSuperordinate(module.to_string()));
        }
        Ok(meta.properties.clone())
    }

    fn new_object(&self, module: &str) -> Result<UdmObject, DirectoryError> {
        self.meta(module)?;
        Ok(UdmObject::new(module))
    }

    fn get(&self, module: &str, dn: &str) -> Result<UdmObject, DirectoryError> {
        self.meta(module)?;
        self.snapshot
            .objects
            .iter()
            .find(|object| object.module == module && object.dn.as_deref() == Some(dn))
            .cloned()
            .ok_or_else(|| DirectoryError::NoObject {
                module: module.to_string(),
                lookup: format!("dn {dn:?}"),
            })
    }

    fn get_by_id(&self, module: &str, id: &str) -> Result<UdmObject, DirectoryError> {
        let id_property = &self.meta(module)?.identifying_property;
        self.snapshot
            .objects
            .iter()
            .find(|object| object.module == module && object.prop(id_property) == Some(id))
            .cloned()
            .ok_or_else(|| DirectoryError::NoObject {
                module: module.to_string(),
                lookup: format!("{id_property}={id:?}"),
            })
    }

    fn set_property(
        &self,
        object: &mut UdmObject,
        name: &str,
        value: &str,
    ) -> Result<(), DirectoryError> {
        let meta = self.meta(&object.module)?;
        if !meta.properties.contains(name) {
            return Err(DirectoryError::UnknownProperty {
                module: object.module.clone(),
                property: name.to_string(),
            });
        }
        object.insert_prop(name, value);
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(module = %object.module))]
    fn save(&mut self, object: &mut UdmObject) -> Result<String, DirectoryError> {
        let meta = self.meta(&object.module)?.clone();
        if meta.superordinate_required
            && object.superordinate.as_deref().is_none_or(str::is_empty)
        {
            return Err(DirectoryError::NoSuperordinate(object.module.clone()));
        }

        let dn = if object.entry_uuid.is_none() {
            self.insert(object, &meta)?
        } else {
            self.update(object, &meta)?
        };
        self.persist()?;
        debug!(%dn, "saved object");
        Ok(dn)
    }

    #[instrument(level = "debug", skip_all, fields(module = %object.module))]
    fn delete(&mut self, object: UdmObject) -> Result<String, DirectoryError> {
        let dn = object.dn.clone().unwrap_or_default();
        let index = self
            .find(|other| other.module == object.module && other.dn.as_deref() == Some(dn.as_str()))
            .ok_or_else(|| DirectoryError::NoObject {
                module: object.module.clone(),
                lookup: format!("dn {dn:?}"),
            })?;
        self.snapshot.objects.remove(index);
        self.persist()?;
        debug!(%dn, "deleted object");
        Ok(dn)
    }
}
