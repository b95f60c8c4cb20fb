//! The [`TypeManager`] trait defining the type registry interface.

use cmr_types::ObjectTypeId;

use crate::definition::{TypeDefinition, TypeTreeNode};
use crate::error::Result;

/// Registry of type definitions.
///
/// Implementations must be thread-safe and must guarantee that every
/// returned definition carries its full effective property map: all
/// definitions of all ancestors with `inherited = true`, plus its own.
/// Definitions are immutable once registered.
pub trait TypeManager: Send + Sync {
    /// Register a new sub-type. The parent must already be registered.
    fn add_type(&self, definition: TypeDefinition) -> Result<TypeDefinition>;

    /// Type updates are not supported by any backend.
    fn update_type(&self, definition: TypeDefinition) -> Result<TypeDefinition>;

    /// Remove a type with no sub-types.
    fn delete_type(&self, id: &ObjectTypeId) -> Result<()>;

    /// Look up a type by id. Returns `Ok(None)` if it is not registered.
    fn get_type(&self, id: &ObjectTypeId) -> Result<Option<TypeDefinition>>;

    /// Look up a type by its query name.
    fn get_type_by_query_name(&self, query_name: &str) -> Result<Option<TypeDefinition>>;

    /// Direct children of `parent`, or the base types when `parent` is `None`.
    /// Sorted by id.
    fn get_type_children(
        &self,
        parent: Option<&ObjectTypeId>,
        include_property_definitions: bool,
    ) -> Result<Vec<TypeDefinition>>;

    /// Sub-type hierarchy below `root` (or below every base type when `None`).
    /// `depth = None` means unlimited; `Some(0)` is invalid.
    fn get_type_descendants(
        &self,
        root: Option<&ObjectTypeId>,
        depth: Option<usize>,
        include_property_definitions: bool,
    ) -> Result<Vec<TypeTreeNode>>;

    /// The parentless base types.
    fn root_types(&self) -> Result<Vec<TypeDefinition>> {
        self.get_type_children(None, true)
    }

    /// Returns `true` if `id` equals `ancestor` or derives from it.
    fn is_subtype_of(&self, id: &ObjectTypeId, ancestor: &ObjectTypeId) -> Result<bool> {
        let mut current = self.get_type(id)?;
        while let Some(def) = current {
            if &def.id == ancestor {
                return Ok(true);
            }
            current = match def.parent_type_id {
                Some(parent) => self.get_type(&parent)?,
                None => None,
            };
        }
        Ok(false)
    }
}
