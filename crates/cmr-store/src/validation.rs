//! Property validation against a type's effective definitions.

use cmr_types::{property_ids, Properties, Updatability};
use cmr_typesys::TypeDefinition;

use crate::error::{StoreError, StoreResult};

/// What the properties are being validated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Purpose {
    Create,
    /// `checked_out` is true when the target is a private working copy.
    Update { checked_out: bool },
}

/// Ids handled explicitly by the operations rather than stored as data.
fn is_structural(id: &str) -> bool {
    id == property_ids::NAME || id == property_ids::OBJECT_TYPE_ID
}

/// Validate caller-supplied properties and return the storable subset.
///
/// - Unknown ids, wrong value types and too many values for a single-valued
///   property are `InvalidArgument`.
/// - Writing a read-only property, or a when-checked-out property outside a
///   working copy, is `Constraint`.
/// - On create, every required property must be supplied; on update a
///   required property may not be cleared.
pub(crate) fn validate_properties(
    def: &TypeDefinition,
    props: &Properties,
    purpose: Purpose,
) -> StoreResult<Properties> {
    let mut accepted = Properties::new();
    for data in props.iter() {
        if is_structural(&data.id) {
            continue;
        }
        let prop_def = def.property_definition(&data.id).ok_or_else(|| {
            StoreError::invalid(format!("type {} has no property {}", def.id, data.id))
        })?;
        match (prop_def.updatability, purpose) {
            (Updatability::ReadOnly, _) => {
                return Err(StoreError::constraint(format!(
                    "property {} is read-only",
                    data.id
                )));
            }
            (Updatability::WhenCheckedOut, Purpose::Update { checked_out: false }) => {
                return Err(StoreError::constraint(format!(
                    "property {} can only be updated on a checked-out document",
                    data.id
                )));
            }
            _ => {}
        }
        if !prop_def.is_multi() && data.values.len() > 1 {
            return Err(StoreError::invalid(format!(
                "property {} is single-valued but {} values were given",
                data.id,
                data.values.len()
            )));
        }
        if let Some(bad) = data
            .values
            .iter()
            .find(|v| v.property_type() != prop_def.property_type)
        {
            return Err(StoreError::invalid(format!(
                "property {} expects {} values, got {}",
                data.id,
                prop_def.property_type,
                bad.property_type()
            )));
        }
        if prop_def.required && data.is_empty() {
            return Err(StoreError::invalid(format!(
                "required property {} cannot be cleared",
                data.id
            )));
        }
        accepted.insert(data.clone());
    }

    if purpose == Purpose::Create {
        let missing = def.property_definitions.values().find(|d| {
            d.required
                && d.updatability != Updatability::ReadOnly
                && !is_structural(&d.id)
                && accepted.get(&d.id).map_or(true, |v| v.is_empty())
        });
        if let Some(d) = missing {
            return Err(StoreError::invalid(format!(
                "required property {} is missing",
                d.id
            )));
        }
        // Unset entries carry no information on a fresh object.
        accepted = accepted.iter().filter(|d| !d.is_empty()).cloned().collect();
    }
    Ok(accepted)
}
