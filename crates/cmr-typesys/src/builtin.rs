//! The built-in base types seeded into every registry.

use cmr_types::{property_ids as p, BaseKind, ObjectTypeId, PropertyType};

use crate::definition::{PropertyDefinition, TypeDefinition};

fn system(id: &str, property_type: PropertyType) -> PropertyDefinition {
    PropertyDefinition::new(id, property_type).read_only()
}

/// Properties every base type carries.
fn common_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new(p::NAME, PropertyType::String)
            .required()
            .with_display_name("Name"),
        PropertyDefinition::new(p::DESCRIPTION, PropertyType::String)
            .with_display_name("Description"),
        system(p::OBJECT_ID, PropertyType::Id),
        system(p::OBJECT_TYPE_ID, PropertyType::Id),
        system(p::BASE_TYPE_ID, PropertyType::Id),
        system(p::CREATED_BY, PropertyType::String),
        system(p::CREATION_DATE, PropertyType::DateTime),
        system(p::LAST_MODIFIED_BY, PropertyType::String),
        system(p::LAST_MODIFICATION_DATE, PropertyType::DateTime),
        system(p::CHANGE_TOKEN, PropertyType::String),
    ]
}

fn kind_properties(kind: BaseKind) -> Vec<PropertyDefinition> {
    match kind {
        BaseKind::Document => vec![
            system(p::IS_IMMUTABLE, PropertyType::Boolean),
            system(p::IS_LATEST_VERSION, PropertyType::Boolean),
            system(p::IS_MAJOR_VERSION, PropertyType::Boolean),
            system(p::IS_LATEST_MAJOR_VERSION, PropertyType::Boolean),
            system(p::IS_PRIVATE_WORKING_COPY, PropertyType::Boolean),
            system(p::VERSION_LABEL, PropertyType::String),
            system(p::VERSION_SERIES_ID, PropertyType::Id),
            system(p::IS_VERSION_SERIES_CHECKED_OUT, PropertyType::Boolean),
            system(p::VERSION_SERIES_CHECKED_OUT_BY, PropertyType::String),
            system(p::VERSION_SERIES_CHECKED_OUT_ID, PropertyType::Id),
            system(p::CHECKIN_COMMENT, PropertyType::String),
            system(p::CONTENT_STREAM_LENGTH, PropertyType::Integer),
            system(p::CONTENT_STREAM_MIME_TYPE, PropertyType::String),
            system(p::CONTENT_STREAM_FILE_NAME, PropertyType::String),
            system(p::CONTENT_STREAM_ID, PropertyType::Id),
        ],
        BaseKind::Folder => vec![
            system(p::PARENT_ID, PropertyType::Id),
            system(p::PATH, PropertyType::String),
            system(p::ALLOWED_CHILD_OBJECT_TYPE_IDS, PropertyType::Id).multi(),
        ],
        BaseKind::Relationship => vec![
            PropertyDefinition::new(p::SOURCE_ID, PropertyType::Id).required(),
            PropertyDefinition::new(p::TARGET_ID, PropertyType::Id).required(),
        ],
        BaseKind::Policy => vec![PropertyDefinition::new(p::POLICY_TEXT, PropertyType::String)],
    }
}

/// The built-in definition of a base type.
pub fn base_type(kind: BaseKind) -> TypeDefinition {
    let mut def = TypeDefinition::base_like(ObjectTypeId::new(kind.base_type_str()), kind)
        .with_display_name(match kind {
            BaseKind::Document => "Document",
            BaseKind::Folder => "Folder",
            BaseKind::Relationship => "Relationship",
            BaseKind::Policy => "Policy",
        });
    // Relationship semantics are not provided; the base type is listed but
    // cannot be instantiated.
    if kind == BaseKind::Relationship {
        def.flags.creatable = false;
    }
    for prop in common_properties().into_iter().chain(kind_properties(kind)) {
        def = def.with_property(prop);
    }
    def
}

/// All four base types.
pub fn base_types() -> Vec<TypeDefinition> {
    BaseKind::ALL.iter().map(|k| base_type(*k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_parentless_base_types() {
        let types = base_types();
        assert_eq!(types.len(), 4);
        assert!(types.iter().all(TypeDefinition::is_base_type));
    }

    #[test]
    fn every_base_type_has_common_properties() {
        for def in base_types() {
            for id in [p::NAME, p::OBJECT_ID, p::CHANGE_TOKEN, p::CREATION_DATE] {
                assert!(def.property_definition(id).is_some(), "{} lacks {id}", def.id);
            }
        }
    }

    #[test]
    fn name_is_required_and_writable() {
        let def = base_type(BaseKind::Folder);
        let name = def.property_definition(p::NAME).unwrap();
        assert!(name.required);
        assert_eq!(name.updatability, cmr_types::Updatability::ReadWrite);
    }

    #[test]
    fn kind_specific_properties() {
        assert!(base_type(BaseKind::Folder).property_definition(p::PATH).is_some());
        assert!(base_type(BaseKind::Document)
            .property_definition(p::VERSION_LABEL)
            .is_some());
        assert!(base_type(BaseKind::Document).property_definition(p::PATH).is_none());
    }

    #[test]
    fn relationship_base_is_not_creatable() {
        assert!(!base_type(BaseKind::Relationship).flags.creatable);
        assert!(base_type(BaseKind::Policy).flags.creatable);
    }
}
