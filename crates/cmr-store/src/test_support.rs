//! Fixtures shared by the store's unit tests.

use std::sync::Arc;

use cmr_types::{BaseKind, CallContext, ObjectId, ObjectTypeId, Properties, VersioningState};
use cmr_typesys::{ContentStreamAllowed, InMemoryTypeManager, TypeDefinition, TypeManager};

use crate::config::StoreConfig;
use crate::content::Content;
use crate::memory::InMemoryObjectStore;
use crate::traits::ObjectStore;

pub fn folder_type() -> ObjectTypeId {
    BaseKind::Folder.base_type_id()
}

pub fn document_type() -> ObjectTypeId {
    BaseKind::Document.base_type_id()
}

pub fn versioned_type() -> ObjectTypeId {
    ObjectTypeId::new("test:versioned")
}

pub fn setup_with(config: StoreConfig) -> (InMemoryObjectStore, CallContext) {
    let types = InMemoryTypeManager::new();
    types
        .add_type(
            TypeDefinition::new("test:versioned", "cmis:document", BaseKind::Document)
                .versionable(true),
        )
        .unwrap();
    types
        .add_type(
            TypeDefinition::new("test:nocontent", "cmis:document", BaseKind::Document)
                .with_content_stream(ContentStreamAllowed::NotAllowed),
        )
        .unwrap();
    let store = InMemoryObjectStore::new(Arc::new(types), config);
    (store, CallContext::user("A1", "alice"))
}

pub fn setup() -> (InMemoryObjectStore, CallContext) {
    setup_with(StoreConfig::default())
}

pub fn text(s: &str) -> Content {
    Content::new(s.as_bytes().to_vec(), "text/plain")
}

pub fn folder(
    store: &InMemoryObjectStore,
    ctx: &CallContext,
    parent: &ObjectId,
    name: &str,
) -> ObjectId {
    store
        .create_folder(ctx, parent, name, &folder_type(), &Properties::new())
        .unwrap()
}

pub fn plain_doc(
    store: &InMemoryObjectStore,
    ctx: &CallContext,
    parent: &ObjectId,
    name: &str,
    body: Option<&str>,
) -> ObjectId {
    store
        .create_document(
            ctx,
            Some(parent),
            name,
            &document_type(),
            &Properties::new(),
            body.map(text),
            VersioningState::None,
        )
        .unwrap()
}

/// A versionable document whose first version holds `"content"`.
pub fn versioned_doc(
    store: &InMemoryObjectStore,
    ctx: &CallContext,
    parent: &ObjectId,
    name: &str,
    state: VersioningState,
) -> ObjectId {
    store
        .create_document(
            ctx,
            Some(parent),
            name,
            &versioned_type(),
            &Properties::new(),
            Some(text("content")),
            state,
        )
        .unwrap()
}
