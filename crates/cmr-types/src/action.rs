use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A capability a principal may exercise on an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "canDeleteObject")]
    DeleteObject,
    #[serde(rename = "canUpdateProperties")]
    UpdateProperties,
    #[serde(rename = "canGetProperties")]
    GetProperties,
    #[serde(rename = "canGetObjectParents")]
    GetObjectParents,
    #[serde(rename = "canGetFolderTree")]
    GetFolderTree,
    #[serde(rename = "canGetDescendants")]
    GetDescendants,
    #[serde(rename = "canAddObjectToFolder")]
    AddObjectToFolder,
    #[serde(rename = "canRemoveObjectFromFolder")]
    RemoveObjectFromFolder,
    #[serde(rename = "canCreateDocument")]
    CreateDocument,
    #[serde(rename = "canCreateFolder")]
    CreateFolder,
    #[serde(rename = "canGetChildren")]
    GetChildren,
    #[serde(rename = "canDeleteTree")]
    DeleteTree,
    #[serde(rename = "canGetFolderParent")]
    GetFolderParent,
    #[serde(rename = "canGetContentStream")]
    GetContentStream,
    #[serde(rename = "canDeleteContentStream")]
    DeleteContentStream,
    #[serde(rename = "canSetContentStream")]
    SetContentStream,
    #[serde(rename = "canGetAllVersions")]
    GetAllVersions,
    #[serde(rename = "canCheckOut")]
    CheckOut,
    #[serde(rename = "canCancelCheckOut")]
    CancelCheckOut,
    #[serde(rename = "canCheckIn")]
    CheckIn,
}

impl Action {
    /// The CMIS wire name of the action (e.g. `canCheckOut`).
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::DeleteObject => "canDeleteObject",
            Self::UpdateProperties => "canUpdateProperties",
            Self::GetProperties => "canGetProperties",
            Self::GetObjectParents => "canGetObjectParents",
            Self::GetFolderTree => "canGetFolderTree",
            Self::GetDescendants => "canGetDescendants",
            Self::AddObjectToFolder => "canAddObjectToFolder",
            Self::RemoveObjectFromFolder => "canRemoveObjectFromFolder",
            Self::CreateDocument => "canCreateDocument",
            Self::CreateFolder => "canCreateFolder",
            Self::GetChildren => "canGetChildren",
            Self::DeleteTree => "canDeleteTree",
            Self::GetFolderParent => "canGetFolderParent",
            Self::GetContentStream => "canGetContentStream",
            Self::DeleteContentStream => "canDeleteContentStream",
            Self::SetContentStream => "canSetContentStream",
            Self::GetAllVersions => "canGetAllVersions",
            Self::CheckOut => "canCheckOut",
            Self::CancelCheckOut => "canCancelCheckOut",
            Self::CheckIn => "canCheckIn",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The set of actions derived for one object/principal pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowableActions {
    actions: BTreeSet<Action>,
}

impl AllowableActions {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one action.
    pub fn insert(&mut self, action: Action) {
        self.actions.insert(action);
    }

    /// Add several actions.
    pub fn extend(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.actions.extend(actions);
    }

    /// Returns `true` if `action` is allowed.
    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Number of allowed actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<Action> for AllowableActions {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Action::CheckOut).unwrap();
        assert_eq!(json, "\"canCheckOut\"");
        assert_eq!(Action::CheckOut.to_string(), "canCheckOut");
    }

    #[test]
    fn set_semantics() {
        let mut actions: AllowableActions =
            [Action::GetProperties, Action::DeleteObject].into_iter().collect();
        actions.insert(Action::GetProperties);
        assert_eq!(actions.len(), 2);
        assert!(actions.contains(Action::DeleteObject));
        assert!(!actions.contains(Action::CheckIn));
    }
}
