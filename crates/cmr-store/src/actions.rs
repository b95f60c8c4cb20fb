//! Allowable-actions computation.
//!
//! A pure function of an object's observable state and the acting user.
//! Nothing here reads the store; callers describe the object with an
//! [`ActionSubject`].

use cmr_types::{Action, AllowableActions};

/// The facts about an object that determine what a user may do with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSubject<'a> {
    pub shape: SubjectShape,
    pub has_content: bool,
    /// `Some` for objects that belong to a version series; the inner value
    /// is the check-out owner, if any.
    pub series: Option<Option<&'a str>>,
    /// A checked-in version; its content can no longer change.
    pub frozen: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubjectShape {
    Folder { is_root: bool },
    Document,
    Policy,
}

impl<'a> ActionSubject<'a> {
    /// A folder, flagged when it is the root.
    pub fn folder(is_root: bool) -> Self {
        Self {
            shape: SubjectShape::Folder { is_root },
            has_content: false,
            series: None,
            frozen: false,
        }
    }

    /// A non-versionable document.
    pub fn document(has_content: bool) -> Self {
        Self {
            shape: SubjectShape::Document,
            has_content,
            series: None,
            frozen: false,
        }
    }

    /// A version series or its private working copy.
    pub fn versioned(has_content: bool, checked_out_by: Option<&'a str>) -> Self {
        Self {
            shape: SubjectShape::Document,
            has_content,
            series: Some(checked_out_by),
            frozen: false,
        }
    }

    /// A version that has been checked in.
    pub fn checked_in_version(has_content: bool, checked_out_by: Option<&'a str>) -> Self {
        Self {
            frozen: true,
            ..Self::versioned(has_content, checked_out_by)
        }
    }

    /// A policy object.
    pub fn policy() -> Self {
        Self {
            shape: SubjectShape::Policy,
            has_content: false,
            series: None,
            frozen: false,
        }
    }
}

/// Compute the allowable actions of `subject` for `user`.
pub fn compute(subject: &ActionSubject<'_>, user: &str) -> AllowableActions {
    let mut actions = AllowableActions::new();
    actions.extend([Action::DeleteObject, Action::UpdateProperties, Action::GetProperties]);

    let is_root = matches!(subject.shape, SubjectShape::Folder { is_root: true });
    if subject.shape != SubjectShape::Policy && !is_root {
        actions.insert(Action::GetObjectParents);
    }

    if let SubjectShape::Folder { is_root } = subject.shape {
        actions.extend([
            Action::GetFolderTree,
            Action::GetDescendants,
            Action::AddObjectToFolder,
            Action::RemoveObjectFromFolder,
            Action::CreateDocument,
            Action::CreateFolder,
            Action::GetChildren,
            Action::DeleteTree,
        ]);
        if !is_root {
            actions.insert(Action::GetFolderParent);
        }
    }

    let content_writable = match subject.series {
        Some(checked_out_by) => {
            actions.insert(Action::GetAllVersions);
            match checked_out_by {
                None => {
                    actions.insert(Action::CheckOut);
                    false
                }
                Some(owner) if owner == user => {
                    actions.extend([Action::CancelCheckOut, Action::CheckIn]);
                    !subject.frozen
                }
                Some(_) => false,
            }
        }
        None => subject.shape == SubjectShape::Document,
    };

    if subject.has_content {
        actions.insert(Action::GetContentStream);
    }
    if content_writable {
        actions.insert(Action::SetContentStream);
        if subject.has_content {
            actions.insert(Action::DeleteContentStream);
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_folder() {
        let a = compute(&ActionSubject::folder(true), "alice");
        assert!(a.contains(Action::CreateDocument));
        assert!(a.contains(Action::GetChildren));
        assert!(!a.contains(Action::GetFolderParent));
        assert!(!a.contains(Action::GetObjectParents));
        assert!(a.contains(Action::DeleteObject));
    }

    #[test]
    fn sub_folder() {
        let a = compute(&ActionSubject::folder(false), "alice");
        assert!(a.contains(Action::GetFolderParent));
        assert!(a.contains(Action::GetObjectParents));
        assert!(!a.contains(Action::GetContentStream));
        assert!(!a.contains(Action::SetContentStream));
    }

    #[test]
    fn plain_document() {
        let a = compute(&ActionSubject::document(true), "alice");
        assert!(a.contains(Action::GetContentStream));
        assert!(a.contains(Action::DeleteContentStream));
        assert!(a.contains(Action::SetContentStream));
        assert!(!a.contains(Action::GetAllVersions));
        assert!(!a.contains(Action::CreateFolder));

        let empty = compute(&ActionSubject::document(false), "alice");
        assert!(!empty.contains(Action::GetContentStream));
    }

    #[test]
    fn versioned_not_checked_out() {
        let a = compute(&ActionSubject::versioned(false, None), "alice");
        assert!(a.contains(Action::GetAllVersions));
        assert!(a.contains(Action::CheckOut));
        assert!(!a.contains(Action::CheckIn));
        assert!(!a.contains(Action::SetContentStream));
    }

    #[test]
    fn versioned_checked_out_by_owner() {
        let a = compute(&ActionSubject::versioned(true, Some("alice")), "alice");
        assert!(!a.contains(Action::CheckOut));
        assert!(a.contains(Action::CheckIn));
        assert!(a.contains(Action::CancelCheckOut));
        assert!(a.contains(Action::SetContentStream));
    }

    #[test]
    fn versioned_checked_out_by_other() {
        let a = compute(&ActionSubject::versioned(true, Some("alice")), "bob");
        assert!(!a.contains(Action::CheckOut));
        assert!(!a.contains(Action::CheckIn));
        assert!(!a.contains(Action::CancelCheckOut));
        assert!(!a.contains(Action::SetContentStream));
        assert!(!a.contains(Action::DeleteContentStream));
        assert!(a.contains(Action::GetContentStream));
    }

    #[test]
    fn checked_in_version_content_is_read_only() {
        let a = compute(&ActionSubject::checked_in_version(true, Some("alice")), "alice");
        assert!(a.contains(Action::CheckIn));
        assert!(a.contains(Action::GetContentStream));
        assert!(!a.contains(Action::SetContentStream));
        assert!(!a.contains(Action::DeleteContentStream));
    }

    #[test]
    fn policy_has_only_the_basics() {
        let a = compute(&ActionSubject::policy(), "alice");
        assert_eq!(a.len(), 3);
        assert!(a.contains(Action::GetProperties));
    }
}
