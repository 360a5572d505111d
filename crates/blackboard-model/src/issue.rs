//! Issues found while validating a protocol or calculating a data set

use crate::descriptor::ValueDescriptor;
use serde::Serialize;
use std::fmt;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueSeverity {
    /// Informational, never blocks usability
    Warning,
    /// Defect in the schema or in one of its expressions
    ModelError,
    /// Submitted or derived data violates a rule
    ValidationError,
}

impl IssueSeverity {
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Warning)
    }
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::ModelError => write!(f, "model error"),
            Self::ValidationError => write!(f, "validation error"),
        }
    }
}

/// A warning, model error or validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: IssueSeverity,
    /// Reference of the offending field, if it has one
    pub reference: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(severity: IssueSeverity, reference: Option<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            reference,
            message: message.into(),
        }
    }

    /// Issue attributed to a field
    pub fn for_field(severity: IssueSeverity, descriptor: &ValueDescriptor, message: impl Into<String>) -> Self {
        let reference = descriptor.reference.trim();
        let reference = (!reference.is_empty()).then(|| descriptor.reference.clone());
        Self::new(severity, reference, message)
    }

    pub fn warning(descriptor: &ValueDescriptor, message: impl Into<String>) -> Self {
        Self::for_field(IssueSeverity::Warning, descriptor, message)
    }

    pub fn model_error(descriptor: &ValueDescriptor, message: impl Into<String>) -> Self {
        Self::for_field(IssueSeverity::ModelError, descriptor, message)
    }

    pub fn validation_error(descriptor: &ValueDescriptor, message: impl Into<String>) -> Self {
        Self::for_field(IssueSeverity::ValidationError, descriptor, message)
    }

    pub const fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered list of issues
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IssueCollection {
    issues: Vec<Issue>,
}

impl IssueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        log::debug!("{}", issue);
        self.issues.push(issue);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }

    /// Model and validation errors
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }
}

impl Extend<Issue> for IssueCollection {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}

impl From<Vec<Issue>> for IssueCollection {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl<'a> IntoIterator for &'a IssueCollection {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

impl IntoIterator for IssueCollection {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_and_warnings() {
        let field = ValueDescriptor::new("a");
        let mut issues = IssueCollection::new();
        issues.push(Issue::warning(&field, "w"));
        assert!(!issues.has_errors());

        issues.push(Issue::validation_error(&field, "e"));
        assert!(issues.has_errors());
        assert_eq!(issues.errors().count(), 1);
        assert_eq!(issues.warnings().count(), 1);

        issues.clear();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_blank_reference_is_not_attributed() {
        let field = ValueDescriptor::calculated("", "1");
        assert_eq!(Issue::model_error(&field, "m").reference, None);
    }
}
