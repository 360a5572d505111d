//! Persistence of protocols, centers and submissions
//!
//! The calculation core performs no I/O. Hosts persist submissions through a
//! [`Repository`]; [`InMemoryRepository`] keeps everything in memory.

use crate::dataset::DataSet;
use crate::descriptor::reference_key;
use crate::protocol::ProtocolDescriptor;
use blackboard_diagnostics::{BB0322, BB0330, BB0331, BB0332, BlackboardError, Result};
use blackboard_expr::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A registered protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub id: u64,
    pub reference: String,
    pub name: String,
}

/// An organization submitting data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Center {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// One persisted field value, as text or as a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredValue {
    pub reference: String,
    pub text: Option<String>,
    pub number: Option<f64>,
}

impl StoredValue {
    pub fn from_value(reference: impl Into<String>, value: &Value) -> Self {
        let (text, number) = match value {
            Value::Null => (None, None),
            Value::Number(n) => (None, Some(*n)),
            other => (Some(other.to_string()), None),
        };
        Self {
            reference: reference.into(),
            text,
            number,
        }
    }

    pub fn to_value(&self) -> Value {
        match (&self.number, &self.text) {
            (Some(n), _) => Value::Number(*n),
            (None, Some(text)) => Value::String(text.clone()),
            (None, None) => Value::Null,
        }
    }
}

/// A data set submitted by a center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub protocol_id: u64,
    pub center_id: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub values: Vec<StoredValue>,
}

/// Store and retrieve protocols and submissions
pub trait Repository {
    fn add_center(&mut self, name: &str, created_by: &str) -> Center;

    fn find_protocol(&self, reference: &str) -> Option<ProtocolRecord>;

    /// Register a protocol, returning the existing record if already known
    fn store_protocol(&mut self, protocol: &ProtocolDescriptor) -> ProtocolRecord;

    /// Persist the editable values of a data set without errors
    fn submit(&mut self, center_id: u64, dataset: &DataSet, created_by: &str) -> Result<Submission>;

    fn submission(&self, id: u64) -> Option<Submission>;

    fn submissions_for(&self, protocol_reference: &str) -> Vec<Submission>;

    /// Rebuild a data set from a submission
    fn restore(&self, submission_id: u64, protocol: Arc<ProtocolDescriptor>) -> Result<DataSet> {
        let submission = self.submission(submission_id).ok_or_else(|| {
            BlackboardError::argument(BB0331, format!("Submission {} does not exist.", submission_id))
        })?;

        let belongs = self
            .find_protocol(&protocol.reference)
            .is_some_and(|record| record.id == submission.protocol_id);
        if !belongs {
            return Err(BlackboardError::argument(
                BB0332,
                format!(
                    "Submission {} was not made against protocol '{}'.",
                    submission_id, protocol.reference
                ),
            ));
        }

        let mut dataset = DataSet::builder(protocol).populate_defaults(false).build();
        for stored in &submission.values {
            dataset.add_value(&stored.reference, stored.to_value())?;
        }
        Ok(dataset)
    }
}

/// Repository keeping records in memory with sequential ids
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    centers: Vec<Center>,
    protocols: Vec<ProtocolRecord>,
    submissions: Vec<Submission>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    fn next_id(len: usize) -> u64 {
        len as u64 + 1
    }
}

impl Repository for InMemoryRepository {
    fn add_center(&mut self, name: &str, created_by: &str) -> Center {
        let center = Center {
            id: Self::next_id(self.centers.len()),
            name: name.to_string(),
            created_at: Utc::now(),
            created_by: created_by.to_string(),
        };
        self.centers.push(center.clone());
        center
    }

    fn find_protocol(&self, reference: &str) -> Option<ProtocolRecord> {
        let key = reference_key(reference);
        self.protocols
            .iter()
            .find(|record| reference_key(&record.reference) == key)
            .cloned()
    }

    fn store_protocol(&mut self, protocol: &ProtocolDescriptor) -> ProtocolRecord {
        if let Some(record) = self.find_protocol(&protocol.reference) {
            return record;
        }
        let record = ProtocolRecord {
            id: Self::next_id(self.protocols.len()),
            reference: protocol.reference.clone(),
            name: protocol.name.clone(),
        };
        log::debug!("registered protocol '{}' as {}", record.reference, record.id);
        self.protocols.push(record.clone());
        record
    }

    fn submit(&mut self, center_id: u64, dataset: &DataSet, created_by: &str) -> Result<Submission> {
        if !self.centers.iter().any(|center| center.id == center_id) {
            return Err(BlackboardError::argument(
                BB0330,
                format!("Center {} does not exist.", center_id),
            ));
        }
        if !dataset.is_usable() || dataset.issues().has_errors() {
            return Err(BlackboardError::aggregation(
                BB0322,
                "Data sets with errors cannot be submitted.",
            ));
        }

        let protocol = self.store_protocol(dataset.protocol());
        let values = dataset
            .protocol()
            .all_values()
            .into_iter()
            .filter(|descriptor| !descriptor.is_calculated())
            .filter_map(|descriptor| dataset.get(&descriptor.reference))
            .map(|entry| StoredValue::from_value(entry.reference.clone(), &entry.value))
            .collect();

        let submission = Submission {
            id: Self::next_id(self.submissions.len()),
            protocol_id: protocol.id,
            center_id,
            created_at: Utc::now(),
            created_by: created_by.to_string(),
            values,
        };
        self.submissions.push(submission.clone());
        Ok(submission)
    }

    fn submission(&self, id: u64) -> Option<Submission> {
        self.submissions.iter().find(|submission| submission.id == id).cloned()
    }

    fn submissions_for(&self, protocol_reference: &str) -> Vec<Submission> {
        let Some(protocol) = self.find_protocol(protocol_reference) else {
            return Vec::new();
        };
        self.submissions
            .iter()
            .filter(|submission| submission.protocol_id == protocol.id)
            .cloned()
            .collect()
    }
}
