//! Integrity checking: uniqueness constraints and association consistency.
//!
//! The checker never errors. Both passes walk the population read-only and
//! return structured findings, logging each one at `warn`; callers decide
//! what to do with them. [`MetaModel::is_consistent`] is true iff both
//! passes come back empty.

use std::fmt;

use indexmap::IndexMap;

use crate::ident::RelId;
use crate::instance::InstanceKey;
use crate::model::MetaModel;
use crate::value::Value;

/// A violated unique identifier: more than one instance of a class shares
/// the identifier's value tuple. Tuples containing a null are exempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessFinding {
    /// The declared kind of the class.
    pub kind: String,
    /// The identifier name, e.g. `I1`.
    pub index: String,
    /// The shared value tuple, in identifier attribute order.
    pub values: Vec<Value>,
    /// Every instance carrying the tuple, in pool order.
    pub instances: Vec<InstanceKey>,
}

impl fmt::Display for UniquenessFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} instances of {} share {} (",
            self.instances.len(),
            self.kind,
            self.index
        )?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// One association-consistency violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationFinding {
    pub rel_id: RelId,
    /// The declared kind of the instance the finding is anchored on.
    pub kind: String,
    pub instance: InstanceKey,
    pub problem: Problem,
}

/// What exactly is wrong with an instance's participation in an
/// association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    /// An edge lacks its mirror in the opposite direction.
    MissingReverseEdge { neighbor: InstanceKey },
    /// A non-many link carries more than one neighbor; only batch loads
    /// with `connect(check: false)` can produce this.
    CardinalityExceeded { count: usize },
    /// An unconditional link with no partner at all.
    Unfulfilled,
}

impl fmt::Display for AssociationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            Problem::MissingReverseEdge { .. } => {
                write!(f, "{} instance lacks reverse edge across {}", self.kind, self.rel_id)
            }
            Problem::CardinalityExceeded { count } => write!(
                f,
                "{} instance has {count} neighbors across non-many {}",
                self.kind, self.rel_id
            ),
            Problem::Unfulfilled => write!(
                f,
                "{} instance unrelated across unconditional {}",
                self.kind, self.rel_id
            ),
        }
    }
}

/// Groups every class's instances by each named identifier and reports the
/// groups sharing a value tuple. Null-valued tuples are excluded from
/// enforcement.
#[must_use]
pub fn check_uniqueness_constraint(model: &MetaModel) -> Vec<UniquenessFinding> {
    let mut findings = Vec::new();
    for metaclass in model.metaclasses() {
        for (index, attributes) in metaclass.indices() {
            let mut groups: IndexMap<Vec<Value>, Vec<InstanceKey>> = IndexMap::new();
            'instances: for &inst in metaclass.instances() {
                let mut tuple = Vec::with_capacity(attributes.len());
                for attribute in attributes {
                    if model.attr_is_null(inst, attribute) {
                        continue 'instances;
                    }
                    let Some(value) = model.attr(inst, attribute) else {
                        continue 'instances;
                    };
                    tuple.push(value);
                }
                groups.entry(tuple).or_default().push(inst);
            }
            for (values, instances) in groups {
                if instances.len() > 1 {
                    let finding = UniquenessFinding {
                        kind: metaclass.kind().to_string(),
                        index: index.clone(),
                        values,
                        instances,
                    };
                    tracing::warn!(%finding, "uniqueness constraint violated");
                    findings.push(finding);
                }
            }
        }
    }
    findings
}

/// Verifies every association: each edge must carry its mirror, non-many
/// links must hold at most one neighbor, and unconditional links must be
/// fulfilled for every instance on their side.
#[must_use]
pub fn check_association_integrity(model: &MetaModel) -> Vec<AssociationFinding> {
    let mut findings = Vec::new();
    for association in model.associations() {
        let (source_link, target_link) = model.association_links(association);
        let ends = [(source_link, target_link), (target_link, source_link)];

        for (link, mirror) in ends {
            let kind = link.from_kind().to_string();
            for (from, to) in link.pairs() {
                if !mirror.contains(to, from) {
                    push_finding(
                        &mut findings,
                        association.rel_id().clone(),
                        kind.clone(),
                        from,
                        Problem::MissingReverseEdge { neighbor: to },
                    );
                }
            }
            let pool = match model.metaclass(&kind) {
                Ok(metaclass) => metaclass.instances(),
                Err(_) => continue,
            };
            for &inst in pool {
                let count = link.navigate(inst).count();
                if count > 1 && !link.many() {
                    push_finding(
                        &mut findings,
                        association.rel_id().clone(),
                        kind.clone(),
                        inst,
                        Problem::CardinalityExceeded { count },
                    );
                }
                if count == 0 && !link.conditional() {
                    push_finding(
                        &mut findings,
                        association.rel_id().clone(),
                        kind.clone(),
                        inst,
                        Problem::Unfulfilled,
                    );
                }
            }
        }
    }
    findings
}

fn push_finding(
    findings: &mut Vec<AssociationFinding>,
    rel_id: RelId,
    kind: String,
    instance: InstanceKey,
    problem: Problem,
) {
    let finding = AssociationFinding {
        rel_id,
        kind,
        instance,
        problem,
    };
    tracing::warn!(%finding, "association integrity violated");
    findings.push(finding);
}
