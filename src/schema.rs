//! Declarative entity registry.
//!
//! Every entity the demo knows about is listed here, together with its
//! relation fields. The resolver, the request handlers and the persistence
//! loader all consult this registry instead of inspecting records at runtime.

use serde::{Deserialize, Serialize};

/// A relation field on an entity: the resolved field name and the entity it
/// points at. On the wire the field appears as `<field>_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub field: &'static str,
    pub target: EntityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Role,
    Customer,
    Employee,
    Project,
    Invoice,
    Task,
    Note,
}

/// All entities in topological load order: an entity only appears after
/// every entity it has a relation to, so relations resolve during bulk load.
pub const LOAD_ORDER: [EntityKind; 7] = [
    EntityKind::Role,
    EntityKind::Customer,
    EntityKind::Employee,
    EntityKind::Project,
    EntityKind::Invoice,
    EntityKind::Task,
    EntityKind::Note,
];

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Role => "role",
            EntityKind::Customer => "customer",
            EntityKind::Employee => "employee",
            EntityKind::Project => "project",
            EntityKind::Invoice => "invoice",
            EntityKind::Task => "task",
            EntityKind::Note => "note",
        }
    }

    /// Path segment used by the REST surface (`/api/<segment>`).
    pub fn api_segment(&self) -> &'static str {
        match self {
            EntityKind::Role => "roles",
            EntityKind::Customer => "customers",
            EntityKind::Employee => "employees",
            EntityKind::Project => "projects",
            EntityKind::Invoice => "invoices",
            EntityKind::Task => "tasks",
            EntityKind::Note => "notes",
        }
    }

    pub fn from_api_segment(segment: &str) -> Option<Self> {
        LOAD_ORDER.iter().copied().find(|k| k.api_segment() == segment)
    }

    /// Relation fields of this entity, resolved-name first.
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            EntityKind::Role | EntityKind::Customer => &[],
            EntityKind::Employee => &[Relation {
                field: "role",
                target: EntityKind::Role,
            }],
            EntityKind::Project => &[
                Relation {
                    field: "customer",
                    target: EntityKind::Customer,
                },
                Relation {
                    field: "employee",
                    target: EntityKind::Employee,
                },
            ],
            EntityKind::Invoice => &[Relation {
                field: "project",
                target: EntityKind::Project,
            }],
            EntityKind::Task => &[
                Relation {
                    field: "employee",
                    target: EntityKind::Employee,
                },
                Relation {
                    field: "project",
                    target: EntityKind::Project,
                },
            ],
            EntityKind::Note => &[
                Relation {
                    field: "employee",
                    target: EntityKind::Employee,
                },
                Relation {
                    field: "customer",
                    target: EntityKind::Customer,
                },
            ],
        }
    }

    /// Look up the relation declared under `field`, if any.
    pub fn relation(&self, field: &str) -> Option<Relation> {
        self.relations().iter().copied().find(|r| r.field == field)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        LOAD_ORDER
            .iter()
            .copied()
            .find(|k| k.as_str() == lower || k.api_segment() == lower)
            .ok_or_else(|| format!("Invalid entity: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_order_is_topological() {
        for (i, kind) in LOAD_ORDER.iter().enumerate() {
            for relation in kind.relations() {
                let target_pos = LOAD_ORDER
                    .iter()
                    .position(|k| *k == relation.target)
                    .unwrap();
                assert!(
                    target_pos < i,
                    "{} loads before its relation target {}",
                    kind,
                    relation.target
                );
            }
        }
    }

    #[test]
    fn test_parse_singular_and_plural() {
        assert_eq!("employee".parse::<EntityKind>().unwrap(), EntityKind::Employee);
        assert_eq!("employees".parse::<EntityKind>().unwrap(), EntityKind::Employee);
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_relation_lookup() {
        let rel = EntityKind::Employee.relation("role").unwrap();
        assert_eq!(rel.target, EntityKind::Role);
        assert!(EntityKind::Role.relation("role").is_none());
        assert!(EntityKind::Employee.relation("name").is_none());
    }
}
