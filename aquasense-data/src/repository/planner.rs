//! Relationship-aware query planning
//!
//! The planner decides the query shape from the entity's declared
//! relationships: a plain select when there are none, an eager-loading
//! select (one round trip fetches owner plus related rows) when there are.
//! It also resolves the rows coming back: join fan-out repeats the owner row
//! once per related row, so list results are deduplicated by primary-key
//! identity and the duplicates' related rows folded into the first
//! occurrence.

use std::collections::HashMap;

use crate::entity::{EntityDescriptor, Record, Value, ValueIdentity};
use crate::error::DataError;

use super::criteria::Criteria;

/// A planned select: entity, predicates, and whether relationships are
/// eager-loaded
#[derive(Debug, Clone)]
pub struct Select {
    /// Entity being selected
    pub entity: &'static EntityDescriptor,
    /// Equality predicates (conjunction)
    pub criteria: Criteria,
    /// Eager-load every declared relationship
    pub eager: bool,
}

/// Plan a select over every row of the entity
///
/// Eager-loading is enabled exactly when the descriptor declares
/// relationships; there is no per-call configuration.
pub fn select_all(entity: &'static EntityDescriptor) -> Select {
    Select {
        entity,
        criteria: Criteria::none(),
        eager: entity.has_relationships(),
    }
}

/// Append criteria to a planned select as a conjunction
pub fn apply_criteria(select: Select, criteria: Criteria) -> Select {
    Select {
        criteria: select.criteria.and(criteria),
        ..select
    }
}

fn key_identity(record: &Record, entity: &EntityDescriptor) -> Vec<ValueIdentity> {
    entity
        .primary_key
        .iter()
        .map(|column| {
            record
                .get(column)
                .map(Value::identity)
                .unwrap_or(ValueIdentity::Null)
        })
        .collect()
}

/// Collapse join fan-out in a list result
///
/// Without relationships the rows pass through unchanged. With
/// relationships, rows sharing a primary-key identity collapse to one record
/// carrying all of their related rows.
pub fn resolve_list(rows: Vec<Record>, entity: &EntityDescriptor) -> Vec<Record> {
    if !entity.has_relationships() {
        return rows;
    }

    let mut resolved: Vec<Record> = Vec::new();
    let mut seen: HashMap<Vec<ValueIdentity>, usize> = HashMap::new();
    for row in rows {
        let identity = key_identity(&row, entity);
        match seen.get(&identity) {
            Some(&index) => resolved[index].merge_related_from(row),
            None => {
                seen.insert(identity, resolved.len());
                resolved.push(row);
            }
        }
    }
    resolved
}

/// Resolve a single-row lookup
///
/// With relationships, fan-out duplicates are tolerated and folded into the
/// first owner. Without, more than one row for a primary-key lookup means a
/// key uniqueness violation upstream and is an integrity error. Zero rows is
/// `Ok(None)`; the caller decides whether absence is an error.
pub fn resolve_single(
    rows: Vec<Record>,
    entity: &EntityDescriptor,
) -> Result<Option<Record>, DataError> {
    if !entity.has_relationships() && rows.len() > 1 {
        return Err(DataError::Integrity {
            entity: entity.entity,
            detail: format!("{} rows matched a single-row lookup", rows.len()),
        });
    }
    Ok(resolve_list(rows, entity).into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnDef, ColumnType, Relationship};

    static TANK_COLUMNS: [ColumnDef; 2] = [
        ColumnDef::new("tank_id", ColumnType::Int),
        ColumnDef::new("building_id", ColumnType::Int),
    ];

    static TANK: EntityDescriptor = EntityDescriptor {
        entity: "Tank",
        table: "tank",
        columns: &TANK_COLUMNS,
        primary_key: &["tank_id"],
        relationships: &[],
    };

    static BUILDING_COLUMNS: [ColumnDef; 2] = [
        ColumnDef::new("building_id", ColumnType::Int),
        ColumnDef::new("building_name", ColumnType::Text),
    ];

    static BUILDING: EntityDescriptor = EntityDescriptor {
        entity: "Building",
        table: "building",
        columns: &BUILDING_COLUMNS,
        primary_key: &["building_id"],
        relationships: &[Relationship {
            name: "tanks",
            target: &TANK,
            local_key: "building_id",
            foreign_key: "building_id",
        }],
    };

    fn owner_row(id: i64, tank: i64) -> Record {
        let mut row = Record::new()
            .with("building_id", id)
            .with("building_name", format!("b{}", id));
        row.attach_related(
            "tanks",
            Record::new().with("tank_id", tank).with("building_id", id),
        );
        row
    }

    #[test]
    fn test_select_all_eager_follows_descriptor() {
        assert!(select_all(&BUILDING).eager);
        assert!(!select_all(&TANK).eager);
    }

    #[test]
    fn test_apply_criteria_appends() {
        let criteria = Criteria::from_fields(&TANK, &[("building_id", Value::Int(2))]).unwrap();
        let select = apply_criteria(select_all(&TANK), criteria);
        assert_eq!(select.criteria.predicates().len(), 1);
    }

    #[test]
    fn test_resolve_list_without_relationships_passes_through() {
        let rows = vec![
            Record::new().with("tank_id", 1_i64),
            Record::new().with("tank_id", 1_i64),
        ];
        assert_eq!(resolve_list(rows, &TANK).len(), 2);
    }

    #[test]
    fn test_resolve_list_dedups_and_folds_related() {
        let rows = vec![owner_row(1, 10), owner_row(1, 11), owner_row(2, 20)];
        let resolved = resolve_list(rows, &BUILDING);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].related("tanks").len(), 2);
        assert_eq!(resolved[1].related("tanks").len(), 1);
    }

    #[test]
    fn test_resolve_single_tolerates_fanout_with_relationships() {
        let rows = vec![owner_row(1, 10), owner_row(1, 11)];
        let resolved = resolve_single(rows, &BUILDING).unwrap().unwrap();
        assert_eq!(resolved.related("tanks").len(), 2);
    }

    #[test]
    fn test_resolve_single_rejects_duplicates_without_relationships() {
        let rows = vec![
            Record::new().with("tank_id", 1_i64),
            Record::new().with("tank_id", 1_i64),
        ];
        let err = resolve_single(rows, &TANK).unwrap_err();
        assert!(matches!(err, DataError::Integrity { .. }));
    }

    #[test]
    fn test_resolve_single_empty_is_none() {
        assert!(resolve_single(Vec::new(), &TANK).unwrap().is_none());
    }
}
