//! Criteria construction
//!
//! A [`Criteria`] is an ordered conjunction of column-equality predicates,
//! derived either from a primary-key value (aligned positionally against the
//! entity's declared key columns) or from an arbitrary field map. Equality
//! only; the system's lookups need nothing else.
//!
//! Field names are validated against the entity descriptor up front, so an
//! undeclared field is rejected as a caller error before any query runs.

use crate::entity::{EntityDescriptor, Key, Record, Value};
use crate::error::DataError;

/// One column-equality predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Declared column name
    pub column: &'static str,
    /// Value the column must equal
    pub value: Value,
}

/// Ordered conjunction of equality predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    predicates: Vec<Predicate>,
}

impl Criteria {
    /// Criteria matching every row
    pub fn none() -> Self {
        Self::default()
    }

    /// Build criteria from a primary-key value
    ///
    /// A scalar key produces one predicate on the sole key column; a
    /// composite key zips its parts positionally with the declared key
    /// columns. Arity mismatches are configuration errors.
    pub fn from_key(descriptor: &'static EntityDescriptor, key: &Key) -> Result<Self, DataError> {
        let parts = key.parts();
        if parts.len() != descriptor.primary_key.len() {
            return Err(DataError::KeyArity {
                entity: descriptor.entity,
                expected: descriptor.primary_key.len(),
                got: parts.len(),
            });
        }

        let predicates = descriptor
            .primary_key
            .iter()
            .zip(parts)
            .map(|(column, value)| Predicate {
                column,
                value: value.clone(),
            })
            .collect();
        Ok(Self { predicates })
    }

    /// Build criteria from a field map, one predicate per entry
    ///
    /// Fields not declared on the entity are a caller error.
    pub fn from_fields(
        descriptor: &'static EntityDescriptor,
        fields: &[(&str, Value)],
    ) -> Result<Self, DataError> {
        let mut predicates = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            let column = descriptor
                .column(field)
                .ok_or_else(|| DataError::UnknownField {
                    entity: descriptor.entity,
                    field: (*field).to_string(),
                })?;
            predicates.push(Predicate {
                column: column.name,
                value: value.clone(),
            });
        }
        Ok(Self { predicates })
    }

    /// Predicates in construction order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when no predicate constrains the query
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append another criteria's predicates to this conjunction
    pub fn and(mut self, other: Criteria) -> Self {
        self.predicates.extend(other.predicates);
        self
    }

    /// Evaluate the conjunction against a record
    ///
    /// Follows SQL comparison semantics: a `Null` predicate value matches no
    /// row. Used by the in-memory backend.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|p| {
            record
                .get(p.column)
                .is_some_and(|value| value.matches(&p.value))
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ColumnDef, ColumnType};
    use chrono::{TimeZone, Utc};

    static COLUMNS: [ColumnDef; 3] = [
        ColumnDef::new("tank_id", ColumnType::Int),
        ColumnDef::new("recorded_at", ColumnType::Timestamp),
        ColumnDef::new("temperature", ColumnType::Float),
    ];

    static HISTORY: EntityDescriptor = EntityDescriptor {
        entity: "History",
        table: "history",
        columns: &COLUMNS,
        primary_key: &["tank_id", "recorded_at"],
        relationships: &[],
    };

    static SCALAR_COLUMNS: [ColumnDef; 2] = [
        ColumnDef::new("tank_id", ColumnType::Int),
        ColumnDef::new("tank_name", ColumnType::Text),
    ];

    static TANK: EntityDescriptor = EntityDescriptor {
        entity: "Tank",
        table: "tank",
        columns: &SCALAR_COLUMNS,
        primary_key: &["tank_id"],
        relationships: &[],
    };

    #[test]
    fn test_scalar_key_produces_single_predicate() {
        let criteria = Criteria::from_key(&TANK, &Key::from(5_i64)).unwrap();
        assert_eq!(criteria.predicates().len(), 1);
        assert_eq!(criteria.predicates()[0].column, "tank_id");
        assert_eq!(criteria.predicates()[0].value, Value::Int(5));
    }

    #[test]
    fn test_composite_key_zips_positionally() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let criteria = Criteria::from_key(&HISTORY, &Key::from((9_i64, at))).unwrap();
        assert_eq!(criteria.predicates().len(), 2);
        assert_eq!(criteria.predicates()[0].column, "tank_id");
        assert_eq!(criteria.predicates()[1].column, "recorded_at");
        assert_eq!(criteria.predicates()[1].value, Value::Timestamp(at));
    }

    #[test]
    fn test_key_arity_mismatch_fails() {
        let err = Criteria::from_key(&HISTORY, &Key::from(9_i64)).unwrap_err();
        assert!(matches!(
            err,
            DataError::KeyArity {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Criteria::from_fields(&TANK, &[("bogus", Value::Int(1))]).unwrap_err();
        assert!(matches!(err, DataError::UnknownField { field, .. } if field == "bogus"));
    }

    #[test]
    fn test_matches_conjunction() {
        let criteria = Criteria::from_fields(
            &TANK,
            &[
                ("tank_id", Value::Int(1)),
                ("tank_name", Value::from("alpha")),
            ],
        )
        .unwrap();

        let hit = Record::new().with("tank_id", 1_i64).with("tank_name", "alpha");
        let miss = Record::new().with("tank_id", 1_i64).with("tank_name", "beta");
        assert!(criteria.matches(&hit));
        assert!(!criteria.matches(&miss));
    }

    #[test]
    fn test_null_predicate_matches_nothing() {
        let criteria = Criteria::from_key(&TANK, &Key::Scalar(Value::Null)).unwrap();
        let row = Record::new().with("tank_id", Value::Null);
        assert!(!criteria.matches(&row));
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(Criteria::none().matches(&Record::new()));
    }
}
