use crate::config::Schema;
use crate::error::ResolveError;
use crate::model::Table;
use crate::quality::FieldScore;

/// Pick key fields: every non-reserved field scoring strictly above `threshold`.
///
/// Order follows `scores`. An empty selection is an error, since zero keys
/// would collapse every record into a single group.
pub fn select_keys(
    scores: &[FieldScore],
    threshold: f64,
    schema: &Schema,
) -> Result<Vec<String>, ResolveError> {
    let keys: Vec<String> = scores
        .iter()
        .filter(|s| !schema.is_reserved(&s.field))
        .filter(|s| s.combined > threshold)
        .map(|s| s.field.clone())
        .collect();

    if keys.is_empty() {
        return Err(ResolveError::NoKeyFieldsFound {
            threshold,
            scores: scores.to_vec(),
        });
    }

    Ok(keys)
}

/// Check pinned key fields against the table.
pub fn pinned_keys(fields: &[String], table: &Table, schema: &Schema) -> Result<Vec<String>, ResolveError> {
    for field in fields {
        if schema.is_reserved(field) {
            return Err(ResolveError::ConfigValidation(format!(
                "keys.fields: '{field}' is reserved and cannot be a key"
            )));
        }
        if table.column_index(field).is_none() {
            return Err(ResolveError::ConfigValidation(format!(
                "keys.fields: '{field}' is not a column of the input"
            )));
        }
    }
    Ok(fields.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(field: &str, combined: f64) -> FieldScore {
        FieldScore {
            field: field.into(),
            non_null: 0,
            distinct: 0,
            coverage: 0.0,
            distinctiveness: 0.0,
            combined,
        }
    }

    #[test]
    fn selects_above_threshold_in_order() {
        let scores = vec![score("phone", 90.0), score("status", 5.0), score("email", 60.0)];
        let keys = select_keys(&scores, 20.0, &Schema::default()).unwrap();
        assert_eq!(keys, vec!["phone", "email"]);
    }

    #[test]
    fn threshold_is_strict() {
        let scores = vec![score("phone", 20.0), score("email", 20.0001)];
        let keys = select_keys(&scores, 20.0, &Schema::default()).unwrap();
        assert_eq!(keys, vec!["email"]);
    }

    #[test]
    fn reserved_fields_never_selected() {
        let scores = vec![
            score("client_id", 100.0),
            score("create_date", 100.0),
            score("update_date", 100.0),
            score("phone", 50.0),
        ];
        let keys = select_keys(&scores, 20.0, &Schema::default()).unwrap();
        assert_eq!(keys, vec!["phone"]);
    }

    #[test]
    fn extra_reserved_from_schema() {
        let schema = Schema {
            reserved: vec!["phone".into()],
            ..Schema::default()
        };
        let scores = vec![score("phone", 50.0), score("email", 40.0)];
        assert_eq!(select_keys(&scores, 20.0, &schema).unwrap(), vec!["email"]);
    }

    #[test]
    fn none_selected_reports_scores() {
        let scores = vec![score("client_id", 100.0), score("status", 3.0)];
        match select_keys(&scores, 20.0, &Schema::default()) {
            Err(ResolveError::NoKeyFieldsFound { threshold, scores }) => {
                assert_eq!(threshold, 20.0);
                assert_eq!(scores.len(), 2);
            }
            other => panic!("expected NoKeyFieldsFound, got {other:?}"),
        }
    }

    #[test]
    fn pinned_keys_must_exist() {
        let table = Table::new(vec!["phone".into(), "update_date".into()]);
        let schema = Schema::default();
        assert_eq!(
            pinned_keys(&["phone".to_string()], &table, &schema).unwrap(),
            vec!["phone"]
        );
        let err = pinned_keys(&["email".to_string()], &table, &schema).unwrap_err();
        assert!(err.to_string().contains("'email' is not a column"));
        let err = pinned_keys(&["update_date".to_string()], &table, &schema).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
