#[cfg(test)]
mod tests {
    use modelsync::model::column::{infer_relation_target, lower_columns};
    use modelsync::model::{ColumnKind, ColumnSpec, FieldDefinition, FieldType, RelationType, StandardField};
    use modelsync::SyncError;
    use serde_json::json;

    #[test]
    fn test_field_definition_from_json() {
        let def: FieldDefinition = serde_json::from_value(json!({
            "type": "integer",
            "nullable": false,
            "defaultValue": 0,
            "references": { "model": "categories", "field": "id" }
        }))
        .unwrap();

        assert_eq!(def.field_type, FieldType::Integer);
        assert!(!def.nullable);
        assert_eq!(def.default_value.as_deref(), Some("0"));
        assert_eq!(def.references.unwrap().model, "categories");
    }

    #[test]
    fn test_field_definition_defaults() {
        let def: FieldDefinition = serde_json::from_value(json!({ "type": "money" })).unwrap();
        assert_eq!(def.field_type, FieldType::Text);
        assert!(def.nullable);
        assert!(!def.primary_key);
        assert!(def.default_value.is_none());
    }

    #[test]
    fn test_primary_key_is_never_nullable() {
        let def = FieldDefinition::new(FieldType::Uuid).primary_key();
        assert!(!def.is_nullable());

        let mut def = FieldDefinition::new(FieldType::Uuid);
        def.primary_key = true;
        assert!(!def.is_nullable());
    }

    #[test]
    fn test_create_form_column_spec() {
        let spec: ColumnSpec = serde_json::from_value(json!({
            "name": "slug",
            "type": "varchar(64)",
            "isNullable": false,
            "isUnique": true,
            "defaultValue": "''"
        }))
        .unwrap();

        let column = spec.into_column().unwrap();
        match column.kind {
            ColumnKind::Plain(def) => {
                assert_eq!(def.field_type, FieldType::Text);
                assert!(!def.nullable);
                assert!(def.unique);
                assert_eq!(def.default_value.as_deref(), Some("''"));
            }
            other => panic!("expected plain column, got {other:?}"),
        }
    }

    #[test]
    fn test_edit_form_column_spec() {
        let spec: ColumnSpec = serde_json::from_value(json!({
            "name": "owner",
            "type": "relation",
            "nullable": "NO",
            "relatedTable": "users",
            "relationType": "manyToOne"
        }))
        .unwrap();

        let column = spec.into_column().unwrap();
        let rel = column.as_relation().unwrap();
        assert_eq!(rel.table, "users");
        assert_eq!(rel.column, "id");
        assert_eq!(rel.cardinality, RelationType::ManyToOne);
        assert_eq!(rel.field_type, FieldType::Uuid);
        assert!(!rel.nullable);
    }

    #[test]
    fn test_relation_defaults_to_one_to_many() {
        let column = ColumnSpec::new("comments", "relation")
            .related_to("comments", RelationType::default())
            .into_column()
            .unwrap();
        assert_eq!(column.as_relation().unwrap().cardinality, RelationType::OneToMany);
    }

    #[test]
    fn test_relation_without_table_is_rejected() {
        let err = ColumnSpec::new("owner", "relation").into_column().unwrap_err();
        assert!(matches!(err, SyncError::InvalidModel(_)));
    }

    #[test]
    fn test_standard_field_name_becomes_standard() {
        let column = ColumnSpec::new("created_at", "text").into_column().unwrap();
        assert_eq!(column.kind, ColumnKind::Standard(StandardField::CreatedAt));
    }

    #[test]
    fn test_bad_names_are_rejected_before_lowering() {
        let err = ColumnSpec::new("bad name;drop", "text").into_column().unwrap_err();
        assert!(matches!(err, SyncError::InvalidIdentifier(_)));

        let err = ColumnSpec::new("owner", "uuid")
            .related_to("users; DROP", RelationType::ManyToOne)
            .into_column()
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_lower_columns_rejects_duplicates() {
        let err = lower_columns(
            vec![ColumnSpec::new("name", "text"), ColumnSpec::new("Name", "text")],
            false,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidModel(_)));
    }

    #[test]
    fn test_lower_columns_rejects_two_primary_keys() {
        let err = lower_columns(
            vec![
                ColumnSpec::new("a", "uuid").primary_key(),
                ColumnSpec::new("b", "uuid").primary_key(),
            ],
            false,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidModel(_)));
    }

    #[test]
    fn test_id_suffix_only_promoted_on_request() {
        let known = vec!["categories".to_string()];
        assert_eq!(
            infer_relation_target("category_id", &known).as_deref(),
            Some("categories")
        );
        assert_eq!(infer_relation_target("vendor_id", &known), None);
        assert_eq!(infer_relation_target("_id", &known), None);

        let plain = lower_columns(vec![ColumnSpec::new("category_id", "uuid")], false, &known).unwrap();
        assert!(plain[0].as_relation().is_none());

        let inferred = lower_columns(vec![ColumnSpec::new("category_id", "uuid")], true, &known).unwrap();
        let rel = inferred[0].as_relation().unwrap();
        assert_eq!(rel.table, "categories");
        assert_eq!(rel.cardinality, RelationType::ManyToOne);
    }
}
