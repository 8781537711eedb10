#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use crate::common::validate_sql;
    use insta::assert_snapshot;
    use modelsync::model::{
        Column, ColumnSpec, FieldDefinition, FieldType, ModelDefinition, ModelRegistry,
        RelationType, StandardField,
    };
    use modelsync::sql::generator::create_junction_table_sql_typed;
    use modelsync::sql::{
        add_column_sql, create_junction_table_sql, create_table_sql, create_table_sql_for,
        with_standard_fields,
    };
    use modelsync::SyncError;

    fn registered(model: ModelDefinition) -> ModelDefinition {
        ModelRegistry::new().define_model(model).unwrap()
    }

    #[test]
    fn test_products_model() {
        let registry = ModelRegistry::with_builtin_models();
        let sql = create_table_sql(registry.get_model("products").unwrap()).unwrap();
        assert_snapshot!(sql, @r#"CREATE TABLE IF NOT EXISTS "products" ("id" uuid PRIMARY KEY DEFAULT gen_random_uuid(), "name" text NOT NULL, "description" text, "price" float NOT NULL, "stock" integer DEFAULT 0, "category_id" uuid REFERENCES "categories"("id"), "createdAt" timestamp with time zone NOT NULL DEFAULT now(), "updatedAt" timestamp with time zone NOT NULL DEFAULT now())"#);
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_key_column_comes_first_and_has_no_null_modifier() {
        let model = registered(
            ModelDefinition::new("products")
                .field("name", FieldDefinition::new(FieldType::Text).not_null())
                .field("price", FieldDefinition::new(FieldType::Float).not_null())
                .with_timestamps(),
        );
        let sql = create_table_sql(&model).unwrap();

        assert!(sql.starts_with(r#"CREATE TABLE IF NOT EXISTS "products" ("id" uuid PRIMARY KEY"#));
        assert!(!sql.contains("PRIMARY KEY NOT NULL"));
        assert_eq!(sql.matches(" NULL").count(), sql.matches("NOT NULL").count());

        let positions: Vec<usize> = ["\"id\"", "\"name\"", "\"price\"", "\"createdAt\"", "\"updatedAt\""]
            .iter()
            .map(|c| sql.find(c).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_declared_primary_key_ignores_nullable_flag() {
        let mut key = FieldDefinition::new(FieldType::Text);
        key.primary_key = true;
        let model = ModelDefinition::new("countries").field("code", key);
        let sql = create_table_sql(&model).unwrap();
        assert_snapshot!(sql, @r#"CREATE TABLE IF NOT EXISTS "countries" ("code" text PRIMARY KEY)"#);
    }

    #[test]
    fn test_modifier_order() {
        let column = Column::plain(
            "slug",
            FieldDefinition::new(FieldType::Text)
                .not_null()
                .unique()
                .default_value("''"),
        );
        let sql = add_column_sql("posts", &column).unwrap();
        assert_snapshot!(sql, @r#"ALTER TABLE "posts" ADD COLUMN IF NOT EXISTS "slug" text UNIQUE NOT NULL DEFAULT ''"#);
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_relation_columns_on_delete() {
        let nullable = ColumnSpec::new("category_id", "uuid")
            .related_to("categories", RelationType::ManyToOne)
            .into_column()
            .unwrap();
        let sql = add_column_sql("products", &nullable).unwrap();
        assert_snapshot!(sql, @r#"ALTER TABLE "products" ADD COLUMN IF NOT EXISTS "category_id" uuid REFERENCES "categories"("id") ON DELETE SET NULL"#);
        validate_sql(&sql).unwrap();

        let required = ColumnSpec::new("owner_id", "uuid")
            .not_null()
            .related_to("users", RelationType::OneToOne)
            .into_column()
            .unwrap();
        let sql = add_column_sql("profiles", &required).unwrap();
        assert_snapshot!(sql, @r#"ALTER TABLE "profiles" ADD COLUMN IF NOT EXISTS "owner_id" uuid UNIQUE NOT NULL REFERENCES "users"("id")"#);
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_junction_table() {
        let sql = create_junction_table_sql("products", "tags").unwrap();
        assert_snapshot!(sql, @r#"CREATE TABLE IF NOT EXISTS "products_tags" ("products_id" uuid NOT NULL REFERENCES "products"("id") ON DELETE CASCADE, "tags_id" uuid NOT NULL REFERENCES "tags"("id") ON DELETE CASCADE, PRIMARY KEY ("products_id", "tags_id"))"#);
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_self_junction_and_integer_keys() {
        let sql = create_junction_table_sql_typed("users", FieldType::Integer, "users", FieldType::Integer)
            .unwrap();
        assert!(sql.contains(r#""users_id" integer NOT NULL"#));
        assert!(sql.contains(r#""related_users_id" integer NOT NULL"#));
        assert!(sql.ends_with(r#"PRIMARY KEY ("users_id", "related_users_id"))"#));
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_standard_fields_appended_after_user_fields() {
        let columns = with_standard_fields(vec![
            Column::plain("id", FieldDefinition::new(FieldType::Uuid).primary_key()),
            Column::plain("label", FieldDefinition::new(FieldType::Text)),
            Column::standard(StandardField::IsActive),
        ]);
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["id", "label", "is_active", "created_at", "updated_at", "metadata"]
        );

        let sql = create_table_sql_for("tags", &columns).unwrap();
        assert_snapshot!(sql, @r#"CREATE TABLE IF NOT EXISTS "tags" ("id" uuid PRIMARY KEY, "label" text, "is_active" boolean NOT NULL DEFAULT true, "created_at" timestamp with time zone NOT NULL DEFAULT now(), "updated_at" timestamp with time zone NOT NULL DEFAULT now(), "metadata" jsonb NOT NULL DEFAULT '{}')"#);
        validate_sql(&sql).unwrap();
    }

    #[test]
    fn test_non_local_relations_are_left_out() {
        let columns = vec![
            Column::plain("id", FieldDefinition::new(FieldType::Uuid).primary_key()),
            ColumnSpec::new("tags", "relation")
                .related_to("tags", RelationType::ManyToMany)
                .into_column()
                .unwrap(),
            ColumnSpec::new("reviews", "relation")
                .related_to("reviews", RelationType::OneToMany)
                .into_column()
                .unwrap(),
        ];
        let sql = create_table_sql_for("products", &columns).unwrap();
        assert_eq!(sql, r#"CREATE TABLE IF NOT EXISTS "products" ("id" uuid PRIMARY KEY)"#);

        let err = add_column_sql("products", &columns[1]).unwrap_err();
        assert!(matches!(err, SyncError::InvalidModel(_)));
    }

    #[test]
    fn test_unsafe_names_never_reach_sql() {
        let err = create_table_sql_for(
            "bad name;drop",
            &[Column::plain("id", FieldDefinition::new(FieldType::Uuid))],
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidIdentifier(_)));

        let err = create_junction_table_sql("products", "tags\"; --").unwrap_err();
        assert!(matches!(err, SyncError::InvalidIdentifier(_)));
    }
}
