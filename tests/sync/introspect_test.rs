#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::common::FakeMetadata;
    use modelsync::metadata::{MetadataService, Nullability};
    use modelsync::sync::{StructureCache, StructureIntrospector};
    use modelsync::SyncError;

    fn introspector(fake: &Arc<FakeMetadata>, cache: StructureCache) -> StructureIntrospector {
        let service: Arc<dyn MetadataService> = fake.clone();
        StructureIntrospector::new(service, cache, "public")
    }

    #[tokio::test]
    async fn test_columns_in_ordinal_order() {
        let fake = FakeMetadata::new();
        fake.add_table(
            "products",
            &[
                ("id", "uuid", false, Some("gen_random_uuid()")),
                ("name", "text", false, None),
                ("stock", "integer", true, Some("0")),
            ],
        );
        let columns = introspector(&fake, StructureCache::disabled())
            .get_table_structure("products")
            .await
            .unwrap();

        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "stock"]);
        assert_eq!(columns[0].nullable, Nullability::No);
        assert_eq!(columns[0].default_value.as_deref(), Some("gen_random_uuid()"));
        assert_eq!(columns[1].default_value, None);
        assert_eq!(columns[2].nullable, Nullability::Yes);
    }

    #[tokio::test]
    async fn test_case_variant_tables_are_cached_apart() {
        let fake = FakeMetadata::new();
        fake.add_table("Products", &[("upper_only", "text", true, None)]);
        fake.add_table("products", &[("lower_only", "text", true, None)]);
        let intro = introspector(&fake, StructureCache::new(Duration::from_secs(60)));

        let upper = intro.get_table_structure("Products").await.unwrap();
        let lower = intro.get_table_structure("products").await.unwrap();

        assert_eq!(upper[0].name, "upper_only");
        assert_eq!(lower[0].name, "lower_only");
        assert_eq!(fake.catalog_queries(), 2);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let fake = FakeMetadata::new();
        let err = introspector(&fake, StructureCache::disabled())
            .get_table_structure("ghosts")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_table_without_columns_is_empty() {
        let fake = FakeMetadata::new();
        fake.add_table("empty", &[]);
        let intro = introspector(&fake, StructureCache::disabled());

        assert!(intro.get_table_structure("empty").await.unwrap().is_empty());
        assert!(intro.table_exists("empty").await.unwrap());
        assert!(!intro.table_exists("ghosts").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_name_issues_no_sql() {
        let fake = FakeMetadata::new();
        let err = introspector(&fake, StructureCache::disabled())
            .get_table_structure("bad name;drop")
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::InvalidIdentifier(_)));
        assert_eq!(fake.catalog_queries(), 0);
        assert!(fake.statements().is_empty());
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_reads() {
        let fake = FakeMetadata::new();
        fake.add_table("tags", &[("id", "uuid", false, None)]);
        let intro = introspector(&fake, StructureCache::new(Duration::from_secs(60)));

        intro.get_table_structure("tags").await.unwrap();
        intro.get_table_structure("TAGS").await.unwrap();
        assert_eq!(fake.catalog_queries(), 1);

        intro.cache().invalidate("tags");
        intro.get_table_structure("tags").await.unwrap();
        assert_eq!(fake.catalog_queries(), 2);
    }

    #[tokio::test]
    async fn test_fetch_bypasses_cache() {
        let fake = FakeMetadata::new();
        fake.add_table("tags", &[("id", "uuid", false, None)]);
        let intro = introspector(&fake, StructureCache::new(Duration::from_secs(60)));

        intro.get_table_structure("tags").await.unwrap();
        intro.fetch_table_structure("tags").await.unwrap();
        assert_eq!(fake.catalog_queries(), 2);
    }

    #[tokio::test]
    async fn test_list_tables_and_foreign_keys() {
        let fake = FakeMetadata::new();
        fake.add_table("products", &[("category_id", "uuid", true, None)]);
        fake.add_table("categories", &[("id", "uuid", false, None)]);
        fake.add_foreign_key("products", "category_id", "categories");
        let intro = introspector(&fake, StructureCache::disabled());

        assert_eq!(intro.list_tables().await.unwrap(), ["categories", "products"]);

        let fks = intro.foreign_keys("products").await.unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].column, "category_id");
        assert_eq!(fks[0].foreign_table, "categories");
        assert_eq!(fks[0].foreign_column, "id");
    }
}
