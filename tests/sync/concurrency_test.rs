#[path = "../common/mod.rs"]
mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::common::{reconciler_with, FakeMetadata};
    use modelsync::config::SyncSettings;
    use modelsync::model::{ColumnSpec, FieldDefinition, FieldType, ModelDefinition, ModelRegistry};
    use modelsync::sync::CreateModelRequest;
    use modelsync::SyncError;

    fn settings(lock_timeout_ms: u64) -> SyncSettings {
        SyncSettings {
            lock_timeout_ms,
            ..SyncSettings::default()
        }
    }

    fn products_registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .define_model(
                ModelDefinition::new("products")
                    .field("name", FieldDefinition::new(FieldType::Text).not_null()),
            )
            .unwrap();
        registry
    }

    fn create(table: &str) -> CreateModelRequest {
        CreateModelRequest {
            model_name: table.to_string(),
            fields: vec![ColumnSpec::new("label", "text")],
            sql: None,
            infer_relations: false,
        }
    }

    #[tokio::test]
    async fn test_lock_wait_times_out_as_busy() {
        let fake = FakeMetadata::new();
        fake.set_delay(Duration::from_millis(200));
        let reconciler = reconciler_with(&fake, products_registry(), settings(20));

        let (first, second) = tokio::join!(reconciler.sync_model("products"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            reconciler.sync_model("products").await
        });

        assert!(first.unwrap().is_complete());
        assert!(matches!(second, Err(SyncError::Busy(ref t)) if t == "products"));
    }

    #[tokio::test]
    async fn test_same_table_reconciliations_are_serialized() {
        let fake = FakeMetadata::new();
        fake.set_delay(Duration::from_millis(10));
        let reconciler = reconciler_with(&fake, products_registry(), settings(5000));

        let (first, second) = tokio::join!(
            reconciler.sync_model("products"),
            reconciler.sync_model("products")
        );

        assert!(first.unwrap().is_complete());
        assert!(second.unwrap().is_complete());
        let creates = fake
            .statements()
            .iter()
            .filter(|s| s.starts_with("CREATE TABLE"))
            .count();
        assert_eq!(creates, 1);
        assert_eq!(fake.tracked(), ["products"]);
    }

    #[tokio::test]
    async fn test_different_tables_do_not_wait_on_each_other() {
        let fake = FakeMetadata::new();
        fake.set_delay(Duration::from_millis(100));
        let reconciler = reconciler_with(&fake, ModelRegistry::new(), settings(50));

        let (tags, labels) = tokio::join!(
            reconciler.create_model(create("tags")),
            reconciler.create_model(create("labels"))
        );

        assert!(tags.unwrap().is_complete());
        assert!(labels.unwrap().is_complete());
        assert!(fake.table("tags").is_some());
        assert!(fake.table("labels").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_table_sets_do_not_deadlock() {
        let fake = FakeMetadata::new();
        fake.set_delay(Duration::from_millis(5));
        let reconciler = Arc::new(reconciler_with(
            &fake,
            ModelRegistry::with_builtin_models(),
            settings(5000),
        ));

        let mut handles = Vec::new();
        for _ in 0..4 {
            for name in ["categories", "products"] {
                let reconciler = Arc::clone(&reconciler);
                handles.push(tokio::spawn(async move { reconciler.sync_model(name).await }));
            }
        }

        let all = join_all(handles);
        let results = tokio::time::timeout(Duration::from_secs(10), all)
            .await
            .expect("reconciliations deadlocked");
        for result in results {
            assert!(result.unwrap().is_ok());
        }
        assert!(fake.table("products").unwrap().column("category_id").is_some());
    }

    async fn join_all<T>(
        handles: Vec<tokio::task::JoinHandle<T>>,
    ) -> Vec<Result<T, tokio::task::JoinError>> {
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.await);
        }
        out
    }
}
