//! Concurrent access tests: writers racing readers on one engine.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dynamock_core::Dynamock;
    use dynamock_model::error::StoreErrorCode;
    use dynamock_model::input::{
        DeleteItemInput, DescribeTableInput, PutItemInput, ScanInput, UpdateItemInput,
    };
    use dynamock_model::types::{AttributeValueUpdate, ScalarAttributeType, TableStatus};
    use indexmap::IndexMap;

    use crate::{create_composite_table, create_hash_table, engine, item, n, test_table_name};

    const ROUNDS: i64 = 300;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_serialize_writes_against_scans() {
        let engine = Arc::new(engine());
        let table = test_table_name("race-items");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        let writer = {
            let engine = Arc::clone(&engine);
            let table = table.clone();
            tokio::task::spawn_blocking(move || write_loop(&engine, &table))
        };
        let updater = {
            let engine = Arc::clone(&engine);
            let table = table.clone();
            tokio::task::spawn_blocking(move || update_loop(&engine, &table))
        };
        let scanner = {
            let engine = Arc::clone(&engine);
            let table = table.clone();
            tokio::task::spawn_blocking(move || scan_loop(&engine, &table))
        };

        writer.await.expect("writer task");
        updater.await.expect("updater task");
        let observed = scanner.await.expect("scanner task");
        assert_eq!(observed, ROUNDS);
    }

    fn write_loop(engine: &Dynamock, table: &str) {
        for round in 0..ROUNDS {
            engine
                .handle_put_item(PutItemInput {
                    table_name: table.to_owned(),
                    item: item(&[("Id", n(1)), ("a", n(round)), ("b", n(round))]),
                    return_values: None,
                })
                .expect("put");
            engine
                .handle_delete_item(DeleteItemInput {
                    table_name: table.to_owned(),
                    key: item(&[("Id", n(1))]),
                    return_values: None,
                })
                .expect("delete");
        }
    }

    fn update_loop(engine: &Dynamock, table: &str) {
        for round in 0..ROUNDS {
            let mut updates = IndexMap::new();
            updates.insert("a".to_owned(), AttributeValueUpdate::put(n(-round)));
            updates.insert("b".to_owned(), AttributeValueUpdate::put(n(-round)));
            engine
                .handle_update_item(UpdateItemInput {
                    table_name: table.to_owned(),
                    key: item(&[("Id", n(1))]),
                    attribute_updates: updates,
                    return_values: None,
                })
                .expect("update");
        }
    }

    /// Scan repeatedly; every snapshot holds at most one item for the key and
    /// never a half-applied write. Returns the number of scans taken.
    fn scan_loop(engine: &Dynamock, table: &str) -> i64 {
        let mut scans = 0;
        for _ in 0..ROUNDS {
            let out = engine
                .handle_scan(ScanInput {
                    table_name: table.to_owned(),
                    ..Default::default()
                })
                .expect("scan");
            let matching: Vec<_> = out
                .items
                .iter()
                .filter(|i| i.get("Id") == Some(&n(1)))
                .collect();
            assert!(matching.len() <= 1, "duplicate key in snapshot: {matching:?}");
            for found in matching {
                assert_eq!(found.get("a"), found.get("b"), "torn write: {found:?}");
            }
            scans += 1;
        }
        scans
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_never_describe_partially_built_table() {
        let engine = Arc::new(engine());
        let table = test_table_name("race-tables");

        let creator = {
            let engine = Arc::clone(&engine);
            let table = table.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..ROUNDS {
                    create_composite_table(
                        &engine,
                        &table,
                        ("Id", ScalarAttributeType::N),
                        ("Sk", ScalarAttributeType::S),
                    );
                }
            })
        };
        let describer = {
            let engine = Arc::clone(&engine);
            let table = table.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..ROUNDS {
                    match engine.handle_describe_table(DescribeTableInput {
                        table_name: table.clone(),
                    }) {
                        Ok(out) => {
                            let description = out.table.expect("description");
                            assert_eq!(description.table_status, Some(TableStatus::Active));
                            assert_eq!(description.key_schema.len(), 2);
                            assert_eq!(description.attribute_definitions.len(), 2);
                            assert_eq!(description.item_count, Some(0));
                        }
                        Err(e) => assert_eq!(e.code, StoreErrorCode::TableNotFound),
                    }
                }
            })
        };

        creator.await.expect("creator task");
        describer.await.expect("describer task");

        let out = engine
            .handle_describe_table(DescribeTableInput { table_name: table })
            .expect("table exists after the race");
        assert_eq!(out.table.map(|t| t.key_schema.len()), Some(2));
    }
}
