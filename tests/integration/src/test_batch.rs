//! BatchGetItem / BatchWriteItem tests.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use dynamock_core::Dynamock;
    use dynamock_model::error::StoreErrorCode;
    use dynamock_model::input::{BatchGetItemInput, BatchWriteItemInput, PutItemInput, ScanInput};
    use dynamock_model::types::{
        DeleteRequest, Item, KeysAndAttributes, PutRequest, ScalarAttributeType, WriteRequest,
    };
    use indexmap::IndexMap;

    use crate::{create_composite_table, create_hash_table, engine, item, n, s, test_table_name};

    fn composite(engine: &Dynamock) -> String {
        let table = test_table_name("batch");
        create_composite_table(
            engine,
            &table,
            ("Hash", ScalarAttributeType::N),
            ("Range", ScalarAttributeType::N),
        );
        table
    }

    fn scan_all(engine: &Dynamock, table: &str) -> Vec<Item> {
        engine
            .handle_scan(ScanInput {
                table_name: table.to_owned(),
                ..Default::default()
            })
            .unwrap_or_else(|e| panic!("failed to scan {table}: {e}"))
            .items
    }

    fn key_pairs(items: &[Item]) -> HashSet<(String, String)> {
        items
            .iter()
            .map(|i| {
                let part = |name: &str| i.get(name).map(ToString::to_string).unwrap_or_default();
                (part("Hash"), part("Range"))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_should_apply_batch_puts_and_deletes() -> anyhow::Result<()> {
        let engine = engine();
        let table = test_table_name("scenario-d");
        create_composite_table(
            &engine,
            &table,
            ("Hash", ScalarAttributeType::N),
            ("Range", ScalarAttributeType::S),
        );
        engine.handle_put_item(PutItemInput {
            table_name: table.clone(),
            item: item(&[("Hash", n(6)), ("Range", s("b"))]),
            return_values: None,
        })?;

        let writes = vec![
            WriteRequest::put(item(&[("Hash", n(1)), ("Range", s("1"))])),
            WriteRequest::put(item(&[("Hash", n(1)), ("Range", s("2"))])),
            WriteRequest::put(item(&[("Hash", n(2)), ("Range", s("2"))])),
            WriteRequest::delete(item(&[("Hash", n(6)), ("Range", s("b"))])),
        ];
        engine.handle_batch_write_item(BatchWriteItemInput {
            request_items: IndexMap::from([(table.clone(), writes)]),
        })?;

        let items = scan_all(&engine, &table);
        assert_eq!(items.len(), 3);
        assert_eq!(
            key_pairs(&items),
            HashSet::from([
                ("{N: 1}".to_owned(), "{S: 1}".to_owned()),
                ("{N: 1}".to_owned(), "{S: 2}".to_owned()),
                ("{N: 2}".to_owned(), "{S: 2}".to_owned()),
            ])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_should_keep_earlier_writes_when_batch_fails() {
        let engine = engine();
        let table = composite(&engine);

        let writes = vec![
            WriteRequest::put(item(&[("Hash", n(1)), ("Range", n(1))])),
            // Missing the range key.
            WriteRequest::put(item(&[("Hash", n(2))])),
            WriteRequest::put(item(&[("Hash", n(3)), ("Range", n(3))])),
        ];
        let err = engine
            .handle_batch_write_item(BatchWriteItemInput {
                request_items: IndexMap::from([(table.clone(), writes)]),
            })
            .expect_err("second write is invalid");
        assert_eq!(err.code, StoreErrorCode::ValidationError);

        let items = scan_all(&engine, &table);
        assert_eq!(items, vec![item(&[("Hash", n(1)), ("Range", n(1))])]);
    }

    #[tokio::test]
    async fn test_should_reject_ambiguous_write_request() {
        let engine = engine();
        let table = composite(&engine);
        let both = WriteRequest {
            put_request: Some(PutRequest {
                item: item(&[("Hash", n(1)), ("Range", n(1))]),
            }),
            delete_request: Some(DeleteRequest {
                key: item(&[("Hash", n(1)), ("Range", n(1))]),
            }),
        };
        let err = engine
            .handle_batch_write_item(BatchWriteItemInput {
                request_items: IndexMap::from([(table, vec![both])]),
            })
            .expect_err("both put and delete");
        assert_eq!(err.code, StoreErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_should_batch_get_across_tables() -> anyhow::Result<()> {
        let engine = engine();
        let orders = composite(&engine);
        let users = test_table_name("users");
        create_hash_table(&engine, &users, ("Id", ScalarAttributeType::S));

        engine.handle_batch_write_item(BatchWriteItemInput {
            request_items: IndexMap::from([
                (
                    orders.clone(),
                    vec![
                        WriteRequest::put(item(&[("Hash", n(1)), ("Range", n(1)), ("x", n(9))])),
                        WriteRequest::put(item(&[("Hash", n(1)), ("Range", n(2)), ("x", n(8))])),
                    ],
                ),
                (
                    users.clone(),
                    vec![WriteRequest::put(item(&[("Id", s("ann")), ("Age", n(30))]))],
                ),
            ]),
        })?;

        let out = engine.handle_batch_get_item(BatchGetItemInput {
            request_items: IndexMap::from([
                (
                    orders.clone(),
                    KeysAndAttributes {
                        keys: vec![
                            item(&[("Hash", n(1)), ("Range", n(2))]),
                            item(&[("Hash", n(1)), ("Range", n(99))]),
                        ],
                        attributes_to_get: vec!["x".to_owned()],
                    },
                ),
                (
                    users.clone(),
                    KeysAndAttributes {
                        keys: vec![item(&[("Id", s("bob"))])],
                        attributes_to_get: Vec::new(),
                    },
                ),
            ]),
        })?;

        assert_eq!(out.responses.get(&orders), Some(&vec![item(&[("x", n(8))])]));
        assert_eq!(out.responses.get(&users), Some(&Vec::new()));
        assert!(out.unprocessed_keys.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_should_fail_batch_get_for_unknown_table() {
        let err = engine()
            .handle_batch_get_item(BatchGetItemInput {
                request_items: IndexMap::from([(
                    "missing".to_owned(),
                    KeysAndAttributes {
                        keys: vec![item(&[("Id", n(1))])],
                        attributes_to_get: Vec::new(),
                    },
                )]),
            })
            .expect_err("missing table");
        assert_eq!(err.code, StoreErrorCode::TableNotFound);
    }
}
