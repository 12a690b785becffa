//! Item put/get/delete/update tests.

#[cfg(test)]
mod tests {
    use dynamock_core::Dynamock;
    use dynamock_model::error::StoreErrorCode;
    use dynamock_model::input::{DeleteItemInput, GetItemInput, PutItemInput, UpdateItemInput};
    use dynamock_model::types::{AttributeValueUpdate, Item, ReturnValue, ScalarAttributeType};
    use indexmap::IndexMap;

    use crate::{create_composite_table, create_hash_table, engine, item, n, s, test_table_name};

    fn put(engine: &Dynamock, table: &str, item: Item) {
        engine
            .handle_put_item(PutItemInput {
                table_name: table.to_owned(),
                item,
                return_values: None,
            })
            .unwrap_or_else(|e| panic!("failed to put into {table}: {e}"));
    }

    fn get(engine: &Dynamock, table: &str, key: Item) -> Option<Item> {
        engine
            .handle_get_item(GetItemInput {
                table_name: table.to_owned(),
                key,
                attributes_to_get: Vec::new(),
            })
            .unwrap_or_else(|e| panic!("failed to get from {table}: {e}"))
            .item
    }

    fn scan_count(engine: &Dynamock, table: &str) -> usize {
        engine
            .catalog()
            .require_table(table)
            .expect("table exists")
            .storage
            .item_count()
    }

    #[tokio::test]
    async fn test_should_put_idempotently() {
        let engine = engine();
        let table = test_table_name("idempotent");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        let x = item(&[("Id", n(1)), ("Data", s("x"))]);
        put(&engine, &table, x.clone());
        put(&engine, &table, x.clone());

        assert_eq!(scan_count(&engine, &table), 1);
        assert_eq!(get(&engine, &table, item(&[("Id", n(1))])), Some(x));
    }

    #[tokio::test]
    async fn test_should_replace_not_merge_on_put() {
        let engine = engine();
        let table = test_table_name("upsert");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        put(&engine, &table, item(&[("Id", n(1)), ("a", n(1))]));
        put(&engine, &table, item(&[("Id", n(1)), ("b", n(2))]));

        assert_eq!(
            get(&engine, &table, item(&[("Id", n(1))])),
            Some(item(&[("Id", n(1)), ("b", n(2))]))
        );
    }

    #[tokio::test]
    async fn test_should_address_items_by_decoded_key() {
        let engine = engine();
        let table = test_table_name("decoded");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        put(&engine, &table, item(&[("Id", n(5)), ("v", s("first"))]));
        let five_point_oh = dynamock_model::AttributeValue::N("5.0".to_owned());
        put(&engine, &table, item(&[("Id", five_point_oh), ("v", s("second"))]));

        assert_eq!(scan_count(&engine, &table), 1);
        let got = get(&engine, &table, item(&[("Id", n(5))])).expect("item exists");
        assert_eq!(got.get("v"), Some(&s("second")));
    }

    #[tokio::test]
    async fn test_should_keep_large_numeric_keys_distinct() {
        let engine = engine();
        let table = test_table_name("bigkeys");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        let max = dynamock_model::AttributeValue::N("9223372036854775807".to_owned());
        let beyond = dynamock_model::AttributeValue::N("9223372036854775808".to_owned());
        put(&engine, &table, item(&[("Id", max.clone()), ("v", s("max"))]));
        put(&engine, &table, item(&[("Id", beyond.clone()), ("v", s("beyond"))]));

        assert_eq!(scan_count(&engine, &table), 2);
        let got = get(&engine, &table, item(&[("Id", max)])).expect("item exists");
        assert_eq!(got.get("v"), Some(&s("max")));
        let got = get(&engine, &table, item(&[("Id", beyond)])).expect("item exists");
        assert_eq!(got.get("v"), Some(&s("beyond")));
    }

    #[tokio::test]
    async fn test_should_return_nothing_for_missing_item() {
        let engine = engine();
        let table = test_table_name("missing");
        create_composite_table(
            &engine,
            &table,
            ("Id", ScalarAttributeType::N),
            ("Sk", ScalarAttributeType::S),
        );
        assert_eq!(get(&engine, &table, item(&[("Id", n(1)), ("Sk", s("a"))])), None);
    }

    #[tokio::test]
    async fn test_should_project_get_item() {
        let engine = engine();
        let table = test_table_name("project");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));
        put(&engine, &table, item(&[("Id", n(1)), ("a", n(1)), ("b", n(2))]));

        let got = engine
            .handle_get_item(GetItemInput {
                table_name: table.clone(),
                key: item(&[("Id", n(1))]),
                attributes_to_get: vec!["b".to_owned()],
            })
            .expect("get")
            .item;
        assert_eq!(got, Some(item(&[("b", n(2))])));

        let err = engine
            .handle_get_item(GetItemInput {
                table_name: table,
                key: item(&[("Id", n(1))]),
                attributes_to_get: vec!["b".to_owned(), "b".to_owned()],
            })
            .expect_err("duplicate projection");
        assert_eq!(err.code, StoreErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_should_delete_idempotently() {
        let engine = engine();
        let table = test_table_name("delete");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::S));
        put(&engine, &table, item(&[("Id", s("k")), ("v", n(1))]));

        for expected_old in [true, false] {
            let out = engine
                .handle_delete_item(DeleteItemInput {
                    table_name: table.clone(),
                    key: item(&[("Id", s("k"))]),
                    return_values: Some(ReturnValue::AllOld),
                })
                .expect("delete");
            assert_eq!(out.attributes.is_some(), expected_old);
        }
        assert_eq!(scan_count(&engine, &table), 0);
    }

    #[tokio::test]
    async fn test_should_reject_key_of_wrong_type() {
        let engine = engine();
        let table = test_table_name("keytype");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        let err = engine
            .handle_put_item(PutItemInput {
                table_name: table.clone(),
                item: item(&[("Id", s("not-a-number"))]),
                return_values: None,
            })
            .expect_err("wrong key type");
        assert_eq!(err.code, StoreErrorCode::ValidationError);

        let err = engine
            .handle_put_item(PutItemInput {
                table_name: table,
                item: item(&[("Other", n(1))]),
                return_values: None,
            })
            .expect_err("missing key");
        assert_eq!(err.code, StoreErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_should_seed_update_of_absent_item_from_key() {
        let engine = engine();
        let table = test_table_name("update-new");
        create_composite_table(
            &engine,
            &table,
            ("Id", ScalarAttributeType::N),
            ("Sk", ScalarAttributeType::S),
        );

        let mut updates = IndexMap::new();
        updates.insert("gone".to_owned(), AttributeValueUpdate::delete());
        updates.insert("Data".to_owned(), AttributeValueUpdate::put(s("hello")));
        let out = engine
            .handle_update_item(UpdateItemInput {
                table_name: table.clone(),
                key: item(&[("Id", n(7)), ("Sk", s("a"))]),
                attribute_updates: updates,
                return_values: Some(ReturnValue::AllNew),
            })
            .expect("update");

        let expected = item(&[("Id", n(7)), ("Sk", s("a")), ("Data", s("hello"))]);
        assert_eq!(out.attributes, Some(expected.clone()));
        assert_eq!(
            get(&engine, &table, item(&[("Id", n(7)), ("Sk", s("a"))])),
            Some(expected)
        );
    }

    #[tokio::test]
    async fn test_should_apply_update_actions_in_order() {
        let engine = engine();
        let table = test_table_name("update-existing");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));
        put(&engine, &table, item(&[("Id", n(1)), ("keep", n(1)), ("drop", n(2))]));

        let mut updates = IndexMap::new();
        updates.insert("drop".to_owned(), AttributeValueUpdate::delete());
        updates.insert("keep".to_owned(), AttributeValueUpdate::put(n(10)));
        updates.insert("absent".to_owned(), AttributeValueUpdate::delete());
        let out = engine
            .handle_update_item(UpdateItemInput {
                table_name: table.clone(),
                key: item(&[("Id", n(1))]),
                attribute_updates: updates,
                return_values: Some(ReturnValue::AllOld),
            })
            .expect("update");

        assert_eq!(
            out.attributes,
            Some(item(&[("Id", n(1)), ("keep", n(1)), ("drop", n(2))]))
        );
        assert_eq!(
            get(&engine, &table, item(&[("Id", n(1))])),
            Some(item(&[("Id", n(1)), ("keep", n(10))]))
        );
    }
}
