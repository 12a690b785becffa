//! Table lifecycle tests.

#[cfg(test)]
mod tests {
    use dynamock_model::error::StoreErrorCode;
    use dynamock_model::input::{
        CreateTableInput, DeleteTableInput, DescribeTableInput, GetItemInput, ListTablesInput,
        PutItemInput,
    };
    use dynamock_model::types::{
        AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType,
        LocalSecondaryIndex, Projection, ScalarAttributeType, TableStatus,
    };

    use crate::{create_hash_table, engine, item, n, test_table_name};

    #[tokio::test]
    async fn test_should_create_and_describe_table() {
        let engine = engine();
        let table = test_table_name("describe");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));

        let desc = engine
            .handle_describe_table(DescribeTableInput {
                table_name: table.clone(),
            })
            .expect("describe")
            .table
            .expect("description");
        assert_eq!(desc.table_name.as_deref(), Some(table.as_str()));
        assert_eq!(desc.table_status, Some(TableStatus::Active));
        assert_eq!(desc.key_schema, vec![KeySchemaElement::new("Id", KeyType::Hash)]);
        assert_eq!(desc.item_count, Some(0));
        assert!(desc.table_id.is_some());
    }

    #[tokio::test]
    async fn test_should_fail_describe_for_unknown_table() {
        let err = engine()
            .handle_describe_table(DescribeTableInput {
                table_name: "never-created".to_owned(),
            })
            .expect_err("unknown table");
        assert_eq!(err.code, StoreErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_should_not_auto_create_table_on_write() {
        let engine = engine();
        let err = engine
            .handle_put_item(PutItemInput {
                table_name: "ghost".to_owned(),
                item: item(&[("Id", n(1))]),
                return_values: None,
            })
            .expect_err("no such table");
        assert_eq!(err.code, StoreErrorCode::TableNotFound);
        assert!(engine.catalog().list_table_names().is_empty());
    }

    #[tokio::test]
    async fn test_should_replace_table_on_recreate() {
        let engine = engine();
        let table = test_table_name("recreate");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));
        engine
            .handle_put_item(PutItemInput {
                table_name: table.clone(),
                item: item(&[("Id", n(1))]),
                return_values: None,
            })
            .expect("put");

        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::N));
        let got = engine
            .handle_get_item(GetItemInput {
                table_name: table.clone(),
                key: item(&[("Id", n(1))]),
                attributes_to_get: Vec::new(),
            })
            .expect("get");
        assert!(got.item.is_none());
    }

    #[tokio::test]
    async fn test_should_delete_table() {
        let engine = engine();
        let table = test_table_name("delete");
        create_hash_table(&engine, &table, ("Id", ScalarAttributeType::S));

        let out = engine
            .handle_delete_table(DeleteTableInput {
                table_name: table.clone(),
            })
            .expect("delete");
        assert_eq!(
            out.table_description.and_then(|d| d.table_status),
            Some(TableStatus::Deleting)
        );

        let err = engine
            .handle_delete_table(DeleteTableInput { table_name: table })
            .expect_err("already deleted");
        assert_eq!(err.code, StoreErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_should_list_tables_sorted() {
        let engine = engine();
        for name in ["zeta", "alpha", "mid"] {
            create_hash_table(&engine, name, ("Id", ScalarAttributeType::S));
        }
        let out = engine
            .handle_list_tables(ListTablesInput::default())
            .expect("list");
        assert_eq!(out.table_names, ["alpha", "mid", "zeta"]);
        assert_eq!(out.last_evaluated_table_name, None);
    }

    #[tokio::test]
    async fn test_should_reject_malformed_key_schemas() {
        let engine = engine();
        let id = || AttributeDefinition::new("Id", ScalarAttributeType::S);
        let cases = [
            // No HASH key.
            CreateTableInput {
                table_name: "bad-one".to_owned(),
                key_schema: vec![KeySchemaElement::new("Id", KeyType::Range)],
                attribute_definitions: vec![id()],
                ..Default::default()
            },
            // Two HASH keys.
            CreateTableInput {
                table_name: "bad-two".to_owned(),
                key_schema: vec![
                    KeySchemaElement::new("Id", KeyType::Hash),
                    KeySchemaElement::new("Other", KeyType::Hash),
                ],
                attribute_definitions: vec![
                    id(),
                    AttributeDefinition::new("Other", ScalarAttributeType::S),
                ],
                ..Default::default()
            },
            // Key attribute without a definition.
            CreateTableInput {
                table_name: "bad-three".to_owned(),
                key_schema: vec![KeySchemaElement::new("Missing", KeyType::Hash)],
                attribute_definitions: vec![id()],
                ..Default::default()
            },
            // LSI with a different HASH key.
            CreateTableInput {
                table_name: "bad-four".to_owned(),
                key_schema: vec![
                    KeySchemaElement::new("Id", KeyType::Hash),
                    KeySchemaElement::new("Sk", KeyType::Range),
                ],
                attribute_definitions: vec![
                    id(),
                    AttributeDefinition::new("Sk", ScalarAttributeType::S),
                ],
                local_secondary_indexes: vec![LocalSecondaryIndex {
                    index_name: "by-other".to_owned(),
                    key_schema: vec![
                        KeySchemaElement::new("Other", KeyType::Hash),
                        KeySchemaElement::new("Sk", KeyType::Range),
                    ],
                    projection: Projection::default(),
                }],
                ..Default::default()
            },
            // Duplicate index names.
            CreateTableInput {
                table_name: "bad-five".to_owned(),
                key_schema: vec![KeySchemaElement::new("Id", KeyType::Hash)],
                attribute_definitions: vec![id()],
                global_secondary_indexes: vec![
                    GlobalSecondaryIndex {
                        index_name: "dup".to_owned(),
                        key_schema: vec![KeySchemaElement::new("A", KeyType::Hash)],
                        projection: Projection::default(),
                    },
                    GlobalSecondaryIndex {
                        index_name: "dup".to_owned(),
                        key_schema: vec![KeySchemaElement::new("B", KeyType::Hash)],
                        projection: Projection::default(),
                    },
                ],
                ..Default::default()
            },
        ];

        for input in cases {
            let name = input.table_name.clone();
            let err = engine
                .handle_create_table(input)
                .expect_err("malformed schema");
            assert_eq!(err.code, StoreErrorCode::SchemaConflict, "case {name}");
            assert!(engine.catalog().get_table(&name).is_none());
        }
    }

    #[tokio::test]
    async fn test_should_reject_invalid_table_name() {
        let err = engine()
            .handle_create_table(CreateTableInput {
                table_name: "x".to_owned(),
                key_schema: vec![KeySchemaElement::new("Id", KeyType::Hash)],
                attribute_definitions: vec![AttributeDefinition::new(
                    "Id",
                    ScalarAttributeType::S,
                )],
                ..Default::default()
            })
            .expect_err("too short");
        assert_eq!(err.code, StoreErrorCode::ValidationError);
    }
}
