//! JSON dispatch tests: operation names in, tagged JSON out.

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use dynamock_core::{DynamockHandler, dispatch_operation, error_to_json};
    use dynamock_model::error::{StoreError, StoreErrorCode};
    use dynamock_model::operations::Operation;
    use serde_json::{Value, json};

    use crate::json_handler;

    async fn call<H: DynamockHandler>(handler: &H, op: &str, body: Value) -> Result<Value, StoreError> {
        let bytes = dispatch_operation(handler, op, Bytes::from(body.to_string())).await?;
        Ok(serde_json::from_slice(&bytes).expect("valid json"))
    }

    #[tokio::test]
    async fn test_should_drive_full_lifecycle_over_json() -> anyhow::Result<()> {
        let handler = json_handler();

        let created = call(
            &handler,
            "CreateTable",
            json!({
                "TableName": "events",
                "KeySchema": [
                    {"AttributeName": "Id", "KeyType": "HASH"},
                    {"AttributeName": "At", "KeyType": "RANGE"}
                ],
                "AttributeDefinitions": [
                    {"AttributeName": "Id", "AttributeType": "S"},
                    {"AttributeName": "At", "AttributeType": "N"}
                ]
            }),
        )
        .await?;
        assert_eq!(created["TableDescription"]["TableStatus"], "ACTIVE");

        call(
            &handler,
            "PutItem",
            json!({
                "TableName": "events",
                "Item": {
                    "Id": {"S": "e1"},
                    "At": {"N": "10"},
                    "Tags": {"L": [{"S": "a"}, {"NULL": true}]},
                    "Meta": {"M": {"ok": {"BOOL": true}}}
                }
            }),
        )
        .await?;

        let got = call(
            &handler,
            "GetItem",
            json!({"TableName": "events", "Key": {"Id": {"S": "e1"}, "At": {"N": "10"}}}),
        )
        .await?;
        assert_eq!(got["Item"]["Tags"], json!({"L": [{"S": "a"}, {"NULL": true}]}));
        assert_eq!(got["Item"]["Meta"], json!({"M": {"ok": {"BOOL": true}}}));

        let updated = call(
            &handler,
            "UpdateItem",
            json!({
                "TableName": "events",
                "Key": {"Id": {"S": "e1"}, "At": {"N": "10"}},
                "AttributeUpdates": {
                    "Tags": {"Action": "DELETE"},
                    "Seen": {"Action": "PUT", "Value": {"BOOL": false}}
                },
                "ReturnValues": "ALL_NEW"
            }),
        )
        .await?;
        assert_eq!(updated["Attributes"]["Seen"], json!({"BOOL": false}));
        assert!(updated["Attributes"].get("Tags").is_none());

        let queried = call(
            &handler,
            "Query",
            json!({
                "TableName": "events",
                "KeyConditions": {
                    "Id": {"ComparisonOperator": "EQ", "AttributeValueList": [{"S": "e1"}]},
                    "At": {"ComparisonOperator": "BETWEEN", "AttributeValueList": [{"N": "5"}, {"N": "10"}]}
                }
            }),
        )
        .await?;
        assert_eq!(queried["Count"], 1);

        let selected = call(
            &handler,
            "ExecuteStatement",
            json!({"Statement": "SELECT Id FROM \"events\" WHERE At > 9"}),
        )
        .await?;
        assert_eq!(selected["Items"], json!([{"Id": {"S": "e1"}}]));

        call(
            &handler,
            "DeleteItem",
            json!({"TableName": "events", "Key": {"Id": {"S": "e1"}, "At": {"N": "10"}}}),
        )
        .await?;
        let scanned = call(&handler, "Scan", json!({"TableName": "events"})).await?;
        assert_eq!(scanned["Count"], 0);

        let listed = call(&handler, "ListTables", json!({})).await?;
        assert_eq!(listed["TableNames"], json!(["events"]));
        Ok(())
    }

    #[tokio::test]
    async fn test_should_route_every_operation_name() {
        let handler = json_handler();
        for op in Operation::ALL {
            let result = dispatch_operation(&handler, op.as_str(), Bytes::new()).await;
            if let Err(e) = result {
                assert_ne!(e.code, StoreErrorCode::UnsupportedOperation, "{op}");
            }
        }
    }

    #[tokio::test]
    async fn test_should_reject_malformed_attribute_values() {
        let handler = json_handler();
        for item in [
            json!({"a": {}}),
            json!({"a": {"N": "twelve"}}),
            json!({"a": {"NULL": false}}),
            json!({"a": {"S": "x", "N": "1"}}),
            json!({"a": {"SS": ["x"]}}),
        ] {
            let err = call(&handler, "PutItem", json!({"TableName": "whatever", "Item": item}))
                .await
                .expect_err("malformed value");
            assert_eq!(err.code, StoreErrorCode::SerializationError, "{item}");
        }
    }

    #[tokio::test]
    async fn test_should_encode_errors_for_callers() {
        let handler = json_handler();
        let err = call(&handler, "ExecuteStatement", json!({"Statement": "SELECT"}))
            .await
            .expect_err("syntax error");
        let body: Value = serde_json::from_slice(&error_to_json(&err)).expect("json");
        assert_eq!(body["__type"], "StatementSyntaxError");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }
}
