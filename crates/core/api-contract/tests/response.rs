use api_contract::ApiResponse;

#[test]
fn success_carries_data() {
    let response = ApiResponse::success(vec![101_i64]);
    assert!(response.success);
    assert_eq!(response.data.as_deref(), Some(&[101_i64][..]));
    assert!(response.error.is_none());
}

#[test]
fn decode_error_serializes_code() {
    let response = ApiResponse::<()>::error("INVALID.REQUEST", "expected object_ids");
    let value = serde_json::to_value(&response).expect("serialize");
    assert_eq!(value["success"], false);
    assert!(value["data"].is_null());
    assert_eq!(value["error"]["code"], "INVALID.REQUEST");
}
