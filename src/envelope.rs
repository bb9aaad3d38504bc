use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope: `{data, success: true, responseCode, message, pagination?}`.
/// Every handler response goes through this or [`ErrorEnvelope`]; external
/// clients rely on exactly these two shapes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessEnvelope<T: Serialize> {
    pub data: T,
    pub success: bool,
    pub response_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> SuccessEnvelope<T> {
    pub fn new(data: T, response_code: u16, message: impl Into<String>) -> Self {
        Self {
            data,
            success: true,
            response_code,
            message: message.into(),
            pagination: None,
        }
    }

    pub fn paginated(
        data: T,
        response_code: u16,
        message: impl Into<String>,
        pagination: Pagination,
    ) -> Self {
        Self {
            data,
            success: true,
            response_code,
            message: message.into(),
            pagination: Some(pagination),
        }
    }
}

/// Error envelope: `{data, success: false, responseCode, errMessage}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub data: Option<serde_json::Value>,
    pub success: bool,
    pub response_code: u16,
    pub err_message: String,
}

impl ErrorEnvelope {
    pub fn new(response_code: u16, err_message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            response_code,
            err_message: err_message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 3)]
    pub total_pages: i64,
    #[schema(example = 25)]
    pub total_items: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64, total_items: i64) -> Self {
        Self {
            page,
            total_pages: total_pages(total_items, page_size),
            total_items,
        }
    }
}

pub fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_items + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_wire_shape() {
        let env = SuccessEnvelope::new(json!({"id": 1}), 201, "created");
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["data"]["id"], 1);
        assert_eq!(value["success"], true);
        assert_eq!(value["responseCode"], 201);
        assert_eq!(value["message"], "created");
        // pagination is omitted entirely when absent
        assert!(value.get("pagination").is_none());
    }

    #[test]
    fn paginated_envelope_carries_pagination() {
        let env = SuccessEnvelope::paginated(
            json!([]),
            200,
            "ok",
            Pagination::new(2, 10, 25),
        );
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["pagination"]["page"], 2);
        assert_eq!(value["pagination"]["totalPages"], 3);
        assert_eq!(value["pagination"]["totalItems"], 25);
    }

    #[test]
    fn error_envelope_wire_shape() {
        let value = serde_json::to_value(ErrorEnvelope::new(401, "Unauthorized access")).unwrap();

        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["success"], false);
        assert_eq!(value["responseCode"], 401);
        assert_eq!(value["errMessage"], "Unauthorized access");
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
    }
}
