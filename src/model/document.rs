use chrono::NaiveDateTime;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// The fixed set of document types accepted by the upload endpoints; the
/// serialized labels are the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, ToSchema)]
pub enum DocumentType {
    AadharCard,
    #[strum(serialize = "10th_Marksheet")]
    TenthMarksheet,
    #[strum(serialize = "12th_Marksheet")]
    TwelfthMarksheet,
    #[strum(serialize = "Graduation_Marksheet")]
    GraduationMarksheet,
    #[strum(serialize = "Joining_Letter")]
    JoiningLetter,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub user_name: String,
    #[serde(rename = "type")]
    #[schema(example = "Joining_Letter")]
    pub doc_type: String,
    #[schema(example = "https://storage.example.com/uploads/abc.pdf")]
    pub file_url: String,
    #[schema(value_type = String)]
    pub upload_date: NaiveDateTime,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn wire_labels_parse() {
        assert_eq!(DocumentType::from_str("AadharCard").unwrap(), DocumentType::AadharCard);
        assert_eq!(DocumentType::from_str("10th_Marksheet").unwrap(), DocumentType::TenthMarksheet);
        assert_eq!(DocumentType::from_str("Joining_Letter").unwrap(), DocumentType::JoiningLetter);
        assert!(DocumentType::from_str("Passport").is_err());
    }
}
