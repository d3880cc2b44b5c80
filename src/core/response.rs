use crate::domain::model::{FingerprintResult, RequestKind};
use crate::utils::error::LookupError;
use serde_json::{Map, Value};

pub const CODE_FIELD: &str = "Code";
pub const CREDITS_FIELD: &str = "Credits";

/// 解析服務回傳的扁平 JSON 物件。缺少的欄位視為空字串，不算錯誤
pub fn decode_response(body: &[u8], kind: RequestKind) -> Result<FingerprintResult, LookupError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(LookupError::EmptyResponse {
            reason: "empty body".to_string(),
        });
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| LookupError::EmptyResponse {
        reason: format!("malformed JSON: {}", e),
    })?;

    let Value::Object(fields) = value else {
        return Err(LookupError::EmptyResponse {
            reason: "expected a JSON object".to_string(),
        });
    };

    Ok(FingerprintResult {
        fingerprint: field_text(&fields, kind.fingerprint_field()),
        status_code: field_text(&fields, CODE_FIELD),
        credits_remaining: field_text(&fields, CREDITS_FIELD),
    })
}

fn field_text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        // Credits sometimes arrive as a bare number
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_company_response() {
        let body = br#"{"SimKey":"N1Ai4RfV0SRJf2dJwDO0Cvzh4xCgQG","Code":"Success","Credits":"5638"}"#;
        let result = decode_response(body, RequestKind::Company).unwrap();

        assert_eq!(result.fingerprint, "N1Ai4RfV0SRJf2dJwDO0Cvzh4xCgQG");
        assert_eq!(result.status_code, "Success");
        assert_eq!(result.credits_remaining, "5638");
        assert!(result.is_success());
    }

    #[test]
    fn test_decode_organization_reads_standard_field() {
        let body = br#"{"Standard":"IBM","SimKey":"ignored","Code":"Success","Credits":"10"}"#;
        let result = decode_response(body, RequestKind::Organization).unwrap();
        assert_eq!(result.fingerprint, "IBM");
    }

    #[test]
    fn test_decode_unescapes_and_stops_at_closing_quote() {
        let body = br#"{"SimKey":"a\"b\\c,d","Code":"Success","Credits":"1","Extra":"\"x\""}"#;
        let result = decode_response(body, RequestKind::Person).unwrap();
        assert_eq!(result.fingerprint, "a\"b\\c,d");
        assert_eq!(result.credits_remaining, "1");
    }

    #[test]
    fn test_missing_and_null_keys_are_empty() {
        let body = br#"{"Code":"Success","SimKey":null}"#;
        let result = decode_response(body, RequestKind::Address).unwrap();
        assert_eq!(result.fingerprint, "");
        assert_eq!(result.credits_remaining, "");
    }

    #[test]
    fn test_numeric_credits_rendered_as_text() {
        let body = br#"{"SimKey":"K1","Code":"Success","Credits":42}"#;
        let result = decode_response(body, RequestKind::Company).unwrap();
        assert_eq!(result.credits_remaining, "42");
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        assert!(matches!(
            decode_response(b"", RequestKind::Company),
            Err(LookupError::EmptyResponse { .. })
        ));
        assert!(matches!(
            decode_response(b"  \n", RequestKind::Company),
            Err(LookupError::EmptyResponse { .. })
        ));
        assert!(matches!(
            decode_response(b"<html>502</html>", RequestKind::Company),
            Err(LookupError::EmptyResponse { .. })
        ));
        assert!(matches!(
            decode_response(br#"["K1"]"#, RequestKind::Company),
            Err(LookupError::EmptyResponse { .. })
        ));
    }
}
