//! TC3-HMAC-SHA256 request signing

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

/// Inputs for one signature. `date` is the UTC day of `timestamp` as YYYY-MM-DD.
pub struct SigningRequest<'a> {
    pub secret_id: &'a str,
    pub secret_key: &'a str,
    pub service: &'a str,
    pub host: &'a str,
    pub timestamp: i64,
    pub date: &'a str,
    pub payload: &'a str,
}

/// Value for the `Authorization` header
pub fn authorization(req: &SigningRequest<'_>) -> Result<String, ApiError> {
    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        CONTENT_TYPE,
        req.host,
        SIGNED_HEADERS,
        sha256_hex(req.payload)
    );

    let credential_scope = format!("{}/{}/tc3_request", req.date, req.service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        req.timestamp,
        credential_scope,
        sha256_hex(&canonical_request)
    );

    let secret_date = hmac_sha256(format!("TC3{}", req.secret_key).as_bytes(), req.date)?;
    let secret_service = hmac_sha256(&secret_date, req.service)?;
    let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, req.secret_id, credential_scope, SIGNED_HEADERS, signature
    ))
}

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>, ApiError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ApiError::Config(format!("invalid signing key: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(payload: &'a str) -> SigningRequest<'a> {
        SigningRequest {
            secret_id: "AKIDEXAMPLE",
            secret_key: "secret",
            service: "cdb",
            host: "cdb.tencentcloudapi.com",
            timestamp: 1_700_000_000,
            date: "2023-11-14",
            payload,
        }
    }

    #[test]
    fn sha256_of_empty_payload() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn authorization_header_layout() {
        let header = authorization(&request("{}")).unwrap();
        assert!(header.starts_with(
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2023-11-14/cdb/tc3_request, SignedHeaders=content-type;host, Signature="
        ));
        let signature = header.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic_and_payload_bound() {
        let a = authorization(&request(r#"{"InstanceId":"cdb-c1nl9rpv"}"#)).unwrap();
        let b = authorization(&request(r#"{"InstanceId":"cdb-c1nl9rpv"}"#)).unwrap();
        let c = authorization(&request(r#"{"InstanceId":"cdb-other"}"#)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
