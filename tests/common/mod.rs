#![allow(dead_code)]

use aws_sdk_s3::Client;
use wiremock::{Match, MockServer, Request, ResponseTemplate};

use cos_transfer::{create_cos_client, CosConfig, CredentialSource, PlainCredentials};

/// Client pointed at a local mock store instead of the real endpoint.
pub fn test_client(server: &MockServer) -> Client {
    create_cos_client(
        &CosConfig::new("ap-test").with_endpoint(server.uri()),
        CredentialSource::Plain(PlainCredentials {
            secret_id: "test-id".to_string(),
            secret_key: "test-key".to_string(),
        }),
    )
}

/// Matches requests carrying a bare query flag such as `?uploads`, which the
/// stock `query_param` matcher cannot express.
pub struct QueryFlag(pub &'static str);

impl Match for QueryFlag {
    fn matches(&self, request: &Request) -> bool {
        request.url.query_pairs().any(|(name, _)| name == self.0)
    }
}

pub fn xml_response(status: u16, body: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body, "application/xml")
}

pub fn init_upload_xml(bucket: &str, key: &str, upload_id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult>
  <Bucket>{bucket}</Bucket>
  <Key>{key}</Key>
  <UploadId>{upload_id}</UploadId>
</InitiateMultipartUploadResult>"#
    )
}

pub fn list_parts_xml(bucket: &str, key: &str, upload_id: &str, parts: &[(i32, u64, &str)]) -> String {
    let mut entries = String::new();
    for (part_number, size, e_tag) in parts {
        entries.push_str(&format!(
            "  <Part><PartNumber>{part_number}</PartNumber><ETag>{e_tag}</ETag><Size>{size}</Size></Part>\n"
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListPartsResult>
  <Bucket>{bucket}</Bucket>
  <Key>{key}</Key>
  <UploadId>{upload_id}</UploadId>
{entries}</ListPartsResult>"#
    )
}

/// One page of a part listing; `next_marker` marks the page as truncated.
pub fn list_parts_page_xml(
    bucket: &str,
    key: &str,
    upload_id: &str,
    parts: &[(i32, u64, &str)],
    next_marker: Option<i32>,
) -> String {
    let mut entries = String::new();
    for (part_number, size, e_tag) in parts {
        entries.push_str(&format!(
            "  <Part><PartNumber>{part_number}</PartNumber><ETag>{e_tag}</ETag><Size>{size}</Size></Part>\n"
        ));
    }
    let continuation = match next_marker {
        Some(marker) => format!(
            "  <IsTruncated>true</IsTruncated>\n  <NextPartNumberMarker>{marker}</NextPartNumberMarker>\n"
        ),
        None => "  <IsTruncated>false</IsTruncated>\n".to_string(),
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListPartsResult>
  <Bucket>{bucket}</Bucket>
  <Key>{key}</Key>
  <UploadId>{upload_id}</UploadId>
{continuation}{entries}</ListPartsResult>"#
    )
}

pub fn complete_upload_xml(bucket: &str, key: &str, e_tag: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CompleteMultipartUploadResult>
  <Location>http://{bucket}.example/{key}</Location>
  <Bucket>{bucket}</Bucket>
  <Key>{key}</Key>
  <ETag>{e_tag}</ETag>
</CompleteMultipartUploadResult>"#
    )
}

pub fn error_xml(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>{code}</Code>
  <Message>{message}</Message>
</Error>"#
    )
}
