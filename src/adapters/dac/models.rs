//! Wire shapes for the DAC import/export service
//!
//! The service speaks DataContract XML. Only the handful of shapes this crate
//! exchanges are modelled: the two request bodies, the `guid` reply to a
//! submission, and the `ArrayOfStatusInfo` reply to a status query.

use crate::domain::{OperationKind, OperationRequest, StatusDetails, StatusSnapshot};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::OnceLock;

/// DataContract namespace of the service types
pub const DAC_NAMESPACE: &str =
    "http://schemas.datacontract.org/2004/07/Microsoft.SqlServer.Management.Dac.ServiceTypes";

/// XML Schema instance namespace, used for the credential type hint
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

const REDACTED: &str = "********";

/// `BlobCredentials` element, serialized as `BlobStorageAccessKeyCredentials`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobCredentials<'a> {
    pub uri: String,
    pub storage_access_key: &'a str,
}

impl BlobCredentials<'_> {
    fn write(&self, out: &mut String) {
        out.push_str("<BlobCredentials i:type=\"BlobStorageAccessKeyCredentials\">");
        push_element(out, "Uri", &self.uri);
        push_element(out, "StorageAccessKey", self.storage_access_key);
        out.push_str("</BlobCredentials>");
    }
}

/// `ConnectionInfo` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfoXml<'a> {
    pub database_name: &'a str,
    pub password: &'a str,
    pub server_name: &'a str,
    pub user_name: &'a str,
}

impl ConnectionInfoXml<'_> {
    fn write(&self, out: &mut String) {
        out.push_str("<ConnectionInfo>");
        push_element(out, "DatabaseName", self.database_name);
        push_element(out, "Password", self.password);
        push_element(out, "ServerName", self.server_name);
        push_element(out, "UserName", self.user_name);
        out.push_str("</ConnectionInfo>");
    }
}

/// Body of `POST /Export`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInput<'a> {
    pub blob_credentials: BlobCredentials<'a>,
    pub connection_info: ConnectionInfoXml<'a>,
}

impl<'a> ExportInput<'a> {
    /// Builds the export body for a request
    pub fn from_request(request: &'a OperationRequest) -> Self {
        Self {
            blob_credentials: blob_credentials(request),
            connection_info: connection_info(request),
        }
    }

    /// Serializes to DataContract XML
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(512);
        open_root(&mut out, "ExportInput");
        self.blob_credentials.write(&mut out);
        self.connection_info.write(&mut out);
        out.push_str("</ExportInput>");
        out
    }
}

/// Body of `POST /Import`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInput<'a> {
    pub azure_edition: &'a str,
    pub blob_credentials: BlobCredentials<'a>,
    pub connection_info: ConnectionInfoXml<'a>,
    pub database_size_in_gb: u32,
}

impl<'a> ImportInput<'a> {
    /// Builds the import body for a request
    ///
    /// Export requests carry no import settings; the service defaults
    /// (`Web`, 1 GB) are used for them.
    pub fn from_request(request: &'a OperationRequest) -> Self {
        let (azure_edition, database_size_in_gb) = match request.import_settings() {
            Some(settings) => (settings.edition.as_str(), settings.size_gb),
            None => ("Web", 1),
        };
        Self {
            azure_edition,
            blob_credentials: blob_credentials(request),
            connection_info: connection_info(request),
            database_size_in_gb,
        }
    }

    /// Serializes to DataContract XML
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(576);
        open_root(&mut out, "ImportInput");
        push_element(&mut out, "AzureEdition", self.azure_edition);
        self.blob_credentials.write(&mut out);
        self.connection_info.write(&mut out);
        push_element(&mut out, "DatabaseSizeInGB", &self.database_size_in_gb.to_string());
        out.push_str("</ImportInput>");
        out
    }
}

/// Serializes the body matching the request's kind
pub fn request_body(request: &OperationRequest) -> String {
    match request.kind() {
        OperationKind::Export => ExportInput::from_request(request).to_xml(),
        OperationKind::Import => ImportInput::from_request(request).to_xml(),
    }
}

/// Masks the password and storage key in a serialized request body
pub fn redact_payload(payload: &str) -> String {
    static SECRET_ELEMENTS: OnceLock<Regex> = OnceLock::new();
    let re = SECRET_ELEMENTS.get_or_init(|| {
        Regex::new(r"<(Password|StorageAccessKey)>[^<]*</").expect("redaction pattern is valid")
    });
    re.replace_all(payload, format!("<${{1}}>{REDACTED}</").as_str())
        .into_owned()
}

fn blob_credentials(request: &OperationRequest) -> BlobCredentials<'_> {
    BlobCredentials {
        uri: request.blob_uri(),
        storage_access_key: request.blob().storage_key.expose_secret().as_str(),
    }
}

fn connection_info(request: &OperationRequest) -> ConnectionInfoXml<'_> {
    let connection = request.connection();
    ConnectionInfoXml {
        database_name: &connection.database_name,
        password: connection.password.expose_secret().as_str(),
        server_name: &connection.server_name,
        user_name: &connection.username,
    }
}

fn open_root(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push_str(" xmlns=\"");
    out.push_str(DAC_NAMESPACE);
    out.push_str("\" xmlns:i=\"");
    out.push_str(XSI_NAMESPACE);
    out.push_str("\">");
}

fn push_element(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape(value));
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Extracts the request identifier from a submission reply
///
/// The reply is a serialized string such as
/// `<guid xmlns="http://schemas.microsoft.com/2003/10/Serialization/">…</guid>`;
/// the first `guid` element anywhere in the document is used.
pub fn parse_request_guid(body: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut in_guid = false;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"guid" => in_guid = true,
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"guid" => {
                return Err("guid element is empty".to_string());
            }
            Ok(Event::Text(t)) if in_guid => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("Invalid guid text: {e}"))?;
                value.push_str(&text);
            }
            Ok(Event::CData(c)) if in_guid => {
                value.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(_)) if in_guid => {
                let value = value.trim();
                if value.is_empty() {
                    return Err("guid element is empty".to_string());
                }
                return Ok(value.to_string());
            }
            Ok(Event::Eof) => return Err("No guid element in response".to_string()),
            Err(e) => {
                return Err(format!(
                    "Invalid XML at position {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }
}

/// One `StatusInfo` record as sent by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    pub blob_uri: Option<String>,
    pub database_name: Option<String>,
    pub error_message: Option<String>,
    pub last_modified_time: Option<String>,
    pub queued_time: Option<String>,
    pub request_id: Option<String>,
    pub request_type: Option<String>,
    pub server_name: Option<String>,
    pub status: Option<String>,
}

impl StatusInfo {
    fn field_mut(&mut self, name: &[u8]) -> Option<&mut Option<String>> {
        match name {
            b"BlobUri" => Some(&mut self.blob_uri),
            b"DatabaseName" => Some(&mut self.database_name),
            b"ErrorMessage" => Some(&mut self.error_message),
            b"LastModifiedTime" => Some(&mut self.last_modified_time),
            b"QueuedTime" => Some(&mut self.queued_time),
            b"RequestId" => Some(&mut self.request_id),
            b"RequestType" => Some(&mut self.request_type),
            b"ServerName" => Some(&mut self.server_name),
            b"Status" => Some(&mut self.status),
            _ => None,
        }
    }

    /// Converts the record into a snapshot
    ///
    /// The result location is the blob URI for exports and the database name
    /// for imports. A record without a status is rejected.
    pub fn into_snapshot(self, kind: OperationKind) -> Result<StatusSnapshot, String> {
        let status = self
            .status
            .ok_or_else(|| "Status record has no Status element".to_string())?;
        let result_location = match kind {
            OperationKind::Export => self.blob_uri,
            OperationKind::Import => self.database_name,
        };

        Ok(StatusSnapshot {
            status,
            error_message: self.error_message,
            result_location,
            details: StatusDetails {
                request_id: self.request_id,
                request_type: self.request_type,
                server_name: self.server_name,
                queued_time: self.queued_time,
                last_modified_time: self.last_modified_time,
            },
        })
    }
}

/// Parses an `ArrayOfStatusInfo` reply into its records, in document order
///
/// Empty elements (including `i:nil="true"` ones) leave the field unset.
pub fn parse_status_list(body: &str) -> Result<Vec<StatusInfo>, String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);
    let mut records = Vec::new();
    let mut current: Option<StatusInfo> = None;
    let mut field: Option<Vec<u8>> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"StatusInfo" {
                    current = Some(StatusInfo::default());
                } else if current.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"StatusInfo" {
                    records.push(StatusInfo::default());
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_deref()) {
                    let text = t
                        .unescape()
                        .map_err(|e| format!("Invalid text in {}: {e}", String::from_utf8_lossy(name)))?;
                    append_field(record, name, &text);
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_deref()) {
                    append_field(record, name, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"StatusInfo" {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "Invalid XML at position {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
    }

    if current.is_some() {
        return Err("Unterminated StatusInfo element".to_string());
    }

    Ok(records)
}

fn append_field(record: &mut StatusInfo, name: &[u8], text: &str) {
    if let Some(slot) = record.field_mut(name) {
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::{BlobTarget, ConnectionInfo, ImportSettings};
    use chrono::{TimeZone, Utc};

    fn request(kind: OperationKind) -> OperationRequest {
        let connection = ConnectionInfo::new(
            "srv.database.windows.net",
            "orders",
            "admin",
            secret_string("p<w>&d".to_string()),
        );
        let blob = BlobTarget::new(
            secret_string("key==".to_string()),
            "https://acct.blob.core.windows.net/bak/{0}-{1}.bacpac",
        );
        let at = Utc.timestamp_opt(0, 0).unwrap();
        match kind {
            OperationKind::Export => OperationRequest::export(connection, blob).requested_at(at),
            OperationKind::Import => {
                OperationRequest::import(connection, blob, ImportSettings::default())
                    .requested_at(at)
            }
        }
    }

    #[test]
    fn test_export_body() {
        let body = request_body(&request(OperationKind::Export));
        let expected = format!(
            "<ExportInput xmlns=\"{DAC_NAMESPACE}\" xmlns:i=\"{XSI_NAMESPACE}\">\
             <BlobCredentials i:type=\"BlobStorageAccessKeyCredentials\">\
             <Uri>https://acct.blob.core.windows.net/bak/orders-621355968000000000.bacpac</Uri>\
             <StorageAccessKey>key==</StorageAccessKey>\
             </BlobCredentials>\
             <ConnectionInfo>\
             <DatabaseName>orders</DatabaseName>\
             <Password>p&lt;w&gt;&amp;d</Password>\
             <ServerName>srv.database.windows.net</ServerName>\
             <UserName>admin</UserName>\
             </ConnectionInfo>\
             </ExportInput>"
        );
        assert_eq!(body, expected);
    }

    #[test]
    fn test_import_body_fixes_edition_and_size() {
        let body = request_body(&request(OperationKind::Import));
        assert!(body.starts_with("<ImportInput "));
        assert!(body.contains("<AzureEdition>Web</AzureEdition>"));
        assert!(body.contains("<DatabaseSizeInGB>1</DatabaseSizeInGB>"));
        assert!(body.ends_with("</ImportInput>"));
    }

    #[test]
    fn test_redact_payload() {
        let body = request_body(&request(OperationKind::Export));
        let redacted = redact_payload(&body);
        assert!(!redacted.contains("key=="));
        assert!(!redacted.contains("p&lt;w&gt;&amp;d"));
        assert!(redacted.contains("<Password>********</Password>"));
        assert!(redacted.contains("<StorageAccessKey>********</StorageAccessKey>"));
        assert!(redacted.contains("<UserName>admin</UserName>"));
    }

    #[test]
    fn test_parse_guid() {
        let body = r#"<guid xmlns="http://schemas.microsoft.com/2003/10/Serialization/">abc-123</guid>"#;
        assert_eq!(parse_request_guid(body).unwrap(), "abc-123");
    }

    #[test]
    fn test_parse_guid_nested() {
        let body = "<?xml version=\"1.0\"?><Reply><guid>\n  9f1c  \n</guid></Reply>";
        assert_eq!(parse_request_guid(body).unwrap(), "9f1c");
    }

    #[test]
    fn test_parse_guid_missing_or_empty() {
        assert!(parse_request_guid("<string>nope</string>").is_err());
        assert!(parse_request_guid("<guid/>").is_err());
        assert!(parse_request_guid("<guid></guid>").is_err());
        assert!(parse_request_guid("").is_err());
        assert!(parse_request_guid("not xml <<<").is_err());
    }

    #[test]
    fn test_parse_status_list() {
        let body = format!(
            r#"<ArrayOfStatusInfo xmlns="{DAC_NAMESPACE}" xmlns:i="{XSI_NAMESPACE}">
                <StatusInfo>
                    <BlobUri>https://blob/db.bacpac</BlobUri>
                    <DatabaseName>orders</DatabaseName>
                    <ErrorMessage i:nil="true"/>
                    <RequestId>abc-123</RequestId>
                    <RequestType>Export</RequestType>
                    <Status>Completed</Status>
                </StatusInfo>
                <StatusInfo>
                    <Status>Failed</Status>
                    <ErrorMessage>older attempt</ErrorMessage>
                </StatusInfo>
            </ArrayOfStatusInfo>"#
        );

        let records = parse_status_list(&body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status.as_deref(), Some("Completed"));
        assert_eq!(records[0].error_message, None);
        assert_eq!(records[0].request_id.as_deref(), Some("abc-123"));
        assert_eq!(records[1].error_message.as_deref(), Some("older attempt"));
    }

    #[test]
    fn test_parse_status_list_empty() {
        let body = format!(r#"<ArrayOfStatusInfo xmlns="{DAC_NAMESPACE}"/>"#);
        assert!(parse_status_list(&body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_status_list_unescapes() {
        let body = "<ArrayOfStatusInfo><StatusInfo><Status>Failed</Status>\
                    <ErrorMessage>a &lt; b &amp; c</ErrorMessage></StatusInfo></ArrayOfStatusInfo>";
        let records = parse_status_list(body).unwrap();
        assert_eq!(records[0].error_message.as_deref(), Some("a < b & c"));
    }

    #[test]
    fn test_parse_status_list_truncated() {
        let body = "<ArrayOfStatusInfo><StatusInfo><Status>Pending</Status>";
        assert!(parse_status_list(body).is_err());
    }

    #[test]
    fn test_into_snapshot_picks_location_by_kind() {
        let info = StatusInfo {
            blob_uri: Some("https://blob/db.bacpac".to_string()),
            database_name: Some("orders".to_string()),
            status: Some("Completed".to_string()),
            ..Default::default()
        };

        let export = info.clone().into_snapshot(OperationKind::Export).unwrap();
        assert_eq!(export.result_location.as_deref(), Some("https://blob/db.bacpac"));

        let import = info.into_snapshot(OperationKind::Import).unwrap();
        assert_eq!(import.result_location.as_deref(), Some("orders"));
    }

    #[test]
    fn test_into_snapshot_requires_status() {
        assert!(StatusInfo::default()
            .into_snapshot(OperationKind::Export)
            .is_err());
    }
}
