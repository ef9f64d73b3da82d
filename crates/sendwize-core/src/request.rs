//! Parsing of JSON request bodies
//!
//! Arguments of the wrong shape are the only fatal condition of an audit
//! call and surface as [`Error::Input`]. Defects inside individual records
//! are left for the engines to score.

use crate::content::EmailDocument;
use crate::hygiene::SuppressionCheckInput;
use crate::vendor::VendorProfile;
use sendwize_common::types::{
    ConsentAuditConfig, ContactRecord, CustomerType, EmailType, ProductType, Timestamp,
};
use sendwize_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Consent audit call arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentAuditRequest {
    pub contacts: Vec<ContactRecord>,
    pub customer_type: CustomerType,
    pub product_type: ProductType,
    pub email_type: EmailType,
    pub user_id: Option<String>,
}

impl ConsentAuditRequest {
    pub fn from_json(body: &Value) -> Result<Self> {
        let contacts = body
            .get("contacts")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Input("Invalid contacts provided".to_string()))?;

        let contacts = contacts
            .iter()
            .enumerate()
            .map(|(index, contact)| {
                if !contact.get("email").is_some_and(Value::is_string) {
                    return Err(Error::Input(format!("Contact {} has no email", index)));
                }
                serde_json::from_value(contact.clone())
                    .map_err(|e| Error::Input(format!("Contact {}: {}", index, e)))
            })
            .collect::<Result<Vec<ContactRecord>>>()?;

        Ok(Self {
            contacts,
            customer_type: enum_field(body, "customerType")?,
            product_type: enum_field(body, "productType")?,
            email_type: enum_field(body, "emailType")?,
            user_id: user_id(body),
        })
    }

    /// Audit parameters for the given evaluation date
    pub fn config(&self, evaluation_date: Timestamp) -> ConsentAuditConfig {
        ConsentAuditConfig {
            customer_type: self.customer_type,
            product_type: self.product_type,
            email_type: self.email_type,
            evaluation_date,
        }
    }
}

impl SuppressionCheckInput {
    pub fn from_json(body: &Value) -> Result<Self> {
        let invalid = || Error::Input("Invalid lists provided".to_string());
        let send_list = string_list(body, "sendList").ok_or_else(invalid)?;
        let suppression_list = string_list(body, "suppressionList").ok_or_else(invalid)?;
        Ok(Self {
            send_list,
            suppression_list,
        })
    }
}

impl EmailDocument {
    pub fn from_json(body: &Value) -> Result<Self> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
        };
        match (field("subject"), field("html")) {
            (Some(subject), Some(html)) => Ok(Self::new(subject, html)),
            _ => Err(Error::Input("Subject and HTML required".to_string())),
        }
    }
}

/// Vendor check call arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorCheckRequest {
    pub vendors: Vec<VendorProfile>,
    pub user_id: Option<String>,
}

impl VendorCheckRequest {
    pub fn from_json(body: &Value) -> Result<Self> {
        let invalid = |detail: String| Error::Input(format!("Invalid vendors provided: {}", detail));
        let vendors = body
            .get("vendors")
            .filter(|v| v.is_array())
            .ok_or_else(|| invalid("expected an array".to_string()))?;
        let vendors: Vec<VendorProfile> =
            serde_json::from_value(vendors.clone()).map_err(|e| invalid(e.to_string()))?;
        Ok(Self {
            vendors,
            user_id: user_id(body),
        })
    }
}

/// Caller id used for history records, if any
pub fn user_id(body: &Value) -> Option<String> {
    body.get("userId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn string_list(body: &Value, name: &str) -> Option<Vec<String>> {
    body.get(name)?
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn enum_field<T: DeserializeOwned>(body: &Value, name: &str) -> Result<T> {
    let value = body
        .get(name)
        .ok_or_else(|| Error::Input(format!("Missing {}", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|_| Error::Input(format!("Unknown {}: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_consent_request() {
        let body = json!({
            "contacts": [
                {"email": "a@b.com", "consentDate": "2024-01-01", "source": "Website"},
                {"email": "c@d.com"}
            ],
            "customerType": "some",
            "productType": "similar",
            "emailType": "b2c",
            "userId": "user-1"
        });
        let request = ConsentAuditRequest::from_json(&body).unwrap();
        assert_eq!(request.contacts.len(), 2);
        assert_eq!(request.contacts[0].source.as_deref(), Some("Website"));
        assert_eq!(request.customer_type, CustomerType::Some);
        assert_eq!(request.email_type, EmailType::B2c);
        assert_eq!(request.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_consent_request_rejects_bad_shapes() {
        let base = json!({"customerType": "all", "productType": "mixed", "emailType": "b2b"});

        let err = ConsentAuditRequest::from_json(&base).unwrap_err();
        assert!(err.is_input());

        let mut body = base.clone();
        body["contacts"] = json!("a@b.com");
        assert!(ConsentAuditRequest::from_json(&body).unwrap_err().is_input());

        body["contacts"] = json!([{"consentDate": "2024-01-01"}]);
        assert!(ConsentAuditRequest::from_json(&body).unwrap_err().is_input());

        body["contacts"] = json!([{"email": "a@b.com"}]);
        body["emailType"] = json!("B2B-ish");
        let err = ConsentAuditRequest::from_json(&body).unwrap_err();
        assert!(err.is_input());
        assert!(err.to_string().contains("emailType"));
    }

    #[test]
    fn test_suppression_input() {
        let body = json!({"sendList": ["a@b.com"], "suppressionList": []});
        let input = SuppressionCheckInput::from_json(&body).unwrap();
        assert_eq!(input.send_list, vec!["a@b.com"]);
        assert!(input.suppression_list.is_empty());

        for body in [
            json!({"sendList": ["a@b.com"]}),
            json!({"sendList": "a@b.com", "suppressionList": []}),
            json!({"sendList": ["a@b.com", 3], "suppressionList": []}),
        ] {
            let err = SuppressionCheckInput::from_json(&body).unwrap_err();
            assert_eq!(err.to_string(), "Invalid input: Invalid lists provided");
        }
    }

    #[test]
    fn test_email_document() {
        let body = json!({"subject": "Hello", "html": "<p>Hi</p>"});
        let document = EmailDocument::from_json(&body).unwrap();
        assert_eq!(document, EmailDocument::new("Hello", "<p>Hi</p>"));

        let err = EmailDocument::from_json(&json!({"subject": "", "html": "<p>Hi</p>"})).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(EmailDocument::from_json(&json!({"subject": "Hi"})).is_err());
    }

    #[test]
    fn test_vendor_request() {
        let body = json!({"vendors": [{"name": "Mailer", "score": 80}, {"name": "X", "isCustom": true}]});
        let request = VendorCheckRequest::from_json(&body).unwrap();
        assert_eq!(request.vendors.len(), 2);
        assert!(request.vendors[1].is_custom);
        assert!(request.user_id.is_none());

        assert!(VendorCheckRequest::from_json(&json!({"vendors": {}})).unwrap_err().is_input());
    }

    #[test]
    fn test_blank_user_id_is_none() {
        assert_eq!(user_id(&json!({"userId": "  "})), None);
        assert_eq!(user_id(&json!({"userId": 7})), None);
    }
}
