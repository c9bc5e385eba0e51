//! Data handed to templates and serialized as the JSON body.

use serde::{Deserialize, Serialize};

/// Everything a rendered error page knows about the failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPageData {
    /// Status code exactly as received in `X-Code`.
    pub code: String,
    pub title: String,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorPageDetails>,
}

/// Routing metadata the ingress controller attaches to the request.
///
/// Values are copied verbatim from the headers; missing headers become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPageDetails {
    #[serde(rename = "originalURI")]
    pub original_uri: String,
    pub namespace: String,
    pub ingress_name: String,
    pub service_name: String,
    pub service_port: String,
    pub request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let data = ErrorPageData {
            code: "502".into(),
            title: "Bad Gateway".into(),
            messages: vec!["Bad Gateway".into()],
            details: Some(ErrorPageDetails {
                original_uri: "/shop".into(),
                request_id: "abc".into(),
                ..Default::default()
            }),
        };

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "code": "502",
                "title": "Bad Gateway",
                "messages": ["Bad Gateway"],
                "details": {
                    "originalURI": "/shop",
                    "namespace": "",
                    "ingressName": "",
                    "serviceName": "",
                    "servicePort": "",
                    "requestId": "abc"
                }
            })
        );
    }

    #[test]
    fn test_hidden_details_are_omitted() {
        let data = ErrorPageData {
            code: "404".into(),
            title: "Not Found".into(),
            messages: vec![],
            details: None,
        };

        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("details").is_none());
    }
}
