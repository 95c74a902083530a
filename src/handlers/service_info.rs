use crate::types::{Organization, ServiceInfo, ServiceType};
use axum::Json;

pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        id: "org.example.ga4ghr".to_string(),
        name: "ga4ghr".to_string(),
        r#type: ServiceType {
            group: "org.ga4gh".to_string(),
            artifact: "genomics".to_string(),
            version: "0.6.0".to_string(),
        },
        description: Some("GA4GH genomics data-access API server implementation in Rust".to_string()),
        organization: Organization {
            name: "Example Organization".to_string(),
            url: "https://example.org".to_string(),
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
