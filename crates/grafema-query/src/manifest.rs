//! Service manifest shape returned by DISCOVERY (§6):
//! `[{id, name, path, type, metadata:{entrypoint?, packageJson?,
//! relativePath?, workspaceType?}}]`. A thin serialization wrapper over
//! `grafema_orchestrator::Service` for the external GraphQL/MCP
//! collaborators named in §1.

use grafema_orchestrator::Service;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceManifestMetadata {
    pub entrypoint: Option<String>,
    #[serde(rename = "packageJson")]
    pub package_json: Option<String>,
    #[serde(rename = "relativePath")]
    pub relative_path: Option<String>,
    #[serde(rename = "workspaceType")]
    pub workspace_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceManifestEntry {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: ServiceManifestMetadata,
}

impl From<&Service> for ServiceManifestEntry {
    fn from(service: &Service) -> Self {
        ServiceManifestEntry {
            id: service.id.clone(),
            name: service.name.clone(),
            path: service.path.clone(),
            kind: service.kind.clone(),
            metadata: ServiceManifestMetadata {
                entrypoint: service.metadata.entrypoint.clone(),
                package_json: service.metadata.package_json.clone(),
                relative_path: service.metadata.relative_path.clone(),
                workspace_type: service.metadata.workspace_type.clone(),
            },
        }
    }
}

pub type ServiceManifest = Vec<ServiceManifestEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_orchestrator::ServiceMetadata;

    #[test]
    fn service_serializes_with_the_documented_field_names() {
        let service = Service {
            id: "root".to_string(),
            name: "demo".to_string(),
            path: "/tmp/demo".to_string(),
            kind: "package".to_string(),
            metadata: ServiceMetadata { workspace_type: Some("Npm".to_string()), ..Default::default() },
        };
        let entry: ServiceManifestEntry = (&service).into();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "package");
        assert_eq!(json["metadata"]["workspaceType"], "Npm");
    }
}
