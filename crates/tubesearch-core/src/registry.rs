use crate::models::{BackendDescriptor, BackendVariant};

pub const AGENT_URL_ENV: &str = "NEXT_PUBLIC_AGENT_URL";
pub const BACKEND_URL_ENV: &str = "NEXT_PUBLIC_BACKEND_URL";

const ALL_BACKENDS: [BackendDescriptor; 2] = [
    BackendDescriptor {
        variant: BackendVariant::Agent,
        display_name: "MCP agent",
        path: "/agent",
        base_url_env: AGENT_URL_ENV,
    },
    BackendDescriptor {
        variant: BackendVariant::ToolInvoke,
        display_name: "MCP tool server",
        path: "/tools/youtube.search/invoke",
        base_url_env: BACKEND_URL_ENV,
    },
];

pub fn backends() -> &'static [BackendDescriptor] {
    &ALL_BACKENDS
}

pub fn backend_descriptor(variant: BackendVariant) -> &'static BackendDescriptor {
    match variant {
        BackendVariant::Agent => &ALL_BACKENDS[0],
        BackendVariant::ToolInvoke => &ALL_BACKENDS[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_its_own_descriptor() {
        for descriptor in backends() {
            assert_eq!(backend_descriptor(descriptor.variant), descriptor);
        }
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let agent = backend_descriptor(BackendVariant::Agent);
        assert_eq!(agent.endpoint("http://localhost:8001/"), "http://localhost:8001/agent");

        let tool = backend_descriptor(BackendVariant::ToolInvoke);
        assert_eq!(
            tool.endpoint("https://mcp.example.com"),
            "https://mcp.example.com/tools/youtube.search/invoke"
        );
    }
}
