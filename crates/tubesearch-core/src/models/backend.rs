#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BackendVariant {
    /// `POST {agent}/agent`, replies with a bare item array.
    Agent,
    /// `POST {backend}/tools/youtube.search/invoke`, replies with `{ "result": ... }`.
    ToolInvoke,
}

impl BackendVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::ToolInvoke => "tool",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "agent" | "a" => Some(Self::Agent),
            "tool" | "tools" | "b" => Some(Self::ToolInvoke),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    LoadConfig,
    SignIn,
    SignOut,
    Search,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BackendDescriptor {
    pub variant: BackendVariant,
    pub display_name: &'static str,
    pub path: &'static str,
    pub base_url_env: &'static str,
}

impl BackendDescriptor {
    pub fn endpoint(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}
