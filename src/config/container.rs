// ABOUTME: Port mapping for the container platform.
// ABOUTME: The local endpoint URL is derived from the host side of the mapping.

pub const DEFAULT_HOST_PORT: u16 = 80;
pub const DEFAULT_CONTAINER_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSettings {
    pub host_port: u16,
    pub container_port: u16,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            host_port: DEFAULT_HOST_PORT,
            container_port: DEFAULT_CONTAINER_PORT,
        }
    }
}

impl ContainerSettings {
    /// `-p` argument for `docker run`.
    pub fn port_mapping(&self) -> String {
        format!("{}:{}", self.host_port, self.container_port)
    }

    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.host_port)
    }
}
