/// Name and version reported by the health route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthService {
    info: AppInfo,
}

impl HealthService {
    pub fn new(info: AppInfo) -> Self {
        Self { info }
    }

    pub fn get_health(&self) -> String {
        format!("{}-{} UP!!", self.info.name, self.info.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_message_uses_name_and_version() {
        let service = HealthService::new(AppInfo::new("starter", "1.2.3"));
        assert_eq!(service.get_health(), "starter-1.2.3 UP!!");
    }
}
