use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Health service shared by the server binaries.
///
/// This service provides a standardised liveness answer for the MedVault API.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "MedVault is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(res.message, "MedVault is alive");
    }
}
