//! Modem Identifier Provider
//!
//! Supplies the serving cell's identifiers for the cellular strategy.

use crate::domain::entities::NetworkIdentifier;
use crate::domain::errors::{LocateError, Result};
use crate::domain::ports::IdentifierProvider;
use crate::infrastructure::modem::Modem;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Reads the latest network snapshot kept by the [`Modem`].
pub struct ModemIdentifierProvider {
    modem: Arc<Modem>,
}

impl ModemIdentifierProvider {
    pub fn new(modem: Arc<Modem>) -> Self {
        Self { modem }
    }
}

#[async_trait]
impl IdentifierProvider<NetworkIdentifier> for ModemIdentifierProvider {
    async fn current(&self, cancel: &CancellationToken) -> Result<NetworkIdentifier> {
        if cancel.is_cancelled() {
            return Err(LocateError::Cancelled);
        }
        self.modem
            .network_identifier()
            .ok_or_else(|| LocateError::external("modem has no network state yet"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_current_after_init() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config_mdmd-ng");
        std::fs::write(
            &path,
            "#!/bin/sh\necho '{\"cid\":\"4242\",\"lac\":\"17\",\"mccmnc\":\"26201\"}'\n",
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let modem = Arc::new(Modem::probe(&path, Duration::from_secs(5)).unwrap());
        let provider = ModemIdentifierProvider::new(modem.clone());
        let cancel = CancellationToken::new();

        assert!(matches!(
            provider.current(&cancel).await,
            Err(LocateError::ExternalLookup(_))
        ));

        modem.refresh(&cancel).await.unwrap();

        assert_eq!(
            provider.current(&cancel).await.unwrap(),
            NetworkIdentifier::new(262, 1, 4242, 17)
        );
    }
}
