//! Modem Information Provider
//!
//! Queries the modem configuration tool for device, wireless data-service
//! and network state. Each facet is one subprocess invocation printing JSON.

use crate::domain::entities::NetworkIdentifier;
use crate::domain::errors::LocateError;
use parking_lot::RwLock;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default location of the modem configuration tool.
pub const DEFAULT_MODEM_COMMAND: &str = "/etc/config-tools/config_mdmd-ng";

/// Refresh period used when a zero interval is requested.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

const INFO_ARGS: [&str; 3] = ["-m", "get", "json"];
const NETWORK_ARGS: [&str; 3] = ["-n", "get", "json"];
const WDS_ARGS: [&str; 3] = ["-w", "get", "json"];

/// Modem query errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModemError {
    #[error("modem not present: {0}")]
    NotPresent(String),
    #[error("{facet} query failed: {message}")]
    Command { facet: &'static str, message: String },
    #[error("{facet} decode failed: {message}")]
    Decode { facet: &'static str, message: String },
    #[error("modem query cancelled")]
    Cancelled,
}

impl From<ModemError> for LocateError {
    fn from(e: ModemError) -> Self {
        match e {
            ModemError::NotPresent(msg) => LocateError::ProviderUnavailable(msg),
            ModemError::Command { .. } => LocateError::ExternalLookup(e.to_string()),
            ModemError::Decode { .. } => LocateError::Decode(e.to_string()),
            ModemError::Cancelled => LocateError::Cancelled,
        }
    }
}

/// Static device information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub imei: String,
    pub manufacturer: String,
    pub model: String,
    pub state: String,
    pub version: String,
}

/// Wireless data-service state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WirelessDataService {
    pub apn: String,
    pub ip: String,
    pub state: String,
    pub status: String,
}

/// Network registration state, including the serving cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkState {
    pub identifier: NetworkIdentifier,
    pub operator: String,
    pub operator_identifier: String,
    pub operator_short: String,
    pub registration_mode: String,
    pub fallback_to_auto: String,
    pub signal_rssi: i32,
    pub signal_strength: i32,
    pub state: String,
    pub technology: String,
    pub technology_selection: String,
}

/// Network facet as printed by the tool; cell fields are decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNetwork {
    cid: String,
    lac: String,
    mccmnc: String,
    fallback_to_auto: String,
    operator: String,
    operator_identifier: String,
    operator_short: String,
    registration_mode: String,
    signal_rssi: i32,
    signal_strength: i32,
    state: String,
    technology: String,
    technology_selection: String,
}

fn decode_err(facet: &'static str, message: impl Into<String>) -> ModemError {
    ModemError::Decode {
        facet,
        message: message.into(),
    }
}

/// Split a combined "MCC+MNC" string: the first three digits are the MCC.
pub fn split_mccmnc(mccmnc: &str) -> Result<(u16, u16), ModemError> {
    let s = mccmnc.trim();
    if s.len() < 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(decode_err("network", format!("invalid mccmnc {:?}", mccmnc)));
    }
    let (mcc, mnc) = s.split_at(3);
    let mcc = mcc
        .parse()
        .map_err(|_| decode_err("network", format!("invalid mcc in {:?}", mccmnc)))?;
    let mnc = mnc
        .parse()
        .map_err(|_| decode_err("network", format!("invalid mnc in {:?}", mccmnc)))?;
    Ok((mcc, mnc))
}

fn parse_decimal(field: &str, value: &str) -> Result<u32, ModemError> {
    value
        .trim()
        .parse()
        .map_err(|_| decode_err("network", format!("invalid {} {:?}", field, value)))
}

/// Parse the network facet output.
pub fn parse_network(bytes: &[u8]) -> Result<NetworkState, ModemError> {
    let raw: RawNetwork =
        serde_json::from_slice(bytes).map_err(|e| decode_err("network", e.to_string()))?;

    let (mcc, mnc) = split_mccmnc(&raw.mccmnc)?;
    let identifier = NetworkIdentifier {
        mcc,
        mnc,
        cid: parse_decimal("cid", &raw.cid)?,
        lac: parse_decimal("lac", &raw.lac)?,
    };

    Ok(NetworkState {
        identifier,
        operator: raw.operator,
        operator_identifier: raw.operator_identifier,
        operator_short: raw.operator_short,
        registration_mode: raw.registration_mode,
        fallback_to_auto: raw.fallback_to_auto,
        signal_rssi: raw.signal_rssi,
        signal_strength: raw.signal_strength,
        state: raw.state,
        technology: raw.technology,
        technology_selection: raw.technology_selection,
    })
}

/// Handle to the modem configuration tool and its latest snapshots.
pub struct Modem {
    command: PathBuf,
    timeout: Duration,
    info: RwLock<Option<DeviceInfo>>,
    wireless: RwLock<Option<WirelessDataService>>,
    network: RwLock<Option<NetworkState>>,
}

impl Modem {
    /// Probe for the modem tool; `NotPresent` when it is not installed.
    pub fn probe(command: impl AsRef<Path>, timeout: Duration) -> Result<Self, ModemError> {
        let command = command.as_ref();
        if !command.is_file() {
            return Err(ModemError::NotPresent(format!(
                "{} does not exist",
                command.display()
            )));
        }

        Ok(Self {
            command: command.to_path_buf(),
            timeout,
            info: RwLock::new(None),
            wireless: RwLock::new(None),
            network: RwLock::new(None),
        })
    }

    /// Fetch all three facets concurrently.
    ///
    /// The first failure wins; the other queries are dropped and their
    /// subprocesses killed.
    pub async fn init(&self, cancel: &CancellationToken) -> Result<(), ModemError> {
        let (info, network, wireless) = tokio::try_join!(
            self.fetch_info(cancel),
            self.fetch_network(cancel),
            self.fetch_wireless(cancel),
        )?;

        *self.info.write() = Some(info);
        *self.network.write() = Some(network);
        *self.wireless.write() = Some(wireless);

        tracing::info!(
            "modem initialized: {}",
            self.network_identifier()
                .map(|id| id.to_string())
                .unwrap_or_default()
        );
        Ok(())
    }

    /// Re-read the facets that change at runtime (network and wireless).
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<(), ModemError> {
        let (network, wireless) =
            tokio::try_join!(self.fetch_network(cancel), self.fetch_wireless(cancel))?;

        *self.network.write() = Some(network);
        *self.wireless.write() = Some(wireless);
        Ok(())
    }

    /// Refresh on a fixed interval until cancelled.
    ///
    /// A failed refresh keeps the previous snapshot.
    pub async fn run(self: Arc<Self>, every: Duration, cancel: CancellationToken) {
        let every = if every.is_zero() {
            tracing::warn!("zero modem refresh interval, using {:?}", DEFAULT_REFRESH_INTERVAL);
            DEFAULT_REFRESH_INTERVAL
        } else {
            every
        };
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.refresh(&cancel).await {
                        Ok(()) => tracing::debug!("modem state refreshed"),
                        Err(ModemError::Cancelled) => break,
                        Err(e) => tracing::warn!("modem refresh failed: {}", e),
                    }
                }
            }
        }

        tracing::debug!("modem refresh loop stopped");
    }

    pub fn network_identifier(&self) -> Option<NetworkIdentifier> {
        self.network.read().as_ref().map(|n| n.identifier)
    }

    pub fn network(&self) -> Option<NetworkState> {
        self.network.read().clone()
    }

    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.info.read().clone()
    }

    pub fn wireless(&self) -> Option<WirelessDataService> {
        self.wireless.read().clone()
    }

    async fn fetch_info(&self, cancel: &CancellationToken) -> Result<DeviceInfo, ModemError> {
        let out = self.query("info", &INFO_ARGS, cancel).await?;
        serde_json::from_slice(&out).map_err(|e| decode_err("info", e.to_string()))
    }

    async fn fetch_network(&self, cancel: &CancellationToken) -> Result<NetworkState, ModemError> {
        let out = self.query("network", &NETWORK_ARGS, cancel).await?;
        parse_network(&out)
    }

    async fn fetch_wireless(
        &self,
        cancel: &CancellationToken,
    ) -> Result<WirelessDataService, ModemError> {
        let out = self.query("wds", &WDS_ARGS, cancel).await?;
        serde_json::from_slice(&out).map_err(|e| decode_err("wds", e.to_string()))
    }

    async fn query(
        &self,
        facet: &'static str,
        args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ModemError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(args).kill_on_drop(true);

        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(ModemError::Cancelled),
            res = tokio::time::timeout(self.timeout, cmd.output()) => match res {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(ModemError::Command { facet, message: e.to_string() })
                }
                Err(_) => {
                    return Err(ModemError::Command { facet, message: "timed out".to_string() })
                }
            },
        };

        if !output.status.success() {
            return Err(ModemError::Command {
                facet,
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const NETWORK_JSON: &str = r#"{
        "cid": "12345", "lac": "678", "mccmnc": "22610",
        "operator": "Vodafone RO", "operator_identifier": "22601",
        "operator_short": "VF", "registration_mode": "automatic",
        "fallback_to_auto": "enabled", "signal_rssi": -71, "signal_strength": 3,
        "state": "registered", "technology": "LTE", "technology_selection": "auto"
    }"#;

    // ===== Parsing Tests =====

    #[test]
    fn test_split_mccmnc_two_digit_mnc() {
        assert_eq!(split_mccmnc("22610").unwrap(), (226, 10));
    }

    #[test]
    fn test_split_mccmnc_three_digit_mnc() {
        assert_eq!(split_mccmnc("310260").unwrap(), (310, 260));
    }

    #[test]
    fn test_split_mccmnc_rejects_short_or_non_numeric() {
        assert!(split_mccmnc("226").is_err());
        assert!(split_mccmnc("").is_err());
        assert!(split_mccmnc("22a10").is_err());
    }

    #[test]
    fn test_parse_network() {
        let state = parse_network(NETWORK_JSON.as_bytes()).unwrap();

        assert_eq!(state.identifier, NetworkIdentifier::new(226, 10, 12345, 678));
        assert_eq!(state.operator, "Vodafone RO");
        assert_eq!(state.signal_rssi, -71);
        assert_eq!(state.technology, "LTE");
    }

    #[test]
    fn test_parse_network_invalid_cid() {
        let json = r#"{"cid": "ffff", "lac": "1", "mccmnc": "22610"}"#;
        assert!(matches!(
            parse_network(json.as_bytes()),
            Err(ModemError::Decode { facet: "network", .. })
        ));
    }

    #[test]
    fn test_modem_error_into_locate_error() {
        let err: LocateError = ModemError::NotPresent("gone".into()).into();
        assert!(matches!(err, LocateError::ProviderUnavailable(_)));

        let err: LocateError = ModemError::Cancelled.into();
        assert_eq!(err, LocateError::Cancelled);
    }

    #[test]
    fn test_probe_missing_command() {
        let result = Modem::probe("/nonexistent/config_mdmd-ng", Duration::from_secs(1));
        assert!(matches!(result, Err(ModemError::NotPresent(_))));
    }

    // ===== Subprocess Tests =====

    #[cfg(unix)]
    fn fake_tool(dir: &tempfile::TempDir, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("config_mdmd-ng");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn working_script() -> String {
        format!(
            r#"#!/bin/sh
case "$1" in
  -m) echo '{{"imei":"356938035643809","manufacturer":"Quectel","model":"EC25","state":"ready","version":"1.0"}}' ;;
  -n) echo '{}' ;;
  -w) echo '{{"apn":"internet","ip":"10.64.0.2","state":"connected","status":"ok"}}' ;;
  *) exit 2 ;;
esac
"#,
            NETWORK_JSON.replace('\n', " ")
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_init_reads_all_facets() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&dir, &working_script());

        let modem = Modem::probe(&tool, Duration::from_secs(5)).unwrap();
        modem.init(&CancellationToken::new()).await.unwrap();

        assert_eq!(
            modem.network_identifier(),
            Some(NetworkIdentifier::new(226, 10, 12345, 678))
        );
        assert_eq!(modem.device_info().unwrap().model, "EC25");
        assert_eq!(modem.wireless().unwrap().apn, "internet");
        assert_eq!(modem.network().unwrap().operator_short, "VF");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_init_fails_when_any_facet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = working_script().replace(r#"-w) echo"#, r#"-w) exit 1; echo"#);
        let tool = fake_tool(&dir, &script);

        let modem = Modem::probe(&tool, Duration::from_secs(5)).unwrap();
        let result = modem.init(&CancellationToken::new()).await;

        assert!(matches!(result, Err(ModemError::Command { facet: "wds", .. })));
        assert!(modem.network_identifier().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_query_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&dir, "#!/bin/sh\nsleep 5\n");

        let modem = Modem::probe(&tool, Duration::from_millis(100)).unwrap();
        let result = modem.refresh(&CancellationToken::new()).await;

        match result {
            Err(ModemError::Command { message, .. }) => assert_eq!(message, "timed out"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&dir, &working_script());

        let modem = Arc::new(Modem::probe(&tool, Duration::from_secs(5)).unwrap());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(modem.clone().run(Duration::from_millis(20), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(modem.network_identifier().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_with_zero_interval_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&dir, &working_script());

        let modem = Arc::new(Modem::probe(&tool, Duration::from_secs(5)).unwrap());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(modem.clone().run(Duration::ZERO, cancel.clone()));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        // Default period is minutes away, no refresh happened yet
        assert!(modem.network_identifier().is_none());
    }
}
