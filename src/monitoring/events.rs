/*!
 * CAEP Security Events
 * Session-risk-change events in the shape the collector expects
 */

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_RISK_CHANGE: &str =
    "https://schemas.openid.net/secevent/caep/event-type/session-risk-change";
pub const RISK_LEVEL_HIGH: &str = "high";
pub const RISK_TYPE_SENSITIVE_FILE_ACCESS: &str = "sensitive_file_access";

/// Kind of access that triggered an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    FileAccess,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::FileAccess => "file_access",
        }
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide event counter, incremented once per emitted event
#[derive(Debug, Default)]
pub struct EventCounter(AtomicU64);

impl EventCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment and return the new value
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Subject identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectId {
    pub format: String,
    pub email: String,
}

impl SubjectId {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            format: "email".to_string(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomData {
    pub file_path: String,
    pub access_type: AccessType,
    pub lab_session: bool,
}

/// Body of the session-risk-change event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRiskChange {
    pub initiating_entity: String,
    pub risk_level: String,
    pub risk_type: String,
    /// Localized reason text keyed by language tag
    pub reason_admin: BTreeMap<String, String>,
    /// Milliseconds since the Unix epoch
    pub event_timestamp: u64,
    pub custom_data: CustomData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypes {
    #[serde(rename = "https://schemas.openid.net/secevent/caep/event-type/session-risk-change")]
    pub session_risk_change: SessionRiskChange,
}

/// Security event envelope
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub iss: String,
    pub jti: String,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub iat: SystemTime,
    pub aud: String,
    pub sub_id: SubjectId,
    pub events: EventTypes,
}

/// Identity fields stamped onto every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdentity {
    pub issuer: String,
    pub audience: String,
    pub subject_email: String,
}

impl SecurityEvent {
    /// Build a sensitive-file-access event for `file_path`
    pub fn sensitive_file_access(
        identity: &EventIdentity,
        sequence: u64,
        file_path: &Path,
        access_type: AccessType,
        now: SystemTime,
    ) -> Self {
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        let basename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut reason_admin = BTreeMap::new();
        reason_admin.insert(
            "en".to_string(),
            format!("Sensitive file accessed: {}", basename),
        );

        Self {
            iss: identity.issuer.clone(),
            jti: format!("event-{}-{}", since_epoch.as_secs(), sequence),
            // Whole seconds so the wire value and the struct agree
            iat: UNIX_EPOCH + std::time::Duration::from_secs(since_epoch.as_secs()),
            aud: identity.audience.clone(),
            sub_id: SubjectId::email(identity.subject_email.clone()),
            events: EventTypes {
                session_risk_change: SessionRiskChange {
                    initiating_entity: "system".to_string(),
                    risk_level: RISK_LEVEL_HIGH.to_string(),
                    risk_type: RISK_TYPE_SENSITIVE_FILE_ACCESS.to_string(),
                    reason_admin,
                    event_timestamp: since_epoch.as_millis() as u64,
                    custom_data: CustomData {
                        file_path: file_path.to_string_lossy().into_owned(),
                        access_type,
                        lab_session: true,
                    },
                },
            },
        }
    }

    pub fn event_id(&self) -> &str {
        &self.jti
    }

    pub fn body(&self) -> &SessionRiskChange {
        &self.events.session_risk_change
    }
}
