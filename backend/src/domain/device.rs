//! Lampi device records and association primitives.
//!
//! A Lampi is identified by its factory id (the device MAC address with the
//! separators stripped). Users claim a lamp by entering the short
//! association code printed on it; the code is a fingerprint of the device
//! id, so it can be re-derived for verification without storing secrets.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::UserId;

/// Validation errors for device values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceValidationError {
    /// Device id is not 12 hex characters.
    #[error("device id must be 12 hexadecimal characters")]
    InvalidDeviceId,
    /// Association code is not 6 hex characters.
    #[error("association code must be 6 hexadecimal characters")]
    InvalidAssociationCode,
    /// Device name is blank once trimmed.
    #[error("device name must not be empty")]
    EmptyName,
    /// Device name exceeds the allowed length.
    #[error("device name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Device name contains characters outside the allowed set.
    #[error("device name may only contain letters, numbers, spaces, hyphens, or underscores")]
    NameInvalidCharacters,
}

fn is_lower_hex(value: &str, expected_len: usize) -> bool {
    value.len() == expected_len && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Factory identifier of a Lampi: 12 lowercase hex characters.
///
/// Uppercase input is normalised; anything that is not a 12-digit hex string
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Validate and construct a [`DeviceId`].
    ///
    /// # Errors
    /// Returns [`DeviceValidationError::InvalidDeviceId`] unless the input is
    /// exactly 12 hex characters.
    pub fn new(id: impl AsRef<str>) -> Result<Self, DeviceValidationError> {
        let normalised = id.as_ref().to_ascii_lowercase();
        if !is_lower_hex(&normalised, 12) {
            return Err(DeviceValidationError::InvalidDeviceId);
        }
        Ok(Self(normalised))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DeviceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeviceId> for String {
    fn from(value: DeviceId) -> Self {
        value.0
    }
}

impl TryFrom<String> for DeviceId {
    type Error = DeviceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Length of an association code in hex characters.
pub const ASSOCIATION_CODE_LEN: usize = 6;

/// Short claim code printed on the lamp.
///
/// Canonically the first [`ASSOCIATION_CODE_LEN`] hex characters of the
/// SHA-256 digest of the device id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssociationCode(String);

impl AssociationCode {
    /// Validate and construct an [`AssociationCode`] from user input.
    ///
    /// # Errors
    /// Returns [`DeviceValidationError::InvalidAssociationCode`] unless the
    /// input is exactly 6 hex characters (case-insensitive).
    pub fn new(code: impl AsRef<str>) -> Result<Self, DeviceValidationError> {
        let normalised = code.as_ref().trim().to_ascii_lowercase();
        if !is_lower_hex(&normalised, ASSOCIATION_CODE_LEN) {
            return Err(DeviceValidationError::InvalidAssociationCode);
        }
        Ok(Self(normalised))
    }

    /// Derive the canonical association code for a device.
    #[must_use]
    pub fn derive(device_id: &DeviceId) -> Self {
        let digest = Sha256::digest(device_id.as_str().as_bytes());
        let mut code = hex::encode(digest);
        code.truncate(ASSOCIATION_CODE_LEN);
        Self(code)
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AssociationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AssociationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AssociationCode> for String {
    fn from(value: AssociationCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for AssociationCode {
    type Error = DeviceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a device name.
pub const DEVICE_NAME_MAX: usize = 64;

/// Human label for a lamp, shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceName(String);

impl DeviceName {
    /// Validate and construct a [`DeviceName`].
    ///
    /// # Errors
    /// Rejects blank, over-long, or out-of-alphabet names.
    pub fn new(name: impl Into<String>) -> Result<Self, DeviceValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DeviceValidationError::EmptyName);
        }
        if name.chars().count() > DEVICE_NAME_MAX {
            return Err(DeviceValidationError::NameTooLong {
                max: DEVICE_NAME_MAX,
            });
        }
        let allowed = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'));
        if !allowed {
            return Err(DeviceValidationError::NameInvalidCharacters);
        }
        Ok(Self(name))
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DeviceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DeviceName> for String {
    fn from(value: DeviceName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DeviceName {
    type Error = DeviceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Persisted device record.
///
/// ## Invariants
/// - An unassociated lamp has neither an owner nor an association timestamp.
/// - Associating sets both together; repositories must persist the pair in a
///   single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lampi {
    /// Factory identifier (12 hex characters).
    #[schema(value_type = String, example = "b827eb08451e")]
    id: DeviceId,
    /// Human label shown in listings.
    #[schema(value_type = String, example = "Living Room")]
    name: DeviceName,
    /// Owning user, absent until the lamp is claimed.
    #[schema(value_type = Option<String>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<UserId>,
    /// When the lamp was claimed, absent until then.
    #[schema(value_type = Option<String>, example = "2026-08-29T12:00:00Z")]
    #[serde(skip_serializing_if = "Option::is_none")]
    associated_at: Option<DateTime<Utc>>,
}

impl Lampi {
    /// Build an unassociated device record.
    #[must_use]
    pub fn unassociated(id: DeviceId, name: DeviceName) -> Self {
        Self {
            id,
            name,
            owner: None,
            associated_at: None,
        }
    }

    /// Rehydrate a record from storage.
    #[must_use]
    pub fn from_parts(
        id: DeviceId,
        name: DeviceName,
        owner: Option<UserId>,
        associated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            associated_at,
        }
    }

    /// Factory identifier.
    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Human label.
    #[must_use]
    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    /// Owning user, if claimed.
    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    /// Claim timestamp, if claimed.
    #[must_use]
    pub fn associated_at(&self) -> Option<DateTime<Utc>> {
        self.associated_at
    }

    /// Whether the lamp has been claimed by any user.
    #[must_use]
    pub fn is_associated(&self) -> bool {
        self.owner.is_some()
    }

    /// Stamp ownership onto an unclaimed lamp, returning the event to
    /// publish.
    ///
    /// # Errors
    /// Returns [`AssociationRefused`] when the lamp already has an owner.
    pub fn associate(
        &mut self,
        user: UserId,
        at: DateTime<Utc>,
    ) -> Result<DeviceAssociated, AssociationRefused> {
        if let Some(existing) = &self.owner {
            return Err(AssociationRefused {
                device_id: self.id.clone(),
                owner: existing.clone(),
            });
        }
        self.owner = Some(user.clone());
        self.associated_at = Some(at);
        Ok(DeviceAssociated {
            device_id: self.id.clone(),
            user_id: user,
            associated_at: at,
        })
    }
}

/// Refusal raised when associating a lamp that already has an owner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device {device_id} is already associated")]
pub struct AssociationRefused {
    /// The contested device.
    pub device_id: DeviceId,
    /// Its current owner.
    pub owner: UserId,
}

/// Event published after a lamp is claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAssociated {
    /// The claimed device.
    pub device_id: DeviceId,
    /// The new owner.
    pub user_id: UserId,
    /// When ownership was recorded.
    pub associated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn device_id() -> DeviceId {
        DeviceId::new("b827eb08451e").expect("valid id")
    }

    fn user_id() -> UserId {
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid user id")
    }

    #[rstest]
    #[case("")]
    #[case("b827eb08451")]
    #[case("b827eb08451ef")]
    #[case("b827eb08451g")]
    #[case("b8:27:eb:08:45:1e")]
    fn device_id_rejects_non_mac_input(#[case] raw: &str) {
        assert_eq!(
            DeviceId::new(raw).expect_err("must fail"),
            DeviceValidationError::InvalidDeviceId
        );
    }

    #[test]
    fn device_id_normalises_case() {
        let id = DeviceId::new("B827EB08451E").expect("valid id");
        assert_eq!(id.as_str(), "b827eb08451e");
    }

    #[test]
    fn association_code_derivation_is_stable() {
        let first = AssociationCode::derive(&device_id());
        let second = AssociationCode::derive(&device_id());
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), ASSOCIATION_CODE_LEN);
        assert!(first.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case("")]
    #[case("12345")]
    #[case("1234567")]
    #[case("12345z")]
    fn association_code_rejects_malformed_input(#[case] raw: &str) {
        assert_eq!(
            AssociationCode::new(raw).expect_err("must fail"),
            DeviceValidationError::InvalidAssociationCode
        );
    }

    #[test]
    fn association_code_accepts_uppercase_input() {
        let derived = AssociationCode::derive(&device_id());
        let typed =
            AssociationCode::new(derived.as_str().to_ascii_uppercase()).expect("valid code");
        assert_eq!(typed, derived);
    }

    #[test]
    fn associate_stamps_owner_and_returns_event() {
        let mut lamp = Lampi::unassociated(
            device_id(),
            DeviceName::new("Living Room").expect("valid name"),
        );
        let now = Utc::now();
        let event = lamp.associate(user_id(), now).expect("first claim succeeds");

        assert!(lamp.is_associated());
        assert_eq!(lamp.owner(), Some(&user_id()));
        assert_eq!(lamp.associated_at(), Some(now));
        assert_eq!(event.device_id, device_id());
        assert_eq!(event.user_id, user_id());
        assert_eq!(event.associated_at, now);
    }

    #[test]
    fn associate_refuses_claimed_lamp() {
        let mut lamp = Lampi::unassociated(
            device_id(),
            DeviceName::new("Living Room").expect("valid name"),
        );
        let now = Utc::now();
        lamp.associate(user_id(), now).expect("first claim succeeds");

        let second_user =
            UserId::new("123e4567-e89b-12d3-a456-426614174000").expect("valid user id");
        let refused = lamp
            .associate(second_user, Utc::now())
            .expect_err("second claim must be refused");
        assert_eq!(refused.device_id, device_id());
        assert_eq!(refused.owner, user_id());
    }

    #[test]
    fn lampi_serialises_camel_case_and_omits_missing_owner() {
        let lamp = Lampi::unassociated(
            device_id(),
            DeviceName::new("Living Room").expect("valid name"),
        );
        let value = serde_json::to_value(&lamp).expect("serialise");
        assert_eq!(value["id"], serde_json::json!("b827eb08451e"));
        assert!(value.get("owner").is_none());
        assert!(value.get("associatedAt").is_none());
    }
}
