//! # Domain Value Objects
//!
//! Immutable value types for remote node confirmation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a confirmation report inside the rolling log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single confirmation report.
///
/// Transitions only move forward: `Created -> PartiallyResolved -> Resolved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportState {
    /// Every sampled validator is still processing.
    Created,
    /// Some, but not all, validators have answered.
    PartiallyResolved,
    /// No validator is left processing.
    Resolved,
}

/// 24-bit RGB color of the trust indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Packed `0xRRGGBB` value.
    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Trust indicator derived from the rolling log.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustSnapshot {
    /// Serving-node baselines plus confirming validators.
    pub confirmations: usize,
    /// Rejecting validators.
    pub rejections: usize,
    /// `min(1, 2 * rejections / confirmations)`, 0 without data.
    pub rejection_ratio: f64,
    /// Indicator color.
    pub color: Rgb,
    /// True when no rejection was seen.
    pub trusted: bool,
}

/// One rolling-log row as handed to the UI sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Request type the report cross-checked.
    pub request_type: String,
    /// Announced addresses of confirming validators.
    pub confirming_addresses: Vec<String>,
    /// Announced addresses of rejecting validators.
    pub rejecting_addresses: Vec<String>,
}

/// Consolidated outcome of a resolved report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Report id.
    pub id: ReportId,
    /// Request type.
    pub request_type: String,
    /// Number of validators sampled.
    pub sampled: usize,
    /// Number of agreeing validators.
    pub confirmations: usize,
    /// Number of disagreeing validators.
    pub rejections: usize,
}

impl ReportSummary {
    /// Validators that answered with an error and were left out of the tally.
    pub fn failures(&self) -> usize {
        self.sampled
            .saturating_sub(self.confirmations)
            .saturating_sub(self.rejections)
    }
}

/// Update pushed to the UI sink after every trust recompute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrustUpdate {
    /// Rolling log, most recent first.
    pub rows: Vec<ReportRow>,
    /// Current trust indicator.
    pub snapshot: TrustSnapshot,
}

/// Transaction attachment kinds the ledger API reports as `version.<Kind>` keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// Plain message stored permanently.
    Message,
    /// Encrypted message stored permanently.
    EncryptedMessage,
    /// Message encrypted to the sender.
    EncryptToSelfMessage,
    /// Recipient public key announcement.
    PublicKeyAnnouncement,
    /// Phasing parameters.
    Phasing,
    /// Plain message that may be pruned.
    PrunablePlainMessage,
    /// Encrypted message that may be pruned.
    PrunableEncryptedMessage,
    /// Prunable encrypted message submitted unencrypted.
    UnencryptedPrunableEncryptedMessage,
    /// Shuffling processing data.
    ShufflingProcessing,
    /// Tagged data upload.
    TaggedDataUpload,
    /// Tagged data extension.
    TaggedDataExtend,
    /// Ordinary payment.
    OrdinaryPayment,
    /// Arbitrary message transaction.
    ArbitraryMessage,
}

/// Attachment kinds whose payload nodes may have pruned.
pub const PRUNABLE_ATTACHMENTS: [AttachmentKind; 5] = [
    AttachmentKind::PrunablePlainMessage,
    AttachmentKind::PrunableEncryptedMessage,
    AttachmentKind::UnencryptedPrunableEncryptedMessage,
    AttachmentKind::ShufflingProcessing,
    AttachmentKind::TaggedDataUpload,
];

impl AttachmentKind {
    /// Wire prefix of attachment version keys.
    pub const VERSION_PREFIX: &'static str = "version.";

    /// Parse the kind named by a `version.<Kind>` attachment key.
    pub fn from_version_key(key: &str) -> Option<Self> {
        key.strip_prefix(Self::VERSION_PREFIX)
            .and_then(Self::from_name)
    }

    /// Parse a bare kind name.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Message" => Self::Message,
            "EncryptedMessage" => Self::EncryptedMessage,
            "EncryptToSelfMessage" => Self::EncryptToSelfMessage,
            "PublicKeyAnnouncement" => Self::PublicKeyAnnouncement,
            "Phasing" => Self::Phasing,
            "PrunablePlainMessage" => Self::PrunablePlainMessage,
            "PrunableEncryptedMessage" => Self::PrunableEncryptedMessage,
            "UnencryptedPrunableEncryptedMessage" => Self::UnencryptedPrunableEncryptedMessage,
            "ShufflingProcessing" => Self::ShufflingProcessing,
            "TaggedDataUpload" => Self::TaggedDataUpload,
            "TaggedDataExtend" => Self::TaggedDataExtend,
            "OrdinaryPayment" => Self::OrdinaryPayment,
            "ArbitraryMessage" => Self::ArbitraryMessage,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether honest nodes may disagree on this kind's non-hash content.
    pub fn is_prunable(self) -> bool {
        PRUNABLE_ATTACHMENTS.contains(&self)
    }
}

/// Replay characteristics of an API request type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTraits {
    /// Mutating request that must be sent with POST.
    pub require_post: bool,
    /// Safe to replay against another node.
    pub forwardable: bool,
}

impl RequestTraits {
    /// Read-only request any node can answer identically.
    pub const fn replayable() -> Self {
        Self {
            require_post: false,
            forwardable: true,
        }
    }

    /// Mutating request.
    pub const fn mutating() -> Self {
        Self {
            require_post: true,
            forwardable: false,
        }
    }

    /// Read whose answer is specific to the node that served it.
    pub const fn node_local() -> Self {
        Self {
            require_post: false,
            forwardable: false,
        }
    }
}
