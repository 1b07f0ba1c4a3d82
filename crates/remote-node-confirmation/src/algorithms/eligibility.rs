//! # Request Eligibility
//!
//! Decides which requests get cross-checked. A request is confirmable iff
//! its base type is not mutating and is safe to replay on another node.

use std::collections::HashMap;

use crate::domain::RequestTraits;

const REPLAYABLE: &[&str] = &[
    "getBlock",
    "getBlocks",
    "getBlockId",
    "getAccount",
    "getAccountId",
    "getAccountPublicKey",
    "getAccountBlockCount",
    "getAccountBlockIds",
    "getAccountBlocks",
    "getAccountLessors",
    "getAccountLedger",
    "getAccountAssets",
    "getBalance",
    "getGuaranteedBalance",
    "getAsset",
    "getAssets",
    "getAssetIds",
    "getAllAssets",
    "getAskOrders",
    "getBidOrders",
    "getTrades",
    "getAllTrades",
    "getDGSGood",
    "getDGSGoods",
    "getDGSPurchases",
    "getDGSPendingPurchases",
    "getAlias",
    "getAliases",
    "getCurrency",
    "getAllCurrencies",
    "getExchanges",
    "getPoll",
    "getPolls",
    "getPhasingPoll",
    "getTaggedData",
    "getBlockchainTransactions",
];

const NODE_LOCAL: &[&str] = &[
    "getTransaction",
    "getUnconfirmedTransactions",
    "getUnconfirmedTransactionIds",
    "getPeers",
    "getPeer",
    "getBlockchainStatus",
    "getState",
    "getTime",
    "getMyInfo",
    "getConstants",
];

const MUTATING: &[&str] = &[
    "sendMoney",
    "sendMessage",
    "broadcastTransaction",
    "uploadTaggedData",
    "extendTaggedData",
    "transferAsset",
    "placeAskOrder",
    "placeBidOrder",
    "setAlias",
    "leaseBalance",
    "dgsPurchase",
    "castVote",
    "approveTransaction",
    "startForging",
    "stopForging",
];

/// Strip a trailing `+suffix` sub-operation. A leading `+` is kept.
pub fn base_request_type(request_type: &str) -> &str {
    match request_type.find('+') {
        Some(index) if index > 0 => &request_type[..index],
        _ => request_type,
    }
}

/// Replay characteristics of known request types.
#[derive(Clone, Debug)]
pub struct RequestCatalog {
    entries: HashMap<String, RequestTraits>,
}

impl Default for RequestCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RequestCatalog {
    /// Catalog that knows nothing; every request is ineligible.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog of the common ledger API requests.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for name in REPLAYABLE {
            catalog.insert(name, RequestTraits::replayable());
        }
        for name in NODE_LOCAL {
            catalog.insert(name, RequestTraits::node_local());
        }
        for name in MUTATING {
            catalog.insert(name, RequestTraits::mutating());
        }
        catalog
    }

    /// Register or override a request type.
    pub fn insert(&mut self, request_type: &str, traits: RequestTraits) {
        self.entries.insert(request_type.to_string(), traits);
    }

    /// Traits of a base request type, if known.
    pub fn traits(&self, request_type: &str) -> Option<RequestTraits> {
        self.entries.get(request_type).copied()
    }

    /// Mutating request that must be POSTed.
    pub fn is_require_post(&self, request_type: &str) -> bool {
        self.traits(request_type).is_some_and(|t| t.require_post)
    }

    /// Safe to replay on another node. Unknown types are not.
    pub fn is_forwardable(&self, request_type: &str) -> bool {
        self.traits(request_type).is_some_and(|t| t.forwardable)
    }

    /// Whether a response to `request_type` should be cross-checked.
    pub fn needs_confirmation(&self, request_type: &str) -> bool {
        let base = base_request_type(request_type);
        !self.is_require_post(base) && self.is_forwardable(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_request_type() {
        assert_eq!(base_request_type("getBlock"), "getBlock");
        assert_eq!(base_request_type("getBlock+includeTx"), "getBlock");
        assert_eq!(base_request_type("+getBlock"), "+getBlock");
        assert_eq!(base_request_type("getBlock+a+b"), "getBlock");
    }

    #[test]
    fn test_read_only_requests_need_confirmation() {
        let catalog = RequestCatalog::builtin();
        assert!(catalog.needs_confirmation("getBlock"));
        assert!(catalog.needs_confirmation("getTrades"));
        assert!(catalog.needs_confirmation("getDGSPendingPurchases"));
        assert!(catalog.needs_confirmation("getAccount+page2"));
    }

    #[test]
    fn test_node_local_requests_skipped() {
        let catalog = RequestCatalog::builtin();
        assert!(!catalog.needs_confirmation("getTransaction"));
        assert!(!catalog.needs_confirmation("getPeers"));
    }

    #[test]
    fn test_mutating_requests_skipped() {
        let catalog = RequestCatalog::builtin();
        assert!(catalog.is_require_post("extendTaggedData"));
        assert!(!catalog.needs_confirmation("extendTaggedData"));
        assert!(!catalog.needs_confirmation("sendMoney+x"));
    }

    #[test]
    fn test_unknown_requests_skipped() {
        let catalog = RequestCatalog::builtin();
        assert!(!catalog.needs_confirmation("getSomethingNew"));
        assert!(!RequestCatalog::empty().needs_confirmation("getBlock"));
    }

    #[test]
    fn test_forwardable_but_post_only_is_skipped() {
        let mut catalog = RequestCatalog::empty();
        catalog.insert(
            "odd",
            RequestTraits {
                require_post: true,
                forwardable: true,
            },
        );
        assert!(!catalog.needs_confirmation("odd"));
    }
}
