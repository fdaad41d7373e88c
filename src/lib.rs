/// Balance-holding accounts. Every mutation is validated into an event and
/// applied under the account's own lock.
pub mod account;

/// Two-party funds movement with compensating rollback.
pub mod transfer;

/// Append-only record of transfer attempts.
pub mod history;

/// The registry owning accounts, their lifecycle and the transfer history,
/// plus read-only reporting views over it.
pub mod ledger;

/// Typed ledger commands parsed from loosely structured input.
pub mod command;

/// Command processor interface, implemented by [`ledger::Ledger`].
///
/// NOTE: the ledger is usable without it; this is the seam for front ends
/// such as the bundled script runner.
pub mod processor;

/// Script runner used by the binary. Lives in the library so integration
/// tests can drive it.
pub mod bin_utils;
