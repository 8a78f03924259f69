//! Contact messages and the observer interface.
//!
//! Submodules:
//! - [`contact`] – collision/overlap/tile/world-edge messages buffered during
//!   a step, plus the [`ContactObserver`](contact::ContactObserver) trait the
//!   world forwards them to

pub mod contact;
