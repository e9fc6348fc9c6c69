//! Thread-safe linked collections with stable node handles.
//!
//! This crate provides two in-process containers for generic payloads:
//!
//! - [`List`]: a doubly-linked list. Insertion returns a [`NodeHandle`]
//!   usable for O(1) deletion or as an anchor for further insertion.
//! - [`Ring`]: a fixed-capacity circular buffer that overwrites its oldest
//!   slot once full.
//!
//! Both take `&self` for every operation and can be shared across threads
//! behind an `Arc`. Payloads that implement [`Identify`] can be looked up by
//! their string identity.
//!
//! # Example
//!
//! ```
//! use nexus_linked::{Identify, List, Ring};
//!
//! #[derive(Clone)]
//! struct Order {
//!     id: String,
//!     qty: u32,
//! }
//!
//! impl Identify for Order {
//!     fn id(&self) -> &str {
//!         &self.id
//!     }
//! }
//!
//! let book = List::new();
//! book.append(Order { id: "o-1".into(), qty: 10 });
//! let second = book.append(Order { id: "o-2".into(), qty: 5 });
//! book.append(Order { id: "o-3".into(), qty: 7 });
//!
//! assert!(book.delete(&second));
//! assert!(book.get("o-2").is_none());
//! assert_eq!(book.data().map(|o| o.qty).sum::<u32>(), 17);
//!
//! let recent = Ring::with_capacity(2).unwrap();
//! for order in book.data() {
//!     recent.add(order);
//! }
//! assert_eq!(recent.find("o-3").map(|e| e.qty), Some(7));
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber. Rejected
//! handles are logged at `debug`; ring allocation and wrap-around at `trace`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identity;
pub mod list;
pub mod node;
pub mod ring;

pub use error::{LinkError, RingError};
pub use identity::Identify;
pub use list::{Data, List, Nodes};
pub use node::NodeHandle;
pub use ring::{Ring, RingEntry, RingIter};
