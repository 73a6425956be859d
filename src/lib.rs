//! # chorus-pro
//!
//! Compliance checks, deposit payloads and status synchronisation for
//! invoices sent to [Chorus Pro](https://chorus-pro.gouv.fr), the French
//! public-sector e-invoicing portal.
//!
//! The crate does not persist anything. It works on plain records
//! ([`Invoice`], [`Partner`], [`Company`]) owned by the caller and talks to the
//! portal through the [`api::ChorusTransport`] trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use chorus_pro::core::*;
//!
//! let company = CompanyBuilder::new(1, "ACME SAS")
//!     .partner(PartnerBuilder::company("ACME SAS").siret("732829320", "00074").build())
//!     .build();
//! let customer = PartnerBuilder::company("Mairie de Lyon")
//!     .siret("216901231", "00011")
//!     .build();
//!
//! let invoice = InvoiceBuilder::new("FAC/2024/0001", MoveType::OutInvoice, company)
//!     .partner(customer)
//!     .transmit_method(CHORUS_TRANSMIT_METHOD)
//!     .add_attachment(Attachment::new("bon_de_commande.pdf", b"%PDF-1.7".to_vec()))
//!     .build()
//!     .unwrap();
//!
//! assert!(invoice.is_chorus());
//! assert!(check_chorus_attachments(&invoice).is_ok());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Records, attachment and payment checks, post gate, commitment and status API calls |
//! | `payload` | Deposit payload builder (base64, gzip tar batches) and flow deposit |
//! | `http` | Blocking `reqwest` transport for the Chorus Pro API |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod api;

#[cfg(feature = "payload")]
pub mod payload;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
