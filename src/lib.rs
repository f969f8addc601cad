//! The library code for the `slidenav` deck linker. Given a directory of HTML
//! slides, a build does three things:
//!
//! 1. Discovers the slides and puts them in deck order by the first number
//!    in each file name ([`crate::slide`])
//! 2. Injects a previous / home / next navigation bar into every slide,
//!    replacing whatever bar an earlier build left there ([`crate::nav`],
//!    [`crate::html`])
//! 3. Writes an index page listing every slide in order ([`crate::index`])
//!
//! The second step is the interesting one. Slides are rewritten in place, so
//! a build has to recognize its own output on the next run; fragments carry
//! a marker attribute and [`crate::html`] finds them structurally rather than
//! by their text, which keeps the build idempotent across restyled templates.
//!
//! [`crate::build::build_site`] ties the steps together and
//! [`crate::config::Config`] says where the slides are and how to treat them.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod html;
pub mod index;
pub mod nav;
pub mod slide;
pub mod template;
