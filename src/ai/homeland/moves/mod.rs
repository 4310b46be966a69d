//! Per-category move handlers, all implemented on [`super::HomelandAi`].
//!
//! Target-list categories (garrison, sentry, mobile reserve, ruins) run the
//! nearest-unit matcher once per target. The rest look at each idle unit
//! on its own.

mod explore;
mod military;
mod safety;
mod support;
mod workers;
