//! Content language settings admin service.
//!
//! Per entity type and bundle, a site stores which language new content
//! defaults to (`langcode`, or the `site_default` sentinel) and whether the
//! content edit form shows a language selector (`language_show`). This crate
//! builds the admin form for those settings from entity metadata, applies
//! submissions back into a key/value config store, and serves both over a
//! small axum surface.
//!
//! The form builder and submission handler are plain functions over the
//! [`metadata::EntityMetadata`] and [`store::ConfigStore`] traits, so the
//! crate is also usable as a library without the web layer.

pub mod config;
pub mod error;
pub mod form;
pub mod metadata;
pub mod security;
pub mod settings;
pub mod store;
pub mod submit;
pub mod web;

pub use error::SettingsError;
pub use form::{build_settings_form, FormDescriptor};
pub use metadata::{BundleInfo, EntityMetadata, EntityRegistry, EntityTypeDescriptor};
pub use settings::{LanguageSettings, SettingsKey, SITE_DEFAULT_LANGCODE};
pub use store::{ConfigStore, MemoryConfigStore, SqliteConfigStore};
pub use submit::{apply_submission, SubmittedValues};
